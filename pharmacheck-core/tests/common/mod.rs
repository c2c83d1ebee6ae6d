//! Shared helpers: an in-process verification backend and scripted lookups.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use pharmacheck_core::fixtures::sample_record;
use pharmacheck_core::{ProductId, ProductLookup, VerificationRecord, VerifyError};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub const SAMPLE: &str = "4a43bbb0-68b1-413a-bcf8-b50fd0174d05";
pub const UNKNOWN: &str = "12345678-1234-1234-1234-123456789012";

/// How the fake backend answers a known identifier.
#[derive(Clone)]
pub enum Reply {
    Record { is_read: bool },
    Status(u16),
    Body(&'static str),
}

#[derive(Clone)]
struct Backend {
    reply: Reply,
    delay: Duration,
    hits: Arc<AtomicUsize>,
}

async fn product(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    if query.get("format").map(String::as_str) != Some("json") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    tokio::time::sleep(backend.delay).await;

    if id != SAMPLE {
        return StatusCode::NOT_FOUND.into_response();
    }

    match backend.reply {
        Reply::Record { is_read } => {
            let mut record = sample_record();
            record.pharmacy.is_read = is_read;
            axum::Json(record).into_response()
        }
        Reply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Reply::Body(body) => (
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
    }
}

/// A verification backend on 127.0.0.1 with a random port.
pub struct TestBackend {
    pub api_url: String,
    pub hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl TestBackend {
    pub async fn start(reply: Reply) -> Self {
        Self::start_with_delay(reply, Duration::ZERO).await
    }

    pub async fn start_with_delay(reply: Reply, delay: Duration) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let backend = Backend {
            reply,
            delay,
            hits: Arc::clone(&hits),
        };
        let router = Router::new()
            .route("/api/{id}/", get(product))
            .with_state(backend);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            api_url: format!("http://{addr}/api"),
            hits,
            handle,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Lookup with a scripted answer that counts calls and can be held open.
pub struct ScriptedLookup {
    pub calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    delay: Duration,
    is_read: Option<bool>,
}

impl ScriptedLookup {
    /// Answers with the sample record (`is_read` as given) or `NotFound` for `None`.
    pub fn new(is_read: Option<bool>, delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: None,
            delay,
            is_read,
        }
    }

    /// Waits for `gate` to be notified before answering.
    pub fn gated(is_read: Option<bool>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(is_read, Duration::ZERO)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductLookup for ScriptedLookup {
    async fn lookup(&self, _id: &ProductId) -> Result<VerificationRecord, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        tokio::time::sleep(self.delay).await;

        match self.is_read {
            None => Err(VerifyError::NotFound),
            Some(true) => {
                let mut record = sample_record();
                record.pharmacy.is_read = true;
                Err(VerifyError::AlreadyUsed {
                    record: Box::new(record),
                })
            }
            Some(false) => Ok(sample_record()),
        }
    }
}
