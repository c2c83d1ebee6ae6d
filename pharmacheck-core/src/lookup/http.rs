//! HTTP client for the product verification service.
//!
//! `GET {base}/{id}/?format=json` returns `{ pharmacy, latest_block }`.
//! Every outcome is classified into [`VerifyError`]; nothing is retried.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::ProductLookup;
use crate::error::{Result, VerifyError};
use crate::identifier::ProductId;
use crate::product::VerificationRecord;

/// Default verification service base URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Deadline for a single lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the HTTP lookup client.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Base URL, without the identifier segment.
    pub api_url: String,
    /// Deadline after which the request is aborted.
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_url: std::env::var("PHARMACHECK_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timeout: std::env::var("PHARMACHECK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

/// Verification service client.
pub struct HttpProductLookup {
    client: Client,
    base: Url,
    config: LookupConfig,
}

impl HttpProductLookup {
    /// Create a client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(LookupConfig::default())
    }

    #[instrument(level = "debug", skip_all, fields(
        api_url = %config.api_url,
        timeout_ms = config.timeout.as_millis() as u64
    ))]
    pub fn with_config(config: LookupConfig) -> Result<Self> {
        debug!("Creating verification client");

        let base = Url::parse(config.api_url.trim_end_matches('/')).map_err(|e| {
            warn!(error = %e, "Invalid verification service URL");
            VerifyError::InvalidConfig(format!("Invalid API URL '{}': {e}", config.api_url))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to create HTTP client");
                VerifyError::InvalidConfig(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Lookup URL for `id`.
    pub fn endpoint(&self, id: &ProductId) -> Url {
        let mut url = self.base.clone();
        // Base URLs are always hierarchical (http/https), so segments can be pushed.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string()).push("");
        }
        url.query_pairs_mut().append_pair("format", "json");
        url
    }

    async fn fetch(&self, url: Url) -> Result<VerificationRecord> {
        let response = self.client.get(url).send().await.map_err(classify_transport)?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body = response.bytes().await.map_err(classify_transport)?;
        let record = VerificationRecord::from_json(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse verification response");
            VerifyError::MalformedResponse(e.to_string())
        })?;

        if record.is_previously_used() {
            return Err(VerifyError::AlreadyUsed {
                record: Box::new(record),
            });
        }

        Ok(record)
    }
}

#[async_trait]
impl ProductLookup for HttpProductLookup {
    #[instrument(level = "info", skip(self), fields(id = %id))]
    async fn lookup(&self, id: &ProductId) -> Result<VerificationRecord> {
        let start = Instant::now();
        let url = self.endpoint(id);
        debug!(url = %url, "Fetching verification record");

        // Dropping the request future at the deadline aborts it.
        let result = match tokio::time::timeout(self.config.timeout, self.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(VerifyError::Timeout),
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(record) => info!(
                latency_ms,
                product = %record.pharmacy.name,
                "Product verified"
            ),
            Err(e) => warn!(latency_ms, kind = ?e.kind(), error = %e, "Verification failed"),
        }

        result
    }
}

/// Map a transport-level failure onto the error taxonomy.
fn classify_transport(error: reqwest::Error) -> VerifyError {
    if error.is_timeout() {
        VerifyError::Timeout
    } else if error.is_decode() {
        VerifyError::MalformedResponse(error.to_string())
    } else {
        VerifyError::NetworkError(error.to_string())
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
pub fn classify_status(status: StatusCode) -> VerifyError {
    if status == StatusCode::NOT_FOUND {
        VerifyError::NotFound
    } else {
        VerifyError::ServerError {
            status: status.as_u16(),
        }
    }
}
