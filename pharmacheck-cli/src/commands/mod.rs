//! Subcommand implementations.

pub mod chat;
pub mod demo;
pub mod extract;
pub mod route;
pub mod scan;
pub mod tutorial;
pub mod verify;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use pharmacheck_core::{
    FailureKind, FixtureLookup, HandoffReceiver, HttpProductLookup, LookupConfig, ProductId,
    ProductLookup, ScanFailure, ScanSession, ScanSnapshot, ScanStatus, SessionConfig,
    VerificationRecord,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{utils, Output, ServiceArgs};

/// A scan attempt that ended in the `Error` state.
#[derive(Debug, thiserror::Error)]
#[error("{}", .0.message)]
pub struct ScanRejected(pub ScanFailure);

/// Session settings for a terminal: there is no success screen to linger on.
pub fn session_config() -> SessionConfig {
    SessionConfig {
        handoff_delay: Duration::ZERO,
        ..SessionConfig::default()
    }
}

/// Build the lookup selected by the service flags.
pub fn build_lookup(service: &ServiceArgs) -> Result<Arc<dyn ProductLookup>> {
    if service.offline {
        debug!("Using demo fixtures for lookups");
        return Ok(Arc::new(FixtureLookup::default()));
    }

    let mut config = LookupConfig::default();
    if let Some(api_url) = &service.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(secs) = service.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    let lookup = HttpProductLookup::with_config(config)
        .context("Failed to configure the verification client")?;
    Ok(Arc::new(lookup))
}

/// Wait until the session settles, then return the handed-off record or the
/// failure as an error.
///
/// Stops early if the camera drops back to `Idle` with an error, which
/// happens when the capture input runs dry.
pub async fn settle(
    session: &ScanSession,
    state: &mut watch::Receiver<ScanSnapshot>,
    handoff: &mut HandoffReceiver,
) -> Result<VerificationRecord> {
    let snap = state
        .wait_for(|s| {
            matches!(s.status, ScanStatus::Success | ScanStatus::Error)
                || (s.status == ScanStatus::Idle && s.camera_error.is_some())
        })
        .await
        .context("Scan session closed unexpectedly")?
        .clone();

    match snap.status {
        ScanStatus::Success => {
            let record = handoff
                .recv()
                .await
                .context("Scan session closed before hand-off")?;
            Ok(record)
        }
        ScanStatus::Error => {
            let failure = snap.failure.context("Scan failed without a reason")?;
            warn!(kind = ?failure.kind, "Scan rejected");
            Err(ScanRejected(failure).into())
        }
        _ => {
            session.stop_camera();
            Err(ScanRejected(ScanFailure {
                kind: FailureKind::CameraUnavailable,
                message: snap.camera_error.unwrap_or_default(),
            })
            .into())
        }
    }
}

/// Print the outcome of a settled scan and turn a rejection into an error.
pub fn report(
    outcome: Result<VerificationRecord>,
    identifier: Option<ProductId>,
    out: Output,
) -> Result<()> {
    let today = utils::today();
    match outcome {
        Ok(record) => {
            info!(product = %record.pharmacy.name, "Product verified");
            if out.json {
                println!("{:#}", utils::authentic_json(&record, today));
            } else if !out.quiet {
                utils::print_authentic(&record, today);
            }
            Ok(())
        }
        Err(err) => {
            let verdict = err
                .downcast_ref::<ScanRejected>()
                .filter(|r| !r.0.kind.is_camera());
            if let Some(rejected) = verdict {
                if out.json {
                    println!("{:#}", utils::rejected_json(identifier, &rejected.0));
                } else if !out.quiet {
                    utils::print_rejected(identifier, &rejected.0);
                }
            }
            Err(err)
        }
    }
}
