//! Verify command implementation.

use std::sync::Arc;

use anyhow::Result;
use pharmacheck_core::{ExtractError, NoCapture, ScanMode, ScanSession, Trigger};
use tracing::{debug, info};

use super::{build_lookup, report, session_config, settle, ScanRejected};
use crate::{Output, ServiceArgs};

/// Execute the verify command.
pub async fn execute(
    code: String,
    barcode: bool,
    service: ServiceArgs,
    out: Output,
) -> Result<()> {
    let lookup = build_lookup(&service)?;
    // Manual entry never touches the camera
    let (session, mut handoff) =
        ScanSession::new(lookup, Arc::new(NoCapture), session_config());
    session.set_mode(if barcode {
        ScanMode::BarcodeManual
    } else {
        ScanMode::QrManual
    });
    let mut state = session.subscribe();

    let outcome = match session.submit_manual(&code) {
        Trigger::Started(id) => {
            info!(id = %id, "Verifying");
            settle(&session, &mut state, &mut handoff).await
        }
        Trigger::Rejected => match session.snapshot().failure {
            Some(failure) => Err(ScanRejected(failure).into()),
            None => anyhow::bail!("Code rejected"),
        },
        other => {
            debug!(trigger = ?other, "Nothing to verify");
            Err(ExtractError::Empty.into())
        }
    };

    report(outcome, session.snapshot().identifier, out)
}
