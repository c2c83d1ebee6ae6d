//! Scan command implementation.
//!
//! Stdin stands in for the camera: each line is one decoded frame, as
//! produced by a hardware scanner in keyboard mode. Unreadable lines are
//! skipped; the first recognized code is verified.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use pharmacheck_core::{LineCapture, ScanSession};
use tokio::io::BufReader;
use tracing::info;

use super::{build_lookup, report, session_config, settle};
use crate::{Output, ServiceArgs};

/// Execute the scan command.
pub async fn execute(service: ServiceArgs, out: Output) -> Result<()> {
    let lookup = build_lookup(&service)?;
    let device = LineCapture::new(BufReader::new(tokio::io::stdin()));
    let (session, mut handoff) = ScanSession::new(lookup, Arc::new(device), session_config());
    let mut state = session.subscribe();

    session
        .start_camera()
        .await
        .context("Failed to open the scanner input")?;
    info!("Waiting for a code on stdin");
    if !out.quiet && !out.json {
        eprintln!("{}", "Scanning... point the scanner at the code".cyan());
    }

    let outcome = tokio::select! {
        outcome = settle(&session, &mut state, &mut handoff) => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.reset();
            bail!("Scan cancelled");
        }
    };

    report(outcome, session.snapshot().identifier, out)
}
