//! Demo command implementation.

use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use pharmacheck_core::{DemoOutcome, FixtureLookup, NoCapture, ScanSession, Trigger};

use super::{report, session_config, settle};
use crate::Output;

/// Execute the demo command.
pub async fn execute(outcome: DemoOutcome, out: Output) -> Result<()> {
    let (session, mut handoff) = ScanSession::new(
        Arc::new(FixtureLookup::default()),
        Arc::new(NoCapture),
        session_config(),
    );
    let mut state = session.subscribe();

    if !out.quiet && !out.json {
        eprintln!("{}", "Demo mode: simulated result, no network access".yellow());
    }

    let id = match session.run_demo(outcome) {
        Trigger::Started(id) => id,
        other => bail!("Demo could not start: {other:?}"),
    };
    let outcome = settle(&session, &mut state, &mut handoff).await;
    report(outcome, Some(id), out)
}
