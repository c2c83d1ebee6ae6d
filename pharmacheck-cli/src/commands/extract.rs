//! Extract command implementation.

use anyhow::{Context, Result};
use pharmacheck_core::extract_identifier;
use serde_json::json;

use crate::Output;

/// Execute the extract command.
pub fn execute(text: &str, out: Output) -> Result<()> {
    let id = extract_identifier(text).context("No product identifier found")?;

    if out.json {
        println!("{}", json!({ "identifier": id }));
    } else if !out.quiet {
        println!("{id}");
    }
    Ok(())
}
