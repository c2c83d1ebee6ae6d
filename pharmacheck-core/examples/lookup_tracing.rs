//! Example showing the lookup and session tracing instrumentation.
//!
//! Run with: cargo run -p pharmacheck-core --example lookup_tracing [CODE]
//!
//! Uses `PHARMACHECK_API_URL` when set, otherwise the local default.

use std::sync::Arc;

use pharmacheck_core::{
    HttpProductLookup, NoCapture, ScanSession, ScanStatus, SessionConfig, SAMPLE_PRODUCT_ID,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::new("pharmacheck_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== PharmaCheck Lookup Tracing Demo ===\n");

    let code = std::env::args()
        .nth(1)
        .unwrap_or_else(|| SAMPLE_PRODUCT_ID.to_string());

    let lookup = match HttpProductLookup::new() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("Config: {:?}\n", lookup.config());

    let (session, mut handoff) = ScanSession::new(
        Arc::new(lookup),
        Arc::new(NoCapture),
        SessionConfig::default(),
    );
    let mut state = session.subscribe();

    println!("Verifying {code}...\n");
    session.submit_manual(&code);

    let settled = match state
        .wait_for(|s| matches!(s.status, ScanStatus::Success | ScanStatus::Error))
        .await
    {
        Ok(snap) => snap.clone(),
        Err(_) => return,
    };

    match settled.failure {
        None => {
            if let Some(record) = handoff.recv().await {
                println!("\n✅ Authentic: {}", record.pharmacy.name);
                println!("   Block: #{}", record.latest_block.index);
            }
        }
        Some(failure) => {
            println!("\n❌ {:?}: {}", failure.alert(), failure.message);
        }
    }
}
