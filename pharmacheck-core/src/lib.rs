//! PharmaCheck Core - scan-to-verification engine for medicine packaging
//!
//! This crate turns a scanned QR/barcode into a verification verdict from the
//! PharmaCheck service: it extracts the product identifier, performs the
//! lookup, classifies the outcome and drives the scanner state machine that
//! a user interface renders.
//!
//! # Features
//!
//! - Identifier extraction from bare codes, lookup URLs and free text
//! - Single-flight verification with stale-result protection
//! - Camera lifecycle with guaranteed release on every exit path
//! - Explicit failure taxonomy (counterfeit vs duplicate alert tracks)
//! - Demo fixtures and mock devices for offline use and tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pharmacheck_core::{
//!     HttpProductLookup, NoCapture, ScanSession, ScanStatus, SessionConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let lookup = Arc::new(HttpProductLookup::new()?);
//! let (session, mut handoff) =
//!     ScanSession::new(lookup, Arc::new(NoCapture), SessionConfig::default());
//!
//! session.submit_manual("4a43bbb0-68b1-413a-bcf8-b50fd0174d05");
//!
//! let mut state = session.subscribe();
//! let settled = state
//!     .wait_for(|s| matches!(s.status, ScanStatus::Success | ScanStatus::Error))
//!     .await?
//!     .clone();
//! if settled.status == ScanStatus::Success {
//!     let record = handoff.recv().await.ok_or("session closed")?;
//!     println!("{} is authentic", record.pharmacy.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fixtures;
pub mod identifier;
pub mod onboarding;
pub mod product;
pub mod routes;

#[cfg(feature = "network")]
pub mod capture;
#[cfg(feature = "network")]
pub mod chat;
#[cfg(feature = "network")]
pub mod lookup;
#[cfg(feature = "network")]
pub mod session;

// Re-export main types for convenience
pub use error::{
    AlertTrack, CameraError, ChatError, ExtractError, FailureKind, Result, VerifyError,
};
pub use fixtures::{DemoFixtures, DemoOutcome, SAMPLE_PRODUCT_ID, UNKNOWN_PRODUCT_ID};
pub use identifier::{extract_identifier, ProductId};
pub use onboarding::{OnboardingStep, OnboardingWizard};
pub use product::{CostTier, LatestBlock, Pharmacy, Recommendation, VerificationRecord};
pub use routes::{Alternative, PageProduct, Presentation, ProductPage, Route};

// Network-dependent exports (not available in Wasm)
#[cfg(feature = "network")]
pub use capture::{
    CameraSession, CaptureConstraints, CaptureDevice, CaptureFeed, Facing, LineCapture,
    MockCapture, NoCapture,
};
#[cfg(feature = "network")]
pub use chat::{ChatClient, ChatConfig, ChatTranscript};
#[cfg(feature = "network")]
pub use lookup::{FixtureLookup, HttpProductLookup, LookupConfig, ProductLookup};
#[cfg(feature = "network")]
pub use session::{
    HandoffReceiver, ScanFailure, ScanMode, ScanSession, ScanSnapshot, ScanStatus, SessionConfig,
    Trigger,
};
