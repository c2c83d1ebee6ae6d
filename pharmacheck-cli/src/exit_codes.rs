//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a counterfeit or duplicate verdict apart from a
//! verification service that could not be reached.

use pharmacheck_core::{CameraError, ChatError, ExtractError, FailureKind, VerifyError};

use crate::commands::ScanRejected;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// The product did not verify: unknown, already redeemed or unreadable code.
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// The capture input could not be opened or ran dry.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Service unavailable (timeout, network, server error, bad response).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// Exit code for a failed scan attempt.
pub fn for_kind(kind: FailureKind) -> i32 {
    match kind {
        FailureKind::NotFound | FailureKind::AlreadyUsed | FailureKind::InvalidCodeFormat => {
            VERIFICATION_FAILED
        }
        FailureKind::CameraPermissionDenied | FailureKind::CameraUnavailable => INPUT_ERROR,
        FailureKind::Timeout
        | FailureKind::ServerError
        | FailureKind::NetworkError
        | FailureKind::MalformedResponse => NETWORK_ERROR,
    }
}

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify by the first typed error in the chain
        let code = err
            .chain()
            .find_map(|cause| {
                if let Some(e) = cause.downcast_ref::<ScanRejected>() {
                    Some(for_kind(e.0.kind))
                } else if let Some(e) = cause.downcast_ref::<VerifyError>() {
                    Some(for_kind(e.kind()))
                } else if let Some(e) = cause.downcast_ref::<ExtractError>() {
                    Some(for_kind(e.kind()))
                } else if let Some(e) = cause.downcast_ref::<CameraError>() {
                    Some(for_kind(e.kind()))
                } else if let Some(e) = cause.downcast_ref::<ChatError>() {
                    Some(match e {
                        ChatError::EmptyMessage => USAGE_ERROR,
                        ChatError::Busy => GENERAL_ERROR,
                        ChatError::Unavailable(_) => NETWORK_ERROR,
                    })
                } else if cause.downcast_ref::<std::io::Error>().is_some() {
                    Some(INPUT_ERROR)
                } else {
                    None
                }
            })
            .unwrap_or(GENERAL_ERROR);

        Self {
            code,
            message: Some(message),
        }
    }
}
