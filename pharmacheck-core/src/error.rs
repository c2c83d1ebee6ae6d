use thiserror::Error;

use crate::product::VerificationRecord;

/// Client-observable failure taxonomy.
///
/// Every failure of a scan attempt is terminal for that attempt and maps to
/// exactly one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    CameraPermissionDenied,
    CameraUnavailable,
    InvalidCodeFormat,
    NotFound,
    AlreadyUsed,
    Timeout,
    ServerError,
    NetworkError,
    MalformedResponse,
}

/// Which alert template a failure is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTrack {
    /// Unknown product: likely counterfeit.
    Counterfeit,
    /// Duplicate scan or any other failure.
    Duplicate,
}

impl FailureKind {
    pub fn alert(self) -> AlertTrack {
        match self {
            Self::NotFound | Self::InvalidCodeFormat => AlertTrack::Counterfeit,
            _ => AlertTrack::Duplicate,
        }
    }

    /// Failures of the capture device rather than of the scanned product.
    pub fn is_camera(self) -> bool {
        matches!(self, Self::CameraPermissionDenied | Self::CameraUnavailable)
    }

    /// Transient failures are worth a user-initiated retry.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ServerError | Self::NetworkError | Self::MalformedResponse
        )
    }
}

/// Failures of the product lookup.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Product not found in database - Possibly FAKE!")]
    NotFound,

    #[error("DUPLICATE WARNING! This QR code was already scanned!")]
    AlreadyUsed { record: Box<VerificationRecord> },

    #[error("{}", server_error_message(*status))]
    ServerError { status: u16 },

    #[error("Verification timed out - please try again")]
    Timeout,

    #[error("Unexpected response from the verification service: {0}")]
    MalformedResponse(String),

    #[error("Could not reach the verification service: {0}")]
    NetworkError(String),

    #[error("Invalid verification client configuration: {0}")]
    InvalidConfig(String),
}

fn server_error_message(status: u16) -> String {
    if (500..600).contains(&status) {
        "Server error - please try again".to_string()
    } else {
        format!("API error: {status}")
    }
}

impl VerifyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound => FailureKind::NotFound,
            Self::AlreadyUsed { .. } => FailureKind::AlreadyUsed,
            Self::ServerError { .. } => FailureKind::ServerError,
            Self::Timeout => FailureKind::Timeout,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
            Self::NetworkError(_) | Self::InvalidConfig(_) => FailureKind::NetworkError,
        }
    }
}

/// Failures acquiring the capture device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera access denied. Please allow camera permissions.")]
    PermissionDenied,

    #[error("Camera unavailable: {0}")]
    Unavailable(String),
}

impl CameraError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PermissionDenied => FailureKind::CameraPermissionDenied,
            Self::Unavailable(_) => FailureKind::CameraUnavailable,
        }
    }
}

/// Failures extracting an identifier from scanned text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No code entered")]
    Empty,

    #[error("Invalid QR code format")]
    NoIdentifier,
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::InvalidCodeFormat
    }
}

/// Failures talking to the assistant chat endpoint.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A message is already being sent")]
    Busy,

    #[error("Chat service unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T, E = VerifyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_tracks() {
        assert_eq!(FailureKind::NotFound.alert(), AlertTrack::Counterfeit);
        assert_eq!(FailureKind::InvalidCodeFormat.alert(), AlertTrack::Counterfeit);
        assert_eq!(FailureKind::AlreadyUsed.alert(), AlertTrack::Duplicate);
        assert_eq!(FailureKind::Timeout.alert(), AlertTrack::Duplicate);
        assert_eq!(FailureKind::NetworkError.alert(), AlertTrack::Duplicate);
    }

    #[test]
    fn test_server_error_messages() {
        assert_eq!(
            VerifyError::ServerError { status: 500 }.to_string(),
            "Server error - please try again"
        );
        assert_eq!(
            VerifyError::ServerError { status: 418 }.to_string(),
            "API error: 418"
        );
    }

    #[test]
    fn test_transient_kinds() {
        assert!(FailureKind::Timeout.is_transient());
        assert!(FailureKind::ServerError.is_transient());
        assert!(!FailureKind::NotFound.is_transient());
        assert!(!FailureKind::AlreadyUsed.is_transient());
    }

    #[test]
    fn test_camera_kinds() {
        assert!(CameraError::PermissionDenied.kind().is_camera());
        assert!(CameraError::Unavailable("busy".into()).kind().is_camera());
        assert!(!ExtractError::NoIdentifier.kind().is_camera());
    }
}
