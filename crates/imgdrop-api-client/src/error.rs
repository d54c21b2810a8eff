//! Error types for submission and listing.

use imgdrop_core::{DegradeReason, ErrorMetadata, LogLevel, ValidationError};

/// Failure of a submission request.
///
/// Only describes the *request*: an `Ok` acceptance says nothing about how the
/// individual jobs will end up.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No response was received
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Submission rejected with status {status}: {diagnostic}")]
    Rejected { status: u16, diagnostic: String },
}

impl SubmitError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            SubmitError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the request reached the network at all.
    pub fn was_sent(&self) -> bool {
        !matches!(self, SubmitError::Validation(_))
    }
}

impl ErrorMetadata for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            SubmitError::Validation(err) => err.error_code(),
            SubmitError::Transport(_) => "TRANSPORT_ERROR",
            SubmitError::Rejected { .. } => "REJECTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            SubmitError::Validation(err) => err.is_recoverable(),
            SubmitError::Transport(_) => true,
            SubmitError::Rejected { status, .. } => *status >= 500,
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            SubmitError::Validation(err) => err.suggested_action(),
            SubmitError::Transport(_) => Some("Check connectivity to the ingestion service"),
            SubmitError::Rejected { .. } => Some("Retry later or contact the service operator"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            SubmitError::Validation(err) => err.client_message(),
            SubmitError::Transport(_) => "An error occurred while uploading.".to_string(),
            SubmitError::Rejected { .. } => "Could not upload files right now.".to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        match self {
            SubmitError::Validation(err) => err.is_sensitive(),
            SubmitError::Transport(_) | SubmitError::Rejected { .. } => true,
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            SubmitError::Validation(err) => err.log_level(),
            SubmitError::Transport(_) | SubmitError::Rejected { .. } => LogLevel::Error,
        }
    }
}

/// Why a listing fetch failed. Never returned to listing callers; it is logged
/// and folded into a degraded [`imgdrop_core::Listing`].
#[derive(Debug, thiserror::Error)]
pub enum ListingFailure {
    #[error("Failed to send listing request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Listing request failed with status {status}")]
    Status { status: u16, body: String },

    #[error("Failed to parse listing response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ListingFailure {
    pub fn to_reason(&self) -> DegradeReason {
        match self {
            ListingFailure::Transport(err) => DegradeReason::Transport {
                detail: err.to_string(),
            },
            ListingFailure::Status { status, body } => DegradeReason::Status {
                status: *status,
                body: body.clone(),
            },
            ListingFailure::Decode(err) => DegradeReason::Decode {
                detail: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_hides_backend_diagnostic() {
        let err = SubmitError::Rejected {
            status: 400,
            diagnostic: "{\"error\": \"cannot identify image file\"}".to_string(),
        };
        assert_eq!(err.client_message(), "Could not upload files right now.");
        assert!(!err.client_message().contains("identify"));
        assert!(err.is_sensitive());
        assert!(!err.is_recoverable());
        assert_eq!(err.error_code(), "REJECTED");
        assert_eq!(err.log_level(), LogLevel::Error);
        assert!(err.was_sent());
    }

    #[test]
    fn test_server_side_rejection_is_recoverable() {
        let err = SubmitError::Rejected {
            status: 503,
            diagnostic: String::new(),
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_validation_delegates_metadata() {
        let err = SubmitError::from(ValidationError::EmptyBatch);
        assert_eq!(err.error_code(), "EMPTY_BATCH");
        assert_eq!(err.client_message(), "Please upload at least one file.");
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert!(!err.was_sent());
        assert_eq!(err.validation(), Some(&ValidationError::EmptyBatch));
    }

    #[test]
    fn test_listing_failure_reason() {
        let failure = ListingFailure::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(
            failure.to_reason(),
            DegradeReason::Status {
                status: 502,
                body: "bad gateway".to_string()
            }
        );

        let decode = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        assert!(matches!(
            ListingFailure::Decode(decode).to_reason(),
            DegradeReason::Decode { .. }
        ));
    }
}
