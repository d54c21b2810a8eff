//! Error types module
//!
//! Errors raised before anything leaves the process live here. Every error type
//! in the workspace implements [`ErrorMetadata`] so the calling layer can pick a
//! safe, user-displayable message and a log level without matching on variants.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a degraded listing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the end consumer.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same operation later could succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Whether the internal message may leak backend details
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Rejection produced by the candidate validator.
///
/// Candidate-level variants carry the position of the offending candidate in
/// its batch (0 for single submissions).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing file at position {index}")]
    MissingFile { index: usize },

    #[error("File too large: {name} is {size} bytes (max: {max} bytes exclusive)")]
    TooLarge {
        index: usize,
        name: String,
        size: u64,
        max: u64,
    },

    #[error("Unsupported content type: {content_type} for {name} (allowed: {allowed:?})")]
    UnsupportedType {
        index: usize,
        name: String,
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Batch contains no files")]
    EmptyBatch,
}

impl ValidationError {
    /// Name of the form field or candidate attribute the rejection is scoped to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingFile { .. } => "file",
            ValidationError::TooLarge { .. } => "size",
            ValidationError::UnsupportedType { .. } => "type",
            ValidationError::EmptyBatch => "images",
        }
    }

    /// Position of the offending candidate, if the rejection is candidate-scoped.
    pub fn index(&self) -> Option<usize> {
        match self {
            ValidationError::MissingFile { index }
            | ValidationError::TooLarge { index, .. }
            | ValidationError::UnsupportedType { index, .. } => Some(*index),
            ValidationError::EmptyBatch => None,
        }
    }
}

/// Renders a whitelist such as `image/jpeg,image/png` as ".jpeg and .png".
fn describe_formats(allowed: &[String]) -> String {
    let formats: Vec<String> = allowed
        .iter()
        .map(|ct| format!(".{}", ct.rsplit('/').next().unwrap_or(ct)))
        .collect();

    match formats.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

/// Static metadata for each variant:
/// (error_code, recoverable, suggested_action, sensitive, log_level).
fn validation_error_static_metadata(
    err: &ValidationError,
) -> (&'static str, bool, Option<&'static str>, bool, LogLevel) {
    match err {
        ValidationError::MissingFile { .. } => (
            "MISSING_FILE",
            false,
            Some("Select a file before submitting"),
            false,
            LogLevel::Debug,
        ),
        ValidationError::TooLarge { .. } => (
            "TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        ValidationError::UnsupportedType { .. } => (
            "UNSUPPORTED_TYPE",
            false,
            Some("Convert the image to a supported format"),
            false,
            LogLevel::Debug,
        ),
        ValidationError::EmptyBatch => (
            "EMPTY_BATCH",
            false,
            Some("Select at least one file"),
            false,
            LogLevel::Debug,
        ),
    }
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        validation_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        validation_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        validation_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        validation_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        validation_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            ValidationError::MissingFile { .. } => "Please upload a file.".to_string(),
            ValidationError::TooLarge { max, .. } => {
                format!("Max {} kB upload size.", max / 1000)
            }
            ValidationError::UnsupportedType { allowed, .. } => format!(
                "Only {} formats are supported.",
                describe_formats(allowed)
            ),
            ValidationError::EmptyBatch => "Please upload at least one file.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitelist() -> Vec<String> {
        ["image/jpg", "image/jpeg", "image/png", "image/webp"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_too_large_client_message() {
        let err = ValidationError::TooLarge {
            index: 1,
            name: "big.jpg".to_string(),
            size: 500_000,
            max: 400_000,
        };
        assert_eq!(err.client_message(), "Max 400 kB upload size.");
        assert_eq!(err.field(), "size");
        assert_eq!(err.index(), Some(1));
        assert_eq!(err.error_code(), "TOO_LARGE");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_unsupported_type_lists_formats() {
        let err = ValidationError::UnsupportedType {
            index: 0,
            name: "anim.gif".to_string(),
            content_type: "image/gif".to_string(),
            allowed: whitelist(),
        };
        assert_eq!(
            err.client_message(),
            "Only .jpg, .jpeg, .png and .webp formats are supported."
        );
        assert_eq!(err.field(), "type");
    }

    #[test]
    fn test_empty_batch_is_not_candidate_scoped() {
        let err = ValidationError::EmptyBatch;
        assert_eq!(err.index(), None);
        assert_eq!(err.field(), "images");
        assert_eq!(err.client_message(), "Please upload at least one file.");
    }

    #[test]
    fn test_describe_formats_edge_cases() {
        assert_eq!(describe_formats(&[]), "");
        assert_eq!(describe_formats(&["image/png".to_string()]), ".png");
    }

    #[test]
    fn test_validation_errors_are_never_sensitive() {
        let errors = [
            ValidationError::MissingFile { index: 0 },
            ValidationError::EmptyBatch,
        ];
        for err in errors {
            assert!(!err.is_sensitive());
            assert!(err.suggested_action().is_some());
        }
    }

    #[test]
    fn test_default_policy_format_message() {
        let err = ValidationError::UnsupportedType {
            index: 0,
            name: "anim.gif".to_string(),
            content_type: "image/gif".to_string(),
            allowed: crate::config::UploadPolicy::default().allowed_content_types,
        };
        assert_eq!(
            err.client_message(),
            "Only .jpg, .jpeg, .png and .webp formats are supported."
        );
    }
}
