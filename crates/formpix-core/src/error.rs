//! Error types module
//!
//! Per-file problems never surface here: they become [`SkipReason`](crate::SkipReason)
//! entries in a batch report. `IntakeError` covers the operations that fail as a
//! whole (bad configuration, removal of a missing entry, form submission).

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like timeouts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the person filling the form
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "INDEX_OUT_OF_RANGE")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same operation may succeed
    fn is_recoverable(&self) -> bool;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Index {index} out of range ({len} accepted files)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Submission timed out")]
    SubmissionTimeout,

    #[error("Submission rejected by endpoint: {0}")]
    Rejected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for IntakeError {
    fn from(err: io::Error) -> Self {
        IntakeError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        IntakeError::Rejected(format!("unreadable response: {}", err))
    }
}

impl ErrorMetadata for IntakeError {
    fn error_code(&self) -> &'static str {
        match self {
            IntakeError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            IntakeError::InvalidConfig(_) => "INVALID_CONFIG",
            IntakeError::InvalidForm(_) => "INVALID_FORM",
            IntakeError::Submission(_) => "SUBMISSION_FAILED",
            IntakeError::SubmissionTimeout => "SUBMISSION_TIMEOUT",
            IntakeError::Rejected(_) => "SUBMISSION_REJECTED",
            IntakeError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IntakeError::Submission(_) | IntakeError::SubmissionTimeout | IntakeError::Rejected(_)
        )
    }

    fn client_message(&self) -> String {
        match self {
            IntakeError::IndexOutOfRange { .. } => {
                "That attachment is no longer in the list.".to_string()
            }
            IntakeError::InvalidForm(msg) => msg.clone(),
            IntakeError::Submission(_)
            | IntakeError::SubmissionTimeout
            | IntakeError::Rejected(_) => {
                "Oops! Something went wrong. Please try again later.".to_string()
            }
            IntakeError::InvalidConfig(_) | IntakeError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            IntakeError::IndexOutOfRange { .. } | IntakeError::InvalidForm(_) => LogLevel::Debug,
            IntakeError::Submission(_)
            | IntakeError::SubmissionTimeout
            | IntakeError::Rejected(_) => LogLevel::Warn,
            IntakeError::InvalidConfig(_) | IntakeError::Internal(_) => LogLevel::Error,
        }
    }
}
