//! Error types module
//!
//! All failures of the upload preparation flow are unified under [`UploadError`].
//! Variants fall into three groups:
//!
//! - client-side policy violations (`MimeRejected`, `SizeRejected`, `NoFileSelected`),
//!   reported immediately with the file input refocused;
//! - collaborator or network failures (`IntentRequestFailed`, `TransferTargetMissing`,
//!   `TransferFailed`, `SubmissionFailed`, ...), reported via a transient notification
//!   with the hidden fields reset as a group;
//! - environment capability failures (`HashingUnsupported`), reported without fallback.
//!
//! No variant is retried automatically. A new user gesture restarts the whole flow.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for collaborator failures the user can work around
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error reporting - defines how an error is presented to the user
/// and how loudly it is logged.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "MIME_REJECTED")
    fn error_code(&self) -> &'static str;

    /// Whether this is a client-side policy violation (input should be refocused)
    fn is_policy_violation(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message. Technical detail stays in the logs.
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("MIME type '{mime}' is not allowed (allowed: {})", .allowed.join(", "))]
    MimeRejected { mime: String, allowed: Vec<String> },

    #[error("File size {size} bytes rejected (max {max_bytes} bytes)")]
    SizeRejected { size: i64, max_bytes: i64 },

    #[error("Upload intent request failed with status {status}")]
    IntentRequestFailed { status: u16 },

    #[error("Upload intent response carries no transfer target")]
    TransferTargetMissing,

    #[error("Transfer to storage target failed with status {status}")]
    TransferFailed { status: u16 },

    #[error("Hashing not supported: {0}")]
    HashingUnsupported(String),

    #[error("No file selected")]
    NoFileSelected,

    #[error("Form context incomplete: {0}")]
    MissingFormContext(String),

    #[error("Upload intent response carries no {0}")]
    IdentifierMissing(&'static str),

    #[error("Invalid upload intent response: {0}")]
    InvalidIntentResponse(String),

    #[error("Form submission failed with status {status}")]
    SubmissionFailed { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::InvalidIntentResponse(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, policy_violation, suggested_action, log_level).
fn upload_error_static_metadata(
    err: &UploadError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        UploadError::MimeRejected { .. } => (
            "MIME_REJECTED",
            true,
            Some("Choose a file of an allowed type"),
            LogLevel::Debug,
        ),
        UploadError::SizeRejected { .. } => (
            "SIZE_REJECTED",
            true,
            Some("Choose a smaller, non-empty file"),
            LogLevel::Debug,
        ),
        UploadError::NoFileSelected => (
            "NO_FILE_SELECTED",
            true,
            Some("Choose a file"),
            LogLevel::Debug,
        ),
        UploadError::IntentRequestFailed { .. } => (
            "INTENT_REQUEST_FAILED",
            false,
            Some("Try again"),
            LogLevel::Warn,
        ),
        UploadError::TransferTargetMissing => (
            "TRANSFER_TARGET_MISSING",
            false,
            Some("Try again"),
            LogLevel::Error,
        ),
        UploadError::TransferFailed { .. } => (
            "TRANSFER_FAILED",
            false,
            Some("Try again"),
            LogLevel::Warn,
        ),
        UploadError::HashingUnsupported(_) => (
            "HASHING_UNSUPPORTED",
            false,
            None,
            LogLevel::Error,
        ),
        UploadError::MissingFormContext(_) => (
            "MISSING_FORM_CONTEXT",
            false,
            None,
            LogLevel::Error,
        ),
        UploadError::IdentifierMissing(_) => (
            "IDENTIFIER_MISSING",
            false,
            Some("Try again"),
            LogLevel::Error,
        ),
        UploadError::InvalidIntentResponse(_) => (
            "INVALID_INTENT_RESPONSE",
            false,
            Some("Try again"),
            LogLevel::Error,
        ),
        UploadError::SubmissionFailed { .. } => (
            "SUBMISSION_FAILED",
            false,
            Some("Try again"),
            LogLevel::Warn,
        ),
        UploadError::Transport(_) => (
            "TRANSPORT_ERROR",
            false,
            Some("Check your connection and try again"),
            LogLevel::Warn,
        ),
        UploadError::Io(_) => ("IO_ERROR", false, None, LogLevel::Error),
    }
}

/// Largest whole unit that represents `bytes` exactly.
fn format_byte_limit(bytes: i64) -> String {
    const KIB: i64 = 1024;
    const MIB: i64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).0
    }

    fn is_policy_violation(&self) -> bool {
        upload_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::MimeRejected { allowed, .. } => {
                format!("File type not allowed. Allowed: {}", allowed.join(", "))
            }
            UploadError::SizeRejected { max_bytes, .. } if *max_bytes > 0 => format!(
                "File is empty or larger than {}",
                format_byte_limit(*max_bytes)
            ),
            UploadError::SizeRejected { .. } => "File is empty".to_string(),
            UploadError::NoFileSelected => "Please choose a file.".to_string(),
            UploadError::HashingUnsupported(_) => {
                "Secure hashing is not supported in this environment.".to_string()
            }
            UploadError::SubmissionFailed { .. } => {
                "Submission failed. Please try again.".to_string()
            }
            // Collaborator failures share one message; detail goes to the log.
            _ => "Upload failed. Please try again.".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).3
    }
}
