//! Shared constants: form field names, defaults and limits.

/// MIME used when a file carries no declared type.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Filename sent to the intent endpoint when the file has none.
pub const DEFAULT_FILENAME: &str = "upload.bin";

/// Size ceiling for learning task submissions (10 MiB).
pub const LEARNING_MAX_BYTES: i64 = 10 * 1024 * 1024;

/// MIME allow-list for learning task submissions.
pub const LEARNING_ALLOWED_MIME: &[&str] = &["image/png", "image/jpeg", "application/pdf"];

/// Hidden form field carrying the storage key (learning submissions).
pub const FIELD_STORAGE_KEY: &str = "storage_key";

/// Hidden form field carrying the intent id (material creation).
pub const FIELD_INTENT_ID: &str = "intent_id";

/// Hidden form field carrying the declared MIME type.
pub const FIELD_MIME_TYPE: &str = "mime_type";

/// Hidden form field carrying the size in bytes.
pub const FIELD_SIZE_BYTES: &str = "size_bytes";

/// Hidden form field carrying the hex SHA-256 digest.
pub const FIELD_SHA256: &str = "sha256";

/// Default base URL of the GUSTAV web application
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Default lifetime of a transient notification in milliseconds.
pub const NOTIFICATION_DEFAULT_MS: u64 = 3000;

/// Lifetime of the "upload prepared" notice in milliseconds.
pub const NOTIFICATION_PREPARED_MS: u64 = 2500;
