//! GUSTAV Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, client-side
//! validation and digest computation shared by the GUSTAV upload client components.
//! It performs no networking; see `gustav-api-client` for the HTTP side.

pub mod config;
pub mod constants;
pub mod digest;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{ClientConfig, UploadPolicy};
pub use digest::{compute_digest, DigestAlgorithm};
pub use error::{ErrorMetadata, LogLevel, UploadError, UploadResult};
pub use models::{
    DigestSource, FormMode, IdentifierField, MetadataPayload, TransferReceipt, UploadFile,
    UploadIntent, UploadKind, UploadOutcome,
};
pub use validation::validate_file;
