//! Domain models for the upload preparation flow and the managed forms.

pub mod form;
pub mod upload;

pub use form::{FormMode, IdentifierField};
pub use upload::{
    DigestSource, MetadataPayload, TransferReceipt, UploadFile, UploadIntent, UploadKind,
    UploadOutcome,
};
