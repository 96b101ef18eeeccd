//! Upload request, intent and outcome types.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FILENAME, DEFAULT_MIME};
use crate::error::{UploadError, UploadResult};

/// A file chosen by the user for one submission attempt.
///
/// `mime` and `size` are the declared values as reported by the picker. They are
/// trusted by validation; the content is never sniffed.
#[derive(Clone)]
pub struct UploadFile {
    pub filename: Option<String>,
    pub mime: Option<String>,
    pub size: i64,
    pub content: Bytes,
}

impl UploadFile {
    /// Build a file whose declared size is the content length.
    /// Empty filename or MIME strings are treated as absent.
    pub fn new(
        filename: impl Into<String>,
        mime: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        let filename = filename.into();
        let mime = mime.into();
        Self {
            filename: (!filename.is_empty()).then_some(filename),
            mime: (!mime.is_empty()).then_some(mime),
            size: content.len() as i64,
            content,
        }
    }

    /// Override the declared size (pickers may report a size that differs from the bytes).
    pub fn with_declared_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Declared MIME, empty when the picker reported none.
    pub fn declared_mime(&self) -> &str {
        self.mime.as_deref().unwrap_or("")
    }

    /// Declared MIME or `application/octet-stream`.
    pub fn effective_mime(&self) -> &str {
        self.mime.as_deref().unwrap_or(DEFAULT_MIME)
    }

    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_FILENAME)
    }

    pub fn kind(&self) -> UploadKind {
        UploadKind::from_mime(self.declared_mime())
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("filename", &self.filename)
            .field("mime", &self.mime)
            .field("size", &self.size)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Classification of an upload for the server-side payload's `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Image,
    File,
}

impl UploadKind {
    /// PDFs and unknown types are generic files; `image/*` are images.
    pub fn from_mime(mime: &str) -> Self {
        if mime == "application/pdf" {
            UploadKind::File
        } else if mime.starts_with("image/") {
            UploadKind::Image
        } else {
            UploadKind::File
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::File => "file",
        }
    }
}

/// JSON body sent to the intent endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataPayload {
    pub kind: UploadKind,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Caller-specific extension fields, flattened into the body.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MetadataPayload {
    pub fn for_file(file: &UploadFile) -> Self {
        Self {
            kind: file.kind(),
            filename: file.display_name().to_string(),
            mime_type: file.effective_mime().to_string(),
            size_bytes: file.size,
            extra: serde_json::Map::new(),
        }
    }

    /// Add a caller-specific field. Reserved keys are left untouched.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        if !matches!(
            key.as_str(),
            "kind" | "filename" | "mime_type" | "size_bytes"
        ) {
            self.extra.insert(key, value.into());
        }
        self
    }
}

/// Intent response as sent by the server. Both field-name generations are accepted.
#[derive(Debug, Deserialize)]
struct RawIntent {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    upload_url: Option<String>,
    #[serde(default)]
    headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    upload_headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    storage_key: Option<String>,
    #[serde(default)]
    intent_id: Option<String>,
}

/// Server-issued authorization and destination for one byte transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadIntent {
    pub target: String,
    pub transfer_headers: BTreeMap<String, String>,
    pub storage_key: Option<String>,
    pub intent_id: Option<String>,
    /// The full response record, kept for callers that need extension fields.
    pub raw: serde_json::Value,
}

impl UploadIntent {
    /// Interpret an intent response for `file`.
    ///
    /// `url` is consulted before `upload_url` and `headers` before `upload_headers`;
    /// empty target strings count as absent. Without headers a single
    /// `Content-Type` header derived from the file is used.
    pub fn from_response(raw: serde_json::Value, file: &UploadFile) -> UploadResult<Self> {
        let parsed: RawIntent = serde_json::from_value(raw.clone())?;

        let target = parsed
            .url
            .filter(|u| !u.is_empty())
            .or_else(|| parsed.upload_url.filter(|u| !u.is_empty()))
            .ok_or(UploadError::TransferTargetMissing)?;

        let transfer_headers = parsed
            .headers
            .or(parsed.upload_headers)
            .unwrap_or_else(|| {
                BTreeMap::from([(
                    "Content-Type".to_string(),
                    file.effective_mime().to_string(),
                )])
            });

        Ok(Self {
            target,
            transfer_headers,
            storage_key: parsed.storage_key.filter(|k| !k.is_empty()),
            intent_id: parsed.intent_id.filter(|i| !i.is_empty()),
            raw,
        })
    }
}

/// Optional JSON body of a successful transfer response.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransferReceipt {
    #[serde(default)]
    pub sha256: Option<String>,
}

impl TransferReceipt {
    /// The server-reported digest, if present and non-empty.
    pub fn server_digest(self) -> Option<String> {
        self.sha256.filter(|s| !s.is_empty())
    }
}

/// Where the outcome digest came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestSource {
    Server,
    Local,
}

/// Result of a successful intent + transfer flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub intent: UploadIntent,
    /// Always populated: the server digest when reported, else computed locally.
    pub digest: String,
    pub digest_source: DigestSource,
    pub mime: String,
    pub size: i64,
}
