//! Hidden form fields populated by a prepared upload.

use gustav_core::constants::{FIELD_MIME_TYPE, FIELD_SHA256, FIELD_SIZE_BYTES};
use gustav_core::{IdentifierField, UploadError, UploadOutcome, UploadResult};

/// The four hidden fields of a managed form.
///
/// Either all four carry values from the same [`UploadOutcome`] or all four are
/// empty. There is no way to set them individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenFields {
    identifier_field: IdentifierField,
    identifier: String,
    mime_type: String,
    size_bytes: String,
    sha256: String,
}

impl HiddenFields {
    pub fn new(identifier_field: IdentifierField) -> Self {
        Self {
            identifier_field,
            identifier: String::new(),
            mime_type: String::new(),
            size_bytes: String::new(),
            sha256: String::new(),
        }
    }

    /// Fill all fields from `outcome`. Fails without touching any field when the
    /// intent lacks the identifier this form echoes back.
    pub fn fill(&mut self, outcome: &UploadOutcome) -> UploadResult<()> {
        let identifier = self
            .identifier_field
            .value_from(&outcome.intent)
            .filter(|v| !v.is_empty())
            .ok_or(UploadError::IdentifierMissing(
                self.identifier_field.field_name(),
            ))?;

        self.identifier = identifier.to_string();
        self.mime_type = outcome.mime.clone();
        self.size_bytes = outcome.size.to_string();
        self.sha256 = outcome.digest.clone();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.identifier.clear();
        self.mime_type.clear();
        self.size_bytes.clear();
        self.sha256.clear();
    }

    pub fn is_complete(&self) -> bool {
        self.values().iter().all(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| v.is_empty())
    }

    pub fn identifier_field(&self) -> IdentifierField {
        self.identifier_field
    }

    /// Look up a field by its form name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs_ref()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// `(name, value)` pairs in form order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.pairs_ref()
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    fn pairs_ref(&self) -> [(&'static str, &str); 4] {
        [
            (self.identifier_field.field_name(), &self.identifier),
            (FIELD_MIME_TYPE, &self.mime_type),
            (FIELD_SIZE_BYTES, &self.size_bytes),
            (FIELD_SHA256, &self.sha256),
        ]
    }

    fn values(&self) -> [&str; 4] {
        [
            &self.identifier,
            &self.mime_type,
            &self.size_bytes,
            &self.sha256,
        ]
    }
}
