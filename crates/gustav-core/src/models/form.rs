use serde::{Deserialize, Serialize};

use crate::constants::{FIELD_INTENT_ID, FIELD_STORAGE_KEY};
use crate::models::UploadIntent;

/// Submission mode selected on a managed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    #[default]
    Text,
    Upload,
}

impl FormMode {
    /// Parse a radio value. `image` and `file` are older spellings of `upload`;
    /// anything unrecognised falls back to `text`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "upload" | "image" | "file" => FormMode::Upload,
            _ => FormMode::Text,
        }
    }

    pub fn requires_file(&self) -> bool {
        matches!(self, FormMode::Upload)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::Text => "text",
            FormMode::Upload => "upload",
        }
    }
}

/// Which server identifier a form echoes back in its finalize submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierField {
    StorageKey,
    IntentId,
}

impl IdentifierField {
    pub fn field_name(&self) -> &'static str {
        match self {
            IdentifierField::StorageKey => FIELD_STORAGE_KEY,
            IdentifierField::IntentId => FIELD_INTENT_ID,
        }
    }

    pub fn value_from<'a>(&self, intent: &'a UploadIntent) -> Option<&'a str> {
        match self {
            IdentifierField::StorageKey => intent.storage_key.as_deref(),
            IdentifierField::IntentId => intent.intent_id.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_mode_parse() {
        assert_eq!(FormMode::parse("text"), FormMode::Text);
        assert_eq!(FormMode::parse("upload"), FormMode::Upload);
        assert_eq!(FormMode::parse("image"), FormMode::Upload);
        assert_eq!(FormMode::parse("file"), FormMode::Upload);
        assert_eq!(FormMode::parse("bogus"), FormMode::Text);
        assert!(FormMode::Upload.requires_file());
        assert!(!FormMode::Text.requires_file());
    }

    #[test]
    fn test_identifier_field_names() {
        assert_eq!(IdentifierField::StorageKey.field_name(), "storage_key");
        assert_eq!(IdentifierField::IntentId.field_name(), "intent_id");
    }
}
