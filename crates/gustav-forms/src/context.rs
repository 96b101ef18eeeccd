//! Form flavours and the data each one carries.

use std::collections::HashMap;

use gustav_api_client::learning_intent_path;
use gustav_core::{IdentifierField, MetadataPayload, UploadError, UploadFile, UploadPolicy, UploadResult};

use crate::registry::ElementRole;

const ATTR_COURSE_ID: &str = "data-course-id";
const ATTR_TASK_ID: &str = "data-task-id";
const ATTR_INTENT_URL: &str = "data-intent-url";
const ATTR_ALLOWED_MIME: &str = "data-allowed-mime";
const ATTR_MAX_BYTES: &str = "data-max-bytes";

/// Where a managed form gets its intent endpoint, policy and identifier field from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormContext {
    /// Task submission inside a course. Empty ids are kept and rejected at preparation.
    LearningSubmission { course_id: String, task_id: String },
    /// Material creation. The policy comes from the form attributes.
    MaterialCreate {
        intent_url: Option<String>,
        policy: UploadPolicy,
    },
}

impl FormContext {
    /// Build a context from the element's `data-*` attributes.
    pub fn from_attributes(role: ElementRole, attrs: &HashMap<String, String>) -> UploadResult<Self> {
        let attr = |name: &str| attrs.get(name).map(|v| v.trim().to_string()).unwrap_or_default();

        match role {
            ElementRole::TaskSubmitForm => Ok(Self::LearningSubmission {
                course_id: attr(ATTR_COURSE_ID),
                task_id: attr(ATTR_TASK_ID),
            }),
            ElementRole::MaterialCreateForm => Ok(Self::MaterialCreate {
                intent_url: Some(attr(ATTR_INTENT_URL)).filter(|u| !u.is_empty()),
                policy: UploadPolicy::from_attributes(&attr(ATTR_ALLOWED_MIME), &attr(ATTR_MAX_BYTES)),
            }),
            other => Err(UploadError::MissingFormContext(format!(
                "{:?} is not an upload form",
                other
            ))),
        }
    }

    /// Intent endpoint for this form.
    pub fn intent_endpoint(&self) -> UploadResult<String> {
        match self {
            Self::LearningSubmission { course_id, task_id } => {
                if course_id.is_empty() || task_id.is_empty() {
                    return Err(UploadError::MissingFormContext(
                        "course or task id missing".to_string(),
                    ));
                }
                Ok(learning_intent_path(course_id, task_id))
            }
            Self::MaterialCreate { intent_url, .. } => intent_url
                .clone()
                .ok_or_else(|| UploadError::MissingFormContext("intent url missing".to_string())),
        }
    }

    /// Policy in force for this form. Learning forms use the configured learning policy.
    pub fn policy<'a>(&'a self, learning: &'a UploadPolicy) -> &'a UploadPolicy {
        match self {
            Self::LearningSubmission { .. } => learning,
            Self::MaterialCreate { policy, .. } => policy,
        }
    }

    pub fn identifier_field(&self) -> IdentifierField {
        match self {
            Self::LearningSubmission { .. } => IdentifierField::StorageKey,
            Self::MaterialCreate { .. } => IdentifierField::IntentId,
        }
    }

    /// Learning forms prepare as soon as a file is picked; material forms wait for submit.
    pub fn prepares_on_select(&self) -> bool {
        matches!(self, Self::LearningSubmission { .. })
    }

    pub fn payload(&self, file: &UploadFile) -> MetadataPayload {
        MetadataPayload::for_file(file)
    }
}
