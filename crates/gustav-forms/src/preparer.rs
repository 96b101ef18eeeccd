//! Seams between the controller and the network.

use async_trait::async_trait;
use gustav_api_client::{ApiClient, UploadPreparer};
use gustav_core::{MetadataPayload, UploadFile, UploadOutcome, UploadPolicy, UploadResult};

/// Validates and uploads a file, producing the values for the hidden fields.
#[async_trait]
pub trait PrepareUpload: Send + Sync {
    async fn prepare(
        &self,
        intent_endpoint: &str,
        file: &UploadFile,
        policy: &UploadPolicy,
        payload: &MetadataPayload,
    ) -> UploadResult<UploadOutcome>;
}

/// Performs the final form submission. Returns the HTTP status.
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(&self, action: &str, fields: &[(String, String)]) -> UploadResult<u16>;
}

#[async_trait]
impl PrepareUpload for UploadPreparer {
    async fn prepare(
        &self,
        intent_endpoint: &str,
        file: &UploadFile,
        policy: &UploadPolicy,
        payload: &MetadataPayload,
    ) -> UploadResult<UploadOutcome> {
        UploadPreparer::prepare(self, intent_endpoint, file, policy, payload).await
    }
}

#[async_trait]
impl FormSubmitter for ApiClient {
    async fn submit(&self, action: &str, fields: &[(String, String)]) -> UploadResult<u16> {
        self.submit_form(action, fields).await
    }
}
