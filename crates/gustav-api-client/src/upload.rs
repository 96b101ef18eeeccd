//! Upload preparation: intent request, byte transfer, digest reconciliation.
//!
//! The flow is strictly sequential. Each step starts only after the previous
//! response has been fully read, and the first failure ends the attempt. Nothing
//! is retried here; a new user gesture starts a new attempt from step one.

use gustav_core::{
    compute_digest, validate_file, DigestAlgorithm, DigestSource, MetadataPayload,
    TransferReceipt, UploadError, UploadFile, UploadIntent, UploadOutcome, UploadPolicy,
    UploadResult,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::{transport_error, ApiClient};

/// Runs the intent + transfer flow for one file at a time.
#[derive(Clone, Debug)]
pub struct UploadPreparer {
    api: ApiClient,
    /// `None` when the configured algorithm is not available in this build
    digest_algorithm: Option<DigestAlgorithm>,
}

impl UploadPreparer {
    pub fn new(api: ApiClient, digest_algorithm: &str) -> Self {
        let digest_algorithm = match digest_algorithm.parse::<DigestAlgorithm>() {
            Ok(algorithm) => Some(algorithm),
            Err(e) => {
                tracing::warn!(error = %e, "Local digest unavailable; uploads without a server digest will fail");
                None
            }
        };
        Self {
            api,
            digest_algorithm,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Client-side policy check. No side effects.
    pub fn validate(&self, file: &UploadFile, policy: &UploadPolicy) -> UploadResult<()> {
        validate_file(file, &policy.allowed_mime, policy.max_bytes)
    }

    /// Digest the full content of `file` locally.
    pub fn compute_digest(&self, file: &UploadFile) -> UploadResult<String> {
        compute_digest(file, self.digest_algorithm)
    }

    /// Validate, then run [`request_intent_and_transfer`](Self::request_intent_and_transfer).
    pub async fn prepare(
        &self,
        intent_endpoint: &str,
        file: &UploadFile,
        policy: &UploadPolicy,
        payload: &MetadataPayload,
    ) -> UploadResult<UploadOutcome> {
        self.validate(file, policy)?;
        self.request_intent_and_transfer(intent_endpoint, file, payload)
            .await
    }

    /// Request an upload intent, PUT the bytes to its target and reconcile the digest.
    ///
    /// The server-reported digest from the transfer response wins over the local one.
    /// A transfer response that is not JSON or lacks `sha256` falls back to hashing
    /// the exact bytes that were sent.
    pub async fn request_intent_and_transfer(
        &self,
        intent_endpoint: &str,
        file: &UploadFile,
        payload: &MetadataPayload,
    ) -> UploadResult<UploadOutcome> {
        let span = tracing::info_span!(
            "upload_prepare",
            attempt_id = %Uuid::new_v4(),
            intent_endpoint = %intent_endpoint,
            size_bytes = file.size,
        );

        async move {
            let intent = self.request_intent(intent_endpoint, file, payload).await?;
            let server_digest = self.transfer(&intent, file).await?;

            let (digest, digest_source) = match server_digest {
                Some(digest) => (digest, DigestSource::Server),
                None => (self.compute_digest(file)?, DigestSource::Local),
            };

            tracing::info!(
                digest_source = ?digest_source,
                storage_key = intent.storage_key.as_deref().unwrap_or(""),
                "Upload prepared"
            );

            Ok::<_, UploadError>(UploadOutcome {
                intent,
                digest,
                digest_source,
                mime: file.effective_mime().to_string(),
                size: file.size,
            })
        }
        .instrument(span)
        .await
    }

    async fn request_intent(
        &self,
        intent_endpoint: &str,
        file: &UploadFile,
        payload: &MetadataPayload,
    ) -> UploadResult<UploadIntent> {
        let url = self.api.resolve(intent_endpoint)?;
        let request = self.api.client().post(url.clone()).json(payload);
        let request = self.api.apply_credentials(request, &url);

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Upload intent request rejected");
            return Err(UploadError::IntentRequestFailed {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            UploadError::InvalidIntentResponse(format!("Failed to parse response as JSON: {}", e))
        })?;

        UploadIntent::from_response(body, file)
    }

    /// PUT the file to the intent target. Returns the server digest, if any.
    async fn transfer(
        &self,
        intent: &UploadIntent,
        file: &UploadFile,
    ) -> UploadResult<Option<String>> {
        let url = self.api.resolve(&intent.target)?;
        let mut request = self.api.client().put(url.clone()).body(file.content.clone());
        for (name, value) in &intent.transfer_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = self.api.apply_credentials(request, &url);

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Transfer to storage target rejected");
            return Err(UploadError::TransferFailed {
                status: status.as_u16(),
            });
        }

        // Any parse failure means "no server digest".
        let server_digest = response
            .json::<TransferReceipt>()
            .await
            .ok()
            .and_then(TransferReceipt::server_digest);

        Ok(server_digest)
    }
}
