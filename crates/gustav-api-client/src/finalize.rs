//! Finalize submission: the conventional form POST after a successful transfer.

use gustav_core::{UploadError, UploadResult};

use crate::{transport_error, ApiClient};

impl ApiClient {
    /// POST `fields` as `application/x-www-form-urlencoded` to `action`.
    ///
    /// Redirects are followed (post/redirect/get). Returns the final status.
    pub async fn submit_form(&self, action: &str, fields: &[(String, String)]) -> UploadResult<u16> {
        let url = self.resolve(action)?;
        let request = self.client().post(url.clone()).form(fields);
        let request = self.apply_credentials(request, &url);

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), action = %action, "Form submission rejected");
            return Err(UploadError::SubmissionFailed {
                status: status.as_u16(),
            });
        }

        tracing::debug!(status = status.as_u16(), action = %action, "Form submitted");
        Ok(status.as_u16())
    }
}
