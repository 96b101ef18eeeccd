//! HTTP client for the GUSTAV web application.
//!
//! Provides [`ApiClient`] with same-origin credential handling, the
//! [`UploadPreparer`] that runs the intent + transfer flow, and finalize form
//! submission. The form controller in `gustav-forms` drives these.

pub mod finalize;
pub mod upload;

use std::time::Duration;

use anyhow::{Context, Result};
use gustav_core::{ClientConfig, UploadError, UploadResult};
use reqwest::{Client, Url};

pub use upload::UploadPreparer;

/// Credentials attached to same-origin requests.
#[derive(Clone, Debug)]
pub enum Auth {
    /// No credentials
    Anonymous,
    /// `Cookie: {name=value}` (the browser session)
    SessionCookie(String),
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

/// Intent endpoint for a learning task submission.
pub fn learning_intent_path(course_id: &str, task_id: &str) -> String {
    format!(
        "/api/learning/courses/{}/tasks/{}/upload-intents",
        urlencoding::encode(course_id),
        urlencoding::encode(task_id)
    )
}

/// HTTP client bound to one GUSTAV origin.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: Auth, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base, auth })
    }

    /// Create client from configuration. A configured session cookie becomes the credential.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let auth = match &config.session_cookie {
            Some(cookie) => Auth::SessionCookie(cookie.clone()),
            None => Auth::Anonymous,
        };
        Self::new(
            &config.base_url,
            auth,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Resolve an absolute URL or a path relative to the base origin.
    pub fn resolve(&self, endpoint: &str) -> UploadResult<Url> {
        let resolved = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)
        } else {
            self.base.join(endpoint)
        };
        resolved.map_err(|e| UploadError::Transport(format!("Invalid URL '{}': {}", endpoint, e)))
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }

    /// Attach credentials when `url` shares the base origin; cross-origin targets get none.
    pub fn apply_credentials(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> reqwest::RequestBuilder {
        if !self.is_same_origin(url) {
            return request;
        }
        match &self.auth {
            Auth::Anonymous => request,
            Auth::SessionCookie(cookie) => request.header(reqwest::header::COOKIE, cookie.as_str()),
            Auth::Bearer(token) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token),
            ),
        }
    }

    /// Raw client for custom requests. Caller applies credentials via `apply_credentials`.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a reqwest failure (connect, timeout, body read) into the upload taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> UploadError {
    UploadError::Transport(err.to_string())
}
