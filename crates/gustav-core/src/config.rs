//! Configuration module
//!
//! Client configuration is read from `GUSTAV_*` environment variables (a `.env`
//! file is honoured via `dotenvy`). Every setting has a default so a bare
//! environment yields a working local configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GUSTAV_BASE_URL` | `http://localhost:8000` |
//! | `GUSTAV_SESSION_COOKIE` | unset (anonymous) |
//! | `GUSTAV_HTTP_TIMEOUT_SECS` | `60` |
//! | `GUSTAV_LEARNING_ALLOWED_MIME` | `image/png,image/jpeg,application/pdf` |
//! | `GUSTAV_LEARNING_MAX_BYTES` | `10485760` |
//! | `GUSTAV_DIGEST_ALGORITHM` | `sha256` |
//! | `GUSTAV_PREFERENCES_PATH` | `gustav-preferences.json` |

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, LEARNING_ALLOWED_MIME, LEARNING_MAX_BYTES,
};
use crate::validation::parse_allowed_mime;

const ENV_PREFIX: &str = "GUSTAV_";
const DEFAULT_PREFERENCES_PATH: &str = "gustav-preferences.json";

/// MIME allow-list and byte ceiling applied before an upload.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UploadPolicy {
    /// Empty means no MIME restriction
    pub allowed_mime: Vec<String>,
    /// Zero or negative disables the ceiling
    pub max_bytes: i64,
}

impl UploadPolicy {
    pub fn new(allowed_mime: Vec<String>, max_bytes: i64) -> Self {
        Self {
            allowed_mime,
            max_bytes,
        }
    }

    /// Policy for learning task submissions.
    pub fn learning() -> Self {
        Self {
            allowed_mime: LEARNING_ALLOWED_MIME.iter().map(|m| m.to_string()).collect(),
            max_bytes: LEARNING_MAX_BYTES,
        }
    }

    /// Policy from the form-attribute representation (`data-allowed-mime`, `data-max-bytes`).
    pub fn from_attributes(allowed_mime: &str, max_bytes: &str) -> Self {
        Self {
            allowed_mime: parse_allowed_mime(allowed_mime),
            max_bytes: crate::validation::parse_max_bytes(max_bytes),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    session_cookie: Option<String>,
    #[serde(default)]
    http_timeout_secs: Option<u64>,
    #[serde(default)]
    learning_allowed_mime: Option<String>,
    #[serde(default)]
    learning_max_bytes: Option<i64>,
    #[serde(default)]
    digest_algorithm: Option<String>,
    #[serde(default)]
    preferences_path: Option<PathBuf>,
}

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    /// Session cookie sent with same-origin requests (`name=value`)
    pub session_cookie: Option<String>,
    pub http_timeout_secs: u64,
    pub learning_policy: UploadPolicy,
    /// Checked when a digest is needed, not at load time
    pub digest_algorithm: String,
    pub preferences_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            learning_policy: UploadPolicy::learning(),
            digest_algorithm: "sha256".to_string(),
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment (after reading `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let raw: EnvConfig = envy::prefixed(ENV_PREFIX)
            .from_env()
            .context("Failed to read GUSTAV_* environment variables")?;
        let config = Self::from_raw(raw);
        config.validate()?;
        Ok(config)
    }

    /// Load from explicit `(name, value)` pairs, e.g. in tests.
    pub fn from_vars<I>(vars: I) -> Result<Self, anyhow::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: EnvConfig = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context("Failed to read GUSTAV_* variables")?;
        let config = Self::from_raw(raw);
        config.validate()?;
        Ok(config)
    }

    fn from_raw(raw: EnvConfig) -> Self {
        let defaults = Self::default();
        let learning_policy = UploadPolicy {
            allowed_mime: raw
                .learning_allowed_mime
                .map(|m| parse_allowed_mime(&m))
                .unwrap_or(defaults.learning_policy.allowed_mime),
            max_bytes: raw
                .learning_max_bytes
                .unwrap_or(defaults.learning_policy.max_bytes),
        };

        Self {
            base_url: raw
                .base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            session_cookie: raw.session_cookie.filter(|c| !c.trim().is_empty()),
            http_timeout_secs: raw.http_timeout_secs.unwrap_or(defaults.http_timeout_secs),
            learning_policy,
            digest_algorithm: raw.digest_algorithm.unwrap_or(defaults.digest_algorithm),
            preferences_path: raw.preferences_path.unwrap_or(defaults.preferences_path),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!(
                "GUSTAV_BASE_URL must be an http(s) URL, got '{}'",
                self.base_url
            );
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("GUSTAV_HTTP_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }
}
