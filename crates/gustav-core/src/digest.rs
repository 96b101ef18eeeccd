//! Content digest computation.
//!
//! The digest is rendered as lowercase hexadecimal. Which algorithm is available is
//! a capability of the build; asking for one it cannot provide fails with
//! [`UploadError::HashingUnsupported`] instead of silently substituting another.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{UploadError, UploadResult};
use crate::models::UploadFile;

/// Digest algorithms this build can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
        }
    }

    /// Digest `data`, lowercase hex.
    pub fn digest_hex(&self, data: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                hex::encode(hasher.finalize())
            }
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            other => Err(UploadError::HashingUnsupported(format!(
                "digest algorithm '{}' is not available",
                other
            ))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest the full content of `file` with `algorithm`.
///
/// `algorithm` is `None` when the environment offers no digest primitive at all.
pub fn compute_digest(file: &UploadFile, algorithm: Option<DigestAlgorithm>) -> UploadResult<String> {
    let algorithm = algorithm.ok_or_else(|| {
        UploadError::HashingUnsupported("no digest primitive available".to_string())
    })?;
    Ok(algorithm.digest_hex(&file.content))
}
