//! Content digests over the compact canonical text.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::error::Result;
use crate::reduce::Reduce;
use crate::serializer::serialize;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlg {
    /// SHA-256.
    #[serde(rename = "sha-256")]
    Sha256,
}

/// Algorithm + digest bytes, encoded as base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    /// Digest algorithm (currently always `sha-256`).
    pub alg: DigestAlg,
    /// Base64URL (no padding) digest bytes.
    pub b64: String,
}

impl Digest {
    /// SHA-256 of the compact canonical text of `value`.
    ///
    /// Values that differ only in key order hash identically.
    pub fn of<R: Reduce + ?Sized>(value: &R) -> Result<Self> {
        let text = serialize(value, None)?;
        Ok(Self::of_bytes(text.as_bytes()))
    }

    /// SHA-256 of raw bytes.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Digest {
            alg: DigestAlg::Sha256,
            b64: URL_SAFE_NO_PAD.encode(Sha256::digest(bytes)),
        }
    }

    /// Decodes the digest bytes, `None` if `b64` is not valid base64url.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        URL_SAFE_NO_PAD.decode(&self.b64).ok()
    }
}
