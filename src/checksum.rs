//! SHA256 fingerprints for exported schema documents

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA256 of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(data)))
    }

    /// Fingerprint of a JSON document in its compact serialization
    ///
    /// Key order is part of the fingerprint: documents are compared as written.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let canonical = serde_json::to_string(value).unwrap_or_default();
        Self::from_bytes(canonical.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_json(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}
