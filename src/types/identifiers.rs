use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// Identity of a content description, independent of the asset it points at.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

#[derive(Debug, Error)]
pub enum RecordIdError {
    #[error("Description path is outside the catalog root")]
    OutsideRoot,
    #[error("Path involves invalid UTF-8")]
    InvalidUtf8,
}

impl RecordId {
    /// Build an id from an already-normalized name (in-memory catalogs, tests).
    pub fn new(name: impl Into<String>) -> Self {
        RecordId(normalize(&name.into()))
    }

    /// Create a RecordId from a description file path and the catalog root.
    pub fn from_path(root: &Path, source: &Path) -> Result<Self, RecordIdError> {
        let rel = source
            .strip_prefix(root)
            .map_err(|_| RecordIdError::OutsideRoot)?;

        let s = rel.to_str().ok_or(RecordIdError::InvalidUtf8)?;

        Ok(RecordId(normalize(s)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(s: &str) -> String {
    s.replace('\\', "/")
        .trim_start_matches("./")
        .to_lowercase()
}

/// Fingerprint of a description's semantic content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordVersion(String);

impl RecordVersion {
    pub fn from_hasher(hasher: Sha256) -> Self {
        let hash = hasher.finalize();
        RecordVersion(format!("sha256:{}", hex::encode(hash)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
