//! Schema documents and content hashing.
//!
//! A schema is carried through the pipeline as a canonical JSON
//! document. The pipeline never interprets it; it only embeds the
//! document and its content hash into the final artifact so a consumer
//! can detect drift between a bound interface schema and the compiled
//! implementation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A content-derived hash of a schema's canonical encoding.
///
/// The hash is a lowercase hexadecimal string (64 characters,
/// SHA-256 of the canonical JSON bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaHash(pub String);

impl std::fmt::Display for SchemaHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed interface schema (signature or extension contract).
///
/// The document is opaque to the build pipeline; only its canonical
/// encoding and hash are consumed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The schema document.
    pub document: serde_json::Value,
}

impl Schema {
    /// Create a schema from a parsed document.
    pub fn new(document: serde_json::Value) -> Self {
        Self { document }
    }

    /// Parse a schema from raw JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            document: serde_json::from_slice(bytes)?,
        })
    }

    /// The canonical encoding of this schema.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.document)
    }

    /// Compute the content hash of the canonical encoding.
    pub fn hash(&self) -> Result<SchemaHash, serde_json::Error> {
        let canonical = self.canonical_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(SchemaHash(format!("{:x}", hasher.finalize())))
    }
}
