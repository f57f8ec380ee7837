//! The build's terminal output record.

use serde::{Deserialize, Serialize};

use crate::config::Language;
use crate::schema::{Schema, SchemaHash};

/// The interface signature block embedded in an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub name: String,
    pub organization: String,
    pub tag: String,
    /// The signature schema the function was built against.
    pub schema: Schema,
    /// Content hash of the schema's canonical encoding.
    pub hash: SchemaHash,
}

/// An extension block embedded in an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionBlock {
    pub name: String,
    pub organization: String,
    pub tag: String,
    pub schema: Schema,
    pub hash: SchemaHash,
}

/// A compiled, versioned, hash-annotated function artifact.
///
/// Produced exactly once per successful build and immutable
/// thereafter. The wire format is owned by downstream packaging and
/// storage; this record only fixes the field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Function name, copied from the function config.
    pub name: String,

    /// Function version tag, copied from the function config.
    pub tag: String,

    /// The bound interface signature.
    pub signature: SignatureBlock,

    /// Extension blocks, in declaration order.
    pub extensions: Vec<ExtensionBlock>,

    /// Source language of the function.
    pub language: Language,

    /// Raw bytes of the installed package manifest the build resolved
    /// against.
    pub manifest: Vec<u8>,

    /// Whether the function is stateless.
    pub stateless: bool,

    /// The compiled sandboxed bytecode.
    pub function: Vec<u8>,
}
