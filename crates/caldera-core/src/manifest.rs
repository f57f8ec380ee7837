//! Installed package manifest parsing.
//!
//! The manifest (package.json) is what dependency resolution actually
//! wired up, as opposed to the function config which is what the user
//! declared. The pipeline reads only the dependency table.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Dependency declarations from an installed package manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse a manifest from raw package.json bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Whether a dependency with the given name is declared.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// The declared location of a dependency, if present.
    pub fn dependency(&self, name: &str) -> Option<&str> {
        self.dependencies.get(name).map(String::as_str)
    }
}
