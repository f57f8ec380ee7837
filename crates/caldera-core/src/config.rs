//! Function configuration: the build intent one layer above the pipeline.

use serde::{Deserialize, Serialize};

/// Build target for the compiled function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Sandboxed bytecode for a server/host-capable runtime.
    Host,
    /// Sandboxed bytecode for a browser-capable runtime.
    Browser,
}

/// Source language of the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
        }
    }
}

/// Reference to an interface signature in a function config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRef {
    pub name: String,
    pub organization: String,
    pub tag: String,
}

/// Reference to an extension in a function config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRef {
    pub name: String,
    pub organization: String,
    pub tag: String,
}

/// A user-authored function configuration.
///
/// This is the authoritative build intent; the installed package
/// manifest is the independently editable second source that the
/// pipeline cross-validates against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Function name.
    pub name: String,

    /// Function version tag.
    pub tag: String,

    /// The interface signature this function implements.
    pub signature: SignatureRef,

    /// Extensions this function uses, in declaration order.
    #[serde(default)]
    pub extensions: Vec<ExtensionRef>,

    /// Whether the function is stateless.
    #[serde(default)]
    pub stateless: bool,
}

impl FunctionConfig {
    /// Parse a function config from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = FunctionConfig::from_bytes(
            br#"{
                "name": "Hello",
                "tag": "latest",
                "signature": {"name": "sig", "organization": "local", "tag": "latest"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "Hello");
        assert_eq!(config.signature.organization, "local");
        assert!(config.extensions.is_empty());
        assert!(!config.stateless);
    }

    #[test]
    fn test_parse_config_with_extensions() {
        let config = FunctionConfig::from_bytes(
            br#"{
                "name": "hello",
                "tag": "v1",
                "signature": {"name": "sig", "organization": "acme", "tag": "v1"},
                "extensions": [{"name": "kv", "organization": "acme", "tag": "v2"}],
                "stateless": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.extensions.len(), 1);
        assert_eq!(config.extensions[0].name, "kv");
        assert!(config.stateless);
    }

    #[test]
    fn test_language_as_str() {
        assert_eq!(Language::TypeScript.as_str(), "typescript");
        assert_eq!(Language::JavaScript.as_str(), "javascript");
    }
}
