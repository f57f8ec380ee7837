//! Error types for caldera-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for caldera-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a function.
#[derive(Debug, Error)]
pub enum Error {
    /// The package manager binary could not be found.
    #[error("package manager binary not found in PATH")]
    ToolchainMissing,

    /// The bundler binary could not be found.
    #[error("esbuild binary not found in PATH")]
    BundlerMissing,

    /// An explicitly supplied package manager binary is unusable.
    #[error("package manager binary {} is not executable", .0.display())]
    ToolchainNotExecutable(PathBuf),

    /// The source directory does not exist or cannot be resolved.
    #[error("unable to find source directory {}: {source}", path.display())]
    SourceDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The number of supplied extension schemas does not match the
    /// number of extensions declared in the function config.
    #[error("number of extension schemas ({supplied}) does not match number of extensions declared in the function config ({declared})")]
    ExtensionCountMismatch { supplied: usize, declared: usize },

    /// The package manager's install step exited non-zero.
    #[error("unable to install dependencies in {}: {message}", dir.display())]
    DependencyInstall { dir: PathBuf, message: String },

    /// The installed package manifest could not be parsed.
    #[error("unable to parse manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The installed manifest declares no signature dependency.
    #[error("signature dependency not found in installed manifest")]
    SignatureDependencyMissing,

    /// The signature dependency's declared location is empty.
    #[error("unable to parse signature dependency in installed manifest")]
    SignatureDependencyUnparsable,

    /// The function config's signature organization and the installed
    /// manifest's declared location disagree.
    #[error("function config's signature block does not match installed manifest: import path is {import_path} for a signature with organization {organization}")]
    SignatureOrganizationMismatch {
        organization: String,
        import_path: String,
    },

    /// The binding generator failed to emit the glue documents.
    #[error("unable to generate bindings: {0}")]
    BindingGeneration(String),

    /// A bundler implementation does not support the requested platform.
    #[error("unknown build target {0}")]
    UnknownTarget(String),

    /// Bundling failed; carries the aggregated diagnostics.
    #[error("unable to bundle {}:\n{diagnostics}", entry.display())]
    Bundle { entry: PathBuf, diagnostics: String },

    /// The native bytecode compiler exited non-zero.
    #[error("unable to compile bundled function to bytecode: {0}")]
    BytecodeCompile(String),

    /// Canonical encoding of a schema failed while hashing.
    #[error("unable to hash schema {name}: {source}")]
    SchemaHash {
        name: String,
        source: serde_json::Error,
    },

    /// The workspace allocator could not provide a build directory.
    #[error("unable to allocate build workspace: {0}")]
    WorkspaceAllocation(std::io::Error),

    /// IO error, tagged with the offending path.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an IO error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// A recovery hint for user-facing errors, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolchainMissing => Some(
                "install npm: https://docs.npmjs.com/downloading-and-installing-node-js-and-npm",
            ),
            Self::BundlerMissing => {
                Some("install esbuild: https://esbuild.github.io/getting-started/")
            }
            _ => None,
        }
    }

    /// Format the error together with its recovery hint.
    pub fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{self}\nhint: {hint}"),
            None => self.to_string(),
        }
    }
}
