//! Module bundling.
//!
//! Both bundling passes share one contract: given a single entry-point
//! module and a target platform, produce one self-contained CommonJS
//! module with no external resolution remaining. The compiler
//! configuration is fixed and non-negotiable; the only per-call inputs
//! are the entry point and the platform.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// The pinned TypeScript compiler configuration used by both passes.
pub const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "es2020",
    "module": "commonjs",
    "esModuleInterop": true,
    "forceConsistentCasingInFileNames": true,
    "strict": true,
    "skipLibCheck": true,
    "resolveJsonModule": true,
    "sourceMap": true,
    "types": ["node"]
  }
}"#;

/// Bundling platform profile, selected from the build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Server/host-capable profile.
    Node,
    /// Browser-capable profile.
    Browser,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Browser => "browser",
        }
    }
}

/// Produces one self-contained module from an entry point's module
/// graph.
///
/// Implementations must either return the complete bundle or an error
/// aggregating every diagnostic; partial bundles are never returned.
pub trait Bundler {
    fn bundle(&self, entry: &Path, platform: Platform) -> Result<Vec<u8>>;
}

/// Bundler backed by the esbuild binary.
pub struct EsbuildBundler {
    binary: PathBuf,
    tsconfig: PathBuf,
}

impl EsbuildBundler {
    /// Create a bundler using the given esbuild binary and a pinned
    /// tsconfig file (see [`TSCONFIG`]).
    pub fn new(binary: impl Into<PathBuf>, tsconfig: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            tsconfig: tsconfig.into(),
        }
    }

    /// Create a bundler with the pinned [`TSCONFIG`] materialized into
    /// `config_dir`.
    pub fn with_pinned_config(
        binary: impl Into<PathBuf>,
        config_dir: &Path,
    ) -> Result<Self> {
        let tsconfig = config_dir.join("tsconfig.json");
        std::fs::write(&tsconfig, TSCONFIG).map_err(|e| Error::io(&tsconfig, e))?;
        Ok(Self::new(binary, tsconfig))
    }

    /// Discover esbuild on PATH and pin the compiler configuration.
    pub fn discover(config_dir: &Path) -> Result<Self> {
        let binary = which::which("esbuild").map_err(|_| Error::BundlerMissing)?;
        Self::with_pinned_config(binary, config_dir)
    }
}

impl Bundler for EsbuildBundler {
    fn bundle(&self, entry: &Path, platform: Platform) -> Result<Vec<u8>> {
        tracing::debug!(entry = %entry.display(), platform = platform.as_str(), "bundling");

        let output = Command::new(&self.binary)
            .arg(entry)
            .arg("--bundle")
            .arg(format!("--platform={}", platform.as_str()))
            .arg("--format=cjs")
            .arg("--target=es2020")
            .arg("--define:global=globalThis")
            .arg("--sourcemap=inline")
            .arg(format!("--tsconfig={}", self.tsconfig.display()))
            .output()
            .map_err(|e| Error::Bundle {
                entry: entry.to_path_buf(),
                diagnostics: format!("failed to run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            // esbuild prints one diagnostic per line on stderr.
            return Err(Error::Bundle {
                entry: entry.to_path_buf(),
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_flags() {
        assert_eq!(Platform::Node.as_str(), "node");
        assert_eq!(Platform::Browser.as_str(), "browser");
    }

    #[test]
    fn test_tsconfig_is_pinned() {
        // The compiler configuration is part of the artifact contract.
        assert!(TSCONFIG.contains("\"target\": \"es2020\""));
        assert!(TSCONFIG.contains("\"module\": \"commonjs\""));
        assert!(TSCONFIG.contains("\"strict\": true"));
        assert!(TSCONFIG.contains("\"esModuleInterop\": true"));
        assert!(TSCONFIG.contains("\"sourceMap\": true"));
    }

    #[test]
    fn test_with_pinned_config_materializes_tsconfig() {
        let temp = tempfile::TempDir::new().unwrap();
        let _bundler =
            EsbuildBundler::with_pinned_config("/usr/bin/esbuild", temp.path()).unwrap();

        let written = std::fs::read_to_string(temp.path().join("tsconfig.json")).unwrap();
        assert_eq!(written, TSCONFIG);
    }

    #[test]
    fn test_missing_binary_aggregates_into_bundle_error() {
        let bundler = EsbuildBundler::new("/definitely/not/esbuild", "/tmp/tsconfig.json");
        let err = bundler
            .bundle(Path::new("/src/index.ts"), Platform::Node)
            .unwrap_err();
        assert!(matches!(err, Error::Bundle { .. }));
    }
}
