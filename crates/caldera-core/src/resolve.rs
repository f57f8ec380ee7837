//! Cross-validation of the two signature declarations.
//!
//! The function config (authoritative build intent) and the installed
//! manifest (what dependency resolution actually wired up) are
//! independently editable. Divergence has to be caught here, before
//! compilation, instead of surfacing as a runtime binding failure
//! inside the sandbox.
//!
//! `resolve_signature` is a pure function over (declared organization,
//! declared location, source root) so it can be unit tested without a
//! file system or subprocess.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

const FILE_SCHEME: &str = "file:";

/// The resolved signature import for the binding generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    /// Absolute path (local) or http/https URL (remote).
    pub import_path: String,

    /// Whether the signature is a local file dependency.
    pub local: bool,
}

/// The bundled function's location for the binding generator.
///
/// Not interpreted further by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Lower-cased function name, used as the generated package name.
    pub package_name: String,

    /// Absolute source directory of the function.
    pub import_path: PathBuf,
}

impl FunctionInfo {
    pub fn new(name: &str, source_dir: &Path) -> Self {
        Self {
            package_name: name.to_lowercase(),
            import_path: source_dir.to_path_buf(),
        }
    }
}

/// Cross-validate the manifest-declared signature location against the
/// config-declared organization and resolve the import path.
///
/// For organization `"local"` the location must carry a `file:` scheme;
/// the stripped path is resolved (lexically) against `source_dir` if it
/// is not already absolute. For any other organization the location
/// must be an http/https URL.
pub fn resolve_signature(
    organization: &str,
    declared_location: &str,
    source_dir: &Path,
) -> Result<SignatureInfo> {
    if declared_location.is_empty() {
        return Err(Error::SignatureDependencyUnparsable);
    }

    if organization == "local" {
        let Some(path) = declared_location.strip_prefix(FILE_SCHEME) else {
            return Err(Error::SignatureOrganizationMismatch {
                organization: organization.to_string(),
                import_path: declared_location.to_string(),
            });
        };

        let path = PathBuf::from(path);
        let resolved = if path.is_absolute() {
            path
        } else {
            normalize(&source_dir.join(path))
        };

        Ok(SignatureInfo {
            import_path: resolved.to_string_lossy().into_owned(),
            local: true,
        })
    } else {
        if !(declared_location.starts_with("http://") || declared_location.starts_with("https://"))
        {
            return Err(Error::SignatureOrganizationMismatch {
                organization: organization.to_string(),
                import_path: declared_location.to_string(),
            });
        }

        Ok(SignatureInfo {
            import_path: declared_location.to_string(),
            local: false,
        })
    }
}

/// Lexically normalize a path, resolving `.` and `..` components
/// without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above an absolute root stays at the root.
                if !out.pop() && !path.has_root() {
                    out.push(Component::ParentDir.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
