//! Package manager discovery and dependency installation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Name of the package manager binary searched on PATH.
pub const PACKAGE_MANAGER: &str = "npm";

/// Resolve the package manager binary.
///
/// An explicitly supplied path must exist and carry an execute bit.
/// Otherwise the binary is searched on the process's PATH; not finding
/// it is a user-facing error with install guidance, not an IO error.
pub fn resolve_package_manager(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => {
            let meta = std::fs::metadata(path).map_err(|e| Error::io(path, e))?;
            if !is_executable(&meta) {
                return Err(Error::ToolchainNotExecutable(path.to_path_buf()));
            }
            Ok(path.to_path_buf())
        }
        None => which::which(PACKAGE_MANAGER).map_err(|_| Error::ToolchainMissing),
    }
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &std::fs::Metadata) -> bool {
    true
}

/// Run the package manager's install step with the given working
/// directory, forwarding the tool's output to the sink.
///
/// A non-zero exit is fatal; there is no retry.
pub fn install_dependencies(
    package_manager: &Path,
    dir: &Path,
    sink: &mut dyn Write,
) -> Result<()> {
    tracing::debug!(dir = %dir.display(), "installing dependencies");

    let output = Command::new(package_manager)
        .arg("install")
        .current_dir(dir)
        .output()
        .map_err(|e| Error::DependencyInstall {
            dir: dir.to_path_buf(),
            message: format!("failed to run {}: {}", package_manager.display(), e),
        })?;

    // Tool output is a side channel, forwarded regardless of exit code.
    let _ = sink.write_all(&output.stdout);
    let _ = sink.write_all(&output.stderr);

    if !output.status.success() {
        return Err(Error::DependencyInstall {
            dir: dir.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_explicit_binary_must_exist() {
        let err = resolve_package_manager(Some(Path::new("/definitely/not/here"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_binary_must_be_executable() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("npm");
        std::fs::write(&path, "not a binary").unwrap();

        let err = resolve_package_manager(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::ToolchainNotExecutable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_executable_binary_resolves() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = write_script(temp.path(), "npm", "exit 0");

        let resolved = resolve_package_manager(Some(&path)).unwrap();
        assert_eq!(resolved, path);
    }

    /// Restores the original PATH when dropped, so the test cannot
    /// leave the process environment scrambled on assertion failure.
    #[cfg(unix)]
    struct PathGuard(Option<std::ffi::OsString>);

    #[cfg(unix)]
    impl PathGuard {
        fn set(dir: &Path) -> Self {
            let original = std::env::var_os("PATH");
            std::env::set_var("PATH", dir);
            Self(original)
        }
    }

    #[cfg(unix)]
    impl Drop for PathGuard {
        fn drop(&mut self) {
            match &self.0 {
                Some(original) => std::env::set_var("PATH", original),
                None => std::env::remove_var("PATH"),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_path_discovery_finds_and_misses_the_binary() {
        let temp = tempfile::TempDir::new().unwrap();
        let script = write_script(temp.path(), "npm", "exit 0");

        let _guard = PathGuard::set(temp.path());
        let resolved = resolve_package_manager(None).unwrap();
        assert_eq!(resolved.file_name(), script.file_name());
        assert!(resolved.is_file());

        let empty = tempfile::TempDir::new().unwrap();
        let _guard = PathGuard::set(empty.path());
        let err = resolve_package_manager(None).unwrap_err();
        assert!(matches!(err, Error::ToolchainMissing));
    }

    #[cfg(unix)]
    #[test]
    fn test_install_streams_output_to_sink() {
        let temp = tempfile::TempDir::new().unwrap();
        let script = write_script(temp.path(), "npm", "echo installing");

        let mut sink = Vec::new();
        install_dependencies(&script, temp.path(), &mut sink).unwrap();

        assert!(String::from_utf8_lossy(&sink).contains("installing"));
    }

    #[cfg(unix)]
    #[test]
    fn test_install_failure_is_fatal() {
        let temp = tempfile::TempDir::new().unwrap();
        let script = write_script(temp.path(), "npm", "echo broken >&2; exit 1");

        let mut sink = Vec::new();
        let err = install_dependencies(&script, temp.path(), &mut sink).unwrap_err();

        match err {
            Error::DependencyInstall { message, .. } => assert!(message.contains("broken")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
