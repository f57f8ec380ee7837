//! Native bytecode compiler invocation.
//!
//! The compiler is a prebuilt executable spoken to over a narrow
//! protocol: it is materialized into the build workspace, invoked with
//! an output-path flag, fed the pass-2 bundle on stdin, and the
//! produced bytecode file is read back in full.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::workspace::BuildWorkspace;

/// Compiles a bundled module into sandboxed bytecode.
pub trait BytecodeCompiler {
    /// Compile `bundle` inside `workspace`, forwarding tool output to
    /// `sink`, and return the bytecode bytes.
    fn compile(
        &self,
        bundle: &[u8],
        workspace: &BuildWorkspace,
        sink: &mut dyn Write,
    ) -> Result<Vec<u8>>;
}

/// A prebuilt native compiler executable.
pub struct NativeCompiler {
    executable: Vec<u8>,
}

impl NativeCompiler {
    /// Wrap prebuilt executable bytes.
    pub fn new(executable: Vec<u8>) -> Self {
        Self { executable }
    }

    /// Load the executable from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let executable = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::new(executable))
    }

    fn materialize(&self, workspace: &BuildWorkspace) -> Result<std::path::PathBuf> {
        let path = workspace.compiler_path();
        std::fs::write(&path, &self.executable).map_err(|e| Error::io(&path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)
                .map_err(|e| Error::io(&path, e))?
                .permissions();
            perms.set_mode(0o770);
            std::fs::set_permissions(&path, perms).map_err(|e| Error::io(&path, e))?;
        }

        Ok(path)
    }
}

impl BytecodeCompiler for NativeCompiler {
    fn compile(
        &self,
        bundle: &[u8],
        workspace: &BuildWorkspace,
        sink: &mut dyn Write,
    ) -> Result<Vec<u8>> {
        let binary = self.materialize(workspace)?;
        let bytecode_path = workspace.bytecode_path();

        tracing::debug!(binary = %binary.display(), "invoking native bytecode compiler");

        let mut child = Command::new(&binary)
            .arg("-o")
            .arg(&bytecode_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::BytecodeCompile(format!("failed to spawn compiler: {e}")))?;

        // stdin handle is dropped after the write so the compiler sees
        // EOF. A compiler that exits before draining stdin breaks the
        // pipe; the wait below surfaces its exit status and stderr.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(bundle);
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::BytecodeCompile(e.to_string()))?;

        let _ = sink.write_all(&output.stdout);
        let _ = sink.write_all(&output.stderr);

        if !output.status.success() {
            return Err(Error::BytecodeCompile(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        std::fs::read(&bytecode_path).map_err(|e| Error::io(&bytecode_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> BuildWorkspace {
        BuildWorkspace {
            path: temp.path().to_path_buf(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_materialize_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let compiler = NativeCompiler::new(b"#!/bin/sh\nexit 0\n".to_vec());

        let path = compiler.materialize(&ws).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o770);
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_reads_back_output_file() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);

        // Stub compiler: echo stdin into the -o target.
        let compiler = NativeCompiler::new(b"#!/bin/sh\ncat > \"$2\"\n".to_vec());

        let mut sink = Vec::new();
        let bytecode = compiler.compile(b"bundled module", &ws, &mut sink).unwrap();
        assert_eq!(bytecode, b"bundled module");
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_without_reading_stdin_keeps_diagnostics() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        // Rejects the input without reading it; the bundle is larger
        // than the pipe buffer so the write hits a closed pipe.
        let compiler = NativeCompiler::new(b"#!/bin/sh\necho rejected >&2\nexit 4\n".to_vec());

        let bundle = vec![b'x'; 1 << 20];
        let mut sink = Vec::new();
        let err = compiler.compile(&bundle, &ws, &mut sink).unwrap_err();
        match err {
            Error::BytecodeCompile(msg) => assert!(msg.contains("rejected")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(String::from_utf8_lossy(&sink).contains("rejected"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_bytecode_compile_error() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let compiler = NativeCompiler::new(b"#!/bin/sh\necho boom >&2\nexit 3\n".to_vec());

        let mut sink = Vec::new();
        let err = compiler.compile(b"bundle", &ws, &mut sink).unwrap_err();
        match err {
            Error::BytecodeCompile(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
