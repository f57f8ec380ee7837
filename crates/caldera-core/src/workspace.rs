//! Disposable build workspaces.
//!
//! Every build owns exactly one workspace for its whole lifetime:
//!
//! ```text
//! <root>/<uuid>/
//! ├── function/        # pass-1 bundle output
//! ├── compile/         # generated manifest + entry point, pass-2 sources
//! ├── <compiler-bin>   # materialized native compiler
//! └── bytecode.bin     # final compiled output
//! ```
//!
//! Reclamation is best-effort and must never mask the pipeline's real
//! outcome, so `reclaim` swallows errors by design of the contract.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// An exclusively owned build directory tree.
#[derive(Debug, Clone)]
pub struct BuildWorkspace {
    /// Root of the workspace.
    pub path: PathBuf,
}

impl BuildWorkspace {
    /// Directory for the pass-1 function bundle.
    pub fn function_dir(&self) -> PathBuf {
        self.path.join("function")
    }

    /// Directory for the generated compile sources (pass 2).
    pub fn compile_dir(&self) -> PathBuf {
        self.path.join("compile")
    }

    /// Path of the final bytecode output file.
    pub fn bytecode_path(&self) -> PathBuf {
        self.path.join("bytecode.bin")
    }

    /// Path where the native compiler binary is materialized.
    pub fn compiler_path(&self) -> PathBuf {
        self.path.join("bytecode_builder")
    }
}

/// Allocates and reclaims disposable build workspaces.
///
/// The pipeline is tested against fake allocators, so the seam is a
/// trait rather than a concrete storage handle.
pub trait WorkspaceAllocator {
    /// Allocate a fresh, uniquely named workspace.
    fn allocate(&self) -> Result<BuildWorkspace>;

    /// Reclaim a workspace. Best-effort: failures are swallowed so
    /// cleanup can never override the pipeline's result.
    fn reclaim(&self, workspace: &BuildWorkspace);
}

/// Disk-backed workspace storage.
///
/// Workspaces are uuid-named directories under a fixed root, so
/// concurrent builds never collide.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Create storage rooted at the given directory.
    ///
    /// The root is created if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        Ok(Self { root })
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl WorkspaceAllocator for DiskStorage {
    fn allocate(&self) -> Result<BuildWorkspace> {
        let path = self.root.join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&path).map_err(Error::WorkspaceAllocation)?;
        Ok(BuildWorkspace { path })
    }

    fn reclaim(&self, workspace: &BuildWorkspace) {
        if let Err(e) = fs::remove_dir_all(&workspace.path) {
            tracing::warn!(
                workspace = %workspace.path.display(),
                error = %e,
                "failed to reclaim build workspace"
            );
        }
    }
}

/// Scoped ownership of a workspace for one build attempt.
///
/// Reclaims the workspace when dropped, so release fires on every
/// return path of the pipeline, including early error returns.
pub struct WorkspaceGuard<'a> {
    allocator: &'a dyn WorkspaceAllocator,
    workspace: BuildWorkspace,
}

impl<'a> WorkspaceGuard<'a> {
    /// Allocate a workspace and take scoped ownership of it.
    pub fn acquire(allocator: &'a dyn WorkspaceAllocator) -> Result<Self> {
        let workspace = allocator.allocate()?;
        Ok(Self {
            allocator,
            workspace,
        })
    }

    /// The guarded workspace.
    pub fn workspace(&self) -> &BuildWorkspace {
        &self.workspace
    }
}

impl Drop for WorkspaceGuard<'_> {
    fn drop(&mut self) {
        self.allocator.reclaim(&self.workspace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_allocate_creates_unique_dirs() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path()).unwrap();

        let a = storage.allocate().unwrap();
        let b = storage.allocate().unwrap();

        assert!(a.path.exists());
        assert!(b.path.exists());
        assert_ne!(a.path, b.path);
    }

    #[test]
    fn test_reclaim_removes_workspace() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path()).unwrap();

        let ws = storage.allocate().unwrap();
        fs::write(ws.path.join("leftover.txt"), "x").unwrap();
        storage.reclaim(&ws);

        assert!(!ws.path.exists());
    }

    #[test]
    fn test_reclaim_missing_workspace_is_silent() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path()).unwrap();

        let ws = storage.allocate().unwrap();
        fs::remove_dir_all(&ws.path).unwrap();

        // Must not panic or propagate.
        storage.reclaim(&ws);
    }

    #[test]
    fn test_guard_reclaims_on_drop() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path()).unwrap();

        let path = {
            let guard = WorkspaceGuard::acquire(&storage).unwrap();
            guard.workspace().path.clone()
        };

        assert!(!path.exists());
    }

    #[test]
    fn test_workspace_layout() {
        let ws = BuildWorkspace {
            path: PathBuf::from("/build/abc"),
        };
        assert_eq!(ws.function_dir(), PathBuf::from("/build/abc/function"));
        assert_eq!(ws.compile_dir(), PathBuf::from("/build/abc/compile"));
        assert_eq!(ws.bytecode_path(), PathBuf::from("/build/abc/bytecode.bin"));
    }
}
