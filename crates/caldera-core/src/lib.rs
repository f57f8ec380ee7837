//! Build pipeline for Caldera sandboxed-bytecode functions.
//!
//! This crate provides:
//! - Disposable, exclusively owned build workspaces
//! - Toolchain preflight and dependency installation
//! - Cross-validation of the function config against the installed
//!   package manifest
//! - Two-pass bundling (user function, then generated glue)
//! - Native bytecode compiler invocation
//! - Assembly of the final hash-annotated artifact
//!
//! The bundler, binding generator, native compiler, and workspace
//! storage are collaborator seams, so the pipeline itself can run
//! against fakes without any toolchain installed.

pub mod artifact;
pub mod bindings;
pub mod bundle;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod install;
pub mod manifest;
pub mod pipeline;
pub mod resolve;
pub mod schema;
pub mod workspace;

pub use artifact::{CompiledArtifact, ExtensionBlock, SignatureBlock};
pub use bindings::{BindingGenerator, GeneratedBindings, TypescriptBindings};
pub use bundle::{Bundler, EsbuildBundler, Platform, TSCONFIG};
pub use bytecode::{BytecodeCompiler, NativeCompiler};
pub use config::{ExtensionRef, FunctionConfig, Language, SignatureRef, Target};
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use pipeline::{BuildRequest, Pipeline};
pub use resolve::{resolve_signature, FunctionInfo, SignatureInfo};
pub use schema::{Schema, SchemaHash};
pub use workspace::{BuildWorkspace, DiskStorage, WorkspaceAllocator, WorkspaceGuard};
