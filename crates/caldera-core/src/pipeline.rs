//! The build pipeline.
//!
//! One build is a strictly sequential, fail-fast pass through nine
//! stages: workspace allocation, preflight validation, dependency
//! installation, manifest/signature cross-validation, two bundling
//! passes with generated glue in between, native bytecode compilation,
//! and artifact assembly. Each stage either produces the input of the
//! next or aborts the build; the workspace is reclaimed on every exit
//! path.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::artifact::{CompiledArtifact, ExtensionBlock, SignatureBlock};
use crate::bindings::BindingGenerator;
use crate::bundle::{Bundler, Platform};
use crate::bytecode::BytecodeCompiler;
use crate::config::{FunctionConfig, Language, Target};
use crate::error::{Error, Result};
use crate::install::{install_dependencies, resolve_package_manager};
use crate::manifest::Manifest;
use crate::resolve::{resolve_signature, FunctionInfo};
use crate::schema::Schema;
use crate::workspace::{WorkspaceAllocator, WorkspaceGuard};

/// Everything one build needs. Immutable for the build's duration.
pub struct BuildRequest<'a> {
    /// The user's function config (authoritative build intent).
    pub config: &'a FunctionConfig,

    /// Schema of the interface signature. Embedded into the artifact;
    /// not itself an input to compilation.
    pub signature_schema: &'a Schema,

    /// Extension schemas, in the same order as the config declares the
    /// extensions.
    pub extension_schemas: &'a [Schema],

    /// Directory containing the function source.
    pub source_dir: PathBuf,

    /// Explicit package manager binary; discovered on PATH when absent.
    pub package_manager: Option<PathBuf>,

    /// Release build. Accepted for parity with other language
    /// pipelines; the TypeScript toolchain configuration is fixed and
    /// does not branch on it.
    pub release: bool,

    /// Build target.
    pub target: Target,
}

/// The build pipeline, parameterized over its collaborator seams so it
/// can run against fakes in tests.
pub struct Pipeline<'a> {
    allocator: &'a dyn WorkspaceAllocator,
    bundler: &'a dyn Bundler,
    bindings: &'a dyn BindingGenerator,
    compiler: &'a dyn BytecodeCompiler,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        allocator: &'a dyn WorkspaceAllocator,
        bundler: &'a dyn Bundler,
        bindings: &'a dyn BindingGenerator,
        compiler: &'a dyn BytecodeCompiler,
    ) -> Self {
        Self {
            allocator,
            bundler,
            bindings,
            compiler,
        }
    }

    /// Run one build.
    ///
    /// Returns either a complete [`CompiledArtifact`] or an error,
    /// never a partial value. Subprocess output is forwarded to `sink`.
    pub fn build(
        &self,
        request: &BuildRequest<'_>,
        sink: &mut dyn Write,
    ) -> Result<CompiledArtifact> {
        let config = request.config;
        tracing::info!(name = %config.name, tag = %config.tag, "starting build");

        // Workspace first; the guard reclaims it on every return path
        // below, success or failure.
        let guard = WorkspaceGuard::acquire(self.allocator)?;
        let workspace = guard.workspace();

        // Preflight: everything that can fail before a subprocess runs.
        let package_manager = resolve_package_manager(request.package_manager.as_deref())?;

        if request.extension_schemas.len() != config.extensions.len() {
            return Err(Error::ExtensionCountMismatch {
                supplied: request.extension_schemas.len(),
                declared: config.extensions.len(),
            });
        }

        let source_dir = fs::canonicalize(&request.source_dir).map_err(|e| {
            Error::SourceDirectory {
                path: request.source_dir.clone(),
                source: e,
            }
        })?;
        if !source_dir.is_dir() {
            return Err(Error::SourceDirectory {
                path: source_dir,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let platform = match request.target {
            Target::Host => Platform::Node,
            Target::Browser => Platform::Browser,
        };

        // Install the function's own dependencies.
        install_dependencies(&package_manager, &source_dir, sink)?;

        // Cross-validate the installed manifest against the config.
        let manifest_path = source_dir.join("package.json");
        let manifest_bytes =
            fs::read(&manifest_path).map_err(|e| Error::io(&manifest_path, e))?;
        let manifest = Manifest::parse(&manifest_bytes).map_err(|e| Error::ManifestParse {
            path: manifest_path.clone(),
            source: e,
        })?;

        if !manifest.has_dependency("signature") {
            return Err(Error::SignatureDependencyMissing);
        }
        let declared = manifest.dependency("signature").unwrap_or_default();
        let signature_info =
            resolve_signature(&config.signature.organization, declared, &source_dir)?;
        let function_info = FunctionInfo::new(&config.name, &source_dir);

        // Pass 1: bundle the user's source as-is.
        tracing::info!("bundling function");
        let function_bundle = self
            .bundler
            .bundle(&source_dir.join("index.ts"), platform)?;

        let function_dir = workspace.function_dir();
        fs::create_dir_all(&function_dir).map_err(|e| Error::io(&function_dir, e))?;
        let function_index = function_dir.join("index.js");
        fs::write(&function_index, &function_bundle).map_err(|e| Error::io(&function_index, e))?;

        // Generated glue for pass 2, written verbatim.
        let generated = self
            .bindings
            .generate(config, &signature_info, &function_info)?;

        let compile_dir = workspace.compile_dir();
        fs::create_dir_all(&compile_dir).map_err(|e| Error::io(&compile_dir, e))?;
        let compile_manifest = compile_dir.join("package.json");
        fs::write(&compile_manifest, &generated.manifest)
            .map_err(|e| Error::io(&compile_manifest, e))?;
        let compile_entry = compile_dir.join("index.ts");
        fs::write(&compile_entry, &generated.entrypoint)
            .map_err(|e| Error::io(&compile_entry, e))?;

        // The generated manifest names fresh dependencies, so pass 2
        // needs its own install.
        install_dependencies(&package_manager, &compile_dir, sink)?;

        // Pass 2: bundle the generated entry point.
        tracing::info!("bundling compiler entry point");
        let compile_bundle = self.bundler.bundle(&compile_entry, platform)?;

        // Native compilation.
        tracing::info!("compiling bytecode");
        let bytecode = self.compiler.compile(&compile_bundle, workspace, sink)?;

        // Assemble the artifact.
        let artifact = assemble(config, request, manifest_bytes, bytecode)?;
        tracing::info!(name = %config.name, "build complete");
        Ok(artifact)
    }
}

/// Hash every schema and assemble the terminal artifact record.
fn assemble(
    config: &FunctionConfig,
    request: &BuildRequest<'_>,
    manifest_bytes: Vec<u8>,
    bytecode: Vec<u8>,
) -> Result<CompiledArtifact> {
    let signature_hash = request
        .signature_schema
        .hash()
        .map_err(|e| Error::SchemaHash {
            name: config.signature.name.clone(),
            source: e,
        })?;

    let signature = SignatureBlock {
        name: config.signature.name.clone(),
        organization: config.signature.organization.clone(),
        tag: config.signature.tag.clone(),
        schema: request.signature_schema.clone(),
        hash: signature_hash,
    };

    let mut extensions = Vec::with_capacity(config.extensions.len());
    for (ext, schema) in config.extensions.iter().zip(request.extension_schemas) {
        let hash = schema.hash().map_err(|e| Error::SchemaHash {
            name: ext.name.clone(),
            source: e,
        })?;
        extensions.push(ExtensionBlock {
            name: ext.name.clone(),
            organization: ext.organization.clone(),
            tag: ext.tag.clone(),
            schema: schema.clone(),
            hash,
        });
    }

    Ok(CompiledArtifact {
        name: config.name.clone(),
        tag: config.tag.clone(),
        signature,
        extensions,
        language: Language::TypeScript,
        manifest: manifest_bytes,
        stateless: config.stateless,
        function: bytecode,
    })
}