//! Generated glue code for the second bundling pass.
//!
//! The binding generator is an external collaborator: given the
//! function config and the resolved signature/function locations, it
//! emits a dependency manifest and an entry-point module that wrap the
//! host/guest stubs around the bundled function. The pipeline writes
//! both verbatim into the workspace's `compile/` subtree.

use crate::config::FunctionConfig;
use crate::error::Result;
use crate::resolve::{FunctionInfo, SignatureInfo};

/// Manifest and entry-point documents for the compile pass.
#[derive(Debug, Clone)]
pub struct GeneratedBindings {
    /// Dependency manifest (package.json) declaring the resolved
    /// signature import and the bundled function.
    pub manifest: Vec<u8>,

    /// Entry-point source wiring the generated stubs around the
    /// function bundle.
    pub entrypoint: Vec<u8>,
}

/// Emits the glue code for the compile pass.
pub trait BindingGenerator {
    fn generate(
        &self,
        config: &FunctionConfig,
        signature: &SignatureInfo,
        function: &FunctionInfo,
    ) -> Result<GeneratedBindings>;
}

/// Default TypeScript binding generator.
pub struct TypescriptBindings;

impl BindingGenerator for TypescriptBindings {
    fn generate(
        &self,
        config: &FunctionConfig,
        signature: &SignatureInfo,
        function: &FunctionInfo,
    ) -> Result<GeneratedBindings> {
        let signature_location = if signature.local {
            format!("file:{}", signature.import_path)
        } else {
            signature.import_path.clone()
        };

        // The signature is the only installed dependency; the function
        // itself is already bundled and is imported by path.
        let mut dependencies = serde_json::Map::new();
        dependencies.insert(
            "signature".to_string(),
            serde_json::Value::String(signature_location),
        );

        let manifest = serde_json::json!({
            "name": format!("{}-compile", function.package_name),
            "version": "0.1.0",
            "private": true,
            "dependencies": dependencies,
        });
        // Pretty-printed so the generated manifest stays diffable when
        // a failed workspace is kept around for inspection.
        let manifest = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| crate::error::Error::BindingGeneration(e.to_string()))?;

        // The entry point lives in compile/, a sibling of function/
        // where the pipeline writes the pass-1 bundle.
        let mut entrypoint = String::new();
        entrypoint.push_str("// Generated entry point. DO NOT EDIT.\n");
        entrypoint.push_str("import * as signature from \"signature\";\n");
        entrypoint.push_str("import { guest } from \"signature/guest\";\n");
        entrypoint.push_str("import fn from \"../function/index.js\";\n\n");
        entrypoint.push_str(&format!("// function: {} {}\n", config.name, config.tag));
        entrypoint.push_str("guest.register(signature, fn);\n");

        Ok(GeneratedBindings {
            manifest,
            entrypoint: entrypoint.into_bytes(),
        })
    }
}
