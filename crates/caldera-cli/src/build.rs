//! `caldera build` - run the pipeline with the real collaborators.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use caldera_core::{
    BuildRequest, DiskStorage, EsbuildBundler, FunctionConfig, NativeCompiler, Pipeline, Schema,
    Target, TypescriptBindings,
};

/// CLI-facing build target.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TargetArg {
    Host,
    Browser,
}

impl From<TargetArg> for Target {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Host => Target::Host,
            TargetArg::Browser => Target::Browser,
        }
    }
}

pub struct BuildArgs {
    pub source_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub signature_schema: PathBuf,
    pub extension_schemas: Vec<PathBuf>,
    pub compiler: PathBuf,
    pub output: PathBuf,
    pub target: TargetArg,
    pub release: bool,
    pub npm: Option<PathBuf>,
    pub esbuild: Option<PathBuf>,
}

pub fn execute(args: BuildArgs) -> anyhow::Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| args.source_dir.join("caldera.json"));
    let config_bytes = fs::read(&config_path)
        .with_context(|| format!("unable to read function config {}", config_path.display()))?;
    let config = FunctionConfig::from_bytes(&config_bytes)
        .with_context(|| format!("unable to parse function config {}", config_path.display()))?;

    let signature_schema = read_schema(&args.signature_schema)?;
    let extension_schemas = args
        .extension_schemas
        .iter()
        .map(|path| read_schema(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cache_root = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("caldera");
    let storage = DiskStorage::new(cache_root.join("builds"))?;

    let bundler = match &args.esbuild {
        Some(binary) => EsbuildBundler::with_pinned_config(binary, &cache_root)?,
        None => EsbuildBundler::discover(&cache_root)?,
    };

    let compiler = NativeCompiler::from_path(&args.compiler)?;

    let pipeline = Pipeline::new(&storage, &bundler, &TypescriptBindings, &compiler);
    let request = BuildRequest {
        config: &config,
        signature_schema: &signature_schema,
        extension_schemas: &extension_schemas,
        source_dir: args.source_dir,
        package_manager: args.npm,
        release: args.release,
        target: args.target.into(),
    };

    let mut stdout = std::io::stdout();
    let artifact = pipeline.build(&request, &mut stdout)?;

    let encoded = bincode::serialize(&artifact).context("unable to encode artifact")?;
    fs::write(&args.output, encoded)
        .with_context(|| format!("unable to write artifact {}", args.output.display()))?;

    println!(
        "built {}:{} -> {} ({} bytes of bytecode)",
        artifact.name,
        artifact.tag,
        args.output.display(),
        artifact.function.len()
    );

    Ok(())
}

fn read_schema(path: &std::path::Path) -> anyhow::Result<Schema> {
    let bytes =
        fs::read(path).with_context(|| format!("unable to read schema {}", path.display()))?;
    Schema::from_bytes(&bytes)
        .with_context(|| format!("unable to parse schema {}", path.display()))
}
