//! Caldera CLI - build sandboxed-bytecode functions.

mod build;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caldera")]
#[command(about = "Build sandboxed-bytecode functions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a function into a bytecode artifact
    Build {
        /// Directory containing the function source
        #[arg(long, default_value = ".")]
        source_dir: PathBuf,

        /// Path to the function config (defaults to <source-dir>/caldera.json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the signature schema document
        #[arg(long)]
        signature_schema: PathBuf,

        /// Extension schema documents, in declaration order
        #[arg(long = "extension-schema")]
        extension_schemas: Vec<PathBuf>,

        /// Path to the native bytecode compiler executable
        #[arg(long)]
        compiler: PathBuf,

        /// Output path for the artifact
        #[arg(short, long)]
        output: PathBuf,

        /// Build target
        #[arg(long, default_value = "host")]
        target: build::TargetArg,

        /// Build with optimizations
        #[arg(long)]
        release: bool,

        /// Explicit path to the package manager binary
        #[arg(long)]
        npm: Option<PathBuf>,

        /// Explicit path to the esbuild binary
        #[arg(long)]
        esbuild: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Surface recovery hints for core errors at the edge.
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<caldera_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Build {
            source_dir,
            config,
            signature_schema,
            extension_schemas,
            compiler,
            output,
            target,
            release,
            npm,
            esbuild,
        } => build::execute(build::BuildArgs {
            source_dir,
            config,
            signature_schema,
            extension_schemas,
            compiler,
            output,
            target,
            release,
            npm,
            esbuild,
        })
        .map_err(format_error)?,
    }

    Ok(())
}
