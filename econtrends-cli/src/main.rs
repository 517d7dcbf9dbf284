//! econtrends CLI: run the series pipeline and inspect the registry.
//!
//! Commands:
//! - `run [START]` fetch every registry series, derive indicators, write CSVs
//! - `registry` print the validated series registry

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use econtrends_runner::{digest_artifacts, run_pipeline, ArtifactMap, PipelineConfig};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "econtrends",
    version,
    about = "Macroeconomic series pipeline for the Argentina Series API"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, transform, and persist every series, then print the artifacts.
    Run {
        /// Start date (YYYY-MM or YYYY-MM-DD). Defaults to the configured start.
        start: Option<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Root for relative output directories. Defaults to the working directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Fetch series one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Print the BLAKE3 digest of each artifact.
        #[arg(long, default_value_t = false)]
        digests: bool,
    },
    /// Print the series registry.
    Registry {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            start,
            config,
            out_dir,
            sequential,
            digests,
        } => run_cmd(start, config, out_dir, sequential, digests),
        Commands::Registry { config } => registry_cmd(config.as_deref()),
    }
}

/// Human-readable logs on stderr; stdout carries only the artifact listing.
fn init_logging(verbose: bool) {
    let default = if verbose { "econtrends=debug" } else { "econtrends=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn run_cmd(
    start: Option<String>,
    config_path: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    sequential: bool,
    digests: bool,
) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(root) = out_dir {
        config = config.with_output_root(&root);
    }
    if sequential {
        config.parallel_fetch = false;
    }
    debug!(?config, "resolved configuration");

    let outputs = run_pipeline(&config, start.as_deref()).context("pipeline run failed")?;
    print_artifacts(&outputs, digests)
}

fn print_artifacts(outputs: &ArtifactMap, digests: bool) -> Result<()> {
    if digests {
        for d in digest_artifacts(outputs)? {
            println!("{}\t{}\t{}", d.key, d.path.display(), d.blake3);
        }
    } else {
        for (key, path) in outputs.iter() {
            println!("{key}\t{}", path.display());
        }
    }
    Ok(())
}

fn registry_cmd(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let registry = config.registry()?;

    println!("{:<14} {:<30} {:<9} aggregation", "name", "id", "collapse");
    for spec in registry.iter() {
        let collapse = spec.collapse.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
        let aggregation = spec.aggregation.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        println!("{:<14} {:<30} {:<9} {}", spec.name, spec.id, collapse, aggregation);
    }
    Ok(())
}
