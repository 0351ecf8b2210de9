use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use sougraph_cli::cli::{Cli, Commands};
use sougraph_cli::{fixtures, graph_ops, symbols};
use sougraph_config::{CONFIG_FILE_NAME, SougraphConfig, ensure_config, validate_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    run(Cli::parse())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CreateIndexes(args) => {
            let config = load_and_report(&args.config_dir)?;
            block_on(graph_ops::run_create_indexes(&config))
        }
        Commands::Link(args) => {
            let config = load_and_report(&args.config_dir)?;
            block_on(graph_ops::run_link(&config, args.repository_url))
        }
        Commands::Parse(args) => symbols::run_parse(&args),
        Commands::FqNames(args) => symbols::run_fq_names(&args),
        Commands::Truncate(args) => fixtures::run_truncate(&args),
    }
}

fn load_and_report(config_dir: &Path) -> Result<SougraphConfig> {
    let config = ensure_config(config_dir).with_context(|| {
        format!(
            "failed to load or create {}",
            config_dir.join(CONFIG_FILE_NAME).display()
        )
    })?;

    for warning in validate_config(&config) {
        eprintln!(
            "sougraph config warning [{}]: {}",
            warning.code, warning.message
        );
    }

    Ok(config)
}

fn block_on(future: impl Future<Output = Result<()>>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(future)
}
