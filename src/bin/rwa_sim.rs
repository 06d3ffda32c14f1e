use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rwa::runtime::config::{load_experiment_config, parse_routing};
use rwa::runtime::simulation::run_experiment;
use rwa::rwa::PathEnumerator;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rwa_sim")]
#[command(about = "Blocking-probability simulation for routing and wavelength assignment")]
struct Args {
    #[arg(long)]
    config: PathBuf,
    #[arg(long, default_value = "INFO")]
    log_level: String,
    #[arg(long)]
    strategy: Option<String>,
    #[arg(long)]
    k_paths: Option<usize>,
    #[arg(long)]
    calls: Option<usize>,
    #[arg(long)]
    output_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let mut cfg = load_experiment_config(&args.config)?;
    let configured_k = match cfg.routing {
        PathEnumerator::FixedAlternate { k_paths } => k_paths,
        PathEnumerator::FixedPath => 2,
    };
    let k_paths = args.k_paths.unwrap_or(configured_k);
    cfg.routing = match args.strategy.as_deref() {
        Some(strategy) => parse_routing(strategy, k_paths)?,
        None => match cfg.routing {
            PathEnumerator::FixedAlternate { .. } => PathEnumerator::FixedAlternate { k_paths },
            PathEnumerator::FixedPath => PathEnumerator::FixedPath,
        },
    };
    if let Some(calls) = args.calls {
        anyhow::ensure!(calls > 0, "--calls must be positive");
        cfg.simulation.calls = calls;
    }

    let report = run_experiment(&cfg)?;
    let rendered = serde_json::to_string_pretty(&report)?;
    println!("{rendered}");

    if let Some(path) = args.output_json {
        fs::write(&path, rendered)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}
