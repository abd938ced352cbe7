//! TrafficScope - Live service traffic topology viewer.
//!
//! Polls a traffic snapshot endpoint and draws the services of the platform
//! with their request and message flows.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use iced::application;

use trafficscope::{SnapshotSource, TrafficScope};
use trafficscope_common::{SnapshotClient, TrafficScopeConfig, init_tracing, load_config};

/// Live service traffic topology viewer.
#[derive(Parser, Debug)]
#[command(name = "trafficscope")]
#[command(about = "Visualize live service-to-service traffic", long_about = None)]
struct Args {
    /// Path to the configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot endpoint URL (overrides the configuration).
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Poll interval in milliseconds (overrides the configuration).
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Use simulated traffic instead of the endpoint.
    #[arg(long)]
    demo: bool,

    /// Log level (overrides the configuration).
    #[arg(long)]
    log_level: Option<String>,
}

/// `<config_dir>/trafficscope/config.json5`.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trafficscope").join("config.json5"))
}

/// Load the configuration and apply command-line overrides.
fn resolve_config(args: &Args) -> Result<(TrafficScopeConfig, Option<PathBuf>)> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => default_config_path().filter(|path| path.exists()),
    };

    let mut config: TrafficScopeConfig = match &path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => TrafficScopeConfig::default(),
    };

    if let Some(url) = &args.endpoint {
        config.endpoint.url = url.clone();
    }
    if let Some(interval_ms) = args.interval_ms {
        config.poll.interval_ms = interval_ms;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    config.validate().context("Invalid configuration")?;

    Ok((config, path))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, path) = resolve_config(&args)?;

    init_tracing(&config.logging).context("Failed to initialize tracing")?;

    let registry = Arc::new(config.layout.registry());

    tracing::info!(
        config = ?path,
        services = registry.len(),
        demo = args.demo,
        "Loaded configuration"
    );

    let source = if args.demo {
        SnapshotSource::demo(registry)
    } else {
        let client = SnapshotClient::new(&config.endpoint, registry)
            .context("Failed to create snapshot client")?;
        SnapshotSource::Remote(client)
    };

    let interval = config.poll.interval();
    let auto_refresh = config.poll.auto_refresh;

    // Run the Iced application
    application(
        move || TrafficScope::boot(source.clone(), interval, auto_refresh),
        TrafficScope::update,
        TrafficScope::view,
    )
    .title(TrafficScope::title)
    .subscription(TrafficScope::subscription)
    .theme(TrafficScope::theme)
    .run()
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
