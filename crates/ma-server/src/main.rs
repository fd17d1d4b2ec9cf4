//! Mobile Alerts sensor host
//!
//! Loads configuration.yaml, sets up the `mobilealerts` sensors and keeps
//! their states current until interrupted.

mod host;

use anyhow::Result;
use clap::Parser;
use ma_config::Configuration;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::host::Host;

#[derive(Parser, Debug)]
#[command(name = "mobilealerts")]
#[command(about = "Mobile Alerts weather history sensors", long_about = None)]
struct Cli {
    /// Directory holding configuration.yaml and secrets.yaml
    #[arg(short, long, default_value = ".")]
    config: PathBuf,

    /// JSON list of entity states to load before setup (e.g. weather entities)
    #[arg(short, long)]
    states: Option<PathBuf>,

    /// Seconds between update passes
    #[arg(long, default_value_t = 30)]
    scan_interval: u64,

    /// Run a single update pass, print the sensor states as JSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Starting Mobile Alerts sensor host");

    let config = Configuration::load(&cli.config)?;
    info!(
        "Loaded {} with time zone {}",
        config.core.name, config.core.time_zone
    );

    let mut host = Host::new();
    if let Some(path) = &cli.states {
        host.seed_states(path)?;
    }
    host.setup(&config).await?;

    if cli.once {
        host.update_all().await;
        println!("{}", serde_json::to_string_pretty(&host.sensor_states())?);
        return Ok(());
    }

    let period = Duration::from_secs(cli.scan_interval.max(1));
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    info!("Mobile Alerts host is running");

    loop {
        tokio::select! {
            _ = interval.tick() => host.update_all().await,
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}
