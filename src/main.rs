use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

use netspeed_watcher::cli::{Cli, CommandHandler, Dashboard, commands::Commands};
use netspeed_watcher::collectors::{SystemCatalog, ThroughputEngine};
use netspeed_watcher::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    debug!("Resolved settings: {:?}", settings);

    let engine = Arc::new(ThroughputEngine::with_components(
        Arc::new(SystemCatalog::new()),
        settings.selector(),
        settings.sampler(),
    ));
    let handler = CommandHandler::new(engine.clone());

    match cli.command {
        Commands::Live { unit, interval } => {
            let interval = resolve_interval(interval, &settings)?;
            let mut dashboard = Dashboard::new(engine, interval, unit.unwrap_or(settings.unit));
            dashboard.run().await?;
        }
        Commands::Watch { unit, interval, count, json } => {
            let interval = resolve_interval(interval, &settings)?;
            handler
                .handle_watch(unit.unwrap_or(settings.unit), interval, count, json)
                .await?;
        }
        Commands::Adapters { json } => {
            handler.handle_adapters(json).await?;
        }
    }

    Ok(())
}

/// Command-line interval wins over the settings file
fn resolve_interval(flag: Option<u64>, settings: &Settings) -> Result<Duration> {
    match flag {
        Some(0) => anyhow::bail!("--interval must be at least 1 second"),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(settings.interval()),
    }
}
