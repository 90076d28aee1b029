// src/main.rs - Run a simulated print through the status display controller
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use krusty_status::config::{self, Config, FileSettings, SettingsSource, StaticSettings};
use krusty_status::sim::{run_simulated_print, SimulatedHost};
use krusty_status::PrintSessionController;

/// Rotating print status messages for the printer display.
#[derive(Parser, Debug)]
#[command(name = "krusty-status", version, about)]
struct Cli {
    /// Path to a TOML config file; built-in defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every tick, not just lifecycle events
    #[arg(short, long)]
    verbose: bool,

    /// Simulate a printer without layer telemetry
    #[arg(long)]
    no_layers: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    tracing::info!("Starting Krusty status display");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let (config, settings): (Config, Arc<dyn SettingsSource>) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = config::load_config(path).map_err(|e| {
                tracing::error!("Failed to load config from '{}': {}", path.display(), e);
                Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
            })?;
            let settings: Arc<dyn SettingsSource> = Arc::new(FileSettings::new(path));
            (config, settings)
        }
        None => {
            let config = Config::default();
            let settings: Arc<dyn SettingsSource> = Arc::new(StaticSettings(config.status.clone()));
            (config, settings)
        }
    };

    let mut simulation = config.simulation.clone();
    if cli.no_layers {
        simulation.layer_info = false;
    }
    tracing::info!("Messages: {}", config.status.messages.len());
    tracing::info!("Update interval: {}s", config.status.time_to_change);
    tracing::info!("Layer telemetry: {}", if simulation.layer_info { "available" } else { "unavailable" });

    let host = Arc::new(SimulatedHost::new(simulation));
    let controller = PrintSessionController::new(host.clone(), settings);
    let (handle, task) = controller.spawn(16);

    run_simulated_print(host.clone(), &handle).await?;

    // Closing the last handle lets the controller drain and exit.
    drop(handle);
    task.await?;

    tracing::info!("Sent {} display commands", host.sent_commands().await.len());
    Ok(())
}
