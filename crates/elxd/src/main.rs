//! elxd - Electrolux appliance exporter
//!
//! Polls the Electrolux cloud API on every scrape and serves the appliance
//! state as Prometheus metrics.

use anyhow::Result;
use clap::Parser;
use elxd::api::OcpClient;
use elxd::cli::Cli;
use elxd::collector::Collector;
use elxd::config::Config;
use elxd::exposition::Exposition;
use elxd::server::{self, AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.init_config {
        Config::save_default(&cli.config)?;
        return Ok(());
    }

    info!("elxd v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;
    cli.apply(&mut config);

    let client = OcpClient::new(config.ocp_config()?)?;
    let options = config.collector_options();
    info!(
        molecular_weight = options.molecular_weight,
        device_type = %options.device_type,
        fan_speed_models = options.fan_speeds.len(),
        "Collector configured"
    );

    let shutdown = CancellationToken::new();
    let collector = Arc::new(Collector::with_shutdown(
        Arc::new(client),
        options,
        shutdown.child_token(),
    ));
    let exposition = Exposition::new(collector.describe())?;
    let state = AppState::new(Arc::clone(&collector), exposition);

    tokio::spawn(wait_for_signal(shutdown.clone()));

    server::run(state, &config.server.listen_addr, shutdown).await?;
    collector.close();

    info!("Shutting down");
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Interrupt received, shutting down");
    shutdown.cancel();
}
