//! Football statistics REST server

use anyhow::{Context, Result};
use clap::Parser;
use stats_gateway::logging::{initialize_logging, initialize_logging_with_config};
use stats_gateway::{build_service, create_routes, GatewayConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stats-server", version, about = "Football statistics REST API")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "STATS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = GatewayConfig::load(args.config.as_deref()).context("loading configuration")?;
    // RUST_LOG wins over the configured level
    if std::env::var_os("RUST_LOG").is_some() {
        initialize_logging()?;
    } else {
        initialize_logging_with_config(&config.logging)?;
    }

    info!("Starting StatsGateway v{}", stats_gateway::VERSION);

    let (service, store) = build_service(&config).await.context("opening stat store")?;
    let addr = config.server_addr()?;
    let routes = create_routes(service);

    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .with_context(|| format!("binding {addr}"))?;

    info!("Listening on http://{}", bound);
    server.await;

    store.close().await;
    info!("StatsGateway stopped");
    Ok(())
}
