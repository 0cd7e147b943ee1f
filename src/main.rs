use std::sync::Arc;

use clap::Parser;
use spidey::config::{Cli, Config};
use spidey::server::{self, ServerContext};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;
    let ctx = Arc::new(ServerContext::new(cfg)?);

    tokio::select! {
        res = server::listener::run(ctx) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
