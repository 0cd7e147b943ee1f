use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConcurrencyMode;
use crate::server::worker::spawn_worker;
use crate::server::ServerContext;

/// Binds the configured address and serves forever.
pub async fn run(ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    let addr = ctx.config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to listen on {addr}"))?;
    info!("Listening on {}", addr);

    serve(listener, ctx).await
}

/// Accepts connections on `listener` and hands each to a worker.
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    tracing::debug!(
        root = %ctx.root.display(),
        mime_types = %ctx.config.mime_types_path.display(),
        default_mime_type = %ctx.config.default_mime_type,
        mode = ?ctx.config.mode,
        "Server configuration"
    );

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let worker = spawn_worker(socket, peer, Arc::clone(&ctx));
        if ctx.config.mode == ConcurrencyMode::Single {
            if let Err(e) = worker.await {
                tracing::error!("Worker supervisor for {} failed: {}", peer, e);
            }
        }
    }
}
