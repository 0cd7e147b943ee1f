use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::http::connection::Connection;
use crate::server::ServerContext;

/// Hands one connection to an isolated worker.
///
/// The worker owns the socket and its `Request` outright; nothing it touches
/// is shared with other workers. A panic inside it is caught here and logged
/// so the acceptor keeps running. The returned handle resolves once the
/// connection is closed.
pub fn spawn_worker(
    stream: TcpStream,
    peer: SocketAddr,
    ctx: Arc<ServerContext>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let worker = tokio::spawn(Connection::new(stream, peer, ctx).run());

        match worker.await {
            Ok(status) => {
                tracing::trace!(%peer, status = status.as_u16(), "Worker finished");
            }
            Err(e) if e.is_panic() => {
                tracing::warn!(%peer, "Worker panicked: {}", e);
            }
            Err(e) => {
                tracing::warn!(%peer, "Worker cancelled: {}", e);
            }
        }
    })
}
