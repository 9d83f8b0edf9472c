// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections until `state.shutdown` is notified.
///
/// Must run inside a `LocalSet`; connections are served with `spawn_local`.
/// In-flight connections keep running after the listener is dropped.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    let shutdown = Arc::clone(&state.shutdown);
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = shutdown.notified() => {
                logger::log_info("[Shutdown] Stop accepting new connections");
                break;
            }
        }
    }
    drop(listener);
    logger::log_server_stopped(state.active_connections());
}
