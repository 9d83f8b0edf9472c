// Connection handling module
// Accepts a single TCP connection and serves it on the local task set

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use crate::config::{AppState, ConnectionGuard};
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing `performance.max_connections`.
///
/// Rejected connections are dropped immediately without a response.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let Some(guard) = state.try_acquire_connection() else {
        let max = state.config.performance.max_connections.unwrap_or_default();
        logger::log_connection_rejected(&peer_addr, max);
        drop(stream);
        return;
    };

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), guard);
}

/// Serve one connection in a spawned local task.
///
/// Only the request head is bounded, by `performance.header_read_timeout`;
/// once a request is parsed its handler runs to completion. The guard
/// releases the connection slot when the task ends.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    guard: ConnectionGuard,
) {
    tokio::task::spawn_local(async move {
        let _guard = guard;
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(
                (performance.header_read_timeout > 0)
                    .then(|| Duration::from_secs(performance.header_read_timeout)),
            )
            .keep_alive(performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), Some(peer_addr))
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}
