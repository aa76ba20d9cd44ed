// Connection handling module
// Accepts and serves a single TCP connection

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppState, PerformanceConfig};
use crate::http;
use crate::logger;

/// Accept a connection, enforcing `performance.max_connections`.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_connection_rejected(&peer_addr, max_conn);
            drop(stream);
            return;
        }
    }

    if state.access_log_enabled() {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Timeouts applied to one connection, derived from `[performance]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTimeouts {
    /// Time allowed to receive a complete request head
    pub header_read: Duration,
    /// Age at which the connection stops taking new requests
    pub lifetime: Duration,
    /// Grace period for an in-flight response once `lifetime` is reached
    pub drain: Duration,
    pub keep_alive: bool,
}

impl ConnectionTimeouts {
    /// `keep_alive_timeout = 0` turns keep-alive off; the single request then
    /// gets `read_timeout + write_timeout` before the drain starts.
    pub fn from_config(performance: &PerformanceConfig) -> Self {
        let keep_alive = performance.keep_alive_timeout > 0;
        let lifetime = if keep_alive {
            performance.keep_alive_timeout
        } else {
            performance
                .read_timeout
                .saturating_add(performance.write_timeout)
        };
        Self {
            header_read: Duration::from_secs(performance.read_timeout),
            lifetime: Duration::from_secs(lifetime),
            drain: Duration::from_secs(performance.write_timeout),
            keep_alive,
        }
    }
}

/// Serve one HTTP/1.1 connection in a spawned task. Once the connection
/// reaches its lifetime it is shut down gracefully: the in-flight response
/// gets the drain period, then the socket is dropped. The connection counter
/// is released on exit.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeouts = ConnectionTimeouts::from_config(&state.config.performance);

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(timeouts.header_read)
            .keep_alive(timeouts.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                http::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );
        tokio::pin!(conn);

        let result = tokio::select! {
            result = conn.as_mut() => Some(result),
            () = tokio::time::sleep(timeouts.lifetime) => {
                conn.as_mut().graceful_shutdown();
                tokio::time::timeout(timeouts.drain, conn.as_mut()).await.ok()
            }
        };

        match result {
            Some(Ok(())) => {}
            Some(Err(err)) => logger::log_connection_error(&err),
            None => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} dropped: response not finished {} seconds after shutdown",
                    timeouts.drain.as_secs()
                ));
            }
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}
