// Server module entry point
// Binds the listener and runs the accept loop until shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;

use crate::config::{AppState, Config};
use crate::logger;
use crate::router::Router;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use server_loop::run_server_loop;

/// Serve `router` on the configured address until SIGINT/SIGTERM
pub async fn serve(config: &Config, router: Arc<Router>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;

    logger::log_server_start(&addr, config, &router.registry().operations());

    let state = Arc::new(AppState::new(config, router));
    run_server_loop(listener, state, signal::shutdown_signal()).await;
    Ok(())
}
