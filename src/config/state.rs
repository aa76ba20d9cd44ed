// Application state module
// Shared, read-only runtime state handed to every connection

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::types::Config;
use crate::router::Router;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Built once at startup; never replaced
    pub router: Arc<Router>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,

    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: &Config, router: Arc<Router>) -> Self {
        Self {
            config: config.clone(),
            router,
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
