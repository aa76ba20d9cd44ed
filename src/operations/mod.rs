//! Built-in operations and router assembly
//!
//! Business handlers are registered by the embedding application; this
//! module only contributes the `test` diagnostics operation.

pub mod diagnostics;

use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::cors::CorsPolicy;
use crate::router::{
    Data, HandlerError, HandlerRegistry, HandlerResult, LogicalMethod, RegistryBuilder,
    RegistryError, Router,
};

pub use diagnostics::Diagnostics;

pub const DIAGNOSTICS_OPERATION: &str = "test";

/// Registry builder pre-loaded with the built-in operations
pub fn default_registry(config: &Config) -> RegistryBuilder {
    let diagnostics = Arc::new(Diagnostics::new(&config.app, &config.tables));
    HandlerRegistry::builder().register(
        DIAGNOSTICS_OPERATION,
        move |data: Data, _method: LogicalMethod| {
            let diagnostics = Arc::clone(&diagnostics);
            async move { diagnostics.report_value(data) }
        },
    )
}

/// Serialize a handler's result; failures become internal errors so they
/// reach the error log and the caller sees a plain 500
pub fn to_handler_value<T: Serialize>(result: &T) -> HandlerResult {
    serde_json::to_value(result)
        .map_err(|e| HandlerError::internal(format!("Failed to serialize result: {e}")))
}

/// Router with the built-in operations and the configured CORS policy
pub fn build_router(config: &Config) -> Result<Router, RegistryError> {
    build_router_with(config, default_registry(config))
}

/// Router from a caller-extended registry
pub fn build_router_with(
    config: &Config,
    registry: RegistryBuilder,
) -> Result<Router, RegistryError> {
    let registry = registry.build()?;
    let cors = CorsPolicy::new(&config.cors, &config.app.environment);
    Ok(Router::new(registry, cors))
}
