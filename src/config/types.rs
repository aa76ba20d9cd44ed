// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub gateway: GatewayConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub tables: TablesConfig,
}

/// Deployment identity, injected explicitly rather than read from the host
/// environment at request time
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
    /// Deployment stage (dev, staging, prod)
    pub environment: String,
    pub region: String,
    /// Deployed function/build version
    pub version: String,
    pub api_version: String,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds before a keep-alive connection is gracefully closed; 0 disables keep-alive
    pub keep_alive_timeout: u64,
    /// Seconds allowed to receive a request head
    pub read_timeout: u64,
    /// Seconds an in-flight response may take once the connection is closing
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Gateway behaviour in front of the router
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    /// Path of the single routed endpoint
    pub endpoint_path: String,
    /// Reject requests without a bearer token before dispatch
    pub require_authorization: bool,
}

/// CORS configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    /// Headers allowed on preflight when the browser does not list any
    #[serde(default)]
    pub allow_headers: Option<String>,
    /// Preflight cache lifetime in seconds
    pub max_age: u64,
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Backing tables known to this deployment
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TablesConfig {
    /// Logical table key (e.g. `profiles`) to physical table name.
    /// Keys are case-insensitive; the config loader lower-cases them.
    #[serde(default)]
    pub names: HashMap<String, String>,
    /// Logical keys that must be configured; missing ones are reported by
    /// the `test` operation
    #[serde(default)]
    pub required: Vec<String>,
}
