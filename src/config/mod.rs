// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    AppConfig, Config, CorsConfig, GatewayConfig, HealthConfig, HttpConfig, LoggingConfig,
    PerformanceConfig, ServerConfig, TablesConfig,
};

/// Prefix for environment overrides, e.g. `ROUTER_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "ROUTER";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("tables.required"),
            )
            .set_default("app.name", "centralized-api")?
            .set_default("app.environment", "dev")?
            .set_default("app.region", "unknown")?
            .set_default("app.version", env!("CARGO_PKG_VERSION"))?
            .set_default("app.api_version", "1.0.0")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "centralized-api")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("gateway.endpoint_path", "/centralized")?
            .set_default("gateway.require_authorization", false)?
            .set_default("cors.allow_credentials", true)?
            .set_default("cors.max_age", 86400)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.gateway.endpoint_path, "/centralized");
        assert!(!cfg.gateway.require_authorization);
        assert_eq!(cfg.cors.max_age, 86400);
        assert!(cfg.health.enabled);
        assert_eq!(cfg.health.liveness_path, "/healthz");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.tables.names.is_empty());
        assert_eq!(cfg.get_socket_addr().unwrap().port(), cfg.server.port);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("router.toml")).unwrap();
        writeln!(
            file,
            r#"
[app]
environment = "prod"
region = "eu-west-2"

[server]
host = "0.0.0.0"
port = 9090

[cors]
allowed_origins = ["https://myai4.co.uk", "https://www.myai4.co.uk"]

[gateway]
require_authorization = true

[tables]
required = ["profiles", "watchlists"]

[tables.names]
profiles = "myai4-profiles"
"#
        )
        .unwrap();

        let path = dir.path().join("router");
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.app.environment, "prod");
        assert_eq!(cfg.app.region, "eu-west-2");
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
        assert!(cfg.gateway.require_authorization);
        assert_eq!(cfg.tables.required, vec!["profiles", "watchlists"]);
        assert_eq!(
            cfg.tables.names.get("profiles").map(String::as_str),
            Some("myai4-profiles")
        );
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("definitely-missing-config-file").unwrap();
        cfg.server.host = "not an address".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
