//! CORS policy
//!
//! Resolves which origin to allow for a request and builds the
//! `Access-Control-*` headers for regular and preflight responses.

use std::collections::BTreeMap;
use url::{Host, Url};

use crate::config::CorsConfig;

const DEFAULT_ALLOW_HEADERS: &str = "Content-Type,Authorization";
const DEFAULT_ALLOW_METHODS: &str = "GET,POST,OPTIONS";
const PREFLIGHT_ALLOW_METHODS: &str = "OPTIONS,GET,POST";
const DEFAULT_PREFLIGHT_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,X-CSRF-Token,X-Requested-With";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    allow_credentials: bool,
    allow_headers: String,
    max_age: u64,
    development: bool,
}

/// Origin decision for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    /// Request origin is allowed and echoed back
    Echo(String),
    /// Request origin unknown or absent, fall back to a configured origin
    Fallback(String),
    Any,
}

impl AllowedOrigin {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Echo(o) | Self::Fallback(o) => o,
            Self::Any => "*",
        }
    }
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig, environment: &str) -> Self {
        Self {
            allowed_origins: config
                .allowed_origins
                .iter()
                .map(|o| o.trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            allow_credentials: config.allow_credentials,
            allow_headers: config
                .allow_headers
                .clone()
                .unwrap_or_else(|| DEFAULT_PREFLIGHT_HEADERS.to_string()),
            max_age: config.max_age,
            development: matches!(
                environment.to_ascii_lowercase().as_str(),
                "dev" | "development"
            ),
        }
    }

    /// Whether `origin` may receive credentialed responses
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if origin.is_empty() {
            return false;
        }
        if self.development && is_loopback_origin(origin) {
            return true;
        }
        let origin = origin.trim_end_matches('/');
        self.allowed_origins.iter().any(|o| o == origin)
    }

    pub fn resolve(&self, origin: Option<&str>) -> AllowedOrigin {
        if let Some(origin) = origin.filter(|o| self.is_origin_allowed(o)) {
            return AllowedOrigin::Echo(origin.to_string());
        }
        self.allowed_origins
            .first()
            .map_or(AllowedOrigin::Any, |o| AllowedOrigin::Fallback(o.clone()))
    }

    /// Headers attached to every routed response
    pub fn response_headers(&self, origin: Option<&str>) -> BTreeMap<String, String> {
        let allowed = self.resolve(origin);
        let mut headers = self.origin_headers(&allowed);
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            DEFAULT_ALLOW_HEADERS.to_string(),
        );
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            DEFAULT_ALLOW_METHODS.to_string(),
        );
        headers
    }

    /// Headers for an OPTIONS preflight answer
    pub fn preflight_headers(
        &self,
        origin: Option<&str>,
        requested_headers: Option<&str>,
    ) -> BTreeMap<String, String> {
        let allowed = self.resolve(origin);
        let mut headers = self.origin_headers(&allowed);
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            requested_headers
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(self.allow_headers.as_str())
                .to_string(),
        );
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            PREFLIGHT_ALLOW_METHODS.to_string(),
        );
        headers.insert(
            "Access-Control-Max-Age".to_string(),
            self.max_age.to_string(),
        );
        headers.insert("Cache-Control".to_string(), "no-cache".to_string());
        headers
    }

    fn origin_headers(&self, allowed: &AllowedOrigin) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            allowed.as_str().to_string(),
        );
        if !matches!(allowed, AllowedOrigin::Any) {
            headers.insert("Vary".to_string(), "Origin".to_string());
            if self.allow_credentials {
                headers.insert(
                    "Access-Control-Allow-Credentials".to_string(),
                    "true".to_string(),
                );
            }
        }
        headers
    }
}

/// Origin host is exactly `localhost` or a loopback address
fn is_loopback_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
