//! HTTP response building module
//!
//! Builders for the responses the gateway produces on its own, outside the
//! router: health probes, unknown paths and oversized bodies. All bodies are
//! JSON so clients parse a single shape.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::router::GatewayResponse;

const FALLBACK_BODY: &str = r#"{"error":"Internal server error"}"#;

/// Build a JSON response with the given status and extra headers
pub fn build_json_response(
    status: u16,
    body: &Value,
    headers: &BTreeMap<String, String>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            fallback_response()
        })
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    build_json_response(200, &json!({ "status": status }), &BTreeMap::new())
}

/// Build 404 Not Found response carrying the caller's CORS headers
pub fn build_404_response(cors: &BTreeMap<String, String>) -> Response<Full<Bytes>> {
    build_json_response(404, &json!({ "error": "Not Found" }), cors)
}

/// Build 413 Payload Too Large response carrying the caller's CORS headers
pub fn build_413_response(cors: &BTreeMap<String, String>) -> Response<Full<Bytes>> {
    build_json_response(413, &json!({ "error": "Payload Too Large" }), cors)
}

/// Convert a router response into a hyper response
pub fn build_gateway_response(resp: GatewayResponse, server_name: &str) -> Response<Full<Bytes>> {
    let status = resp.status_code;
    let mut builder = Response::builder().status(status).header("Server", server_name);
    for (name, value) in &resp.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Full::new(Bytes::from(resp.body)))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            fallback_response()
        })
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from_static(FALLBACK_BODY.as_bytes())));
    *resp.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
