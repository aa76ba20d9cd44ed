//! Response formatting
//!
//! Every response body is a JSON document, including errors.

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::{RouterError, INTERNAL_ERROR_MESSAGE};
use crate::logger;

pub const PREFLIGHT_MESSAGE: &str = "CORS preflight successful";

/// Outbound response in the gateway's shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    /// Parsed body, for callers that want to inspect it
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Build a JSON response, degrading to a plain 500 if `body` cannot be
/// serialized
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    mut headers: BTreeMap<String, String>,
) -> GatewayResponse {
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    match serde_json::to_string(body) {
        Ok(json) => GatewayResponse {
            status_code: status.as_u16(),
            headers,
            body: json,
        },
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            GatewayResponse {
                status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                headers,
                body: error_body(INTERNAL_ERROR_MESSAGE),
            }
        }
    }
}

pub fn success(result: &Value, headers: BTreeMap<String, String>) -> GatewayResponse {
    json_response(StatusCode::OK, result, headers)
}

pub fn error(err: &RouterError, headers: BTreeMap<String, String>) -> GatewayResponse {
    let body = serde_json::json!({ "error": err.client_message() });
    json_response(err.status_code(), &body, headers)
}

pub fn preflight(headers: BTreeMap<String, String>) -> GatewayResponse {
    let body = serde_json::json!({ "message": PREFLIGHT_MESSAGE });
    json_response(StatusCode::OK, &body, headers)
}

fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::error::HandlerError;
    use serde_json::json;

    #[test]
    fn test_success_body_is_handler_result() {
        let resp = success(&json!({"name": "Alice"}), BTreeMap::new());
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, r#"{"name":"Alice"}"#);
        assert_eq!(resp.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_unknown_operation_body() {
        let err = RouterError::UnknownOperation("deleteProfile".to_string());
        let resp = error(&err, BTreeMap::new());
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.body, r#"{"error":"Unknown operation: deleteProfile"}"#);
    }

    #[test]
    fn test_internal_error_body_is_generic() {
        let err = RouterError::from(HandlerError::internal("ConditionalCheckFailed on accounts"));
        let resp = error(&err, BTreeMap::new());
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body, r#"{"error":"Internal server error"}"#);
        assert!(!resp.body.contains("ConditionalCheckFailed"));
    }

    #[test]
    fn test_unauthorized_body() {
        let resp = error(&RouterError::Unauthorized, BTreeMap::new());
        assert_eq!(resp.status_code, 401);
        assert_eq!(resp.json(), Some(json!({"error": "Unauthorized"})));
    }

    #[test]
    fn test_serializes_camel_case() {
        let resp = preflight(BTreeMap::new());
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(
            value["body"],
            json!(r#"{"message":"CORS preflight successful"}"#)
        );
    }
}
