//! Gateway request handling
//!
//! Entry point for HTTP request processing: probe endpoints, path and size
//! checks, the bearer-token gate, then hand-off to the router.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::response;
use crate::config::AppState;
use crate::logger::{self, AccessLogEntry};
use crate::router::{GatewayRequest, RouterError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let entry = state
        .access_log_enabled()
        .then(|| access_entry(&req, peer_addr));

    let resp = route_request(req, &state).await;

    if let Some(mut entry) = entry {
        entry.status = resp.status().as_u16();
        entry.body_bytes = resp
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(resp)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<BoxError>,
{
    let config = &state.config;
    let path = req.uri().path();

    // Health check endpoints (highest priority, always fast)
    if config.health.enabled
        && (path == config.health.liveness_path || path == config.health.readiness_path)
    {
        return response::build_health_response("ok");
    }

    let is_endpoint = path == config.gateway.endpoint_path;
    let (parts, body) = req.into_parts();
    let mut request = to_gateway_request(&parts);
    // Gateway-level rejections stay readable to cross-origin callers
    let cors = state.router.cors_headers(&request);

    if !is_endpoint {
        return response::build_404_response(&cors);
    }

    if let Some(resp) = check_body_size(&parts.headers, config.http.max_body_size, &cors) {
        return resp;
    }

    logger::log_headers_count(parts.headers.len(), config.logging.show_headers);

    let server_name = config.http.server_name.as_str();

    if config.gateway.require_authorization
        && parts.method != Method::OPTIONS
        && !has_bearer_token(&request)
    {
        let resp = state.router.reject(&request, &RouterError::Unauthorized);
        return response::build_gateway_response(resp, server_name);
    }

    let limit = usize::try_from(config.http.max_body_size).unwrap_or(usize::MAX);
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large (max: {})",
                config.http.max_body_size
            ));
            return response::build_413_response(&cors);
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            let err = RouterError::parse("Failed to read request body");
            return response::build_gateway_response(
                state.router.reject(&request, &err),
                server_name,
            );
        }
    };

    if !bytes.is_empty() {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => request.body = Some(text),
            Err(_) => {
                let err = RouterError::parse("Request body must be valid UTF-8");
                return response::build_gateway_response(
                    state.router.reject(&request, &err),
                    server_name,
                );
            }
        }
    }

    let resp = state.router.handle(request).await;
    response::build_gateway_response(resp, server_name)
}

/// Translate the request line and headers; the body is attached later
pub fn to_gateway_request(parts: &Parts) -> GatewayRequest {
    let query_string_parameters = parts.uri.query().map(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect::<HashMap<String, String>>()
    });

    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in &parts.headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    GatewayRequest {
        http_method: parts.method.as_str().to_string(),
        query_string_parameters,
        headers: Some(headers),
        body: None,
    }
}

/// `Authorization: Bearer <token>` with a non-empty token
fn has_bearer_token(request: &GatewayRequest) -> bool {
    request
        .header("authorization")
        .and_then(|value| value.trim().split_once(' '))
        .is_some_and(|(scheme, token)| {
            scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty()
        })
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    headers: &HeaderMap,
    max_body_size: u64,
    cors: &BTreeMap<String, String>,
) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(response::build_413_response(cors))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::operations;
    use serde_json::{json, Value};

    fn state_with(adjust: impl FnOnce(&mut Config)) -> Arc<AppState> {
        let mut config = Config::load_from("definitely-missing-config-file").unwrap();
        config.logging.access_log = false;
        config.cors.allowed_origins = vec!["https://app.example.com".to_string()];
        adjust(&mut config);
        let router = operations::build_router(&config).unwrap();
        Arc::new(AppState::new(&config, Arc::new(router)))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(
        state: &Arc<AppState>,
        req: Request<Full<Bytes>>,
    ) -> (u16, hyper::HeaderMap, Value) {
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Full<Bytes>> {
        Request::get(uri).body(Full::new(Bytes::new())).unwrap()
    }

    fn post(body: &'static [u8]) -> Request<Full<Bytes>> {
        Request::post("/centralized")
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from_static(body)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_with_encoded_data() {
        let state = state_with(|_| {});
        let (status, headers, body) = send(
            &state,
            get("/centralized?operation=test&data=%7B%22userId%22%3A%22abc%22%7D"),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data_received"], json!({"userId": "abc"}));
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["server"], "centralized-api");
    }

    #[tokio::test]
    async fn test_post_unknown_operation() {
        let state = state_with(|_| {});
        let (status, _, body) = send(&state, post(br#"{"operation":"nope","data":{}}"#)).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "Unknown operation: nope"}));
    }

    #[tokio::test]
    async fn test_health_and_unknown_path() {
        let state = state_with(|_| {});
        let (status, _, body) = send(&state, get("/healthz")).await;
        assert_eq!((status, body), (200, json!({"status": "ok"})));
        let (status, _, body) = send(&state, get("/readyz")).await;
        assert_eq!((status, body), (200, json!({"status": "ok"})));
        let (status, _, body) = send(&state, get("/elsewhere")).await;
        assert_eq!((status, body), (404, json!({"error": "Not Found"})));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let state = state_with(|c| c.http.max_body_size = 16);
        let declared = Request::post("/centralized")
            .header("Content-Length", "1024")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        assert_eq!(send(&state, declared).await.0, 413);

        let (status, _, body) =
            send(&state, post(br#"{"operation":"test","data":{"padding":"xxxxxxxx"}}"#)).await;
        assert_eq!(status, 413);
        assert_eq!(body, json!({"error": "Payload Too Large"}));
    }

    #[tokio::test]
    async fn test_gateway_rejections_carry_cors() {
        let state = state_with(|c| c.http.max_body_size = 16);
        let declared = Request::post("/centralized")
            .header("Origin", "https://app.example.com")
            .header("Content-Length", "1024")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let (status, headers, _) = send(&state, declared).await;
        assert_eq!(status, 413);
        assert_eq!(
            headers["access-control-allow-origin"],
            "https://app.example.com"
        );

        let streamed = Request::post("/centralized")
            .header("Origin", "https://app.example.com")
            .body(Full::new(Bytes::from_static(
                br#"{"operation":"test","data":{"padding":"xxxxxxxx"}}"#,
            )))
            .unwrap();
        let (status, headers, _) = send(&state, streamed).await;
        assert_eq!(status, 413);
        assert_eq!(headers["access-control-allow-credentials"], "true");

        let elsewhere = Request::get("/elsewhere")
            .header("Origin", "https://app.example.com")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = send(&state, elsewhere).await;
        assert_eq!(status, 404);
        assert_eq!(
            headers["access-control-allow-origin"],
            "https://app.example.com"
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_body() {
        let state = state_with(|_| {});
        let (status, _, body) = send(&state, post(&[0x7b, 0xff, 0xfe, 0x7d])).await;
        assert_eq!(status, 400);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_authorization_gate() {
        let state = state_with(|c| c.gateway.require_authorization = true);

        let (status, headers, body) = send(
            &state,
            Request::post("/centralized")
                .header("Origin", "https://app.example.com")
                .body(Full::new(Bytes::from_static(br#"{"operation":"test"}"#)))
                .unwrap(),
        )
        .await;
        assert_eq!(status, 401);
        assert_eq!(body, json!({"error": "Unauthorized"}));
        assert_eq!(
            headers["access-control-allow-origin"],
            "https://app.example.com"
        );

        let authorized = Request::post("/centralized")
            .header("Authorization", "Bearer eyJhbGciOi")
            .body(Full::new(Bytes::from_static(br#"{"operation":"test"}"#)))
            .unwrap();
        assert_eq!(send(&state, authorized).await.0, 200);

        let empty_token = Request::post("/centralized")
            .header("Authorization", "Bearer ")
            .body(Full::new(Bytes::from_static(br#"{"operation":"test"}"#)))
            .unwrap();
        assert_eq!(send(&state, empty_token).await.0, 401);
    }

    #[tokio::test]
    async fn test_preflight_skips_authorization() {
        let state = state_with(|c| c.gateway.require_authorization = true);
        let req = Request::options("/centralized")
            .header("Origin", "https://app.example.com")
            .header("Access-Control-Request-Method", "POST")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = send(&state, req).await;
        assert_eq!(status, 200);
        assert!(headers.contains_key("access-control-max-age"));
    }

    #[test]
    fn test_to_gateway_request() {
        let (parts, ()) = Request::get("/centralized?operation=getMovies&data=%7B%7D&q=a+b")
            .header("X-Trace", "1")
            .header("Accept", "text/html")
            .header("Accept", "application/json")
            .body(())
            .unwrap()
            .into_parts();
        let request = to_gateway_request(&parts);
        let query = request.query_string_parameters.as_ref().unwrap();
        assert_eq!(request.http_method, "GET");
        assert_eq!(query["operation"], "getMovies");
        assert_eq!(query["data"], "{}");
        assert_eq!(query["q"], "a b");
        assert_eq!(request.header("x-trace"), Some("1"));
        assert_eq!(request.header("accept"), Some("text/html, application/json"));
    }
}
