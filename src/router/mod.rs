//! Centralized operation router
//!
//! Every frontend call passes through [`Router::handle`]:
//! preflight check, then parse, dispatch and format, strictly in that order.
//! The router holds no per-request state; the registry is read-only.

pub mod dispatch;
pub mod error;
pub mod registry;
pub mod request;
pub mod response;

use std::collections::BTreeMap;
use std::time::Instant;

pub use error::{HandlerError, HandlerStatus, RouterError};
pub use registry::{Handler, HandlerRegistry, HandlerResult, RegistryBuilder, RegistryError};
pub use request::{parse_request, Data, GatewayRequest, LogicalMethod, OperationEnvelope};
pub use response::GatewayResponse;

use crate::cors::CorsPolicy;
use crate::logger;

pub struct Router {
    registry: HandlerRegistry,
    cors: CorsPolicy,
}

impl Router {
    pub const fn new(registry: HandlerRegistry, cors: CorsPolicy) -> Self {
        Self { registry, cors }
    }

    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Route one request. Never fails: every error becomes a JSON response.
    pub async fn handle(&self, request: GatewayRequest) -> GatewayResponse {
        let origin = request.header("origin");

        if request.is_preflight() {
            let headers = self
                .cors
                .preflight_headers(origin, request.header("access-control-request-headers"));
            return response::preflight(headers);
        }

        let headers = self.cors.response_headers(origin);
        let started = Instant::now();

        let envelope = match parse_request(&request) {
            Ok(envelope) => envelope,
            Err(err) => return self.reject_with(None, &err, headers),
        };

        let operation = envelope.operation.clone();
        let method = envelope.method;

        match dispatch::dispatch(envelope, &self.registry).await {
            Ok(result) => {
                let resp = response::success(&result, headers);
                logger::log_operation(
                    &operation,
                    method.as_str(),
                    resp.status_code,
                    elapsed_us(started),
                );
                resp
            }
            Err(err) => {
                let resp = self.reject_with(Some(&operation), &err, headers);
                logger::log_operation(
                    &operation,
                    method.as_str(),
                    resp.status_code,
                    elapsed_us(started),
                );
                resp
            }
        }
    }

    /// CORS headers a regular response to `request` would carry
    pub fn cors_headers(&self, request: &GatewayRequest) -> BTreeMap<String, String> {
        self.cors.response_headers(request.header("origin"))
    }

    /// Format an error raised outside the pipeline (e.g. by the gateway's
    /// authorization check) with the same body and CORS headers.
    pub fn reject(&self, request: &GatewayRequest, err: &RouterError) -> GatewayResponse {
        self.reject_with(None, err, self.cors_headers(request))
    }

    fn reject_with(
        &self,
        operation: Option<&str>,
        err: &RouterError,
        headers: BTreeMap<String, String>,
    ) -> GatewayResponse {
        if err.is_internal() {
            logger::log_error(&format!(
                "Operation '{}' failed: {err}",
                operation.unwrap_or("-")
            ));
        } else if operation.is_none() {
            logger::log_warning(&format!("Rejected request: {err}"));
        }
        response::error(err, headers)
    }
}

fn elapsed_us(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}
