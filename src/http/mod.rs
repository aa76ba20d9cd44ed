//! HTTP gateway layer
//!
//! Stands in for the managed API gateway: translates hyper requests into
//! [`GatewayRequest`](crate::router::GatewayRequest)s for the router and
//! serves the probe endpoints.

pub mod gateway;
pub mod response;

// Re-export main entry point
pub use gateway::handle_request;
pub use response::{build_404_response, build_413_response, build_health_response};
