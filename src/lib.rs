//! Centralized operation router
//!
//! One HTTP endpoint receives every frontend call, names the backend
//! operation to run, and gets back a uniform JSON response with CORS headers.
//! [`router::Router`] is the gateway-independent core; [`server`] and
//! [`http`] put it behind a hyper listener.

pub mod config;
pub mod cors;
pub mod http;
pub mod logger;
pub mod operations;
pub mod router;
pub mod server;
