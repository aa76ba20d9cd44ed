//! Operation dispatch
//!
//! Looks up the envelope's operation and awaits its handler. The handler runs
//! on its own task so a panic comes back as a `JoinError` instead of tearing
//! down the connection that carried the request.

use serde_json::Value;

use super::error::RouterError;
use super::registry::HandlerRegistry;
use super::request::OperationEnvelope;

pub async fn dispatch(
    envelope: OperationEnvelope,
    registry: &HandlerRegistry,
) -> Result<Value, RouterError> {
    let OperationEnvelope {
        operation,
        data,
        method,
    } = envelope;

    let Some(handler) = registry.get(&operation) else {
        return Err(RouterError::UnknownOperation(operation));
    };

    match tokio::spawn(handler.call(data, method)).await {
        Ok(result) => result.map_err(RouterError::from),
        Err(join_err) => Err(RouterError::UnhandledFault {
            operation,
            detail: panic_detail(join_err),
        }),
    }
}

fn panic_detail(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
