//! Handler registry
//!
//! Maps operation names to handlers. Built once at startup, read-only after.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use super::error::HandlerError;
use super::request::{Data, LogicalMethod};

pub type HandlerResult = Result<Value, HandlerError>;
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// One unit of backend business logic.
///
/// Implemented for any `Fn(Data, LogicalMethod) -> impl Future` closure.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, data: Data, method: LogicalMethod) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Data, LogicalMethod) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, data: Data, method: LogicalMethod) -> HandlerFuture {
        Box::pin(self(data, method))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("operation name must not be empty")]
    EmptyName,
    #[error("operation '{0}' registered more than once")]
    Duplicate(String),
}

/// Immutable operation table
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, operation: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(operation).cloned()
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.handlers.contains_key(operation)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered operation names, sorted
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("operations", &self.operations())
            .finish()
    }
}

/// Collects registrations and validates them in [`RegistryBuilder::build`]
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<(String, Arc<dyn Handler>)>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn register(mut self, operation: impl Into<String>, handler: impl Handler) -> Self {
        self.entries.push((operation.into(), Arc::new(handler)));
        self
    }

    pub fn build(self) -> Result<HandlerRegistry, RegistryError> {
        let mut handlers = HashMap::with_capacity(self.entries.len());
        for (name, handler) in self.entries {
            if name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if handlers.contains_key(&name) {
                return Err(RegistryError::Duplicate(name));
            }
            handlers.insert(name, handler);
        }
        Ok(HandlerRegistry { handlers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn ok_handler(_data: Data, _method: LogicalMethod) -> HandlerResult {
        Ok(json!({"ok": true}))
    }

    #[test]
    fn test_build_registry() {
        let registry = HandlerRegistry::builder()
            .register("getMovies", ok_handler)
            .register("getWatchlist", ok_handler)
            .build()
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("getMovies"));
        assert!(!registry.contains("getmovies"));
        assert_eq!(registry.operations(), vec!["getMovies", "getWatchlist"]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let result = HandlerRegistry::builder()
            .register("getMovies", ok_handler)
            .register("getMovies", ok_handler)
            .build();
        assert_eq!(
            result.unwrap_err(),
            RegistryError::Duplicate("getMovies".to_string())
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = HandlerRegistry::builder().register("", ok_handler).build();
        assert_eq!(result.unwrap_err(), RegistryError::EmptyName);
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let registry = HandlerRegistry::builder()
            .register("echo", |data: Data, method: LogicalMethod| async move {
                Ok::<_, HandlerError>(json!({"data": data, "method": method}))
            })
            .build()
            .unwrap();
        let handler = registry.get("echo").unwrap();
        let mut data = Data::new();
        data.insert("k".to_string(), json!("v"));
        let result = handler.call(data, LogicalMethod::Patch).await.unwrap();
        assert_eq!(result, json!({"data": {"k": "v"}, "method": "PATCH"}));
    }
}
