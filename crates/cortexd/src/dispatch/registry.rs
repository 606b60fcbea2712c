//! Method name to handler bindings.
//!
//! The registry is assembled once through [`RegistryBuilder`] and is immutable
//! afterwards, so lookups from concurrent connections need no locking.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use cortexd_types::Request;

use super::errors::DispatchError;

/// Executes one request method.
///
/// Handlers receive everything they need through their own fields and the
/// request; they never reach into the registry.
pub trait Handler: Send + Sync {
    /// Runs the method and returns its result payload.
    fn execute(&self, request: &Request) -> Result<Value, DispatchError>;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Result<Value, DispatchError> + Send + Sync,
{
    fn execute(&self, request: &Request) -> Result<Value, DispatchError> {
        self(request)
    }
}

/// Errors raised while assembling a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The method name already has a handler.
    #[error("a handler is already registered for '{method}'")]
    Duplicate { method: String },
    /// The method name is empty or whitespace.
    #[error("handler method names must not be empty")]
    EmptyMethod,
}

/// Builder collecting handler bindings before the daemon serves requests.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl RegistryBuilder {
    /// Binds `handler` to `method`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if `method` is already bound and
    /// [`RegistryError::EmptyMethod`] if it is blank.
    pub fn register(
        &mut self,
        method: &str,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        let method = method.trim();
        if method.is_empty() {
            return Err(RegistryError::EmptyMethod);
        }
        if self.handlers.contains_key(method) {
            return Err(RegistryError::Duplicate {
                method: method.to_owned(),
            });
        }
        self.handlers.insert(method.to_owned(), Box::new(handler));
        Ok(self)
    }

    /// Freezes the bindings.
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

/// Immutable mapping from method name to handler.
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Starts an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the handler bound to `method`.
    pub fn get(&self, method: &str) -> Option<&dyn Handler> {
        self.handlers.get(method).map(Box::as_ref)
    }

    /// Returns `true` when `method` has a handler.
    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names in sorted order.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no method is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn constant(request: &Request) -> Result<Value, DispatchError> {
        Ok(json!({ "method": request.method() }))
    }

    #[test]
    fn registered_handlers_are_found() {
        let mut builder = HandlerRegistry::builder();
        builder.register("ping", constant).expect("register ping");
        let registry = builder.build();

        let handler = registry.get("ping").expect("ping is bound");
        let result = handler.execute(&Request::new("ping")).expect("execute");
        assert_eq!(result, json!({ "method": "ping" }));
        assert!(registry.get("pong").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut builder = HandlerRegistry::builder();
        builder.register("ping", constant).expect("first registration");
        let error = builder
            .register(" ping ", constant)
            .err()
            .expect("second registration must fail");
        assert_eq!(
            error,
            RegistryError::Duplicate {
                method: "ping".to_owned()
            }
        );
    }

    #[test]
    fn blank_method_is_rejected() {
        let mut builder = HandlerRegistry::builder();
        let error = builder.register("  ", constant).err().expect("blank name");
        assert_eq!(error, RegistryError::EmptyMethod);
        assert!(builder.build().is_empty());
    }

    #[test]
    fn methods_are_listed_in_order() {
        let mut builder = HandlerRegistry::builder();
        builder
            .register("version", constant)
            .and_then(|builder| builder.register("health", constant))
            .expect("register");
        let registry = builder.build();
        assert_eq!(registry.methods(), vec!["health", "version"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("health"));
    }
}
