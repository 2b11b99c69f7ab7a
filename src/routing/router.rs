//! Route table: exact (method, path) lookup.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use crate::error::Error;
use crate::routing::handler::Handler;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

/// Maps (method, path) pairs to handlers.
///
/// Mutable only before the server binds; the server freezes it behind an
/// `Arc`, after which lookups are lock-free and concurrent.
#[derive(Default)]
pub struct Router {
    routes: HashMap<RouteKey, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. Fails with [`Error::DuplicateRoute`] when the identical
    /// (method, path) pair is already registered.
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Result<(), Error> {
        let key = RouteKey {
            method,
            path: path.into(),
        };
        if self.routes.contains_key(&key) {
            return Err(Error::DuplicateRoute {
                method: key.method,
                path: key.path,
            });
        }
        tracing::debug!(method = %key.method, path = %key.path, "Route registered");
        self.routes.insert(key, Arc::new(handler));
        Ok(())
    }

    /// Fluent `GET` registration.
    pub fn get(mut self, path: impl Into<String>, handler: impl Handler + 'static) -> Result<Self, Error> {
        self.register(Method::GET, path, handler)?;
        Ok(self)
    }

    /// Fluent `POST` registration.
    pub fn post(mut self, path: impl Into<String>, handler: impl Handler + 'static) -> Result<Self, Error> {
        self.register(Method::POST, path, handler)?;
        Ok(self)
    }

    /// Look up the handler for an exact (method, path) pair.
    ///
    /// `None` means no match; the server answers with a fixed 404 and no
    /// cookies.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<Arc<dyn Handler>> {
        let key = RouteKey {
            method: method.clone(),
            path: path.to_string(),
        };
        self.routes.get(&key).cloned()
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
