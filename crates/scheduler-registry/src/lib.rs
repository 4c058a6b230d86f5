//! The task registry (spec.md §4.3): sync and async handler tables, populated once at
//! startup and frozen for the lifetime of the server.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use scheduler_types::ArgValue;
use thiserror::Error;

/// A synchronous handler: runs to completion on the calling task and returns its
/// rendered result directly.
pub type SyncHandlerFn = dyn Fn(Vec<ArgValue>) -> String + Send + Sync;

/// An asynchronous handler: returns a boxed future so the registry can store handlers
/// of differing concrete future types behind one table.
pub type AsyncHandlerFn = dyn Fn(Vec<ArgValue>) -> BoxFuture<'static, String> + Send + Sync;

/// What kind of handler a method is registered as. Used by the execution core to
/// reject a submission whose `is_async` flag doesn't match the registered kind
/// (spec.md §7, "method kind mismatch").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Sync,
    Async,
}

/// A registered method handler.
#[derive(Clone)]
pub enum Handler {
    Sync(Arc<SyncHandlerFn>),
    Async(Arc<AsyncHandlerFn>),
}

impl Handler {
    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Sync(_) => HandlerKind::Sync,
            Handler::Async(_) => HandlerKind::Async,
        }
    }
}

impl core::fmt::Debug for Handler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Handler::Sync(_) => f.write_str("Handler::Sync(..)"),
            Handler::Async(_) => f.write_str("Handler::Async(..)"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("method `{0}` is already registered")]
    AlreadyRegistered(String),
}

/// Builds a frozen [`Registry`]. Keys are unique across the sync and async tables
/// taken together: registering `"add"` as sync and then again as async is rejected,
/// the same as registering it twice as sync.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Handler>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_sync<F>(&mut self, name: impl Into<String>, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(Vec<ArgValue>) -> String + Send + Sync + 'static,
    {
        self.insert(name.into(), Handler::Sync(Arc::new(handler)))
    }

    pub fn register_async<F, Fut>(&mut self, name: impl Into<String>, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(Vec<ArgValue>) -> Fut + Send + Sync + 'static,
        Fut: core::future::Future<Output = String> + Send + 'static,
    {
        let handler = move |args: Vec<ArgValue>| -> BoxFuture<'static, String> { Box::pin(handler(args)) };
        self.insert(name.into(), Handler::Async(Arc::new(handler)))
    }

    fn insert(&mut self, name: String, handler: Handler) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    pub fn build(self) -> Registry {
        Registry { handlers: Arc::new(self.handlers) }
    }
}

/// The frozen set of registered handlers. Cheap to clone; every clone shares the same
/// underlying table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    handlers: Arc<HashMap<String, Handler>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a method by name. Returns `None` when no handler of either kind is
    /// registered under this name ("method not found" in the execution core).
    pub fn lookup(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
