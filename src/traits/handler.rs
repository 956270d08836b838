// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Operation handlers and the table the executor dispatches through.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BoxError;

/// An asynchronous operation invoked with a node's resolved arguments.
///
/// The executor treats handlers as opaque: it calls `call` at most once per
/// version of a node's resolved input and hands back whatever it returns.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError>;
}

/// Adapts an async closure into an [`OperationHandler`].
///
/// ```rust
/// use graph_executor::errors::BoxError;
/// use graph_executor::traits::{FnHandler, OperationHandler};
/// use serde_json::{json, Value};
///
/// # #[tokio::main]
/// # async fn main() {
/// let double = FnHandler::new(|args: Vec<Value>| async move {
///     let value = args[0].as_i64().ok_or("expected an integer")?;
///     Ok::<Value, BoxError>(json!(value * 2))
/// });
///
/// assert_eq!(double.call(vec![json!(21)]).await.unwrap(), json!(42));
/// # }
/// ```
pub struct FnHandler<F> {
    function: F,
}

impl<F> FnHandler<F> {
    pub fn new(function: F) -> Self {
        Self { function }
    }
}

#[async_trait]
impl<F, Fut> OperationHandler for FnHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        (self.function)(arguments).await
    }
}

/// Newtype wrapper mapping operation names to handlers.
#[derive(Clone, Default)]
pub struct HandlerTable(HashMap<String, Arc<dyn OperationHandler>>);

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `operation`, replacing any previous one.
    pub fn insert(&mut self, operation: impl Into<String>, handler: Arc<dyn OperationHandler>) {
        self.0.insert(operation.into(), handler);
    }

    /// Register an async closure under `operation`.
    pub fn register_fn<F, Fut>(&mut self, operation: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        self.insert(operation, Arc::new(FnHandler::new(function)));
        self
    }

    pub fn get(&self, operation: &str) -> Option<&Arc<dyn OperationHandler>> {
        self.0.get(operation)
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.0.contains_key(operation)
    }

    pub fn operations(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut operations: Vec<&String> = self.0.keys().collect();
        operations.sort();
        f.debug_struct("HandlerTable")
            .field("handler_count", &self.0.len())
            .field("operations", &operations)
            .finish()
    }
}

impl From<HashMap<String, Arc<dyn OperationHandler>>> for HandlerTable {
    fn from(map: HashMap<String, Arc<dyn OperationHandler>>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Arc<dyn OperationHandler>)> for HandlerTable {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn OperationHandler>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
