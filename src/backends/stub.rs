// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Handlers for exercising the executor in tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::errors::BoxError;
use crate::traits::{HandlerTable, OperationHandler};

/// Shared invocation counter.
#[derive(Debug, Clone, Default)]
pub struct CallCount(Arc<AtomicUsize>);

impl CallCount {
    pub fn total(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Runs a synchronous function and counts how often it was called.
pub struct CountingHandler<F> {
    function: F,
    calls: CallCount,
}

#[async_trait]
impl<F> OperationHandler for CountingHandler<F>
where
    F: Fn(&[Value]) -> Value + Send + Sync,
{
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        self.calls.bump();
        Ok((self.function)(&arguments))
    }
}

pub fn counting<F>(function: F) -> (Arc<dyn OperationHandler>, CallCount)
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    let calls = CallCount::default();
    let handler = CountingHandler {
        function,
        calls: calls.clone(),
    };
    (Arc::new(handler), calls)
}

/// Records which operations were invoked, per operation name.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<BTreeMap<String, usize>>>);

impl CallLog {
    pub fn count(&self, operation: &str) -> usize {
        self.0
            .lock()
            .map(|calls| calls.get(operation).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.lock().map(|calls| calls.values().sum()).unwrap_or(0)
    }

    pub fn reset(&self) {
        if let Ok(mut calls) = self.0.lock() {
            calls.clear();
        }
    }

    fn record(&self, operation: &str) {
        if let Ok(mut calls) = self.0.lock() {
            *calls.entry(operation.to_string()).or_default() += 1;
        }
    }
}

struct RecordingHandler {
    operation: String,
    inner: Arc<dyn OperationHandler>,
    log: CallLog,
}

#[async_trait]
impl OperationHandler for RecordingHandler {
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        self.log.record(&self.operation);
        self.inner.call(arguments).await
    }
}

/// Wraps every handler of `table` so invocations land in the returned log.
pub fn recording(table: &HandlerTable) -> (HandlerTable, CallLog) {
    let log = CallLog::default();
    let wrapped = table
        .operations()
        .filter_map(|operation| {
            let inner = table.get(operation)?.clone();
            let handler: Arc<dyn OperationHandler> = Arc::new(RecordingHandler {
                operation: operation.clone(),
                inner,
                log: log.clone(),
            });
            Some((operation.clone(), handler))
        })
        .collect();
    (wrapped, log)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Simulated handler failure: {0}")]
pub struct SimulatedFailure(pub String);

/// Always rejects with [`SimulatedFailure`].
pub struct FailingHandler {
    message: String,
}

#[async_trait]
impl OperationHandler for FailingHandler {
    async fn call(&self, _arguments: Vec<Value>) -> Result<Value, BoxError> {
        Err(Box::new(SimulatedFailure(self.message.clone())))
    }
}

pub fn failing(message: &str) -> Arc<dyn OperationHandler> {
    Arc::new(FailingHandler {
        message: message.to_string(),
    })
}

/// Panics inside the handler task.
pub struct PanickingHandler;

#[async_trait]
impl OperationHandler for PanickingHandler {
    async fn call(&self, _arguments: Vec<Value>) -> Result<Value, BoxError> {
        panic!("handler exploded");
    }
}

/// Tracks how many handlers run at the same time.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyProbe {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Sleeps before echoing its first argument (or `null`).
pub struct DelayedHandler {
    delay: Duration,
    probe: ConcurrencyProbe,
}

#[async_trait]
impl OperationHandler for DelayedHandler {
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        self.probe.enter();
        tokio::time::sleep(self.delay).await;
        self.probe.exit();
        Ok(arguments.into_iter().next().unwrap_or(Value::Null))
    }
}

pub fn delayed(delay: Duration) -> (Arc<dyn OperationHandler>, ConcurrencyProbe) {
    let probe = ConcurrencyProbe::default();
    let handler = DelayedHandler {
        delay,
        probe: probe.clone(),
    };
    (Arc::new(handler), probe)
}
