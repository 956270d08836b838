// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph executor lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Execution lifecycle (start, completion, failure)
//! * Per-node dispatch, reuse and completion
//! * Incremental bookkeeping (dependent invalidation, graph updates)

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use graph_executor::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     node_count: 5,
///     reusable_count: 3,
///     max_concurrency: None,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted {
    pub node_count: usize,
    pub reusable_count: usize,
    pub max_concurrency: Option<usize>,
}

impl Display for ExecutionStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting graph execution: {} nodes, {} with reusable results",
            self.node_count, self.reusable_count
        )?;
        match self.max_concurrency {
            Some(limit) => write!(f, ", max_concurrency={}", limit),
            None => write!(f, ", max_concurrency=unbounded"),
        }
    }
}

impl StructuredLog for ExecutionStarted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            reusable_count = self.reusable_count,
            max_concurrency = ?self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            node_count = self.node_count,
            reusable_count = self.reusable_count,
        )
    }
}

/// Execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted {
    pub node_count: usize,
    pub dispatched: usize,
    pub reused: usize,
    pub duration: std::time::Duration,
}

impl Display for ExecutionCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph execution completed: {} nodes ({} computed, {} reused) in {:?}",
            self.node_count, self.dispatched, self.reused, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            dispatched = self.dispatched,
            reused = self.reused,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Execution failed with error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use graph_executor::observability::messages::engine::ExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ExecutionFailed {
///     node_id: Some("divide"),
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Graph execution failed at node 'divide': test error");
/// ```
pub struct ExecutionFailed<'a> {
    pub node_id: Option<&'a str>,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.node_id {
            Some(node_id) => write!(
                f,
                "Graph execution failed at node '{}': {}",
                node_id, self.error
            ),
            None => write!(f, "Graph execution failed: {}", self.error),
        }
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            error = %self.error,
            "{}", self
        );
    }
}

/// A node's handler was invoked.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct NodeDispatched<'a> {
    pub node_id: &'a str,
    pub operation: &'a str,
    pub argument_count: usize,
}

impl Display for NodeDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Started  node '{}' ({} with {} arguments)",
            self.node_id, self.operation, self.argument_count
        )
    }
}

impl StructuredLog for NodeDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            operation = self.operation,
            argument_count = self.argument_count,
            "{}", self
        );
    }
}

/// A node was finished from its previous result without calling its handler.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct NodeReused<'a> {
    pub node_id: &'a str,
}

impl Display for NodeReused<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reused   node '{}' (input unchanged)", self.node_id)
    }
}

impl StructuredLog for NodeReused<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, "{}", self);
    }
}

/// A node's handler settled successfully.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct NodeFinished<'a> {
    pub node_id: &'a str,
    pub in_flight: usize,
}

impl Display for NodeFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Finished node '{}' ({} still running)",
            self.node_id, self.in_flight
        )
    }
}

impl StructuredLog for NodeFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            in_flight = self.in_flight,
            "{}", self
        );
    }
}

/// A dependent's cached input no longer matches an upstream output.
///
/// # Log Level
/// `debug!` - Incremental bookkeeping
///
/// # Example
/// ```
/// use graph_executor::observability::messages::engine::DependentInvalidated;
///
/// let msg = DependentInvalidated { node_id: "c", upstream: "b" };
/// assert_eq!(msg.to_string(), "Invalidated cached input of 'c': output of 'b' changed");
/// ```
pub struct DependentInvalidated<'a> {
    pub node_id: &'a str,
    pub upstream: &'a str,
}

impl Display for DependentInvalidated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invalidated cached input of '{}': output of '{}' changed",
            self.node_id, self.upstream
        )
    }
}

impl StructuredLog for DependentInvalidated<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            upstream = self.upstream,
            "{}", self
        );
    }
}

/// The executor was re-armed against a new graph.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphUpdated {
    pub retained: usize,
    pub redefined: usize,
    pub added: usize,
    pub removed: usize,
}

impl Display for GraphUpdated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph updated: {} retained, {} redefined, {} added, {} removed",
            self.retained, self.redefined, self.added, self.removed
        )
    }
}

impl StructuredLog for GraphUpdated {
    fn log(&self) {
        tracing::info!(
            retained = self.retained,
            redefined = self.redefined,
            added = self.added,
            removed = self.removed,
            "{}", self
        );
    }
}
