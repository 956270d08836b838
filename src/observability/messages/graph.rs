// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph construction and validation.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// A graph passed validation and was built.
///
/// # Log Level
/// `debug!` - Construction detail
pub struct GraphBuilt {
    pub node_count: usize,
    pub edge_count: usize,
}

impl Display for GraphBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Built graph with {} nodes and {} references",
            self.node_count, self.edge_count
        )
    }
}

impl StructuredLog for GraphBuilt {
    fn log(&self) {
        tracing::debug!(
            node_count = self.node_count,
            edge_count = self.edge_count,
            "{}", self
        );
    }
}

/// Cycle detection rejected a graph.
///
/// # Log Level
/// `warn!` - The caller receives the error; this records where it came from
///
/// # Example
/// ```
/// use graph_executor::observability::messages::graph::CircularReferenceDetected;
///
/// let path = vec!["a".to_string(), "b".to_string(), "a".to_string()];
/// let msg = CircularReferenceDetected { path: &path };
///
/// assert_eq!(msg.to_string(), "Circular reference detected: a => b => a");
/// ```
pub struct CircularReferenceDetected<'a> {
    pub path: &'a [String],
}

impl Display for CircularReferenceDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Circular reference detected: {}", self.path.join(" => "))
    }
}

impl StructuredLog for CircularReferenceDetected<'_> {
    fn log(&self) {
        tracing::warn!(cycle_length = self.path.len(), "{}", self);
    }
}
