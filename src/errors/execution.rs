// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors produced while executing a graph.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::NodeId;

/// Error type handlers return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A handler's original error, shared between the failed node and the
/// `ExecutionError` that reports it.
///
/// The engine never wraps or alters it; `Arc::ptr_eq` holds between the two.
pub type HandlerError = Arc<dyn std::error::Error + Send + Sync>;

/// Raised in place of a handler error when the handler task panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Handler for node '{node_id}' panicked: {message}")]
pub struct HandlerPanic {
    pub node_id: NodeId,
    pub message: String,
}

/// Errors that end an `execute()` call or reject a graph at the executor.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// A dispatched handler failed; the whole execution fails fast with it
    #[error("Node '{node_id}' failed: {error}")]
    Handler {
        node_id: NodeId,
        #[source]
        error: HandlerError,
    },

    /// A node names an operation the handler table does not provide
    #[error("Node '{node_id}' uses unknown operation '{operation}'")]
    UnknownOperation { node_id: NodeId, operation: String },

    /// Nothing is running and nothing more can be dispatched, yet some nodes
    /// never finished. Unreachable for validated graphs.
    #[error("Execution stalled with unfinished nodes: {}", pending.join(", "))]
    Stalled { pending: Vec<NodeId> },

    /// The caller's cancellation token fired
    #[error("Execution cancelled")]
    Cancelled,
}

impl ExecutionError {
    /// The handler's original error, when this is a handler failure.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            ExecutionError::Handler { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Id of the node that caused the failure, if one node is to blame.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ExecutionError::Handler { node_id, .. }
            | ExecutionError::UnknownOperation { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}
