// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-node runtime record layered over a node definition.

use std::fmt;

use serde_json::Value;

use crate::errors::HandlerError;
use crate::graph::{NodeDefinition, NodeId};

/// Lifecycle of one execution node.
///
/// States only move forward (`NotStarted → Started → Finished | Error`, or
/// `NotStarted → Finished` on reuse) within one `execute()` call. Re-arming
/// between runs puts a node back to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    NotStarted,
    Started,
    Finished,
    Error,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeState::NotStarted => "NotStarted",
            NodeState::Started => "Started",
            NodeState::Finished => "Finished",
            NodeState::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Runtime state of one node, owned by the `GraphExecutor`.
///
/// The output of the last successful run is retained across re-arming so it
/// can be reused, but it is only observable through [`output`](Self::output)
/// while the node is `Finished`. Likewise the error is only observable while
/// the node is in `Error`.
#[derive(Debug, Clone)]
pub struct ExecutionNode {
    id: NodeId,
    definition: NodeDefinition,
    state: NodeState,
    resolved_input: Option<Vec<Value>>,
    output: Option<Value>,
    error: Option<HandlerError>,
}

impl ExecutionNode {
    pub(crate) fn new(id: NodeId, definition: NodeDefinition) -> Self {
        Self {
            id,
            definition,
            state: NodeState::NotStarted,
            resolved_input: None,
            output: None,
            error: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Arguments with references replaced by upstream outputs, as captured at
    /// the last dispatch. `None` once invalidated.
    pub fn resolved_input(&self) -> Option<&[Value]> {
        self.resolved_input.as_deref()
    }

    pub fn output(&self) -> Option<&Value> {
        match self.state {
            NodeState::Finished => self.output.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&HandlerError> {
        match self.state {
            NodeState::Error => self.error.as_ref(),
            _ => None,
        }
    }

    /// True when the previous result can be reused without calling the
    /// handler: the input snapshot survived and a successful output exists.
    pub(crate) fn is_reusable(&self) -> bool {
        self.resolved_input.is_some() && self.output.is_some()
    }

    pub(crate) fn begin(&mut self, resolved_input: Vec<Value>) {
        self.resolved_input = Some(resolved_input);
        self.output = None;
        self.error = None;
        self.state = NodeState::Started;
    }

    pub(crate) fn reuse(&mut self) {
        self.state = NodeState::Finished;
    }

    pub(crate) fn finish(&mut self, output: Value) {
        self.output = Some(output);
        self.state = NodeState::Finished;
    }

    pub(crate) fn fail(&mut self, error: HandlerError) {
        self.error = Some(error);
        self.state = NodeState::Error;
    }

    /// Drop the input snapshot so the next run calls the handler again.
    pub(crate) fn invalidate(&mut self) {
        self.resolved_input = None;
    }

    pub(crate) fn redefine(&mut self, definition: NodeDefinition) {
        self.definition = definition;
        self.invalidate();
    }

    /// Put the node back to `NotStarted` for another run.
    ///
    /// A node caught mid-flight or failed has no usable result, so its
    /// snapshot is dropped as well.
    pub(crate) fn rearm(&mut self) {
        if matches!(self.state, NodeState::Started | NodeState::Error) {
            self.invalidate();
        }
        self.state = NodeState::NotStarted;
    }

    /// Whether `upstream` producing `output` contradicts the snapshot.
    ///
    /// Looks at every argument slot that references `upstream` and compares
    /// the value baked into the snapshot with `output`.
    pub(crate) fn is_stale_for(&self, upstream: &str, output: &Value) -> bool {
        let Some(snapshot) = &self.resolved_input else {
            return false;
        };
        self.definition
            .arguments
            .iter()
            .enumerate()
            .filter(|(_, argument)| argument.as_reference() == Some(upstream))
            .any(|(index, _)| snapshot.get(index) != Some(output))
    }
}
