// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::errors::GraphError;
use crate::graph::{Argument, GraphModel, NodeDefinition, NodeId};
use crate::observability::messages::graph::GraphBuilt;
use crate::observability::messages::StructuredLog;

/// Incrementally assembles a [`GraphModel`].
///
/// Nodes may reference ids that are appended later; references are only
/// checked when [`build`](GraphBuilder::build) runs.
///
/// # Examples
///
/// ```rust
/// use graph_executor::graph::{Argument, GraphBuilder};
///
/// let mut builder = GraphBuilder::new();
/// builder
///     .append("c", "add", vec![Argument::reference("a"), Argument::reference("b")])?
///     .append("a", "negate", vec![Argument::literal(1)])?
///     .append("b", "min", vec![Argument::literal(2), Argument::literal(4)])?;
///
/// let graph = builder.build()?;
/// assert_eq!(graph.len(), 3);
/// # Ok::<(), graph_executor::errors::GraphError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<NodeId, NodeDefinition>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node under `id`.
    ///
    /// Fails with [`GraphError::DuplicateNode`] if `id` was already appended.
    pub fn append(
        &mut self,
        id: impl Into<NodeId>,
        operation: impl Into<String>,
        arguments: Vec<Argument>,
    ) -> Result<&mut Self, GraphError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode { node_id: id });
        }
        self.nodes.insert(id, NodeDefinition::new(operation, arguments));
        Ok(self)
    }

    /// Appends a content-addressed node and returns a reference to it.
    ///
    /// The node id is the canonical text of its definition, so interning the
    /// same operation with the same arguments twice yields the same node
    /// instead of a duplicate.
    pub fn intern(
        &mut self,
        operation: impl Into<String>,
        arguments: Vec<Argument>,
    ) -> Result<Argument, GraphError> {
        let definition = NodeDefinition::new(operation, arguments);
        let id = definition.to_canonical_text()?;
        match self.nodes.get(&id) {
            Some(existing) if *existing == definition => {}
            Some(_) => return Err(GraphError::DuplicateNode { node_id: id }),
            None => {
                self.nodes.insert(id.clone(), definition);
            }
        }
        Ok(Argument::reference(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validates the accumulated nodes and returns them as a graph.
    ///
    /// The returned model is an independent copy; appending to the builder
    /// afterwards does not affect it.
    pub fn build(&self) -> Result<GraphModel, GraphError> {
        let graph = GraphModel::validated(self.nodes.clone())?;
        GraphBuilt {
            node_count: graph.len(),
            edge_count: graph.edges().count(),
        }
        .log();
        Ok(graph)
    }
}
