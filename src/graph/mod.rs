// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph model: the immutable shape of a node graph.
//!
//! A [`GraphModel`] maps node ids to [`NodeDefinition`]s. Each definition
//! names an operation and an ordered argument list; every argument is either
//! a literal JSON value or a [`Reference`] to another node's output.
//!
//! Models are only handed out by [`GraphBuilder::build`] and
//! [`GraphModel::from_canonical_text`], both of which validate that every
//! reference resolves and that the reference graph is acyclic. Holding a
//! `GraphModel` therefore means holding a valid one.
//!
//! # Canonical text
//!
//! The canonical text form is compact JSON: nodes ordered by id, definition
//! fields in declaration order and literal object keys sorted. Two
//! structurally equal models always produce byte-identical text:
//!
//! ```rust
//! use graph_executor::graph::{Argument, GraphBuilder};
//! use serde_json::json;
//!
//! let mut builder = GraphBuilder::new();
//! builder.append("a", "negate", vec![json!(1).into()])?;
//! builder.append("b", "add", vec![Argument::reference("a"), json!(2).into()])?;
//! let graph = builder.build()?;
//!
//! assert_eq!(
//!     graph.to_canonical_text()?,
//!     r#"{"a":{"operation":"negate","arguments":[1]},"b":{"operation":"add","arguments":[{"ref":"a"},2]}}"#
//! );
//! # Ok::<(), graph_executor::errors::GraphError>(())
//! ```

mod builder;
mod validation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GraphError;

pub use builder::GraphBuilder;
pub use validation::validate_graph;

/// Opaque node identifier, unique within one graph.
pub type NodeId = String;

/// "Use the output of node `node`", serialized as `{"ref": "<id>"}`.
///
/// Only an object with a single string `ref` field is a reference. Unknown
/// fields are rejected, so domain objects which merely happen to carry a
/// `ref` key next to other keys stay literals. This is stricter than
/// treating any object with a string `ref` as a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    #[serde(rename = "ref")]
    pub node: NodeId,
}

/// One argument slot of a node definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Reference(Reference),
    Literal(Value),
}

impl Argument {
    /// Wraps a JSON value, classified the way the text form would read it:
    /// `{"ref": "<id>"}` becomes a reference, anything else a literal.
    pub fn literal(value: impl Into<Value>) -> Self {
        Argument::Literal(value.into()).normalized()
    }

    pub fn reference(node: impl Into<NodeId>) -> Self {
        Argument::Reference(Reference { node: node.into() })
    }

    /// Turns a literal that encodes as a reference into that reference, so
    /// the canonical text always reads back as the same argument.
    pub fn normalized(self) -> Self {
        match self {
            Argument::Literal(Value::Object(mut map))
                if map.len() == 1 && map.get("ref").map_or(false, Value::is_string) =>
            {
                match map.remove("ref") {
                    Some(Value::String(node)) => Argument::reference(node),
                    _ => Argument::Literal(Value::Object(map)),
                }
            }
            other => other,
        }
    }

    /// The referenced node id, if this slot is a reference.
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Argument::Reference(reference) => Some(&reference.node),
            Argument::Literal(_) => None,
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::literal(value)
    }
}

impl From<Reference> for Argument {
    fn from(reference: Reference) -> Self {
        Argument::Reference(reference)
    }
}

/// Operation type plus ordered arguments for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub operation: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl NodeDefinition {
    /// Arguments are [`normalized`](Argument::normalized).
    pub fn new(operation: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            operation: operation.into(),
            arguments: arguments.into_iter().map(Argument::normalized).collect(),
        }
    }

    /// Ids of the nodes this definition references, in argument order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().filter_map(Argument::as_reference)
    }

    /// True if no argument depends on another node's output.
    pub fn is_independent(&self) -> bool {
        self.references().next().is_none()
    }

    /// Canonical text of this definition alone.
    pub fn to_canonical_text(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Validated mapping from node id to node definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GraphModel(BTreeMap<NodeId, NodeDefinition>);

impl GraphModel {
    /// Wraps nodes after checking references and acyclicity.
    pub(crate) fn validated(nodes: BTreeMap<NodeId, NodeDefinition>) -> Result<Self, GraphError> {
        validate_graph(&nodes)?;
        Ok(Self(nodes))
    }

    pub fn get(&self, id: &str) -> Option<&NodeDefinition> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeDefinition)> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.0.keys()
    }

    /// All `(referencing, referenced)` edges of the graph.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(id, definition)| {
            definition
                .references()
                .map(move |referenced| (id.as_str(), referenced))
        })
    }

    pub fn to_canonical_text(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses canonical text and re-validates the result.
    pub fn from_canonical_text(text: &str) -> Result<Self, GraphError> {
        let nodes: BTreeMap<NodeId, NodeDefinition> = serde_json::from_str(text)?;
        Self::validated(nodes)
    }
}
