// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while assembling or parsing a graph model.
///
/// All of these are fatal to `GraphBuilder::build`: no partial graph is
/// ever returned alongside them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The same node id was appended twice
    #[error("Graph node already exists: '{node_id}'")]
    DuplicateNode { node_id: NodeId },

    /// Following references from a node leads back to it.
    ///
    /// `path` starts and ends with the same id, e.g. `[a, b, a]`.
    #[error("Circular reference {}", path.join(" => "))]
    CircularReference { path: Vec<NodeId> },

    /// A reference points at a node id that is not part of the graph
    #[error("Node '{node_id}' references '{missing}' which does not exist")]
    InvalidReference { node_id: NodeId, missing: NodeId },

    /// The canonical text form could not be produced or parsed
    #[error("Invalid canonical graph text: {message}")]
    Encoding { message: String },
}

impl From<serde_json::Error> for GraphError {
    fn from(error: serde_json::Error) -> Self {
        GraphError::Encoding {
            message: error.to_string(),
        }
    }
}
