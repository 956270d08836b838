// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::engine::node::ExecutionNode;
use crate::graph::NodeId;

/// Reverse-edge index: node id → ids of the nodes whose arguments reference it.
///
/// Owned by the executor instead of living inside node records, so nodes
/// never hold pointers to each other. Rebuilt from scratch at the start of
/// every `execute()`.
#[derive(Debug, Clone, Default)]
pub struct DependentsIndex(BTreeMap<NodeId, BTreeSet<NodeId>>);

impl DependentsIndex {
    pub fn build(nodes: &BTreeMap<NodeId, ExecutionNode>) -> Self {
        let mut index: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        for (id, node) in nodes {
            for referenced in node.definition().references() {
                index
                    .entry(referenced.to_string())
                    .or_default()
                    .insert(id.clone());
            }
        }
        Self(index)
    }

    /// Direct dependents of `id`, in id order.
    pub fn of(&self, id: &str) -> impl Iterator<Item = &NodeId> {
        self.0.get(id).into_iter().flatten()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
