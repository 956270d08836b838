// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation for node graphs.
//!
//! Validation runs in two stages:
//!
//! 1. **Reference validation**: every reference must name a node of the same graph
//! 2. **Cycle detection**: depth-first search from every node, in id order
//!
//! Cycle detection only runs once references are known to resolve, so the
//! traversal never has to deal with dangling edges.
//!
//! ## Cycle detection
//! Uses the "three colors" DFS driven by an explicit stack, which is also the
//! current path:
//! - nodes on the current path are gray (`on_path`)
//! - fully explored nodes are black (`visited`)
//! - reaching a gray node closes a cycle, which is cut out of the path
//!
//! For `a → b → c → a` this yields `[a, b, c, a]`. A self reference yields
//! `[a, a]`. The reported path always starts and ends with the same id.

use std::collections::{BTreeMap, HashSet};

use crate::errors::GraphError;
use crate::graph::{NodeDefinition, NodeId};
use crate::observability::messages::graph::CircularReferenceDetected;
use crate::observability::messages::StructuredLog;

/// Validates that a set of node definitions forms a well-formed graph.
///
/// Returns the first problem found: dangling references are reported before
/// cycles, and both are searched in node id order so the result is stable.
pub fn validate_graph(nodes: &BTreeMap<NodeId, NodeDefinition>) -> Result<(), GraphError> {
    validate_references(nodes)?;
    validate_acyclic(nodes)
}

fn validate_references(nodes: &BTreeMap<NodeId, NodeDefinition>) -> Result<(), GraphError> {
    for (id, definition) in nodes {
        if let Some(missing) = definition.references().find(|r| !nodes.contains_key(*r)) {
            return Err(GraphError::InvalidReference {
                node_id: id.clone(),
                missing: missing.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_acyclic(nodes: &BTreeMap<NodeId, NodeDefinition>) -> Result<(), GraphError> {
    let mut visited = HashSet::new();
    let mut on_path = HashSet::new();

    for id in nodes.keys() {
        if visited.contains(id.as_str()) {
            continue;
        }
        if let Some(cycle) = find_cycle(id, nodes, &mut visited, &mut on_path) {
            CircularReferenceDetected { path: &cycle }.log();
            return Err(GraphError::CircularReference { path: cycle });
        }
    }
    Ok(())
}

/// Depth-first search from `start` with an explicit stack.
///
/// Each frame is a node on the current path plus the index of the next
/// reference to follow, so the stack doubles as the path for cycle reports.
fn find_cycle<'a>(
    start: &'a str,
    nodes: &'a BTreeMap<NodeId, NodeDefinition>,
    visited: &mut HashSet<&'a str>,
    on_path: &mut HashSet<&'a str>,
) -> Option<Vec<NodeId>> {
    let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];
    visited.insert(start);
    on_path.insert(start);

    while let Some(frame) = stack.last_mut() {
        let (id, next) = *frame;
        frame.1 += 1;

        let Some(referenced) = nodes.get(id).and_then(|d| d.references().nth(next)) else {
            on_path.remove(id);
            stack.pop();
            continue;
        };

        if on_path.contains(referenced) {
            let from = stack.iter().position(|(p, _)| *p == referenced).unwrap_or(0);
            let mut cycle: Vec<NodeId> = stack[from..].iter().map(|(p, _)| p.to_string()).collect();
            cycle.push(referenced.to_string());
            return Some(cycle);
        }
        if visited.insert(referenced) {
            on_path.insert(referenced);
            stack.push((referenced, 0));
        }
    }
    None
}
