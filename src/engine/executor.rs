// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Incremental graph executor.
//!
//! The executor owns one [`ExecutionNode`] per node of a [`GraphModel`] and
//! runs them with a single coordinator loop:
//!
//! ```text
//!            ┌────────────── frame ──────────────┐
//!            │ NotStarted + inputs resolvable?    │
//!            │   reusable snapshot → Finished     │──┐ repeat while
//!            │   otherwise → Started, spawn task  │  │ reuse unblocks
//!            └────────────────────────────────────┘◄─┘ more nodes
//!                         │
//!                         ▼
//!            wait for the next completion on the channel
//!                         │
//!          ok ────────────┴──────────── err
//!   Finished, invalidate            Error, fail the whole
//!   stale dependents, next frame    execution immediately
//! ```
//!
//! Handlers run as spawned tokio tasks. Their results travel back over one
//! mpsc channel that only the coordinator reads, so every state transition
//! happens in one place. When an execution fails, tasks still in flight are
//! left alone; the receiver is dropped with the coordinator and their
//! results go nowhere.
//!
//! # Incremental re-execution
//!
//! [`GraphExecutor::update`] diffs a new graph against the current nodes.
//! Unchanged nodes keep their input snapshot and output; the next
//! [`execute`](GraphExecutor::execute) finishes them without calling their
//! handler as soon as their references are finished. Whenever a handler does
//! run, every direct dependent whose snapshot disagrees with the new output
//! loses its snapshot and is recomputed in turn, which carries changes down
//! any number of levels.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::ExecutorOptions;
use crate::engine::dependents::DependentsIndex;
use crate::engine::node::{ExecutionNode, NodeState};
use crate::errors::{ExecutionError, HandlerError, HandlerPanic};
use crate::graph::{Argument, GraphModel, NodeId};
use crate::observability::messages::engine::{
    DependentInvalidated, ExecutionCompleted, ExecutionFailed, ExecutionStarted, GraphUpdated,
    NodeDispatched, NodeFinished, NodeReused,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{HandlerTable, OperationHandler};

/// Counts reported by a successful `execute()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Handlers invoked during this run
    pub dispatched: usize,
    /// Nodes finished from their previous result
    pub reused: usize,
    pub duration: Duration,
}

/// What `update()` did to the node set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub retained: usize,
    pub redefined: usize,
    pub added: usize,
    pub removed: usize,
}

/// A handler settled; sent from the handler task to the coordinator.
struct Completion {
    node_id: NodeId,
    outcome: Result<Value, HandlerError>,
}

/// Executes a graph of asynchronous operations and re-executes it
/// incrementally after updates.
///
/// # Examples
///
/// ```rust
/// use graph_executor::backends::arithmetic::arithmetic_handlers;
/// use graph_executor::engine::GraphExecutor;
/// use graph_executor::graph::{Argument, GraphBuilder};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = GraphBuilder::new();
/// builder
///     .append("a", "negate", vec![Argument::literal(1)])?
///     .append("b", "min", [2, 4, 8, 4, 12].into_iter().map(Argument::literal).collect())?
///     .append("c", "add", vec![Argument::reference("a"), Argument::reference("b")])?;
///
/// let mut executor = GraphExecutor::new(arithmetic_handlers(), &builder.build()?)?;
/// executor.execute().await?;
/// assert_eq!(executor.get_node("c").unwrap().output(), Some(&json!(1)));
/// # Ok(())
/// # }
/// ```
pub struct GraphExecutor {
    handlers: HandlerTable,
    nodes: BTreeMap<NodeId, ExecutionNode>,
    dependents: DependentsIndex,
    options: ExecutorOptions,
}

impl GraphExecutor {
    /// Creates an executor with one `NotStarted` node per graph entry.
    ///
    /// Fails with [`ExecutionError::UnknownOperation`] if any node names an
    /// operation missing from `handlers`.
    pub fn new(handlers: HandlerTable, graph: &GraphModel) -> Result<Self, ExecutionError> {
        Self::with_options(handlers, graph, ExecutorOptions::default())
    }

    pub fn with_options(
        handlers: HandlerTable,
        graph: &GraphModel,
        options: ExecutorOptions,
    ) -> Result<Self, ExecutionError> {
        check_operations(&handlers, graph)?;
        let nodes = graph
            .iter()
            .map(|(id, definition)| {
                (id.clone(), ExecutionNode::new(id.clone(), definition.clone()))
            })
            .collect();
        Ok(Self {
            handlers,
            nodes,
            dependents: DependentsIndex::default(),
            options,
        })
    }

    pub fn get_node(&self, id: &str) -> Option<&ExecutionNode> {
        self.nodes.get(id)
    }

    /// Nodes currently in `state`, in id order.
    pub fn nodes_by_state(&self, state: NodeState) -> Vec<&ExecutionNode> {
        self.nodes
            .values()
            .filter(|node| node.state() == state)
            .collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ExecutionNode> {
        self.nodes.values()
    }

    /// Direct dependents of `id` as computed by the last `execute()`.
    pub fn dependents_of(&self, id: &str) -> impl Iterator<Item = &NodeId> {
        self.dependents.of(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-arms the executor against `graph` without running anything.
    ///
    /// Nodes whose definition is unchanged keep their previous result for
    /// reuse; changed nodes lose their input snapshot; new ids get fresh
    /// nodes and ids missing from `graph` are removed. Nothing is modified if
    /// `graph` names an unknown operation.
    pub fn update(&mut self, graph: &GraphModel) -> Result<UpdateSummary, ExecutionError> {
        check_operations(&self.handlers, graph)?;

        let mut summary = UpdateSummary::default();
        for (id, definition) in graph.iter() {
            match self.nodes.get_mut(id) {
                Some(node) => {
                    if node.definition() == definition {
                        summary.retained += 1;
                    } else {
                        node.redefine(definition.clone());
                        summary.redefined += 1;
                    }
                    node.rearm();
                }
                None => {
                    self.nodes
                        .insert(id.clone(), ExecutionNode::new(id.clone(), definition.clone()));
                    summary.added += 1;
                }
            }
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, _| graph.contains(id));
        summary.removed = before - self.nodes.len();
        self.dependents.clear();

        GraphUpdated {
            retained: summary.retained,
            redefined: summary.redefined,
            added: summary.added,
            removed: summary.removed,
        }
        .log();
        Ok(summary)
    }

    /// Runs every node that is not finished yet.
    ///
    /// Resolves once all nodes are `Finished`, or fails with the first
    /// handler error observed.
    pub async fn execute(&mut self) -> Result<ExecutionSummary, ExecutionError> {
        self.execute_with_cancellation(CancellationToken::new()).await
    }

    /// Like [`execute`](Self::execute), but stops coordinating with
    /// [`ExecutionError::Cancelled`] once `cancel` fires. Handlers already
    /// running are not interrupted.
    pub async fn execute_with_cancellation(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<ExecutionSummary, ExecutionError> {
        // left over from a previous run that failed or was cancelled
        for node in self.nodes.values_mut() {
            if matches!(node.state(), NodeState::Started | NodeState::Error) {
                node.rearm();
            }
        }
        self.dependents = DependentsIndex::build(&self.nodes);

        let started = ExecutionStarted {
            node_count: self.nodes.len(),
            reusable_count: self.nodes.values().filter(|n| n.is_reusable()).count(),
            max_concurrency: self.options.max_concurrency,
        };
        started.log();
        let span = started.span("execute");

        let result = self.coordinate(cancel).instrument(span).await;
        if let Err(error) = &result {
            ExecutionFailed {
                node_id: error.node_id(),
                error,
            }
            .log();
        }
        result
    }

    async fn coordinate(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<ExecutionSummary, ExecutionError> {
        let started_at = Instant::now();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Completion>();
        let limiter = self
            .options
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        let mut summary = ExecutionSummary::default();
        let mut in_flight = 0usize;

        loop {
            in_flight += self.run_frame(&sender, limiter.as_ref(), &mut summary)?;

            if self.all_finished() {
                summary.duration = started_at.elapsed();
                ExecutionCompleted {
                    node_count: self.nodes.len(),
                    dispatched: summary.dispatched,
                    reused: summary.reused,
                    duration: summary.duration,
                }
                .log();
                return Ok(summary);
            }

            if in_flight == 0 {
                return Err(self.stalled());
            }

            let completion = tokio::select! {
                _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
                completion = receiver.recv() => completion,
            };
            // the coordinator holds a sender, so the channel never closes here
            let Some(completion) = completion else {
                return Err(self.stalled());
            };
            in_flight -= 1;
            self.settle(completion, in_flight)?;
        }
    }

    /// One scheduling round. Returns how many handlers were dispatched.
    ///
    /// Reusing a node can make its dependents resolvable without any handler
    /// settling, so the scan repeats until a pass reuses nothing.
    fn run_frame(
        &mut self,
        sender: &mpsc::UnboundedSender<Completion>,
        limiter: Option<&Arc<Semaphore>>,
        summary: &mut ExecutionSummary,
    ) -> Result<usize, ExecutionError> {
        let mut dispatched = 0;
        loop {
            let mut reused_any = false;
            let candidates: Vec<NodeId> = self
                .nodes
                .values()
                .filter(|node| node.state() == NodeState::NotStarted)
                .map(|node| node.id().to_string())
                .collect();

            for id in candidates {
                let Some(arguments) = self.resolve_arguments(&id) else {
                    continue;
                };
                let Some(node) = self.nodes.get_mut(&id) else {
                    continue;
                };

                if node.is_reusable() {
                    node.reuse();
                    NodeReused { node_id: &id }.log();
                    summary.reused += 1;
                    reused_any = true;
                    continue;
                }

                let operation = node.definition().operation.clone();
                let handler = self.handlers.get(&operation).cloned().ok_or_else(|| {
                    ExecutionError::UnknownOperation {
                        node_id: id.clone(),
                        operation: operation.clone(),
                    }
                })?;

                NodeDispatched {
                    node_id: &id,
                    operation: &operation,
                    argument_count: arguments.len(),
                }
                .log();
                node.begin(arguments.clone());
                spawn_handler(id, handler, arguments, sender.clone(), limiter.cloned());
                summary.dispatched += 1;
                dispatched += 1;
            }

            if !reused_any {
                return Ok(dispatched);
            }
        }
    }

    /// The node's argument list with references replaced by outputs, or
    /// `None` while any referenced node is not `Finished`.
    fn resolve_arguments(&self, id: &str) -> Option<Vec<Value>> {
        let node = self.nodes.get(id)?;
        node.definition()
            .arguments
            .iter()
            .map(|argument| match argument {
                Argument::Literal(value) => Some(value.clone()),
                Argument::Reference(reference) => self
                    .nodes
                    .get(&reference.node)
                    .and_then(ExecutionNode::output)
                    .cloned(),
            })
            .collect()
    }

    fn settle(&mut self, completion: Completion, in_flight: usize) -> Result<(), ExecutionError> {
        let Completion { node_id, outcome } = completion;
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return Ok(());
        };
        if node.state() != NodeState::Started {
            return Ok(());
        }

        match outcome {
            Ok(output) => {
                node.finish(output);
                NodeFinished {
                    node_id: &node_id,
                    in_flight,
                }
                .log();
                self.invalidate_stale_dependents(&node_id);
                Ok(())
            }
            Err(error) => {
                node.fail(error.clone());
                Err(ExecutionError::Handler { node_id, error })
            }
        }
    }

    /// Clears the snapshot of every direct dependent that baked in a value
    /// different from `id`'s new output.
    fn invalidate_stale_dependents(&mut self, id: &str) {
        let Some(output) = self.nodes.get(id).and_then(ExecutionNode::output).cloned() else {
            return;
        };
        let dependents: Vec<NodeId> = self.dependents.of(id).cloned().collect();
        for dependent_id in dependents {
            if let Some(dependent) = self.nodes.get_mut(&dependent_id) {
                if dependent.is_stale_for(id, &output) {
                    dependent.invalidate();
                    DependentInvalidated {
                        node_id: &dependent_id,
                        upstream: id,
                    }
                    .log();
                }
            }
        }
    }

    fn stalled(&self) -> ExecutionError {
        ExecutionError::Stalled {
            pending: self
                .nodes
                .values()
                .filter(|node| node.state() != NodeState::Finished)
                .map(|node| node.id().to_string())
                .collect(),
        }
    }

    fn all_finished(&self) -> bool {
        self.nodes
            .values()
            .all(|node| node.state() == NodeState::Finished)
    }
}

impl std::fmt::Debug for GraphExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphExecutor")
            .field("handlers", &self.handlers)
            .field("nodes", &self.nodes)
            .field("options", &self.options)
            .finish()
    }
}

fn check_operations(handlers: &HandlerTable, graph: &GraphModel) -> Result<(), ExecutionError> {
    match graph
        .iter()
        .find(|(_, definition)| !handlers.contains(&definition.operation))
    {
        Some((id, definition)) => Err(ExecutionError::UnknownOperation {
            node_id: id.clone(),
            operation: definition.operation.clone(),
        }),
        None => Ok(()),
    }
}

/// Runs one handler invocation on its own task and reports back.
///
/// The handler itself runs in a nested task so a panic surfaces as a
/// `JoinError` here instead of silently losing the completion.
fn spawn_handler(
    node_id: NodeId,
    handler: Arc<dyn OperationHandler>,
    arguments: Vec<Value>,
    sender: mpsc::UnboundedSender<Completion>,
    limiter: Option<Arc<Semaphore>>,
) {
    tokio::spawn(async move {
        let _permit = match limiter {
            Some(semaphore) => semaphore.acquire_owned().await.ok(),
            None => None,
        };

        let outcome = match tokio::spawn(async move { handler.call(arguments).await }).await {
            Ok(result) => result.map_err(HandlerError::from),
            Err(join_error) => Err(Arc::new(HandlerPanic {
                node_id: node_id.clone(),
                message: join_error.to_string(),
            }) as HandlerError),
        };

        // a closed channel means the execution already ended; nothing to report to
        let _ = sender.send(Completion { node_id, outcome });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{counting, failing};
    use crate::graph::GraphBuilder;
    use serde_json::json;

    fn chain() -> GraphModel {
        let mut builder = GraphBuilder::new();
        builder
            .append("a", "inc", vec![Argument::literal(1)])
            .unwrap()
            .append("b", "inc", vec![Argument::reference("a")])
            .unwrap();
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn test_new_rejects_unknown_operations() {
        let result = GraphExecutor::new(HandlerTable::new(), &chain());
        match result {
            Err(ExecutionError::UnknownOperation { node_id, operation }) => {
                assert_eq!(node_id, "a");
                assert_eq!(operation, "inc");
            }
            other => panic!("Expected UnknownOperation, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_all_nodes_start_not_started() {
        let (inc, _calls) = counting(|args| json!(args[0].as_i64().unwrap_or(0) + 1));
        let mut handlers = HandlerTable::new();
        handlers.insert("inc", inc);

        let executor = GraphExecutor::new(handlers, &chain()).unwrap();
        assert_eq!(executor.len(), 2);
        assert_eq!(executor.nodes_by_state(NodeState::NotStarted).len(), 2);
        assert!(executor.get_node("a").unwrap().resolved_input().is_none());
        assert!(executor.get_node("missing").is_none());
    }

    #[tokio::test]
    async fn test_execute_runs_chain_and_builds_dependents() {
        let (inc, calls) = counting(|args| json!(args[0].as_i64().unwrap_or(0) + 1));
        let mut handlers = HandlerTable::new();
        handlers.insert("inc", inc);

        let mut executor = GraphExecutor::new(handlers, &chain()).unwrap();
        let summary = executor.execute().await.unwrap();

        assert_eq!(summary.dispatched, 2);
        assert_eq!(summary.reused, 0);
        assert_eq!(calls.total(), 2);
        assert_eq!(executor.get_node("b").unwrap().output(), Some(&json!(3)));
        assert_eq!(
            executor.get_node("b").unwrap().resolved_input(),
            Some(&[json!(2)][..])
        );
        assert_eq!(executor.dependents_of("a").collect::<Vec<_>>(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_empty_graph_finishes_immediately() {
        let graph = GraphBuilder::new().build().unwrap();
        let mut executor = GraphExecutor::new(HandlerTable::new(), &graph).unwrap();
        let summary = executor.execute().await.unwrap();
        assert_eq!(summary.dispatched, 0);
        assert!(executor.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_operation_without_changes() {
        let (inc, _calls) = counting(|args| json!(args[0].as_i64().unwrap_or(0) + 1));
        let mut handlers = HandlerTable::new();
        handlers.insert("inc", inc);
        let mut executor = GraphExecutor::new(handlers, &chain()).unwrap();
        executor.execute().await.unwrap();

        let mut builder = GraphBuilder::new();
        builder.append("z", "unknown", vec![]).unwrap();
        let result = executor.update(&builder.build().unwrap());

        assert!(matches!(result, Err(ExecutionError::UnknownOperation { .. })));
        assert_eq!(executor.len(), 2);
        assert_eq!(executor.nodes_by_state(NodeState::Finished).len(), 2);
    }

    #[tokio::test]
    async fn test_update_reports_what_changed() {
        let (inc, _calls) = counting(|args| json!(args[0].as_i64().unwrap_or(0) + 1));
        let mut handlers = HandlerTable::new();
        handlers.insert("inc", inc);
        let mut executor = GraphExecutor::new(handlers, &chain()).unwrap();
        executor.execute().await.unwrap();

        let mut builder = GraphBuilder::new();
        builder
            .append("a", "inc", vec![Argument::literal(5)])
            .unwrap()
            .append("c", "inc", vec![Argument::reference("a")])
            .unwrap();
        let summary = executor.update(&builder.build().unwrap()).unwrap();

        assert_eq!(
            summary,
            UpdateSummary {
                retained: 0,
                redefined: 1,
                added: 1,
                removed: 1,
            }
        );
        assert!(executor.get_node("b").is_none());
        assert_eq!(executor.nodes_by_state(NodeState::NotStarted).len(), 2);
        assert_eq!(executor.dependents_of("a").count(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_reported_with_node_id() {
        let mut handlers = HandlerTable::new();
        handlers.insert("inc", failing("bad"));

        let mut executor = GraphExecutor::new(handlers, &chain()).unwrap();
        let err = executor.execute().await.unwrap_err();

        assert_eq!(err.node_id(), Some("a"));
        let failed = executor.get_node("a").unwrap();
        assert_eq!(failed.state(), NodeState::Error);
        assert!(Arc::ptr_eq(err.handler_error().unwrap(), failed.error().unwrap()));
        assert_eq!(executor.get_node("b").unwrap().state(), NodeState::NotStarted);
    }
}
