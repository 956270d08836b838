// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // operation handler backends
pub mod config;     // YAML graph definitions
pub mod engine;     // incremental executor
pub mod errors;     // error handling
pub mod graph;      // graph model + builder
pub mod observability;
pub mod traits;     // handler abstractions

pub use engine::{ExecutionNode, ExecutionSummary, GraphExecutor, NodeState, UpdateSummary};
pub use errors::{ExecutionError, GraphError};
pub use graph::{Argument, GraphBuilder, GraphModel, NodeDefinition, NodeId};
pub use traits::{HandlerTable, OperationHandler};
