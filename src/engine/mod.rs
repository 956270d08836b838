pub mod dependents;
pub mod executor;
pub mod node;

pub use dependents::DependentsIndex;
pub use executor::{ExecutionSummary, GraphExecutor, UpdateSummary};
pub use node::{ExecutionNode, NodeState};
