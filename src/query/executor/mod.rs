// Re-export all executor modules
pub mod base;
pub mod data_processing;

// Re-export the base types
pub use base::{BaseExecutor, ExecutionResult, Executor, ExecutorStats};

pub use data_processing::graph_traversal::algorithms;
pub use data_processing::FindPathExecutor;
