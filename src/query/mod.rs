// Query module for the graph database
//
// This module provides the path query pipeline:
// - Executors driving multi-pair path searches
// - Bidirectional path-finding algorithms

pub mod executor;

// Re-export error types from core module
pub use crate::core::{DBResult, QueryError};
// Re-export execution result from executor module
pub use executor::ExecutionResult;
