//! 执行器基础类型统一模块
//!
//! 模块结构：
//! - executor_stats.rs    - 执行器统计信息
//! - execution_result.rs  - 执行结果类型
//! - executor_base.rs     - 执行器 trait 与基础执行器

pub mod execution_result;
pub mod executor_base;
pub mod executor_stats;

pub use execution_result::ExecutionResult;
pub use executor_base::{BaseExecutor, Executor};
pub use executor_stats::ExecutorStats;

pub use crate::core::error::DBResult;
