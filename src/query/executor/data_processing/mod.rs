//! 数据处理执行器模块
//!
//! 模块组织：
//! - `graph_traversal` - 图遍历相关（FindPath）

pub mod graph_traversal;
pub use graph_traversal::FindPathExecutor;
