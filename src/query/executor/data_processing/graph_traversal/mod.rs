//! 图遍历执行器模块
//!
//! - 路径查找（FindPath）：最短路径、所有路径、加权最短路径
//! - `algorithms`：双向扩展的路径算法

pub mod algorithms;
pub mod find_path;

pub use find_path::FindPathExecutor;
