//! Value 模块 - 路径查询使用的值类型
//!
//! - 核心类型定义 (`types.rs`)
//! - 顶点ID (`vid.rs`)
//! - 结果数据集 (`dataset.rs`)

pub mod dataset;
pub mod types;
pub mod vid;

pub use dataset::*;
pub use types::*;
pub use vid::*;
