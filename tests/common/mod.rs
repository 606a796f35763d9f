//! 集成测试共享工具模块
//!
//! 提供测试图构建、带记录或故障的扩展器，以及查询运行辅助函数

#![allow(dead_code)]

pub mod assertions;
pub mod data_fixtures;
pub mod storage_helpers;

pub use data_fixtures::*;
pub use storage_helpers::*;
