//! 查询层错误类型
//!
//! 涵盖路径查询参数校验和执行过程中的错误

use thiserror::Error;

use crate::core::error::codes::{ErrorCode, ToPublicError};

/// 查询层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("无效查询: {0}")]
    InvalidQuery(String),
}

impl QueryError {
    /// 起点与终点相同
    pub fn same_endpoints(vid: impl std::fmt::Display) -> Self {
        QueryError::InvalidQuery(format!("起点与终点相同: {}", vid))
    }

    /// 步数超出范围
    pub fn steps_out_of_range(steps: usize, limit: usize) -> Self {
        QueryError::InvalidQuery(format!("步数 {} 超出允许范围 [1, {}]", steps, limit))
    }
}

impl ToPublicError for QueryError {
    fn to_error_code(&self) -> ErrorCode {
        match self {
            QueryError::InvalidQuery(_) => ErrorCode::ValidationError,
        }
    }

    fn to_public_message(&self) -> String {
        self.to_string()
    }
}
