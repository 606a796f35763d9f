//! 存储层错误类型
//!
//! 邻居扩展协作方返回的错误。路径查询不对这些错误做重试，
//! 任何一次扩展失败都会终止整个多对查询。

use thiserror::Error;

use crate::core::error::codes::{ErrorCode, ToPublicError};

/// 存储层结果类型
pub type StorageResult<T> = Result<T, StorageError>;

/// 存储层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("部分结果: 完成度 {completeness}%，失败分区 {failed_parts:?}")]
    PartialResult {
        completeness: u8,
        failed_parts: Vec<u32>,
    },
    #[error("存储不可用: {0}")]
    Unavailable(String),
    #[error("IO错误: {0}")]
    IOError(String),
    #[error("解析错误: {0}")]
    ParseError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::ParseError(e.to_string())
    }
}

impl ToPublicError for StorageError {
    fn to_error_code(&self) -> ErrorCode {
        match self {
            StorageError::PartialResult { .. } => ErrorCode::PartialResult,
            StorageError::Unavailable(_) => ErrorCode::ResourceUnavailable,
            StorageError::ParseError(_) => ErrorCode::InvalidInput,
            StorageError::IOError(_) => ErrorCode::InternalError,
        }
    }

    fn to_public_message(&self) -> String {
        match self {
            StorageError::PartialResult { completeness, .. } => {
                format!("邻居扩展未完成，完成度 {}%", completeness)
            }
            StorageError::Unavailable(msg) => format!("存储不可用: {}", msg),
            StorageError::ParseError(msg) => format!("图数据解析失败: {}", msg),
            StorageError::IOError(_) => "存储操作失败".to_string(),
        }
    }
}
