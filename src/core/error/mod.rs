//! 统一错误处理系统
//!
//! ## 分层
//!
//! - `QueryError`：查询参数与执行错误，`InvalidQuery` 即用户输入错误
//! - `StorageError`：邻居扩展协作方返回的错误
//! - `DBError::Internal`：算法内部不变量被破坏，属于逻辑缺陷
//!
//! `DBResult<T>` 是统一的返回类型，`DBError::kind()` 给出错误归类。

use thiserror::Error;

pub mod codes;
pub mod query;
pub mod storage;

pub use codes::{ErrorCategory, ErrorCode, PublicError, ToPublicError};
pub use query::QueryError;
pub use storage::{StorageError, StorageResult};

/// 统一的数据库错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DBError {
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("查询错误: {0}")]
    Query(#[from] QueryError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误归类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 用户输入错误，在任何扩展请求之前报告
    UserInput,
    /// 协作方失败，整个查询失败
    Collaborator,
    /// 内部不变量违反
    Internal,
    Other,
}

/// 统一的结果类型
pub type DBResult<T> = Result<T, DBError>;

impl DBError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DBError::Query(QueryError::InvalidQuery(_)) => ErrorKind::UserInput,
            DBError::Storage(_) => ErrorKind::Collaborator,
            DBError::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::Other,
        }
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        DBError::Query(QueryError::InvalidQuery(msg.into()))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DBError::Internal(msg.into())
    }
}

// ==================== 对外错误转换实现 ====================

impl ToPublicError for DBError {
    fn to_error_code(&self) -> ErrorCode {
        match self {
            DBError::Storage(se) => se.to_error_code(),
            DBError::Query(qe) => qe.to_error_code(),
            DBError::Config(_) => ErrorCode::InvalidInput,
            DBError::Io(_) => ErrorCode::InternalError,
            DBError::Internal(_) => ErrorCode::InternalError,
        }
    }

    fn to_public_message(&self) -> String {
        match self {
            // 内部错误不暴露细节
            DBError::Internal(_) => "内部服务器错误".to_string(),
            DBError::Io(_) => "IO操作失败".to_string(),
            DBError::Storage(se) => se.to_public_message(),
            _ => self.to_string(),
        }
    }
}

// ==================== 外部错误转换实现 ====================

impl From<std::io::Error> for DBError {
    fn from(err: std::io::Error) -> Self {
        DBError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DBError {
    fn from(err: serde_json::Error) -> Self {
        DBError::Storage(StorageError::ParseError(err.to_string()))
    }
}

impl From<toml::de::Error> for DBError {
    fn from(err: toml::de::Error) -> Self {
        DBError::Config(err.to_string())
    }
}
