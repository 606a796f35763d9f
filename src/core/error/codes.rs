//! 对外错误码定义
//!
//! 错误码格式: XXYY
//! - XX: 错误类别 (00=成功, 03=验证, 05=资源, 09=系统)
//! - YY: 具体错误

use serde::{Deserialize, Serialize};

/// 对外错误码 - 用于命令行与调用方的错误响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ErrorCode {
    #[default]
    Success = 0,

    // ==================== 验证错误 (03xx) ====================
    /// 查询参数不合法（步数越界、起点等于终点、代价无效）
    ValidationError = 300,
    /// 输入无法解析（图文件、配置、过滤条件）
    InvalidInput = 302,

    // ==================== 资源错误 (05xx) ====================
    /// 存储分区不可达
    ResourceUnavailable = 502,
    /// 邻居扩展只返回了部分结果
    PartialResult = 503,

    // ==================== 系统错误 (09xx) ====================
    InternalError = 900,
    Unknown = 999,
}

impl ErrorCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::Success),
            300 => Some(ErrorCode::ValidationError),
            302 => Some(ErrorCode::InvalidInput),
            502 => Some(ErrorCode::ResourceUnavailable),
            503 => Some(ErrorCode::PartialResult),
            900 => Some(ErrorCode::InternalError),
            999 => Some(ErrorCode::Unknown),
            _ => None,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_i32() {
            0 => ErrorCategory::Success,
            300..=399 => ErrorCategory::Validation,
            500..=599 => ErrorCategory::Resource,
            900..=999 => ErrorCategory::System,
            _ => ErrorCategory::Unknown,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "成功",
            ErrorCode::ValidationError => "查询参数无效",
            ErrorCode::InvalidInput => "无效输入",
            ErrorCode::ResourceUnavailable => "存储不可用",
            ErrorCode::PartialResult => "邻居扩展结果不完整",
            ErrorCode::InternalError => "内部错误",
            ErrorCode::Unknown => "未知错误",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.default_message())
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Success,
    Validation,
    Resource,
    System,
    Unknown,
}

impl ErrorCategory {
    /// 命令行退出码映射
    pub fn to_exit_code(&self) -> i32 {
        match self {
            ErrorCategory::Success => 0,
            ErrorCategory::Validation => 2,
            ErrorCategory::Resource => 3,
            ErrorCategory::System | ErrorCategory::Unknown => 1,
        }
    }
}

/// 对外错误信息：错误码与不含内部细节的消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicError {
    pub code: ErrorCode,
    pub message: String,
}

impl PublicError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn with_default_message(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }
}

/// 内部错误到对外错误的转换，对外消息不带内部细节
pub trait ToPublicError {
    fn to_public_error(&self) -> PublicError {
        PublicError::new(self.to_error_code(), self.to_public_message())
    }

    fn to_error_code(&self) -> ErrorCode;

    fn to_public_message(&self) -> String;
}
