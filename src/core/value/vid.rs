//! 顶点ID类型
//!
//! 顶点ID只允许整数或字符串两种形式，相等性与哈希在此处统一定义，
//! 所有以顶点ID为键的映射（跳表、访问集合、代价表）都依赖这里的实现。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::Value;

/// 顶点ID
///
/// 整数ID与字符串ID互不相等：`VertexId::Int(1) != VertexId::String("1")`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VertexId {
    Int(i64),
    String(String),
}

impl VertexId {
    /// 从命令行或配置中的文本解析顶点ID，能解析为整数的按整数处理
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => VertexId::Int(id),
            Err(_) => VertexId::String(trimmed.trim_matches('"').to_string()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            VertexId::Int(id) => Some(*id),
            VertexId::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VertexId::Int(_) => None,
            VertexId::String(s) => Some(s.as_str()),
        }
    }

    /// 转换为通用 Value
    pub fn to_value(&self) -> Value {
        match self {
            VertexId::Int(id) => Value::Int(*id),
            VertexId::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexId::Int(id) => write!(f, "{}", id),
            VertexId::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for VertexId {
    fn from(id: i64) -> Self {
        VertexId::Int(id)
    }
}

impl From<i32> for VertexId {
    fn from(id: i32) -> Self {
        VertexId::Int(id as i64)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        VertexId::String(s.to_string())
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        VertexId::String(s)
    }
}

impl TryFrom<&Value> for VertexId {
    type Error = String;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(id) => Ok(VertexId::Int(*id)),
            Value::String(s) => Ok(VertexId::String(s.clone())),
            other => Err(format!("无法将 {:?} 用作顶点ID", other)),
        }
    }
}
