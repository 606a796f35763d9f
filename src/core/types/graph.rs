// 图相关类型定义
//
// 路径查询用到的边方向与 OVER 子句

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 边的方向类型
///
/// 用于表示边的遍历方向，支持出边、入边和双向遍历
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    /// 出边：从源节点指向目标节点
    #[default]
    Out,
    /// 入边：从目标节点指向源节点（REVERSELY）
    In,
    /// 双向：同时包含出边和入边（BIDIRECT）
    Both,
}

impl EdgeDirection {
    /// 判断是否包含出边
    pub fn is_outgoing(&self) -> bool {
        matches!(self, EdgeDirection::Out | EdgeDirection::Both)
    }

    /// 判断是否包含入边
    pub fn is_incoming(&self) -> bool {
        matches!(self, EdgeDirection::In | EdgeDirection::Both)
    }

    /// 获取反向方向
    pub fn reverse(&self) -> Self {
        match self {
            EdgeDirection::Out => EdgeDirection::In,
            EdgeDirection::In => EdgeDirection::Out,
            EdgeDirection::Both => EdgeDirection::Both,
        }
    }
}

impl FromStr for EdgeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "out" | "outgoing" | "forward" => Ok(EdgeDirection::Out),
            "in" | "incoming" | "reversely" => Ok(EdgeDirection::In),
            "both" | "bidirect" | "bidirectional" => Ok(EdgeDirection::Both),
            other => Err(format!("未知的边方向: {}", other)),
        }
    }
}

/// OVER 子句：参与遍历的边类型与方向
///
/// 边类型为空表示所有边类型。正向扩展使用 `direction`，
/// 反向扩展使用其反方向。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverClause {
    pub edge_types: Vec<i32>,
    pub direction: EdgeDirection,
}

impl OverClause {
    pub fn new(edge_types: Vec<i32>, direction: EdgeDirection) -> Self {
        Self {
            edge_types,
            direction,
        }
    }

    /// 所有边类型，沿出边方向
    pub fn all() -> Self {
        Self::default()
    }

    /// 判断某个边类型（忽略符号）是否参与遍历
    pub fn accepts(&self, edge_type: i32) -> bool {
        self.edge_types.is_empty() || self.edge_types.contains(&edge_type.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_and_reverse() {
        assert_eq!("OUT".parse::<EdgeDirection>(), Ok(EdgeDirection::Out));
        assert_eq!("reversely".parse::<EdgeDirection>(), Ok(EdgeDirection::In));
        assert_eq!("bidirect".parse::<EdgeDirection>(), Ok(EdgeDirection::Both));
        assert!("sideways".parse::<EdgeDirection>().is_err());
        assert_eq!(EdgeDirection::Out.reverse(), EdgeDirection::In);
        assert_eq!(EdgeDirection::Both.reverse(), EdgeDirection::Both);
    }

    #[test]
    fn test_over_clause_accepts() {
        assert!(OverClause::all().accepts(42));
        let over = OverClause::new(vec![1, 2], EdgeDirection::Out);
        assert!(over.accepts(2));
        assert!(over.accepts(-1));
        assert!(!over.accepts(3));
    }
}
