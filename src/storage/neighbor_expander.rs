//! 邻居扩展接口
//!
//! 路径查询对存储层的唯一依赖：给定一批顶点，返回它们一跳之内的邻居。
//! 过滤条件对引擎不透明，由存储层自行求值。

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::core::error::StorageResult;
use crate::core::{Edge, EdgeDirection, OverClause, Vertex, VertexId};

/// 顶点过滤条件，作用于邻居顶点
pub type VertexFilter = Arc<dyn Fn(&Vertex) -> bool + Send + Sync>;

/// 边过滤条件，作用于已按遍历方向定向的边
pub type EdgeFilter = Arc<dyn Fn(&Edge) -> bool + Send + Sync>;

/// 搜索方向：正向从起点出发，反向从终点出发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    pub fn opposite(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }

    /// 该方向上实际遍历的边方向
    pub fn edge_direction(self, over: &OverClause) -> EdgeDirection {
        match self {
            SearchDirection::Forward => over.direction,
            SearchDirection::Backward => over.direction.reverse(),
        }
    }
}

impl fmt::Display for SearchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDirection::Forward => write!(f, "forward"),
            SearchDirection::Backward => write!(f, "backward"),
        }
    }
}

/// 一次邻居扩展请求
#[derive(Clone)]
pub struct ExpandRequest {
    pub direction: SearchDirection,
    pub frontier: Vec<VertexId>,
    pub edge_types: Vec<i32>,
    /// 已经按搜索方向换算过的边方向
    pub edge_direction: EdgeDirection,
    pub vertex_filter: Option<VertexFilter>,
    pub edge_filter: Option<EdgeFilter>,
}

impl ExpandRequest {
    pub fn new(direction: SearchDirection, frontier: Vec<VertexId>, over: &OverClause) -> Self {
        Self {
            direction,
            frontier,
            edge_types: over.edge_types.clone(),
            edge_direction: direction.edge_direction(over),
            vertex_filter: None,
            edge_filter: None,
        }
    }

    pub fn with_filters(
        mut self,
        vertex_filter: Option<VertexFilter>,
        edge_filter: Option<EdgeFilter>,
    ) -> Self {
        self.vertex_filter = vertex_filter;
        self.edge_filter = edge_filter;
        self
    }

    /// 边类型（忽略符号）是否在请求范围内
    pub fn accepts_type(&self, edge_type: i32) -> bool {
        self.edge_types.is_empty() || self.edge_types.contains(&edge_type.abs())
    }
}

impl fmt::Debug for ExpandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpandRequest")
            .field("direction", &self.direction)
            .field("frontier", &self.frontier)
            .field("edge_types", &self.edge_types)
            .field("edge_direction", &self.edge_direction)
            .field("has_vertex_filter", &self.vertex_filter.is_some())
            .field("has_edge_filter", &self.edge_filter.is_some())
            .finish()
    }
}

/// 扩展结果中的一条记录：`edge` 从 `vid` 指向 `neighbor`
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub vid: VertexId,
    pub edge: Edge,
    pub neighbor: VertexId,
}

impl Neighbor {
    pub fn new(edge: Edge) -> Self {
        Self {
            vid: edge.src.clone(),
            neighbor: edge.dst.clone(),
            edge,
        }
    }
}

/// 一跳扩展结果
#[derive(Debug, Clone, PartialEq)]
pub struct HopBatch {
    pub neighbors: Vec<Neighbor>,
    /// 完成度百分比，小于 100 表示有分区失败
    pub completeness: u8,
    pub failed_parts: Vec<u32>,
}

impl HopBatch {
    pub fn complete(neighbors: Vec<Neighbor>) -> Self {
        Self {
            neighbors,
            completeness: 100,
            failed_parts: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completeness >= 100
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// 邻居扩展能力
///
/// 失败时返回错误；部分成功以 `completeness < 100` 表示。引擎不重试。
#[async_trait]
pub trait NeighborExpander: Send + Sync {
    async fn expand_one_hop(&self, request: ExpandRequest) -> StorageResult<HopBatch>;

    /// 按ID取顶点及其属性，仅在查询要求附带属性时调用
    ///
    /// 返回的顶点可以少于请求，缺失的顶点在路径中保持无属性。
    async fn fetch_vertices(&self, vids: Vec<VertexId>) -> StorageResult<Vec<Vertex>> {
        Ok(vids.into_iter().map(Vertex::new).collect())
    }
}
