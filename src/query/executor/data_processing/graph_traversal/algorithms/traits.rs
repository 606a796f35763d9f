//! 路径算法 trait 定义
//!
//! 单对顶点搜索的统一接口，以及查询上下文

use std::fmt;
use std::sync::Arc;

use super::types::{AlgorithmStats, HopRequest, PairStatus, ResultRow, RoundOutcome};
use crate::core::error::DBResult;
use crate::core::{Edge, OverClause, VertexId};
use crate::storage::{EdgeFilter, ExpandRequest, HopBatch, SearchDirection, VertexFilter};

use super::types::PathKind;

/// 边代价函数，加权最短路径使用
pub type CostFn = Arc<dyn Fn(&Edge) -> f64 + Send + Sync>;

/// 单对顶点的增量搜索
///
/// 搜索本身不做 I/O：驱动方用 `take_requests` 取出需要的扩展，
/// 调用协作方后把结果交给 `ingest_hop`，直到没有新的请求。
pub trait PairSearch: Send {
    /// (起点, 终点)
    fn pair(&self) -> (&VertexId, &VertexId);

    fn status(&self) -> PairStatus;

    /// 取出当前可以发出的扩展请求，并标记为进行中
    ///
    /// `pipelined` 为 true 时可能同时返回正反两个方向的请求。
    /// 返回空表示该对顶点已进入终止状态。
    fn take_requests(&mut self, pipelined: bool) -> Vec<HopRequest>;

    /// 接收一个方向的一跳扩展结果
    fn ingest_hop(&mut self, direction: SearchDirection, batch: HopBatch) -> DBResult<RoundOutcome>;

    fn stats(&self) -> &AlgorithmStats;

    /// 交出已接受的结果行
    fn into_rows(self: Box<Self>) -> Vec<ResultRow>;
}

/// 路径查询上下文
///
/// 一次多对查询的所有参数，所有对顶点共享
#[derive(Clone)]
pub struct PathQueryContext {
    pub kind: PathKind,
    /// 路径最大长度（跳数）
    pub max_steps: usize,
    /// 是否禁止重复经过同一顶点
    pub no_loop: bool,
    pub over: OverClause,
    pub vertex_filter: Option<VertexFilter>,
    pub edge_filter: Option<EdgeFilter>,
    pub cost_fn: Option<CostFn>,
    /// 结果行数上限
    pub limit: Option<usize>,
    /// 结果路径上的顶点附带属性
    pub with_prop: bool,
}

impl fmt::Debug for PathQueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathQueryContext")
            .field("kind", &self.kind)
            .field("max_steps", &self.max_steps)
            .field("no_loop", &self.no_loop)
            .field("over", &self.over)
            .field("has_vertex_filter", &self.vertex_filter.is_some())
            .field("has_edge_filter", &self.edge_filter.is_some())
            .field("has_cost_fn", &self.cost_fn.is_some())
            .field("limit", &self.limit)
            .field("with_prop", &self.with_prop)
            .finish()
    }
}

impl PathQueryContext {
    pub fn new(kind: PathKind, max_steps: usize) -> Self {
        Self {
            kind,
            max_steps,
            no_loop: false,
            over: OverClause::all(),
            vertex_filter: None,
            edge_filter: None,
            cost_fn: None,
            limit: None,
            with_prop: false,
        }
    }

    pub fn with_no_loop(mut self, no_loop: bool) -> Self {
        self.no_loop = no_loop;
        self
    }

    pub fn with_over(mut self, over: OverClause) -> Self {
        self.over = over;
        self
    }

    pub fn with_vertex_filter(mut self, filter: VertexFilter) -> Self {
        self.vertex_filter = Some(filter);
        self
    }

    pub fn with_edge_filter(mut self, filter: EdgeFilter) -> Self {
        self.edge_filter = Some(filter);
        self
    }

    pub fn with_cost_fn(mut self, cost_fn: CostFn) -> Self {
        self.cost_fn = Some(cost_fn);
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_props(mut self, with_prop: bool) -> Self {
        self.with_prop = with_prop;
        self
    }

    /// 正向最多扩展的轮数：⌈L/2⌉
    pub fn forward_rounds(&self) -> usize {
        (self.max_steps + 1) / 2
    }

    /// 反向最多扩展的轮数：⌊L/2⌋
    pub fn backward_rounds(&self) -> usize {
        self.max_steps / 2
    }

    /// 把搜索请求转换为协作方请求，附带过滤条件
    pub fn expand_request(&self, request: HopRequest) -> ExpandRequest {
        ExpandRequest::new(request.direction, request.frontier, &self.over)
            .with_filters(self.vertex_filter.clone(), self.edge_filter.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EdgeDirection;

    #[test]
    fn test_round_budget_split() {
        let ctx = PathQueryContext::new(PathKind::Shortest, 5);
        assert_eq!(ctx.forward_rounds(), 3);
        assert_eq!(ctx.backward_rounds(), 2);

        let ctx = PathQueryContext::new(PathKind::Shortest, 1);
        assert_eq!(ctx.forward_rounds(), 1);
        assert_eq!(ctx.backward_rounds(), 0);
    }

    #[test]
    fn test_expand_request_carries_filters() {
        let ctx = PathQueryContext::new(PathKind::AllPaths, 3)
            .with_over(OverClause::new(vec![7], EdgeDirection::In))
            .with_edge_filter(Arc::new(|e: &Edge| e.ranking == 0));
        let request = ctx.expand_request(HopRequest {
            direction: SearchDirection::Backward,
            frontier: vec![VertexId::Int(9)],
        });
        assert_eq!(request.edge_direction, EdgeDirection::Out);
        assert_eq!(request.edge_types, vec![7]);
        assert!(request.edge_filter.is_some());
        assert!(request.vertex_filter.is_none());
    }
}
