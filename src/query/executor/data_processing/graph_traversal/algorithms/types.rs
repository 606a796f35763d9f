//! 路径算法共享类型定义
//!
//! 包含各路径算法使用的共享数据结构

use dashmap::DashSet;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::core::{Edge, EdgeKey, Path, Value, VertexId};
use crate::storage::SearchDirection;

/// 单批扩展结果中的重复边去重
///
/// 双向扩展时同一条边会从两个端点各返回一次，自环边在出边和入边中各出现一次。
/// 以 (到达顶点, 规范化边键) 判重，同一物理边从不同端点到达不同顶点时各自保留。
#[derive(Debug, Default)]
pub struct EdgeDedup {
    seen: HashSet<(VertexId, EdgeKey)>,
}

impl EdgeDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回 true 表示首次出现，应当保留
    pub fn should_include(&mut self, edge: &Edge) -> bool {
        self.seen.insert((edge.dst.clone(), edge.key()))
    }
}

/// 算法统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlgorithmStats {
    /// 记录进跳表的顶点数
    pub vertices_recorded: usize,
    /// 协作方返回的边数
    pub edges_received: usize,
    /// 发出的扩展请求数
    pub hop_requests: usize,
    /// 已完成的单方向扩展轮数
    pub rounds: usize,
    /// 交汇顶点数
    pub meetings: usize,
    pub execution_time_ms: u64,
}

impl AlgorithmStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_vertices_recorded(&mut self, count: usize) {
        self.vertices_recorded += count;
    }

    pub fn increment_edges_received(&mut self, count: usize) {
        self.edges_received += count;
    }

    pub fn increment_hop_requests(&mut self) {
        self.hop_requests += 1;
    }

    pub fn increment_rounds(&mut self) {
        self.rounds += 1;
    }

    pub fn increment_meetings(&mut self, count: usize) {
        self.meetings += count;
    }

    pub fn set_execution_time(&mut self, time_ms: u64) {
        self.execution_time_ms = time_ms;
    }

    /// 汇总另一组统计
    pub fn merge(&mut self, other: &AlgorithmStats) {
        self.vertices_recorded += other.vertices_recorded;
        self.edges_received += other.edges_received;
        self.hop_requests += other.hop_requests;
        self.rounds += other.rounds;
        self.meetings += other.meetings;
        self.execution_time_ms += other.execution_time_ms;
    }
}

/// 路径查询类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// 每对顶点之间所有最短（跳数最少）路径
    Shortest,
    /// 步数上限内满足约束的所有路径
    AllPaths,
    /// 每对顶点之间累计代价最小的路径
    WeightedShortest,
}

impl PathKind {
    /// 结果表默认列名
    pub fn default_columns(&self) -> Vec<String> {
        match self {
            PathKind::WeightedShortest => vec!["path".to_string(), "cost".to_string()],
            _ => vec!["path".to_string()],
        }
    }

    /// 找到交汇后是否停止该对顶点的搜索
    pub fn stops_on_meeting(&self) -> bool {
        !matches!(self, PathKind::AllPaths)
    }
}

impl FromStr for PathKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shortest" => Ok(PathKind::Shortest),
            "all" | "all_paths" => Ok(PathKind::AllPaths),
            "weighted" | "weighted_shortest" => Ok(PathKind::WeightedShortest),
            other => Err(format!("不支持的路径类型: {}", other)),
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::Shortest => write!(f, "SHORTEST"),
            PathKind::AllPaths => write!(f, "ALL"),
            PathKind::WeightedShortest => write!(f, "WEIGHTED SHORTEST"),
        }
    }
}

/// 单对顶点的搜索状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairStatus {
    Expanding,
    /// 已找到结果并停止
    Met,
    /// 步数预算耗尽或两侧无法继续扩展
    Exhausted,
    /// 被协调器取消（例如结果数达到上限）
    Cancelled,
}

impl PairStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PairStatus::Expanding)
    }
}

/// 一次 `ingest_hop` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub status: PairStatus,
    /// 本次新接受的结果行数
    pub new_rows: usize,
    /// 本次发现的交汇顶点数
    pub meetings: usize,
}

impl RoundOutcome {
    pub fn idle(status: PairStatus) -> Self {
        Self {
            status,
            new_rows: 0,
            meetings: 0,
        }
    }
}

/// 交给驱动方执行的扩展请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopRequest {
    pub direction: SearchDirection,
    pub frontier: Vec<VertexId>,
}

/// 结果行：一条路径，加权查询附带总代价
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub path: Path,
    pub cost: Option<f64>,
}

impl ResultRow {
    pub fn unweighted(path: Path) -> Self {
        Self { path, cost: None }
    }

    pub fn weighted(path: Path, cost: f64) -> Self {
        Self {
            path,
            cost: Some(cost),
        }
    }

    /// 按列数展开成结果表的一行
    pub fn to_values(&self, columns: usize) -> Vec<Value> {
        let mut row = vec![Value::Path(Box::new(self.path.clone()))];
        if columns > 1 {
            row.push(match self.cost {
                Some(cost) => Value::Float(cost),
                None => Value::Empty,
            });
        }
        row
    }
}

/// 尚未解决的 (起点, 终点) 组合表
///
/// 协调器在开始时填充，各对顶点在终止时移除自己；
/// 协调器取消查询时清空整表，仍在运行的搜索据此停止请求扩展。
#[derive(Debug, Default)]
pub struct PendingCombinations {
    pairs: DashSet<(VertexId, VertexId)>,
}

impl PendingCombinations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, src: VertexId, dst: VertexId) -> bool {
        self.pairs.insert((src, dst))
    }

    pub fn contains(&self, src: &VertexId, dst: &VertexId) -> bool {
        self.pairs.contains(&(src.clone(), dst.clone()))
    }

    /// 移除一个组合，返回它此前是否仍待处理
    pub fn invalidate(&self, src: &VertexId, dst: &VertexId) -> bool {
        self.pairs.remove(&(src.clone(), dst.clone())).is_some()
    }

    pub fn clear(&self) {
        self.pairs.clear();
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
