//! 单对顶点的加权最短路径
//!
//! 与 `PairRunner` 一样从两端交替扩展，但跳表记录的是每个顶点当前的最小累计代价。
//! 每轮只从上一轮代价有改进的顶点继续松弛；新到达的顶点与对侧已知顶点交汇时
//! 得到候选路径，只有代价严格更低的候选才会替换已记录的结果。
//! 当两侧剩余前沿的最小代价都不低于已记录结果时，该对顶点终止。
//!
//! 代价改进会影响另一侧已经做过的检查，因此两个方向从不并发扩展。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::core::error::{DBError, DBResult, QueryError, StorageError};
use crate::core::{Path, Step, VertexId};
use crate::storage::{HopBatch, Neighbor, SearchDirection};

use super::reconstruct::{PathFilter, PathReconstructor};
use super::traits::{CostFn, PairSearch, PathQueryContext};
use super::types::{
    AlgorithmStats, EdgeDedup, HopRequest, PairStatus, PathKind, PendingCombinations, ResultRow,
    RoundOutcome,
};

/// 到达某顶点的最小代价及所有同代价半路径
#[derive(Debug, Clone)]
struct CostEntry {
    cost: f64,
    paths: Vec<Path>,
}

/// 按首次插入顺序迭代的代价表
#[derive(Debug, Clone, Default)]
struct CostTable {
    entries: HashMap<VertexId, CostEntry>,
    order: Vec<VertexId>,
}

impl CostTable {
    fn get(&self, vid: &VertexId) -> Option<&CostEntry> {
        self.entries.get(vid)
    }

    fn contains(&self, vid: &VertexId) -> bool {
        self.entries.contains_key(vid)
    }

    fn put(&mut self, vid: VertexId, entry: CostEntry) {
        if !self.entries.contains_key(&vid) {
            self.order.push(vid.clone());
        }
        self.entries.insert(vid, entry);
    }

    fn vertices(&self) -> &[VertexId] {
        &self.order
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn min_cost(&self) -> Option<f64> {
        self.entries.values().map(|e| e.cost).reduce(f64::min)
    }
}

/// 一侧的搜索状态
#[derive(Debug)]
struct CostSide {
    /// 已知的最小代价，含起始顶点
    best: CostTable,
    /// 最近一轮代价有改进的顶点，即下一轮的前沿
    latest: CostTable,
    rounds: usize,
    cap: usize,
}

impl CostSide {
    fn new(root: &VertexId, cap: usize) -> Self {
        let mut seed = CostTable::default();
        seed.put(
            root.clone(),
            CostEntry {
                cost: 0.0,
                paths: vec![Path::from_vid(root.clone())],
            },
        );
        Self {
            best: seed.clone(),
            latest: seed,
            rounds: 0,
            cap,
        }
    }

    fn can_expand(&self) -> bool {
        self.rounds < self.cap && !self.latest.is_empty()
    }

    /// 还有可能改进 `best` 的前沿
    fn is_useful(&self, best: Option<f64>) -> bool {
        self.can_expand()
            && match (best, self.latest.min_cost()) {
                (Some(best), Some(min)) => min < best,
                _ => true,
            }
    }

    /// 以上一轮的前沿为源，用一批邻居松弛代价
    fn relax(
        &mut self,
        neighbors: Vec<Neighbor>,
        cost_fn: &CostFn,
        direction: SearchDirection,
    ) -> DBResult<()> {
        let sources = std::mem::take(&mut self.latest);
        let mut improved = CostTable::default();
        let mut dedup = EdgeDedup::new();

        for neighbor in neighbors {
            let Some(source) = sources.get(&neighbor.vid) else {
                log::warn!(
                    "Dropping {} hop entry {} -> {} not rooted in the frontier",
                    direction,
                    neighbor.vid,
                    neighbor.neighbor
                );
                continue;
            };
            if neighbor.edge.src != neighbor.vid || neighbor.edge.dst != neighbor.neighbor {
                log::warn!(
                    "Dropping {} hop entry with mismatched edge {} -> {}",
                    direction,
                    neighbor.edge.src,
                    neighbor.edge.dst
                );
                continue;
            }
            if !dedup.should_include(&neighbor.edge) {
                continue;
            }

            let edge_cost = cost_fn(&neighbor.edge);
            if edge_cost.is_nan() || edge_cost < 0.0 {
                return Err(QueryError::InvalidQuery(format!(
                    "边 {} -> {} 的代价 {} 无效，代价必须为非负数",
                    neighbor.edge.src, neighbor.edge.dst, edge_cost
                ))
                .into());
            }
            let total = source.cost + edge_cost;

            let step = Step::along(&neighbor.edge);
            let candidates: Vec<Path> = source
                .paths
                .iter()
                .filter(|p| !p.contains_vertex(&neighbor.neighbor))
                .map(|p| p.extended(step.clone()))
                .collect();
            if candidates.is_empty() {
                continue;
            }

            let known = self.best.get(&neighbor.neighbor).map(|e| e.cost);
            match known {
                Some(cost) if total > cost => {}
                Some(cost) if total == cost => {
                    // 同代价只在本轮刚改进过时合并
                    if !improved.contains(&neighbor.neighbor) {
                        continue;
                    }
                    let mut entry = improved
                        .get(&neighbor.neighbor)
                        .cloned()
                        .ok_or_else(|| DBError::internal("改进表与代价表不一致"))?;
                    for path in candidates {
                        if !entry.paths.contains(&path) {
                            entry.paths.push(path);
                        }
                    }
                    self.best.put(neighbor.neighbor.clone(), entry.clone());
                    improved.put(neighbor.neighbor, entry);
                }
                _ => {
                    let entry = CostEntry {
                        cost: total,
                        paths: candidates,
                    };
                    self.best.put(neighbor.neighbor.clone(), entry.clone());
                    improved.put(neighbor.neighbor, entry);
                }
            }
        }

        self.rounds += 1;
        self.latest = improved;
        Ok(())
    }
}

/// 已记录结果的代价和发现它的检查编号
#[derive(Debug, Clone, Copy)]
struct CostRecord {
    cost: f64,
    check_id: usize,
}

/// 单对顶点的加权最短路径搜索
pub struct CostPathRunner {
    src: VertexId,
    dst: VertexId,
    ctx: Arc<PathQueryContext>,
    cost_fn: CostFn,
    forward: CostSide,
    backward: CostSide,
    in_flight: Option<SearchDirection>,
    check_id: usize,
    record: Option<CostRecord>,
    status: PairStatus,
    filter: PathFilter,
    rows: Vec<ResultRow>,
    pending: Option<Arc<PendingCombinations>>,
    stats: AlgorithmStats,
    started: Instant,
}

impl std::fmt::Debug for CostPathRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostPathRunner")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("forward_rounds", &self.forward.rounds)
            .field("backward_rounds", &self.backward.rounds)
            .field("best_cost", &self.best_cost())
            .field("status", &self.status)
            .finish()
    }
}

impl CostPathRunner {
    pub fn new(src: VertexId, dst: VertexId, ctx: Arc<PathQueryContext>) -> DBResult<Self> {
        if src == dst {
            return Err(QueryError::same_endpoints(&src).into());
        }
        if ctx.max_steps == 0 {
            return Err(DBError::invalid_query("步数必须大于 0"));
        }
        if ctx.kind != PathKind::WeightedShortest {
            return Err(DBError::invalid_query(format!(
                "{} 路径不需要代价函数，应使用 PairRunner",
                ctx.kind
            )));
        }
        let cost_fn = ctx
            .cost_fn
            .clone()
            .ok_or_else(|| DBError::invalid_query("加权最短路径缺少代价函数"))?;

        Ok(Self {
            forward: CostSide::new(&src, ctx.forward_rounds()),
            backward: CostSide::new(&dst, ctx.backward_rounds()),
            in_flight: None,
            check_id: 0,
            record: None,
            status: PairStatus::Expanding,
            filter: PathFilter::new(ctx.no_loop),
            rows: Vec::new(),
            pending: None,
            stats: AlgorithmStats::new(),
            started: Instant::now(),
            cost_fn,
            src,
            dst,
            ctx,
        })
    }

    pub fn with_pending(mut self, pending: Arc<PendingCombinations>) -> Self {
        self.pending = Some(pending);
        self
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// 当前已记录结果的代价
    pub fn best_cost(&self) -> Option<f64> {
        self.record.map(|r| r.cost)
    }

    fn side(&self, direction: SearchDirection) -> &CostSide {
        match direction {
            SearchDirection::Forward => &self.forward,
            SearchDirection::Backward => &self.backward,
        }
    }

    fn finish(&mut self, status: PairStatus) {
        self.status = status;
        self.stats
            .set_execution_time(self.started.elapsed().as_millis() as u64);
        if let Some(pending) = &self.pending {
            pending.invalidate(&self.src, &self.dst);
        }
        log::debug!(
            "Weighted pair ({}, {}) finished as {:?}: best cost {:?}, {} rows",
            self.src,
            self.dst,
            status,
            self.best_cost(),
            self.rows.len()
        );
    }

    /// 两侧都不可能再改进结果时终止
    fn update_status(&mut self) {
        if self.status.is_terminal() || self.in_flight.is_some() {
            return;
        }
        let best = self.best_cost();
        if !self.forward.is_useful(best) && !self.backward.is_useful(best) {
            let status = if self.rows.is_empty() {
                PairStatus::Exhausted
            } else {
                PairStatus::Met
            };
            self.finish(status);
        }
    }

    /// 刚扩展的一侧与对侧已知顶点交汇的检查
    fn check(&mut self, fresh: SearchDirection) -> DBResult<(usize, usize)> {
        self.check_id += 1;
        let check_id = self.check_id;

        let (fresh_side, other_side) = match fresh {
            SearchDirection::Forward => (&self.forward, &self.backward),
            SearchDirection::Backward => (&self.backward, &self.forward),
        };
        let mut candidates = Vec::new();
        for vid in fresh_side.latest.vertices() {
            let (Some(fresh_entry), Some(other_entry)) =
                (fresh_side.latest.get(vid), other_side.best.get(vid))
            else {
                continue;
            };
            let total = fresh_entry.cost + other_entry.cost;
            let paths = match fresh {
                SearchDirection::Forward => {
                    PathReconstructor::stitch(&fresh_entry.paths, &other_entry.paths)?
                }
                SearchDirection::Backward => {
                    PathReconstructor::stitch(&other_entry.paths, &fresh_entry.paths)?
                }
            };
            candidates.push((vid.clone(), total, paths));
        }

        let meetings = candidates.len();
        self.stats.increment_meetings(meetings);
        let mut new_rows = 0;
        for (meet, total, paths) in candidates {
            log::debug!(
                "Weighted pair ({}, {}) check {}: meet at {} with cost {}",
                self.src,
                self.dst,
                check_id,
                meet,
                total
            );
            for path in paths {
                if self.offer(path, total, check_id) {
                    new_rows += 1;
                }
            }
        }
        Ok((new_rows, meetings))
    }

    /// 提交一条候选路径，返回是否成为结果
    fn offer(&mut self, path: Path, total: f64, check_id: usize) -> bool {
        if !self.filter.is_valid(&path) {
            return false;
        }
        match self.record {
            Some(record) if total > record.cost => false,
            Some(record) if total == record.cost => {
                // 首次发现者胜出，同一次检查内的等价路径一并输出
                if record.check_id != check_id || !self.filter.accept(&path) {
                    return false;
                }
                self.rows.push(ResultRow::weighted(path, total));
                true
            }
            _ => {
                self.record = Some(CostRecord { cost: total, check_id });
                self.rows.clear();
                self.filter.reset();
                self.filter.accept(&path);
                self.rows.push(ResultRow::weighted(path, total));
                true
            }
        }
    }
}

impl PairSearch for CostPathRunner {
    fn pair(&self) -> (&VertexId, &VertexId) {
        (&self.src, &self.dst)
    }

    fn status(&self) -> PairStatus {
        self.status
    }

    /// 始终最多返回一个请求，`pipelined` 被忽略
    fn take_requests(&mut self, _pipelined: bool) -> Vec<HopRequest> {
        if self.status.is_terminal() || self.in_flight.is_some() {
            return Vec::new();
        }
        if let Some(pending) = &self.pending {
            if !pending.contains(&self.src, &self.dst) {
                self.finish(PairStatus::Cancelled);
                return Vec::new();
            }
        }
        self.update_status();
        if self.status.is_terminal() {
            return Vec::new();
        }

        let best = self.best_cost();
        let forward_useful = self.forward.is_useful(best);
        let backward_useful = self.backward.is_useful(best);
        let direction = if forward_useful
            && (self.forward.rounds <= self.backward.rounds || !backward_useful)
        {
            SearchDirection::Forward
        } else {
            SearchDirection::Backward
        };

        self.in_flight = Some(direction);
        self.stats.increment_hop_requests();
        vec![HopRequest {
            direction,
            frontier: self.side(direction).latest.vertices().to_vec(),
        }]
    }

    fn ingest_hop(&mut self, direction: SearchDirection, batch: HopBatch) -> DBResult<RoundOutcome> {
        if self.status.is_terminal() {
            return Ok(RoundOutcome::idle(self.status));
        }
        if self.in_flight != Some(direction) {
            log::error!(
                "Weighted pair ({}, {}) received an unrequested {} hop",
                self.src,
                self.dst,
                direction
            );
            return Err(DBError::internal(format!(
                "收到未请求的 {} 扩展结果",
                direction
            )));
        }
        self.in_flight = None;

        if !batch.is_complete() {
            return Err(StorageError::PartialResult {
                completeness: batch.completeness,
                failed_parts: batch.failed_parts,
            }
            .into());
        }

        self.stats.increment_edges_received(batch.len());
        self.stats.increment_rounds();

        let side = match direction {
            SearchDirection::Forward => &mut self.forward,
            SearchDirection::Backward => &mut self.backward,
        };
        side.relax(batch.neighbors, &self.cost_fn, direction)?;
        let improved = side.latest.len();
        self.stats.increment_vertices_recorded(improved);
        log::debug!(
            "Weighted pair ({}, {}) {} round: {} vertices improved",
            self.src,
            self.dst,
            direction,
            improved
        );

        let (new_rows, meetings) = self.check(direction)?;
        self.update_status();
        Ok(RoundOutcome {
            status: self.status,
            new_rows,
            meetings,
        })
    }

    fn stats(&self) -> &AlgorithmStats {
        &self.stats
    }

    fn into_rows(self: Box<Self>) -> Vec<ResultRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Edge, Value};

    fn vid(id: i64) -> VertexId {
        VertexId::Int(id)
    }

    fn weight_ctx(steps: usize) -> Arc<PathQueryContext> {
        Arc::new(
            PathQueryContext::new(PathKind::WeightedShortest, steps).with_cost_fn(Arc::new(
                |e: &Edge| e.get_property("w").and_then(Value::as_f64).unwrap_or(1.0),
            )),
        )
    }

    fn weighted(src: i64, dst: i64, edge_type: i32, w: f64) -> Edge {
        Edge::new(src, dst, edge_type, "e", 0)
            .with_props(HashMap::from([("w".to_string(), Value::Float(w))]))
    }

    fn batch(edges: Vec<Edge>) -> HopBatch {
        HopBatch::complete(edges.into_iter().map(Neighbor::new).collect())
    }

    /// 依次响应请求，直到终止
    fn drive(runner: &mut CostPathRunner, graph: &[Edge]) {
        loop {
            let requests = runner.take_requests(true);
            if requests.is_empty() {
                break;
            }
            assert_eq!(requests.len(), 1);
            let request = &requests[0];
            let edges: Vec<Edge> = graph
                .iter()
                .flat_map(|e| {
                    let oriented = match request.direction {
                        SearchDirection::Forward => e.clone(),
                        SearchDirection::Backward => e.reversed(),
                    };
                    request
                        .frontier
                        .contains(&oriented.src)
                        .then_some(oriented)
                })
                .collect();
            runner
                .ingest_hop(request.direction, batch(edges))
                .expect("ingest");
        }
    }

    #[test]
    fn test_cheaper_longer_path_wins() {
        let graph = vec![
            weighted(1, 2, 1, 1.0),
            weighted(2, 3, 1, 1.0),
            weighted(1, 3, 1, 5.0),
        ];
        let mut runner = CostPathRunner::new(vid(1), vid(3), weight_ctx(3)).expect("runner");
        drive(&mut runner, &graph);

        assert_eq!(runner.status(), PairStatus::Met);
        assert_eq!(runner.best_cost(), Some(2.0));
        assert_eq!(runner.rows().len(), 1);
        assert_eq!(
            runner.rows()[0].path.vertex_ids().cloned().collect::<Vec<_>>(),
            vec![vid(1), vid(2), vid(3)]
        );
        assert_eq!(runner.rows()[0].cost, Some(2.0));
    }

    #[test]
    fn test_step_budget_limits_weighted_search() {
        let graph = vec![
            weighted(1, 2, 1, 1.0),
            weighted(2, 3, 1, 1.0),
            weighted(1, 3, 1, 5.0),
        ];
        let mut runner = CostPathRunner::new(vid(1), vid(3), weight_ctx(1)).expect("runner");
        drive(&mut runner, &graph);
        assert_eq!(runner.best_cost(), Some(5.0));
        assert_eq!(runner.rows()[0].path.len(), 1);
    }

    #[test]
    fn test_equal_cost_paths_in_same_check_are_both_kept() {
        let graph = vec![weighted(1, 2, 1, 2.0), {
            let mut e = weighted(1, 2, 1, 2.0);
            e.ranking = 1;
            e
        }];
        let mut runner = CostPathRunner::new(vid(1), vid(2), weight_ctx(2)).expect("runner");
        drive(&mut runner, &graph);
        assert_eq!(runner.rows().len(), 2);
        assert!(runner.rows().iter().all(|r| r.cost == Some(2.0)));
    }

    #[test]
    fn test_unreachable_pair_is_exhausted() {
        let graph = vec![weighted(1, 2, 1, 1.0)];
        let mut runner = CostPathRunner::new(vid(1), vid(9), weight_ctx(4)).expect("runner");
        drive(&mut runner, &graph);
        assert_eq!(runner.status(), PairStatus::Exhausted);
        assert!(runner.rows().is_empty());
    }

    #[test]
    fn test_negative_cost_is_rejected() {
        let mut runner = CostPathRunner::new(vid(1), vid(2), weight_ctx(2)).expect("runner");
        let requests = runner.take_requests(false);
        assert_eq!(requests[0].direction, SearchDirection::Forward);
        let err = runner
            .ingest_hop(SearchDirection::Forward, batch(vec![weighted(1, 2, 1, -1.0)]))
            .unwrap_err();
        assert!(matches!(err, DBError::Query(QueryError::InvalidQuery(_))));
    }

    #[test]
    fn test_requires_cost_function() {
        let ctx = Arc::new(PathQueryContext::new(PathKind::WeightedShortest, 2));
        assert!(CostPathRunner::new(vid(1), vid(2), ctx).is_err());
        assert!(CostPathRunner::new(vid(1), vid(1), weight_ctx(2)).is_err());
    }

    #[test]
    fn test_never_more_than_one_request() {
        let mut runner = CostPathRunner::new(vid(1), vid(5), weight_ctx(4)).expect("runner");
        assert_eq!(runner.take_requests(true).len(), 1);
        assert!(runner.take_requests(true).is_empty());
        assert!(runner
            .ingest_hop(SearchDirection::Backward, batch(vec![]))
            .is_err());
    }
}
