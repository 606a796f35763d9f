//! 单对顶点的双向 BFS
//!
//! 正向从起点、反向从终点交替扩展，每封存一步就按奇偶顺序检查交汇，
//! 交汇后从两侧跳历史重建路径。
//!
//! 步数预算 L 拆分为正向 ⌈L/2⌉ 轮、反向 ⌊L/2⌋ 轮。任一方向不会领先另一方向
//! 超过一轮，因此两个方向的请求可以并发发出，检查按固定深度进行，结果与串行一致。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::core::error::{DBError, DBResult, QueryError, StorageError};
use crate::core::VertexId;
use crate::storage::{HopBatch, SearchDirection};

use super::hop_table::{HopEntry, HopHistory, HopTable};
use super::meeting::{MeetingDetector, ParityCheck};
use super::reconstruct::{PathFilter, PathReconstructor};
use super::traits::{PairSearch, PathQueryContext};
use super::types::{
    AlgorithmStats, EdgeDedup, HopRequest, PairStatus, PathKind, PendingCombinations, ResultRow,
    RoundOutcome,
};

/// 单对顶点的搜索状态机
pub struct PairRunner {
    src: VertexId,
    dst: VertexId,
    ctx: Arc<PathQueryContext>,
    forward: HopHistory,
    backward: HopHistory,
    /// 最短路径模式下每个方向已到达的顶点
    forward_visited: HashSet<VertexId>,
    backward_visited: HashSet<VertexId>,
    /// 每个方向最多扩展的轮数，一侧无路可走时收紧
    forward_cap: usize,
    backward_cap: usize,
    forward_in_flight: bool,
    backward_in_flight: bool,
    next_check: ParityCheck,
    status: PairStatus,
    filter: PathFilter,
    rows: Vec<ResultRow>,
    pending: Option<Arc<PendingCombinations>>,
    stats: AlgorithmStats,
    started: Instant,
}

impl std::fmt::Debug for PairRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairRunner")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("kind", &self.ctx.kind)
            .field("forward_depth", &self.forward.depth())
            .field("backward_depth", &self.backward.depth())
            .field("next_check", &self.next_check)
            .field("status", &self.status)
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl PairRunner {
    pub fn new(src: VertexId, dst: VertexId, ctx: Arc<PathQueryContext>) -> DBResult<Self> {
        if src == dst {
            return Err(QueryError::same_endpoints(&src).into());
        }
        if ctx.max_steps == 0 {
            return Err(DBError::invalid_query("步数必须大于 0"));
        }
        if ctx.kind == PathKind::WeightedShortest {
            return Err(DBError::invalid_query("加权最短路径需要代价函数，应使用 CostPathRunner"));
        }

        let forward_cap = ctx.forward_rounds();
        let backward_cap = ctx.backward_rounds();
        Ok(Self {
            forward: HopHistory::new(src.clone()),
            backward: HopHistory::new(dst.clone()),
            forward_visited: HashSet::from([src.clone()]),
            backward_visited: HashSet::from([dst.clone()]),
            forward_cap,
            backward_cap,
            forward_in_flight: false,
            backward_in_flight: false,
            next_check: ParityCheck::first(),
            status: PairStatus::Expanding,
            filter: PathFilter::new(ctx.no_loop),
            rows: Vec::new(),
            pending: None,
            stats: AlgorithmStats::new(),
            started: Instant::now(),
            src,
            dst,
            ctx,
        })
    }

    /// 共享的待处理组合表，终止时从中移除本对顶点
    pub fn with_pending(mut self, pending: Arc<PendingCombinations>) -> Self {
        self.pending = Some(pending);
        self
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn forward_history(&self) -> &HopHistory {
        &self.forward
    }

    pub fn backward_history(&self) -> &HopHistory {
        &self.backward
    }

    fn can_request(&self, direction: SearchDirection) -> bool {
        let (fwd, bwd) = (self.forward.depth(), self.backward.depth());
        match direction {
            SearchDirection::Forward => !self.forward_in_flight && fwd < self.forward_cap && fwd <= bwd,
            SearchDirection::Backward => {
                !self.backward_in_flight && bwd < self.backward_cap && bwd <= fwd
            }
        }
    }

    fn request(&mut self, direction: SearchDirection) -> HopRequest {
        let frontier = match direction {
            SearchDirection::Forward => {
                self.forward_in_flight = true;
                self.forward.frontier()
            }
            SearchDirection::Backward => {
                self.backward_in_flight = true;
                self.backward.frontier()
            }
        };
        self.stats.increment_hop_requests();
        HopRequest {
            direction,
            frontier,
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
            "Pair ({}, {}) finished as {:?}: {} rows, forward depth {}, backward depth {}",
            self.src,
            self.dst,
            status,
            self.rows.len(),
            self.forward.depth(),
            self.backward.depth()
        );
    }

    fn limit_reached(&self) -> bool {
        self.ctx.limit.is_some_and(|limit| self.rows.len() >= limit)
    }

    /// 一侧封存了空表：该侧不再扩展，另一侧只保留还能参与检查的轮数
    fn tighten_caps(&mut self, direction: SearchDirection, depth: usize) {
        match direction {
            SearchDirection::Forward => {
                self.forward_cap = self.forward_cap.min(depth);
                self.backward_cap = self.backward_cap.min(depth.saturating_sub(1));
            }
            SearchDirection::Backward => {
                self.backward_cap = self.backward_cap.min(depth);
                self.forward_cap = self.forward_cap.min(depth);
            }
        }
        log::debug!(
            "Pair ({}, {}): {} frontier empty at depth {}, caps now {}/{}",
            self.src,
            self.dst,
            direction,
            depth,
            self.forward_cap,
            self.backward_cap
        );
    }

    /// 运行所有已就绪的检查，返回 (新结果行数, 交汇顶点数)
    fn run_checks(&mut self) -> DBResult<(usize, usize)> {
        let mut new_rows = 0;
        let mut meetings = 0;

        while !self.status.is_terminal() && self.next_check.is_ready(&self.forward, &self.backward) {
            let check = self.next_check;
            self.next_check = check.next(self.ctx.max_steps);

            let met = MeetingDetector::detect_at(check, &self.forward, &self.backward)?;
            if met.is_empty() {
                continue;
            }
            meetings += met.len();
            self.stats.increment_meetings(met.len());
            log::debug!(
                "Pair ({}, {}) {:?}: {} meeting vertices {:?}",
                self.src,
                self.dst,
                check,
                met.len(),
                met
            );

            let mut accepted = 0;
            for meet in &met {
                let paths = PathReconstructor::reconstruct(
                    meet,
                    &self.forward,
                    check.forward_depth(),
                    &self.backward,
                    check.backward_depth(),
                )
                .map_err(|e| {
                    log::error!(
                        "Path reconstruction failed for pair ({}, {}) at {:?}, meeting vertex {}: {}",
                        self.src,
                        self.dst,
                        check,
                        meet,
                        e
                    );
                    e
                })?;
                for path in paths {
                    if self.filter.accept(&path) {
                        self.rows.push(ResultRow::unweighted(path));
                        accepted += 1;
                    }
                }
            }
            new_rows += accepted;

            if accepted > 0 && self.ctx.kind.stops_on_meeting() {
                self.finish(PairStatus::Met);
            } else if self.limit_reached() {
                self.finish(PairStatus::Met);
            }
        }
        Ok((new_rows, meetings))
    }
}

/// 把一批扩展结果整理成新的跳表
///
/// 丢弃来源不在前沿中的记录、重复边；最短路径模式下还丢弃已访问过的顶点。
fn build_hop_table(
    kind: PathKind,
    latest: &HopTable,
    visited: &HashSet<VertexId>,
    batch: HopBatch,
    direction: SearchDirection,
) -> HopTable {
    let mut dedup = EdgeDedup::new();
    let mut table = HopTable::new();
    for neighbor in batch.neighbors {
        if !latest.contains(&neighbor.vid)
            || neighbor.edge.src != neighbor.vid
            || neighbor.edge.dst != neighbor.neighbor
        {
            log::warn!(
                "Dropping {} hop entry {} -> {} not rooted in the frontier",
                direction,
                neighbor.vid,
                neighbor.neighbor
            );
            continue;
        }
        if !dedup.should_include(&neighbor.edge) {
            continue;
        }
        if kind == PathKind::Shortest && visited.contains(&neighbor.neighbor) {
            continue;
        }
        table.insert(neighbor.neighbor, HopEntry::via(neighbor.edge));
    }
    table
}

impl PairSearch for PairRunner {
    fn pair(&self) -> (&VertexId, &VertexId) {
        (&self.src, &self.dst)
    }

    fn status(&self) -> PairStatus {
        self.status
    }

    fn take_requests(&mut self, pipelined: bool) -> Vec<HopRequest> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        if let Some(pending) = &self.pending {
            if !pending.contains(&self.src, &self.dst) {
                self.finish(PairStatus::Cancelled);
                return Vec::new();
            }
        }

        let mut requests = Vec::with_capacity(2);
        if self.can_request(SearchDirection::Forward) {
            requests.push(self.request(SearchDirection::Forward));
        }
        if (pipelined || requests.is_empty()) && self.can_request(SearchDirection::Backward) {
            requests.push(self.request(SearchDirection::Backward));
        }

        if requests.is_empty() && !self.forward_in_flight && !self.backward_in_flight {
            let status = if self.rows.is_empty() || !self.ctx.kind.stops_on_meeting() {
                PairStatus::Exhausted
            } else {
                PairStatus::Met
            };
            self.finish(status);
        }
        requests
    }

    fn ingest_hop(&mut self, direction: SearchDirection, batch: HopBatch) -> DBResult<RoundOutcome> {
        if self.status.is_terminal() {
            log::debug!(
                "Pair ({}, {}) already {:?}, ignoring late {} hop",
                self.src,
                self.dst,
                self.status,
                direction
            );
            return Ok(RoundOutcome::idle(self.status));
        }

        let in_flight = match direction {
            SearchDirection::Forward => &mut self.forward_in_flight,
            SearchDirection::Backward => &mut self.backward_in_flight,
        };
        if !*in_flight {
            log::error!(
                "Pair ({}, {}) received an unrequested {} hop (depths {}/{})",
                self.src,
                self.dst,
                direction,
                self.forward.depth(),
                self.backward.depth()
            );
            return Err(DBError::internal(format!(
                "收到未请求的{}扩展结果",
                match direction {
                    SearchDirection::Forward => "正向",
                    SearchDirection::Backward => "反向",
                }
            )));
        }
        *in_flight = false;

        if !batch.is_complete() {
            return Err(StorageError::PartialResult {
                completeness: batch.completeness,
                failed_parts: batch.failed_parts,
            }
            .into());
        }

        self.stats.increment_edges_received(batch.len());
        self.stats.increment_rounds();

        let kind = self.ctx.kind;
        let (history, visited) = match direction {
            SearchDirection::Forward => (&mut self.forward, &mut self.forward_visited),
            SearchDirection::Backward => (&mut self.backward, &mut self.backward_visited),
        };
        let table = build_hop_table(kind, history.latest(), visited, batch, direction);
        if kind == PathKind::Shortest {
            visited.extend(table.vertices().iter().cloned());
        }
        let empty = table.is_empty();
        self.stats.increment_vertices_recorded(table.len());
        history.seal(table);
        let depth = history.depth();

        log::debug!(
            "Pair ({}, {}) sealed {} step {}: {} vertices",
            self.src,
            self.dst,
            direction,
            depth,
            if direction == SearchDirection::Forward {
                self.forward.latest().len()
            } else {
                self.backward.latest().len()
            }
        );

        if empty {
            self.tighten_caps(direction, depth);
        }

        let (new_rows, meetings) = self.run_checks()?;
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
