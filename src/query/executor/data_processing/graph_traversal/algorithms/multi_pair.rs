//! 多对顶点协调
//!
//! 对起点集合与终点集合做去重后的笛卡尔积，每对顶点由独立的搜索状态机求解，
//! 驱动循环负责调用邻居扩展并把结果交回状态机。各对顶点可以并发执行，
//! 结果按组合顺序合并。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};

use crate::core::error::{DBError, DBResult, QueryError};
use crate::core::{Vertex, VertexId};
use crate::storage::{NeighborExpander, SearchDirection};

use super::cost_path_runner::CostPathRunner;
use super::pair_runner::PairRunner;
use super::traits::{PairSearch, PathQueryContext};
use super::types::{AlgorithmStats, PairStatus, PathKind, PendingCombinations, ResultRow};

/// 默认的步数上限
pub const DEFAULT_MAX_STEPS_LIMIT: usize = 64;

/// 一次多对查询的输出
#[derive(Debug, Clone, Default)]
pub struct CoordinatorOutput {
    /// 按组合顺序合并的结果行
    pub rows: Vec<ResultRow>,
    pub stats: AlgorithmStats,
    pub pairs: usize,
    /// 因达到结果上限而未合并的组合数
    pub cancelled: usize,
}

/// 驱动单对顶点直到终止
///
/// 每轮取出状态机的请求，调用协作方，再按先正向后反向的顺序交回结果。
/// 协作方的失败原样返回，不重试。
pub async fn drive_pair(
    runner: &mut dyn PairSearch,
    expander: &dyn NeighborExpander,
    ctx: &PathQueryContext,
    pipelined: bool,
) -> DBResult<()> {
    loop {
        let requests = runner.take_requests(pipelined);
        if requests.is_empty() {
            return Ok(());
        }

        let directions: Vec<SearchDirection> = requests.iter().map(|r| r.direction).collect();
        let calls = requests
            .into_iter()
            .map(|request| expander.expand_one_hop(ctx.expand_request(request)));
        let batches = futures::future::try_join_all(calls).await.map_err(|e| {
            let (src, dst) = runner.pair();
            log::error!("Neighbor expansion failed for pair ({}, {}): {}", src, dst, e);
            DBError::from(e)
        })?;
        metrics::counter!("graphdb_find_path_hops_total").increment(directions.len() as u64);

        let mut results: Vec<_> = directions.into_iter().zip(batches).collect();
        results.sort_by_key(|(direction, _)| *direction != SearchDirection::Forward);
        for (direction, batch) in results {
            runner.ingest_hop(direction, batch)?;
        }
    }
}

/// 多对顶点协调器
pub struct MultiPairCoordinator {
    expander: Arc<dyn NeighborExpander>,
    ctx: Arc<PathQueryContext>,
    max_steps_limit: usize,
    pipelined: bool,
    parallelism: usize,
}

impl std::fmt::Debug for MultiPairCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiPairCoordinator")
            .field("ctx", &self.ctx)
            .field("max_steps_limit", &self.max_steps_limit)
            .field("pipelined", &self.pipelined)
            .field("parallelism", &self.parallelism)
            .finish()
    }
}

impl MultiPairCoordinator {
    pub fn new(expander: Arc<dyn NeighborExpander>, ctx: Arc<PathQueryContext>) -> Self {
        Self {
            expander,
            ctx,
            max_steps_limit: DEFAULT_MAX_STEPS_LIMIT,
            pipelined: false,
            parallelism: 1,
        }
    }

    pub fn with_max_steps_limit(mut self, limit: usize) -> Self {
        self.max_steps_limit = limit;
        self
    }

    /// 同一轮的正反两个方向并发请求
    pub fn with_pipelining(mut self, pipelined: bool) -> Self {
        self.pipelined = pipelined;
        self
    }

    /// 同时驱动的组合数，至少为 1
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn context(&self) -> &Arc<PathQueryContext> {
        &self.ctx
    }

    /// 查询参数校验，在任何扩展之前完成
    pub fn validate(&self) -> DBResult<()> {
        if self.ctx.max_steps == 0 || self.ctx.max_steps > self.max_steps_limit {
            return Err(QueryError::steps_out_of_range(self.ctx.max_steps, self.max_steps_limit).into());
        }
        if self.ctx.kind == PathKind::WeightedShortest && self.ctx.cost_fn.is_none() {
            return Err(DBError::invalid_query("加权最短路径缺少代价函数"));
        }
        Ok(())
    }

    /// 去重后的笛卡尔积，保持输入顺序；起点与终点相同的组合直接报错
    pub fn build_pairs(
        sources: &[VertexId],
        destinations: &[VertexId],
    ) -> DBResult<Vec<(VertexId, VertexId)>> {
        let sources = dedup_preserving_order(sources);
        let destinations = dedup_preserving_order(destinations);

        let mut pairs = Vec::with_capacity(sources.len() * destinations.len());
        for src in &sources {
            for dst in &destinations {
                if src == dst {
                    return Err(QueryError::same_endpoints(src).into());
                }
                pairs.push((src.clone(), dst.clone()));
            }
        }
        Ok(pairs)
    }

    fn create_runner(
        &self,
        src: VertexId,
        dst: VertexId,
        pending: &Arc<PendingCombinations>,
    ) -> DBResult<Box<dyn PairSearch>> {
        let runner: Box<dyn PairSearch> = match self.ctx.kind {
            PathKind::WeightedShortest => Box::new(
                CostPathRunner::new(src, dst, self.ctx.clone())?.with_pending(pending.clone()),
            ),
            PathKind::Shortest | PathKind::AllPaths => Box::new(
                PairRunner::new(src, dst, self.ctx.clone())?.with_pending(pending.clone()),
            ),
        };
        Ok(runner)
    }

    pub async fn run(
        &self,
        sources: &[VertexId],
        destinations: &[VertexId],
    ) -> DBResult<CoordinatorOutput> {
        self.validate()?;
        let pairs = Self::build_pairs(sources, destinations)?;
        if pairs.is_empty() {
            return Ok(CoordinatorOutput::default());
        }

        let started = Instant::now();
        let pending = Arc::new(PendingCombinations::new());
        for (src, dst) in &pairs {
            pending.insert(src.clone(), dst.clone());
        }
        let total = pairs.len();
        let mut runners = Vec::with_capacity(total);
        for (src, dst) in pairs {
            runners.push(self.create_runner(src, dst, &pending)?);
        }

        log::info!(
            "Find {} path over {} pairs, up to {} steps (pipelined: {}, parallelism: {})",
            self.ctx.kind,
            total,
            self.ctx.max_steps,
            self.pipelined,
            self.parallelism
        );

        let mut drives: Vec<BoxFuture<'static, (usize, Box<dyn PairSearch>, DBResult<()>)>> =
            Vec::with_capacity(total);
        for (index, mut runner) in runners.into_iter().enumerate() {
            let expander = self.expander.clone();
            let ctx = self.ctx.clone();
            let pipelined = self.pipelined;
            drives.push(
                async move {
                    let result =
                        drive_pair(runner.as_mut(), expander.as_ref(), ctx.as_ref(), pipelined).await;
                    (index, runner, result)
                }
                .boxed(),
            );
        }
        let mut finished = stream::iter(drives).buffer_unordered(self.parallelism);

        let mut output = CoordinatorOutput {
            pairs: total,
            ..Default::default()
        };
        let mut parked: BTreeMap<usize, Box<dyn PairSearch>> = BTreeMap::new();
        let mut next_index = 0;

        while let Some((index, runner, result)) = finished.next().await {
            if let Err(e) = result {
                pending.clear();
                return Err(e);
            }
            parked.insert(index, runner);

            while let Some(runner) = parked.remove(&next_index) {
                output.stats.merge(runner.stats());
                if runner.status() == PairStatus::Cancelled {
                    output.cancelled += 1;
                }
                output.rows.extend(runner.into_rows());
                next_index += 1;
            }

            if let Some(limit) = self.ctx.limit {
                if output.rows.len() >= limit {
                    output.rows.truncate(limit);
                    pending.clear();
                    output.cancelled += total - next_index;
                    log::debug!(
                        "Row limit {} reached after {} of {} pairs",
                        limit,
                        next_index,
                        total
                    );
                    break;
                }
            }
        }

        if self.ctx.with_prop {
            self.attach_vertex_props(&mut output.rows).await?;
        }

        output
            .stats
            .set_execution_time(started.elapsed().as_millis() as u64);
        log::info!(
            "Find {} path finished: {} rows from {} pairs in {}ms",
            self.ctx.kind,
            output.rows.len(),
            total,
            output.stats.execution_time_ms
        );
        Ok(output)
    }
}

impl MultiPairCoordinator {
    /// 一次取回结果中出现的全部顶点，把属性填回每条路径
    async fn attach_vertex_props(&self, rows: &mut [ResultRow]) -> DBResult<()> {
        let mut seen = HashSet::new();
        let vids: Vec<VertexId> = rows
            .iter()
            .flat_map(|row| row.path.vertex_ids())
            .filter(|vid| seen.insert((*vid).clone()))
            .cloned()
            .collect();
        if vids.is_empty() {
            return Ok(());
        }

        let requested = vids.len();
        let vertices = self.expander.fetch_vertices(vids).await.map_err(|e| {
            log::error!("Fetching properties of {} path vertices failed: {}", requested, e);
            DBError::from(e)
        })?;
        log::debug!(
            "Fetched {} of {} path vertices with properties",
            vertices.len(),
            requested
        );

        let lookup: HashMap<VertexId, Vertex> = vertices
            .into_iter()
            .map(|vertex| (vertex.vid.clone(), vertex))
            .collect();
        for row in rows.iter_mut() {
            row.path.fill_vertices(&lookup);
        }
        Ok(())
    }
}

fn dedup_preserving_order(vids: &[VertexId]) -> Vec<VertexId> {
    let mut seen = HashSet::with_capacity(vids.len());
    vids.iter()
        .filter(|vid| seen.insert((*vid).clone()))
        .cloned()
        .collect()
}
