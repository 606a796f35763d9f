//! FindPathExecutor - 路径查找执行器
//!
//! 对应 `FIND SHORTEST | ALL | WEIGHTED SHORTEST PATH FROM ... TO ... OVER ... UPTO n STEPS`。
//! 把查询参数交给多对协调器，并把结果整理成数据集。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PathConfig;
use crate::core::error::{DBError, DBResult};
use crate::core::{DataSet, VertexId};
use crate::query::executor::base::{BaseExecutor, ExecutionResult, Executor, ExecutorStats};
use crate::storage::NeighborExpander;

use super::algorithms::{
    AlgorithmStats, MultiPairCoordinator, PathQueryContext, DEFAULT_MAX_STEPS_LIMIT,
};

/// 路径查找执行器
pub struct FindPathExecutor {
    base: BaseExecutor,
    expander: Arc<dyn NeighborExpander>,
    sources: Vec<VertexId>,
    destinations: Vec<VertexId>,
    ctx: Arc<PathQueryContext>,
    col_names: Option<Vec<String>>,
    max_steps_limit: usize,
    pipelined: bool,
    parallelism: usize,
    algorithm_stats: AlgorithmStats,
}

impl std::fmt::Debug for FindPathExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindPathExecutor")
            .field("base", &self.base)
            .field("sources", &self.sources)
            .field("destinations", &self.destinations)
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl FindPathExecutor {
    pub fn new(
        id: i64,
        expander: Arc<dyn NeighborExpander>,
        sources: Vec<VertexId>,
        destinations: Vec<VertexId>,
        ctx: PathQueryContext,
    ) -> Self {
        let description = format!("Find {} path", ctx.kind);
        Self {
            base: BaseExecutor::new(id, "FindPathExecutor").with_description(description),
            expander,
            sources,
            destinations,
            ctx: Arc::new(ctx),
            col_names: None,
            max_steps_limit: DEFAULT_MAX_STEPS_LIMIT,
            pipelined: false,
            parallelism: 1,
            algorithm_stats: AlgorithmStats::new(),
        }
    }

    /// 覆盖默认列名
    pub fn with_columns(mut self, col_names: Vec<String>) -> Self {
        self.col_names = Some(col_names);
        self
    }

    /// 应用步数上限、并发和流水线配置；查询自身的结果上限优先
    pub fn with_config(mut self, config: &PathConfig) -> Self {
        self.max_steps_limit = config.max_steps_limit;
        self.pipelined = config.pipeline_directions;
        self.parallelism = config.resolved_parallelism();
        if self.ctx.limit.is_none() && config.default_limit.is_some() {
            let ctx = (*self.ctx).clone().with_limit(config.default_limit);
            self.ctx = Arc::new(ctx);
        }
        self
    }

    /// 最近一次执行的算法统计
    pub fn algorithm_stats(&self) -> &AlgorithmStats {
        &self.algorithm_stats
    }

    fn columns(&self) -> DBResult<Vec<String>> {
        let defaults = self.ctx.kind.default_columns();
        match &self.col_names {
            None => Ok(defaults),
            Some(names) if names.len() == defaults.len() => Ok(names.clone()),
            Some(names) => Err(DBError::invalid_query(format!(
                "{} 路径查询需要 {} 列，实际给出 {} 列",
                self.ctx.kind,
                defaults.len(),
                names.len()
            ))),
        }
    }

    async fn find_paths(&mut self) -> DBResult<DataSet> {
        let columns = self.columns()?;
        let coordinator = MultiPairCoordinator::new(self.expander.clone(), self.ctx.clone())
            .with_max_steps_limit(self.max_steps_limit)
            .with_pipelining(self.pipelined)
            .with_parallelism(self.parallelism);
        let output = coordinator.run(&self.sources, &self.destinations).await?;

        let width = columns.len();
        let mut dataset = DataSet::with_columns(columns);
        for row in &output.rows {
            dataset.add_row(row.to_values(width));
        }

        let stats = self.base.get_stats_mut();
        stats.add_row(dataset.row_count());
        stats.add_batch(output.stats.hop_requests);
        stats.add_stat("pairs", output.pairs);
        stats.add_stat("cancelled_pairs", output.cancelled);
        stats.add_stat("rounds", output.stats.rounds);
        stats.add_stat("meetings", output.stats.meetings);
        stats.add_stat("vertices_recorded", output.stats.vertices_recorded);
        stats.add_stat("edges_received", output.stats.edges_received);
        self.algorithm_stats = output.stats;
        Ok(dataset)
    }
}

#[async_trait]
impl Executor for FindPathExecutor {
    async fn execute(&mut self) -> DBResult<ExecutionResult> {
        let start = Instant::now();
        let kind = self.ctx.kind.to_string();
        metrics::counter!("graphdb_find_path_queries_total", "kind" => kind.clone()).increment(1);

        let result = self.find_paths().await;
        self.base.get_stats_mut().add_exec_time(start.elapsed());
        self.base.get_stats_mut().add_total_time(start.elapsed());

        match result {
            Ok(dataset) => {
                metrics::counter!("graphdb_find_path_rows_total", "kind" => kind)
                    .increment(dataset.row_count() as u64);
                log::info!(
                    "{} (id {}) returned {} rows: {}",
                    self.base.name,
                    self.base.id,
                    dataset.row_count(),
                    self.base.get_stats().to_formatted_string()
                );
                Ok(ExecutionResult::DataSet(dataset))
            }
            Err(e) => {
                metrics::counter!(
                    "graphdb_find_path_errors_total",
                    "kind" => kind,
                    "error_kind" => format!("{:?}", e.kind())
                )
                .increment(1);
                log::warn!("{} (id {}) failed: {}", self.base.name, self.base.id, e);
                Err(e)
            }
        }
    }

    fn open(&mut self) -> DBResult<()> {
        self.base.open()
    }

    fn close(&mut self) -> DBResult<()> {
        self.base.close()
    }

    fn is_open(&self) -> bool {
        self.base.is_open()
    }

    fn id(&self) -> i64 {
        self.base.id
    }

    fn name(&self) -> &str {
        "FindPathExecutor"
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn stats(&self) -> &ExecutorStats {
        self.base.get_stats()
    }

    fn stats_mut(&mut self) -> &mut ExecutorStats {
        self.base.get_stats_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Edge, Value};
    use crate::query::executor::data_processing::graph_traversal::algorithms::PathKind;
    use crate::storage::MemoryStorage;

    fn graph() -> Arc<MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.insert_edge(Edge::new(1, 2, 1, "like", 0));
        storage.insert_edge(Edge::new(2, 3, 1, "like", 0));
        Arc::new(storage)
    }

    #[tokio::test]
    async fn test_execute_returns_path_dataset() {
        let ctx = PathQueryContext::new(PathKind::Shortest, 3);
        let mut executor = FindPathExecutor::new(
            1,
            graph(),
            vec![VertexId::Int(1)],
            vec![VertexId::Int(3)],
            ctx,
        );
        executor.open().expect("open");
        let result = executor.execute().await.expect("execute");
        let dataset = result.into_dataset();
        assert_eq!(dataset.col_names, vec!["path".to_string()]);
        assert_eq!(dataset.row_count(), 1);
        match &dataset.rows[0][0] {
            Value::Path(path) => assert_eq!(path.to_string(), "<(1)-[:like@0]->(2)-[:like@0]->(3)>"),
            other => panic!("expected a path, got {:?}", other),
        }
        assert_eq!(executor.stats().num_rows, 1);
        assert!(executor.algorithm_stats().hop_requests >= 1);
    }

    #[tokio::test]
    async fn test_column_count_must_match_kind() {
        let ctx = PathQueryContext::new(PathKind::Shortest, 3);
        let mut executor = FindPathExecutor::new(
            1,
            graph(),
            vec![VertexId::Int(1)],
            vec![VertexId::Int(3)],
            ctx,
        )
        .with_columns(vec!["p".to_string(), "c".to_string()]);
        assert!(matches!(
            executor.execute().await,
            Err(DBError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_config_limit_applies_when_query_has_none() {
        let config = PathConfig {
            default_limit: Some(0),
            ..PathConfig::default()
        };
        let ctx = PathQueryContext::new(PathKind::AllPaths, 3);
        let mut executor = FindPathExecutor::new(
            1,
            graph(),
            vec![VertexId::Int(1)],
            vec![VertexId::Int(3)],
            ctx,
        )
        .with_config(&config);
        let result = executor.execute().await.expect("execute");
        assert_eq!(result.count(), 0);
    }
}
