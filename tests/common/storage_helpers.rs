//! 测试扩展器与查询辅助
//!
//! - `RecordingExpander`：转发给内存图并记录每次请求
//! - `FailingExpander`：每次请求都返回同一个错误

use async_trait::async_trait;
use graphdb_path::core::error::{DBResult, StorageError, StorageResult};
use graphdb_path::core::{Vertex, VertexId};
use graphdb_path::query::executor::algorithms::{
    CoordinatorOutput, MultiPairCoordinator, PathQueryContext,
};
use graphdb_path::storage::{
    ExpandRequest, HopBatch, MemoryStorage, NeighborExpander, SearchDirection,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// 记录请求的扩展器
pub struct RecordingExpander {
    inner: Arc<MemoryStorage>,
    requests: Mutex<Vec<(SearchDirection, Vec<VertexId>)>>,
}

impl RecordingExpander {
    pub fn new(inner: Arc<MemoryStorage>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<(SearchDirection, Vec<VertexId>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl NeighborExpander for RecordingExpander {
    async fn expand_one_hop(&self, request: ExpandRequest) -> StorageResult<HopBatch> {
        self.requests
            .lock()
            .push((request.direction, request.frontier.clone()));
        self.inner.expand_one_hop(request).await
    }

    async fn fetch_vertices(&self, vids: Vec<VertexId>) -> StorageResult<Vec<Vertex>> {
        self.inner.fetch_vertices(vids).await
    }
}

/// 总是失败的扩展器
pub struct FailingExpander {
    error: StorageError,
}

impl FailingExpander {
    pub fn new(error: StorageError) -> Arc<Self> {
        Arc::new(Self { error })
    }
}

#[async_trait]
impl NeighborExpander for FailingExpander {
    async fn expand_one_hop(&self, _request: ExpandRequest) -> StorageResult<HopBatch> {
        Err(self.error.clone())
    }
}

/// 串行运行一次多对查询
pub async fn run_query(
    expander: Arc<dyn NeighborExpander>,
    ctx: PathQueryContext,
    sources: &[VertexId],
    destinations: &[VertexId],
) -> DBResult<CoordinatorOutput> {
    run_query_with(expander, ctx, sources, destinations, false, 1).await
}

pub async fn run_query_with(
    expander: Arc<dyn NeighborExpander>,
    ctx: PathQueryContext,
    sources: &[VertexId],
    destinations: &[VertexId],
    pipelined: bool,
    parallelism: usize,
) -> DBResult<CoordinatorOutput> {
    MultiPairCoordinator::new(expander, Arc::new(ctx))
        .with_pipelining(pipelined)
        .with_parallelism(parallelism)
        .run(sources, destinations)
        .await
}

/// 结果路径的文本形式
pub fn rendered(output: &CoordinatorOutput) -> Vec<String> {
    output.rows.iter().map(|row| row.path.to_string()).collect()
}
