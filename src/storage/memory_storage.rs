//! 内存图存储
//!
//! 以邻接表保存图，实现邻居扩展能力。用于命令行与测试，
//! 支持从 JSON 文件加载，并可注入故障以模拟分区不可用。

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::neighbor_expander::{ExpandRequest, HopBatch, Neighbor, NeighborExpander};
use crate::core::error::{StorageError, StorageResult};
use crate::core::{Edge, Value, Vertex, VertexId};

/// 注入的故障
#[derive(Debug, Clone, PartialEq)]
pub enum FaultKind {
    /// 整个请求失败
    Unavailable(String),
    /// 请求返回部分结果
    Partial { completeness: u8, failed_parts: Vec<u32> },
}

#[derive(Debug, Clone)]
struct FaultInjection {
    /// 前 `after_calls` 次请求正常返回
    after_calls: usize,
    kind: FaultKind,
}

#[derive(Debug, Default)]
struct GraphData {
    vertices: HashMap<VertexId, Vertex>,
    out_edges: HashMap<VertexId, Vec<Edge>>,
    in_edges: HashMap<VertexId, Vec<Edge>>,
    edge_count: usize,
}

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    vertices: Vec<VertexRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Deserialize)]
struct VertexRecord {
    vid: VertexId,
    #[serde(default)]
    props: serde_json::Map<String, serde_json::Value>,
}

fn default_edge_type() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    src: VertexId,
    dst: VertexId,
    #[serde(rename = "type", default = "default_edge_type")]
    edge_type: i32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    rank: i64,
    #[serde(default)]
    props: serde_json::Map<String, serde_json::Value>,
}

fn convert_props(props: &serde_json::Map<String, serde_json::Value>) -> HashMap<String, Value> {
    props
        .iter()
        .map(|(k, v)| (k.clone(), Value::from_json(v)))
        .collect()
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    graph: RwLock<GraphData>,
    fault: RwLock<Option<FaultInjection>>,
    calls: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本构建
    pub fn from_json_str(text: &str) -> StorageResult<Self> {
        let file: GraphFile = serde_json::from_str(text)?;
        let storage = Self::new();
        for record in &file.vertices {
            storage.insert_vertex(Vertex::with_props(
                record.vid.clone(),
                convert_props(&record.props),
            ));
        }
        for record in &file.edges {
            if record.edge_type == 0 {
                return Err(StorageError::ParseError(format!(
                    "边 {} -> {} 的类型不能为 0",
                    record.src, record.dst
                )));
            }
            storage.insert_edge(
                Edge::new(
                    record.src.clone(),
                    record.dst.clone(),
                    record.edge_type,
                    record.name.clone(),
                    record.rank,
                )
                .with_props(convert_props(&record.props)),
            );
        }
        log::info!(
            "Loaded graph with {} vertices and {} edges",
            storage.vertex_count(),
            storage.edge_count()
        );
        Ok(storage)
    }

    /// 从 JSON 文件加载
    pub fn load_json<P: AsRef<FsPath>>(path: P) -> StorageResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn insert_vertex(&self, vertex: Vertex) {
        self.graph.write().vertices.insert(vertex.vid.clone(), vertex);
    }

    /// 插入一条边，负类型按反向存储
    pub fn insert_edge(&self, edge: Edge) {
        let edge = if edge.edge_type < 0 { edge.reversed() } else { edge };
        let mut graph = self.graph.write();
        graph
            .out_edges
            .entry(edge.src.clone())
            .or_default()
            .push(edge.clone());
        graph.in_edges.entry(edge.dst.clone()).or_default().push(edge);
        graph.edge_count += 1;
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.read().vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.read().edge_count
    }

    /// 已处理的扩展请求次数（含失败的请求）
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 前 `after_calls` 次请求正常，此后按 `kind` 失败
    pub fn inject_fault(&self, after_calls: usize, kind: FaultKind) {
        *self.fault.write() = Some(FaultInjection { after_calls, kind });
    }

    pub fn clear_fault(&self) {
        *self.fault.write() = None;
    }

    fn expand_sync(&self, request: &ExpandRequest) -> Vec<Neighbor> {
        let graph = self.graph.read();
        let mut neighbors = Vec::new();

        for vid in &request.frontier {
            let mut oriented: Vec<Edge> = Vec::new();
            if request.edge_direction.is_outgoing() {
                if let Some(edges) = graph.out_edges.get(vid) {
                    oriented.extend(edges.iter().cloned());
                }
            }
            if request.edge_direction.is_incoming() {
                if let Some(edges) = graph.in_edges.get(vid) {
                    oriented.extend(edges.iter().map(Edge::reversed));
                }
            }

            for edge in oriented {
                if !request.accepts_type(edge.edge_type) {
                    continue;
                }
                if let Some(filter) = &request.edge_filter {
                    if !filter(&edge) {
                        continue;
                    }
                }
                if let Some(filter) = &request.vertex_filter {
                    let accepted = match graph.vertices.get(&edge.dst) {
                        Some(vertex) => filter(vertex),
                        None => filter(&Vertex::new(edge.dst.clone())),
                    };
                    if !accepted {
                        continue;
                    }
                }
                neighbors.push(Neighbor::new(edge));
            }
        }
        neighbors
    }
}

#[async_trait]
impl NeighborExpander for MemoryStorage {
    async fn expand_one_hop(&self, request: ExpandRequest) -> StorageResult<HopBatch> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let fault = self
            .fault
            .read()
            .clone()
            .filter(|fault| call >= fault.after_calls);

        match fault {
            Some(FaultInjection {
                kind: FaultKind::Unavailable(msg),
                ..
            }) => Err(StorageError::Unavailable(msg)),
            Some(FaultInjection {
                kind:
                    FaultKind::Partial {
                        completeness,
                        failed_parts,
                    },
                ..
            }) => {
                let mut neighbors = self.expand_sync(&request);
                let kept = neighbors.len() * completeness as usize / 100;
                neighbors.truncate(kept);
                Ok(HopBatch {
                    neighbors,
                    completeness,
                    failed_parts,
                })
            }
            None => Ok(HopBatch::complete(self.expand_sync(&request))),
        }
    }

    async fn fetch_vertices(&self, vids: Vec<VertexId>) -> StorageResult<Vec<Vertex>> {
        let graph = self.graph.read();
        Ok(vids
            .iter()
            .filter_map(|vid| graph.vertices.get(vid).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EdgeDirection, OverClause};
    use crate::storage::SearchDirection;
    use std::sync::Arc;

    fn storage() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.insert_edge(Edge::new(1, 2, 1, "like", 0));
        storage.insert_edge(Edge::new(3, 2, 1, "like", 0));
        storage.insert_edge(Edge::new(2, 4, 2, "follow", 0));
        storage
    }

    fn request(direction: SearchDirection, vid: i64, over: OverClause) -> ExpandRequest {
        ExpandRequest::new(direction, vec![VertexId::Int(vid)], &over)
    }

    #[tokio::test]
    async fn test_expand_out_and_in() {
        let storage = storage();

        let out = storage
            .expand_one_hop(request(SearchDirection::Forward, 2, OverClause::all()))
            .await
            .expect("expand");
        assert_eq!(out.len(), 1);
        assert_eq!(out.neighbors[0].neighbor, VertexId::Int(4));
        assert_eq!(out.neighbors[0].edge.edge_type, 2);

        // 反向搜索沿入边扩展，边类型取负
        let back = storage
            .expand_one_hop(request(SearchDirection::Backward, 2, OverClause::all()))
            .await
            .expect("expand");
        let neighbors: Vec<_> = back.neighbors.iter().map(|n| n.neighbor.clone()).collect();
        assert_eq!(neighbors, vec![VertexId::Int(1), VertexId::Int(3)]);
        assert!(back.neighbors.iter().all(|n| n.edge.edge_type == -1));
        assert!(back.neighbors.iter().all(|n| n.vid == VertexId::Int(2)));
        assert_eq!(storage.call_count(), 2);
    }

    #[tokio::test]
    async fn test_type_and_filters() {
        let storage = storage();
        let over = OverClause::new(vec![1], EdgeDirection::Both);
        let both = storage
            .expand_one_hop(request(SearchDirection::Forward, 2, over.clone()))
            .await
            .expect("expand");
        assert_eq!(both.len(), 2);

        let filtered = request(SearchDirection::Forward, 2, over).with_filters(
            Some(Arc::new(|v: &Vertex| v.vid != VertexId::Int(3))),
            None,
        );
        let batch = storage.expand_one_hop(filtered).await.expect("expand");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.neighbors[0].neighbor, VertexId::Int(1));
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let storage = storage();
        storage.inject_fault(1, FaultKind::Unavailable("part 7 offline".to_string()));
        assert!(storage
            .expand_one_hop(request(SearchDirection::Forward, 1, OverClause::all()))
            .await
            .is_ok());
        let err = storage
            .expand_one_hop(request(SearchDirection::Forward, 1, OverClause::all()))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::Unavailable("part 7 offline".to_string()));

        storage.inject_fault(
            0,
            FaultKind::Partial {
                completeness: 50,
                failed_parts: vec![2],
            },
        );
        let partial = storage
            .expand_one_hop(request(SearchDirection::Backward, 2, OverClause::all()))
            .await
            .expect("partial batch is still a batch");
        assert!(!partial.is_complete());
        assert_eq!(partial.len(), 1);

        storage.clear_fault();
        assert!(storage
            .expand_one_hop(request(SearchDirection::Forward, 1, OverClause::all()))
            .await
            .expect("expand")
            .is_complete());
    }

    #[tokio::test]
    async fn test_fetch_vertices_skips_unknown_ids() {
        let storage = MemoryStorage::new();
        storage.insert_vertex(Vertex::with_props(
            1,
            HashMap::from([("name".to_string(), Value::String("Tim".to_string()))]),
        ));
        let vertices = storage
            .fetch_vertices(vec![VertexId::Int(1), VertexId::Int(9)])
            .await
            .expect("fetch");
        assert_eq!(vertices.len(), 1);
        assert_eq!(
            vertices[0].get_property("name"),
            Some(&Value::String("Tim".to_string()))
        );
        // 取顶点不计入扩展次数
        assert_eq!(storage.call_count(), 0);
    }

    #[test]
    fn test_load_from_json() {
        let storage = MemoryStorage::from_json_str(
            r#"{
                "vertices": [{"vid": 1, "props": {"name": "Tim"}}],
                "edges": [
                    {"src": 1, "dst": 2, "type": 1, "name": "like", "rank": 0, "props": {"weight": 1.5}},
                    {"src": "a", "dst": "b"}
                ]
            }"#,
        )
        .expect("valid graph");
        assert_eq!(storage.vertex_count(), 1);
        assert_eq!(storage.edge_count(), 2);

        let bad = MemoryStorage::from_json_str(r#"{"edges": [{"src": 1, "dst": 2, "type": 0}]}"#);
        assert!(matches!(bad, Err(StorageError::ParseError(_))));
    }
}
