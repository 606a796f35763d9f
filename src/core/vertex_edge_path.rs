use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::error::{DBError, DBResult};
use crate::core::value::{Value, VertexId};

// 对于HashMap，按键排序后逐对哈希
fn hash_props<H: Hasher>(props: &HashMap<String, Value>, state: &mut H) {
    let mut pairs: Vec<_> = props.iter().collect();
    pairs.sort_by_key(|&(k, _)| k);
    for (k, v) in pairs {
        k.hash(state);
        v.hash(state);
    }
}

/// Represents a vertex in a path. Only the id takes part in traversal; properties are carried for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vertex {
    pub vid: VertexId,
    #[serde(default)]
    pub props: HashMap<String, Value>,
}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vid.hash(state);
        hash_props(&self.props, state);
    }
}

impl Vertex {
    pub fn new(vid: impl Into<VertexId>) -> Self {
        Self {
            vid: vid.into(),
            props: HashMap::new(),
        }
    }

    pub fn with_props(vid: impl Into<VertexId>, props: HashMap<String, Value>) -> Self {
        Self {
            vid: vid.into(),
            props,
        }
    }

    pub fn vid(&self) -> &VertexId {
        &self.vid
    }

    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.props.is_empty() {
            return write!(f, "({})", self.vid);
        }
        let mut pairs: Vec<_> = self.props.iter().collect();
        pairs.sort_by_key(|&(k, _)| k);
        write!(f, "({} {{", self.vid)?;
        for (i, (k, v)) in pairs.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}})")
    }
}

/// An edge as returned by neighbor expansion, oriented from the frontier vertex.
///
/// `edge_type` is signed: positive when the stored direction was followed,
/// negated when the edge was walked against its stored direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    pub src: VertexId,
    pub dst: VertexId,
    pub edge_type: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ranking: i64,
    #[serde(default)]
    pub props: HashMap<String, Value>,
}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.src.hash(state);
        self.dst.hash(state);
        self.edge_type.hash(state);
        self.ranking.hash(state);
        hash_props(&self.props, state);
    }
}

impl Edge {
    pub fn new(
        src: impl Into<VertexId>,
        dst: impl Into<VertexId>,
        edge_type: i32,
        name: impl Into<String>,
        ranking: i64,
    ) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            edge_type,
            name: name.into(),
            ranking,
            props: HashMap::new(),
        }
    }

    pub fn with_props(mut self, props: HashMap<String, Value>) -> Self {
        self.props = props;
        self
    }

    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// The same physical edge seen from its other endpoint.
    pub fn reversed(&self) -> Edge {
        Edge {
            src: self.dst.clone(),
            dst: self.src.clone(),
            edge_type: -self.edge_type,
            name: self.name.clone(),
            ranking: self.ranking,
            props: self.props.clone(),
        }
    }

    /// Normalized key, equal for an edge and its reverse.
    pub fn key(&self) -> EdgeKey {
        if self.edge_type < 0 {
            EdgeKey {
                src: self.dst.clone(),
                dst: self.src.clone(),
                edge_type: -self.edge_type,
                ranking: self.ranking,
            }
        } else {
            EdgeKey {
                src: self.src.clone(),
                dst: self.dst.clone(),
                edge_type: self.edge_type,
                ranking: self.ranking,
            }
        }
    }
}

/// Identity of a physical edge in its stored direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub src: VertexId,
    pub dst: VertexId,
    pub edge_type: i32,
    pub ranking: i64,
}

/// Whether a step followed the stored direction of its edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalDirection {
    Forward,
    Reverse,
}

impl TraversalDirection {
    pub fn flip(self) -> Self {
        match self {
            TraversalDirection::Forward => TraversalDirection::Reverse,
            TraversalDirection::Reverse => TraversalDirection::Forward,
        }
    }
}

/// One hop of a path: the edge just traversed and the vertex arrived at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub dst: Vertex,
    /// Always positive; the walking direction lives in `direction`.
    pub edge_type: i32,
    pub edge_name: String,
    pub ranking: i64,
    pub direction: TraversalDirection,
    #[serde(default)]
    pub props: HashMap<String, Value>,
}

impl Hash for Step {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dst.hash(state);
        self.edge_type.hash(state);
        self.edge_name.hash(state);
        self.ranking.hash(state);
        self.direction.hash(state);
        hash_props(&self.props, state);
    }
}

impl Step {
    /// Builds the step that walks `edge` from its `src` to its `dst`.
    ///
    /// A self-loop reads the same either way and is always `Forward`.
    pub fn along(edge: &Edge) -> Self {
        let direction = if edge.edge_type < 0 && edge.src != edge.dst {
            TraversalDirection::Reverse
        } else {
            TraversalDirection::Forward
        };
        Self {
            dst: Vertex::new(edge.dst.clone()),
            edge_type: edge.edge_type.abs(),
            edge_name: edge.name.clone(),
            ranking: edge.ranking,
            direction,
            props: edge.props.clone(),
        }
    }

    /// Key of the traversed edge, given the vertex the step started from.
    pub fn edge_key(&self, from: &VertexId) -> EdgeKey {
        let (src, dst) = match self.direction {
            TraversalDirection::Forward => (from.clone(), self.dst.vid.clone()),
            TraversalDirection::Reverse => (self.dst.vid.clone(), from.clone()),
        };
        EdgeKey {
            src,
            dst,
            edge_type: self.edge_type,
            ranking: self.ranking,
        }
    }
}

/// Represents a path in the graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Path {
    pub src: Vertex,
    pub steps: Vec<Step>,
}

// 手动实现Hash以处理复杂类型的Hash
impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.src.hash(state);
        for step in &self.steps {
            step.hash(state);
        }
    }
}

impl Path {
    pub fn new(src: Vertex) -> Self {
        Self {
            src,
            steps: Vec::new(),
        }
    }

    pub fn from_vid(vid: impl Into<VertexId>) -> Self {
        Self::new(Vertex::new(vid))
    }

    /// 终点：无步骤时为起点，否则为最后一步到达的顶点
    pub fn dst(&self) -> &Vertex {
        self.steps.last().map(|s| &s.dst).unwrap_or(&self.src)
    }

    pub fn dst_vid(&self) -> &VertexId {
        &self.dst().vid
    }

    /// 获取路径长度（步骤数）
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// 检查路径是否为空（仅包含源顶点）
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 返回追加一步后的新路径
    pub fn extended(&self, step: Step) -> Path {
        let mut path = self.clone();
        path.steps.push(step);
        path
    }

    /// 反向路径：步骤顺序颠倒，每一步的遍历方向翻转（自环保持原方向）
    pub fn reverse(&self) -> Path {
        let mut vertices: Vec<&Vertex> = Vec::with_capacity(self.steps.len() + 1);
        vertices.push(&self.src);
        vertices.extend(self.steps.iter().map(|s| &s.dst));

        let steps = self
            .steps
            .iter()
            .enumerate()
            .rev()
            .map(|(i, step)| Step {
                dst: vertices[i].clone(),
                edge_type: step.edge_type,
                edge_name: step.edge_name.clone(),
                ranking: step.ranking,
                direction: if vertices[i].vid == step.dst.vid {
                    step.direction
                } else {
                    step.direction.flip()
                },
                props: step.props.clone(),
            })
            .collect();

        Path {
            src: self.dst().clone(),
            steps,
        }
    }

    /// 拼接路径，要求 `self` 的终点与 `other` 的起点相同
    pub fn append(&mut self, other: Path) -> DBResult<()> {
        if self.dst_vid() != &other.src.vid {
            return Err(DBError::internal(format!(
                "路径拼接端点不匹配: {} 的终点不是 {}",
                self, other.src
            )));
        }
        self.steps.extend(other.steps);
        Ok(())
    }

    /// 依次经过的顶点ID，包括起点
    pub fn vertex_ids(&self) -> impl Iterator<Item = &VertexId> {
        std::iter::once(&self.src.vid).chain(self.steps.iter().map(|s| &s.dst.vid))
    }

    pub fn contains_vertex(&self, vid: &VertexId) -> bool {
        self.vertex_ids().any(|v| v == vid)
    }

    /// 每一步所经过边的规范化键
    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        let mut keys = Vec::with_capacity(self.steps.len());
        let mut from = &self.src.vid;
        for step in &self.steps {
            keys.push(step.edge_key(from));
            from = &step.dst.vid;
        }
        keys
    }

    /// 是否两次经过同一条物理边（正反两个方向视为同一条）
    pub fn has_duplicate_edges(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.steps.len());
        self.edge_keys().into_iter().any(|key| !seen.insert(key))
    }

    /// 是否重复经过同一个顶点
    pub fn has_duplicate_vertices(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.steps.len() + 1);
        self.vertex_ids().any(|vid| !seen.insert(vid))
    }

    /// 用查到的顶点替换路径上的同ID顶点，查不到的保持原样
    pub fn fill_vertices(&mut self, vertices: &HashMap<VertexId, Vertex>) {
        if let Some(vertex) = vertices.get(&self.src.vid) {
            self.src = vertex.clone();
        }
        for step in &mut self.steps {
            if let Some(vertex) = vertices.get(&step.dst.vid) {
                step.dst = vertex.clone();
            }
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.src)?;
        for step in &self.steps {
            let label = if step.edge_name.is_empty() {
                step.edge_type.to_string()
            } else {
                step.edge_name.clone()
            };
            match step.direction {
                TraversalDirection::Forward => {
                    write!(f, "-[:{}@{}]->{}", label, step.ranking, step.dst)?
                }
                TraversalDirection::Reverse => {
                    write!(f, "<-[:{}@{}]-{}", label, step.ranking, step.dst)?
                }
            }
        }
        write!(f, ">")
    }
}
