//! 测试数据生成模块
//!
//! 提供测试图和查询上下文的生成函数

use graphdb_path::core::{Edge, Value, VertexId};
use graphdb_path::query::executor::algorithms::{PathKind, PathQueryContext};
use graphdb_path::storage::MemoryStorage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// 类型 1、名称 `e`、rank 0 的边
pub fn edge(src: i64, dst: i64) -> Edge {
    Edge::new(src, dst, 1, "e", 0)
}

pub fn ranked_edge(src: i64, dst: i64, rank: i64) -> Edge {
    Edge::new(src, dst, 1, "e", rank)
}

/// 带 `weight` 属性的边
pub fn weighted_edge(src: i64, dst: i64, weight: f64) -> Edge {
    edge(src, dst).with_props(HashMap::from([(
        "weight".to_string(),
        Value::Float(weight),
    )]))
}

/// 由边列表构建内存图
pub fn graph(edges: &[Edge]) -> Arc<MemoryStorage> {
    let storage = MemoryStorage::new();
    for e in edges {
        storage.insert_edge(e.clone());
    }
    Arc::new(storage)
}

pub fn graph_from_pairs(pairs: &[(i64, i64)]) -> Arc<MemoryStorage> {
    let edges: Vec<Edge> = pairs.iter().map(|(s, d)| edge(*s, *d)).collect();
    graph(&edges)
}

/// 1->2, 2->4@0, 2->4@1, 4->5
pub fn parallel_rank_graph() -> Arc<MemoryStorage> {
    graph(&[
        edge(1, 2),
        ranked_edge(2, 4, 0),
        ranked_edge(2, 4, 1),
        edge(4, 5),
    ])
}

/// 1->2->3->1 加一条捷径 1->3
pub fn cycle_with_shortcut() -> Arc<MemoryStorage> {
    graph_from_pairs(&[(1, 2), (2, 3), (3, 1), (1, 3)])
}

pub fn vids(ids: &[i64]) -> Vec<VertexId> {
    ids.iter().map(|id| VertexId::Int(*id)).collect()
}

pub fn ctx(kind: PathKind, steps: usize) -> PathQueryContext {
    PathQueryContext::new(kind, steps)
}

/// 按 `weight` 属性计算代价的加权查询上下文
pub fn weighted_ctx(steps: usize) -> PathQueryContext {
    PathQueryContext::new(PathKind::WeightedShortest, steps).with_cost_fn(Arc::new(|e: &Edge| {
        e.get_property("weight")
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN)
    }))
}

/// 固定种子的随机有向图，顶点编号 1..=vertices
pub fn random_pairs(seed: u64, vertices: i64, edges: usize) -> Vec<(i64, i64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut pairs = Vec::with_capacity(edges);
    while pairs.len() < edges && seen.len() < (vertices * vertices) as usize {
        let src = rng.gen_range(1..=vertices);
        let dst = rng.gen_range(1..=vertices);
        if seen.insert((src, dst)) {
            pairs.push((src, dst));
        }
    }
    pairs
}

/// 沿出边的穷举 BFS，返回 `max_steps` 内的最短跳数
pub fn bfs_distance(pairs: &[(i64, i64)], src: i64, dst: i64, max_steps: usize) -> Option<usize> {
    let mut adjacency: HashMap<i64, Vec<i64>> = HashMap::new();
    for (s, d) in pairs {
        adjacency.entry(*s).or_default().push(*d);
    }
    let mut distance = HashMap::from([(src, 0usize)]);
    let mut queue = VecDeque::from([src]);
    while let Some(v) = queue.pop_front() {
        let dist = distance[&v];
        if dist == max_steps {
            continue;
        }
        for next in adjacency.get(&v).into_iter().flatten() {
            if !distance.contains_key(next) {
                distance.insert(*next, dist + 1);
                queue.push_back(*next);
            }
        }
    }
    // 起点与终点不同，距离 0 不会出现
    distance.get(&dst).copied().filter(|d| *d > 0)
}

/// 在 `random_pairs` 的边上配 1..=5 的整数权重，代价之和没有浮点误差
pub fn random_weighted_edges(seed: u64, vertices: i64, edges: usize) -> Vec<(i64, i64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    random_pairs(seed, vertices, edges)
        .into_iter()
        .map(|(src, dst)| (src, dst, rng.gen_range(1..=5) as f64))
        .collect()
}

pub fn weighted_graph(edges: &[(i64, i64, f64)]) -> Arc<MemoryStorage> {
    let edges: Vec<Edge> = edges
        .iter()
        .map(|(src, dst, weight)| weighted_edge(*src, *dst, *weight))
        .collect();
    graph(&edges)
}

fn adjacency<T: Copy>(edges: impl IntoIterator<Item = (i64, i64, T)>) -> HashMap<i64, Vec<(i64, T)>> {
    let mut adjacency: HashMap<i64, Vec<(i64, T)>> = HashMap::new();
    for (src, dst, value) in edges {
        adjacency.entry(src).or_default().push((dst, value));
    }
    adjacency
}

fn render_walk(vertices: &[i64]) -> String {
    let mut text = format!("<({})", vertices[0]);
    for vid in &vertices[1..] {
        text.push_str(&format!("-[:e@0]->({})", vid));
    }
    text.push('>');
    text
}

struct WalkSearch<'a> {
    adjacency: &'a HashMap<i64, Vec<(i64, ())>>,
    dst: i64,
    max_steps: usize,
    no_loop: bool,
    vertices: Vec<i64>,
    used: HashSet<(i64, i64)>,
    found: BTreeSet<String>,
}

impl WalkSearch<'_> {
    fn visit(&mut self) {
        let current = *self.vertices.last().expect("walk starts at src");
        if self.vertices.len() > 1 && current == self.dst {
            self.found.insert(render_walk(&self.vertices));
        }
        if self.vertices.len() > self.max_steps {
            return;
        }
        let adjacency = self.adjacency;
        for (next, _) in adjacency.get(&current).into_iter().flatten() {
            let key = (current, *next);
            if self.used.contains(&key) || (self.no_loop && self.vertices.contains(next)) {
                continue;
            }
            self.used.insert(key);
            self.vertices.push(*next);
            self.visit();
            self.vertices.pop();
            self.used.remove(&key);
        }
    }
}

/// 沿出边穷举 `max_steps` 步内从 src 到 dst、不重复使用同一条边的行走
///
/// 行走可以中途经过 dst；`no_loop` 时不重复经过顶点。
pub fn enumerate_walks(
    pairs: &[(i64, i64)],
    src: i64,
    dst: i64,
    max_steps: usize,
    no_loop: bool,
) -> BTreeSet<String> {
    let adjacency = adjacency(pairs.iter().map(|(s, d)| (*s, *d, ())));
    let mut search = WalkSearch {
        adjacency: &adjacency,
        dst,
        max_steps,
        no_loop,
        vertices: vec![src],
        used: HashSet::new(),
        found: BTreeSet::new(),
    };
    search.visit();
    search.found
}

/// 穷举 `max_steps` 步内的简单路径，返回最小代价
pub fn min_cost(edges: &[(i64, i64, f64)], src: i64, dst: i64, max_steps: usize) -> Option<f64> {
    fn visit(
        adjacency: &HashMap<i64, Vec<(i64, f64)>>,
        dst: i64,
        steps_left: usize,
        vertices: &mut Vec<i64>,
        cost: f64,
        best: &mut Option<f64>,
    ) {
        let current = *vertices.last().expect("path starts at src");
        if current == dst {
            if best.map_or(true, |b| cost < b) {
                *best = Some(cost);
            }
            return;
        }
        if steps_left == 0 {
            return;
        }
        for (next, weight) in adjacency.get(&current).into_iter().flatten() {
            if vertices.contains(next) {
                continue;
            }
            vertices.push(*next);
            visit(adjacency, dst, steps_left - 1, vertices, cost + weight, best);
            vertices.pop();
        }
    }

    let adjacency = adjacency(edges.iter().copied());
    let mut best = None;
    visit(&adjacency, dst, max_steps, &mut vec![src], 0.0, &mut best);
    best
}
