//! 跳表与跳历史
//!
//! `HopTable` 记录某一方向某一步到达了哪些顶点、经由哪条边、从哪个前驱到达；
//! `HopHistory` 是同一方向按步排列的跳表序列，第 0 步是起始顶点本身。

use std::collections::HashMap;

use crate::core::{Edge, VertexId};

/// 跳表中的一条记录
#[derive(Debug, Clone, PartialEq)]
pub struct HopEntry {
    /// 前驱顶点；第 0 步中为起始顶点自身
    pub prev: VertexId,
    /// 从前驱到达该顶点的边，按遍历方向定向；仅第 0 步为空
    pub edge: Option<Edge>,
}

impl HopEntry {
    pub fn seed(root: VertexId) -> Self {
        Self {
            prev: root,
            edge: None,
        }
    }

    pub fn via(edge: Edge) -> Self {
        Self {
            prev: edge.src.clone(),
            edge: Some(edge),
        }
    }
}

/// 单步跳表：顶点 -> 到达它的所有记录
///
/// 同一顶点可以有多条记录（平行边、不同 rank、不同前驱），全部保留。
/// 顶点按首次插入顺序迭代，保证结果顺序稳定。
#[derive(Debug, Clone, Default)]
pub struct HopTable {
    entries: HashMap<VertexId, Vec<HopEntry>>,
    order: Vec<VertexId>,
    entry_count: usize,
}

impl HopTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 0 步的种子表
    pub fn seed(root: &VertexId) -> Self {
        let mut table = Self::new();
        table.insert(root.clone(), HopEntry::seed(root.clone()));
        table
    }

    /// 追加记录，从不覆盖
    pub fn insert(&mut self, vid: VertexId, entry: HopEntry) {
        match self.entries.get_mut(&vid) {
            Some(list) => list.push(entry),
            None => {
                self.order.push(vid.clone());
                self.entries.insert(vid, vec![entry]);
            }
        }
        self.entry_count += 1;
    }

    /// 查找到达某顶点的记录，不存在时为空
    pub fn find(&self, vid: &VertexId) -> &[HopEntry] {
        self.entries.get(vid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, vid: &VertexId) -> bool {
        self.entries.contains_key(vid)
    }

    /// 表中的顶点，按首次插入顺序
    pub fn vertices(&self) -> &[VertexId] {
        &self.order
    }

    /// 不同顶点数
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 记录总数
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}

/// 一个方向上按步排列的跳表
///
/// 表一旦追加进历史即被封存，只能读取。
#[derive(Debug, Clone)]
pub struct HopHistory {
    root: VertexId,
    tables: Vec<HopTable>,
}

impl HopHistory {
    /// 以起始顶点为第 0 步创建
    pub fn new(root: VertexId) -> Self {
        let seed = HopTable::seed(&root);
        Self {
            root,
            tables: vec![seed],
        }
    }

    pub fn root(&self) -> &VertexId {
        &self.root
    }

    /// 封存一步
    pub fn seal(&mut self, table: HopTable) {
        self.tables.push(table);
    }

    /// 已封存的扩展步数，不含第 0 步
    pub fn depth(&self) -> usize {
        self.tables.len() - 1
    }

    pub fn get(&self, depth: usize) -> Option<&HopTable> {
        self.tables.get(depth)
    }

    pub fn latest(&self) -> &HopTable {
        // tables 至少包含种子表
        &self.tables[self.tables.len() - 1]
    }

    /// 下一轮扩展的前沿：最近一步到达的顶点
    pub fn frontier(&self) -> Vec<VertexId> {
        self.latest().vertices().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_every_entry() {
        let mut table = HopTable::new();
        table.insert(VertexId::Int(4), HopEntry::via(Edge::new(2, 4, 1, "e", 0)));
        table.insert(VertexId::Int(4), HopEntry::via(Edge::new(2, 4, 1, "e", 1)));
        table.insert(VertexId::Int(3), HopEntry::via(Edge::new(2, 3, 1, "e", 0)));

        assert_eq!(table.len(), 2);
        assert_eq!(table.entry_count(), 3);
        assert_eq!(table.find(&VertexId::Int(4)).len(), 2);
        assert!(table.find(&VertexId::Int(9)).is_empty());
        assert_eq!(table.vertices(), &[VertexId::Int(4), VertexId::Int(3)]);
        assert_eq!(table.find(&VertexId::Int(3))[0].prev, VertexId::Int(2));
    }

    #[test]
    fn test_history_starts_with_seed() {
        let mut history = HopHistory::new(VertexId::Int(1));
        assert_eq!(history.depth(), 0);
        assert_eq!(history.frontier(), vec![VertexId::Int(1)]);
        assert!(history.latest().find(&VertexId::Int(1))[0].edge.is_none());

        let mut table = HopTable::new();
        table.insert(VertexId::Int(2), HopEntry::via(Edge::new(1, 2, 1, "e", 0)));
        history.seal(table);
        assert_eq!(history.depth(), 1);
        assert_eq!(history.frontier(), vec![VertexId::Int(2)]);
        assert!(history.get(2).is_none());
        assert!(history.get(0).is_some_and(|t| t.contains(&VertexId::Int(1))));
    }
}
