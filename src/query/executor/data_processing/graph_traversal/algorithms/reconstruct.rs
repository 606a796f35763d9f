//! 路径重建
//!
//! 从交汇顶点沿两侧跳历史逐步回溯到各自的起始顶点，得到两组半路径，
//! 再两两拼接成完整路径：正向半路径 src→m 接上反向半路径 dst→m 的反转。

use std::collections::HashSet;

use crate::core::error::{DBError, DBResult};
use crate::core::{Path, Step, VertexId};

use super::hop_table::HopHistory;

pub struct PathReconstructor;

impl PathReconstructor {
    /// 从 `history` 第 `depth` 步中的顶点 `meet` 回溯，返回所有 root→meet 的半路径
    pub fn interim_paths(history: &HopHistory, depth: usize, meet: &VertexId) -> DBResult<Vec<Path>> {
        let table = history.get(depth).ok_or_else(|| {
            DBError::internal(format!("历史中没有第 {} 步，无法从 {} 回溯", depth, meet))
        })?;
        if !table.contains(meet) {
            return Err(DBError::internal(format!(
                "交汇顶点 {} 不在第 {} 步的跳表中",
                meet, depth
            )));
        }

        // 先构建 meet→root 方向的路径，最后整体反转
        let mut current = vec![Path::from_vid(meet.clone())];
        for d in (1..=depth).rev() {
            let table = history
                .get(d)
                .ok_or_else(|| DBError::internal(format!("历史中没有第 {} 步", d)))?;
            let mut next = Vec::with_capacity(current.len());
            for path in &current {
                let entries = table.find(path.dst_vid());
                if entries.is_empty() {
                    return Err(DBError::internal(format!(
                        "回溯中断: 顶点 {} 不在第 {} 步的跳表中",
                        path.dst_vid(),
                        d
                    )));
                }
                for entry in entries {
                    if let Some(edge) = &entry.edge {
                        next.push(path.extended(Step::along(&edge.reversed())));
                    }
                }
            }
            current = next;
        }

        Ok(current
            .into_iter()
            .filter(|path| path.dst_vid() == history.root())
            .map(|path| path.reverse())
            .collect())
    }

    /// 重建所有经过 `meet` 的 src→dst 路径
    pub fn reconstruct(
        meet: &VertexId,
        forward: &HopHistory,
        forward_depth: usize,
        backward: &HopHistory,
        backward_depth: usize,
    ) -> DBResult<Vec<Path>> {
        let forward_paths = Self::interim_paths(forward, forward_depth, meet)?;
        let backward_paths = Self::interim_paths(backward, backward_depth, meet)?;
        Self::stitch(&forward_paths, &backward_paths)
    }

    /// 正向半路径 (src→m) 与反向半路径 (dst→m) 两两拼接
    pub fn stitch(forward_paths: &[Path], backward_paths: &[Path]) -> DBResult<Vec<Path>> {
        let mut paths = Vec::with_capacity(forward_paths.len() * backward_paths.len());
        for head in forward_paths {
            for tail in backward_paths {
                let mut path = head.clone();
                path.append(tail.reverse())?;
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

/// 结果路径过滤：重复边、可选的重复顶点、已输出路径
#[derive(Debug, Default)]
pub struct PathFilter {
    no_loop: bool,
    emitted: HashSet<Path>,
}

impl PathFilter {
    pub fn new(no_loop: bool) -> Self {
        Self {
            no_loop,
            emitted: HashSet::new(),
        }
    }

    /// 路径本身是否满足约束，不记录
    pub fn is_valid(&self, path: &Path) -> bool {
        !path.has_duplicate_edges() && !(self.no_loop && path.has_duplicate_vertices())
    }

    /// 满足约束且未输出过时记录并返回 true
    pub fn accept(&mut self, path: &Path) -> bool {
        self.is_valid(path) && self.emitted.insert(path.clone())
    }

    /// 清空已输出记录
    pub fn reset(&mut self) {
        self.emitted.clear();
    }
}
