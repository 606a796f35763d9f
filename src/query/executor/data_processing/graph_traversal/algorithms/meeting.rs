//! 交汇检测
//!
//! 正向第 r 步与反向第 r-1 步比较得到长度 2r-1 的路径（奇数检查），
//! 与反向第 r 步比较得到长度 2r 的路径（偶数检查）。检查总是按
//! 奇 r、偶 r、奇 r+1 的顺序进行，路径长度单调不减。
//! 每次检查都指定两侧的深度，因此两个方向的请求并发返回时结果不变。

use crate::core::error::{DBError, DBResult};
use crate::core::VertexId;

use super::hop_table::{HopHistory, HopTable};

/// 一次交汇检查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParityCheck {
    /// 正向第 r 步对反向第 r-1 步
    Odd(usize),
    /// 正向第 r 步对反向第 r 步
    Even(usize),
}

impl ParityCheck {
    pub fn first() -> Self {
        ParityCheck::Odd(1)
    }

    pub fn forward_depth(&self) -> usize {
        match self {
            ParityCheck::Odd(r) | ParityCheck::Even(r) => *r,
        }
    }

    pub fn backward_depth(&self) -> usize {
        match self {
            ParityCheck::Odd(r) => r - 1,
            ParityCheck::Even(r) => *r,
        }
    }

    /// 该检查找到的路径长度
    pub fn path_length(&self) -> usize {
        self.forward_depth() + self.backward_depth()
    }

    /// 下一次检查；超出 `max_steps` 的偶数检查被跳过
    pub fn next(&self, max_steps: usize) -> Self {
        match self {
            ParityCheck::Odd(r) if 2 * r <= max_steps => ParityCheck::Even(*r),
            ParityCheck::Odd(r) | ParityCheck::Even(r) => ParityCheck::Odd(r + 1),
        }
    }

    /// 两侧所需的表是否都已封存
    pub fn is_ready(&self, forward: &HopHistory, backward: &HopHistory) -> bool {
        forward.depth() >= self.forward_depth() && backward.depth() >= self.backward_depth()
    }
}

/// 交汇检测器
pub struct MeetingDetector;

impl MeetingDetector {
    /// `fresh` 与 `other` 共同包含的顶点，按 `fresh` 中的顺序
    pub fn detect(fresh: &HopTable, other: &HopTable) -> Vec<VertexId> {
        let (probe, target, probe_is_fresh) = if fresh.len() <= other.len() {
            (fresh, other, true)
        } else {
            (other, fresh, false)
        };
        let mut met: Vec<VertexId> = probe
            .vertices()
            .iter()
            .filter(|vid| target.contains(vid))
            .cloned()
            .collect();
        if !probe_is_fresh {
            // 保持 fresh 的顺序
            met.sort_by_key(|vid| {
                fresh
                    .vertices()
                    .iter()
                    .position(|v| v == vid)
                    .unwrap_or(usize::MAX)
            });
        }
        met
    }

    /// 按指定深度检查两侧历史
    pub fn detect_at(
        check: ParityCheck,
        forward: &HopHistory,
        backward: &HopHistory,
    ) -> DBResult<Vec<VertexId>> {
        let fwd = forward.get(check.forward_depth()).ok_or_else(|| {
            DBError::internal(format!(
                "正向历史缺少第 {} 步（当前深度 {}）",
                check.forward_depth(),
                forward.depth()
            ))
        })?;
        let bwd = backward.get(check.backward_depth()).ok_or_else(|| {
            DBError::internal(format!(
                "反向历史缺少第 {} 步（当前深度 {}）",
                check.backward_depth(),
                backward.depth()
            ))
        })?;
        Ok(Self::detect(fwd, bwd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Edge;
    use crate::query::executor::data_processing::graph_traversal::algorithms::hop_table::HopEntry;

    fn table(vids: &[i64]) -> HopTable {
        let mut t = HopTable::new();
        for vid in vids {
            t.insert(
                VertexId::Int(*vid),
                HopEntry::via(Edge::new(0, *vid, 1, "e", 0)),
            );
        }
        t
    }

    #[test]
    fn test_check_sequence() {
        let mut check = ParityCheck::first();
        let mut lengths = Vec::new();
        for _ in 0..5 {
            lengths.push(check.path_length());
            check = check.next(5);
        }
        assert_eq!(lengths, vec![1, 2, 3, 4, 5]);

        // 偶数检查超出预算时跳过
        assert_eq!(ParityCheck::Odd(2).next(3), ParityCheck::Odd(3));
    }

    #[test]
    fn test_detect_preserves_fresh_order() {
        let fresh = table(&[7, 3, 5, 9]);
        let other = table(&[5, 7]);
        assert_eq!(
            MeetingDetector::detect(&fresh, &other),
            vec![VertexId::Int(7), VertexId::Int(5)]
        );
        assert_eq!(
            MeetingDetector::detect(&other, &fresh),
            vec![VertexId::Int(5), VertexId::Int(7)]
        );
        assert!(MeetingDetector::detect(&fresh, &table(&[])).is_empty());
    }

    #[test]
    fn test_detect_at_explicit_depth() {
        let mut forward = HopHistory::new(VertexId::Int(1));
        let mut backward = HopHistory::new(VertexId::Int(4));
        forward.seal(table(&[2]));
        backward.seal(table(&[2, 3]));

        // 奇数检查看的是反向第 0 步，即使反向已经多走了一步
        assert!(MeetingDetector::detect_at(ParityCheck::Odd(1), &forward, &backward)
            .expect("depths exist")
            .is_empty());
        assert_eq!(
            MeetingDetector::detect_at(ParityCheck::Even(1), &forward, &backward)
                .expect("depths exist"),
            vec![VertexId::Int(2)]
        );
        assert!(!ParityCheck::Odd(2).is_ready(&forward, &backward));
        assert!(matches!(
            MeetingDetector::detect_at(ParityCheck::Odd(2), &forward, &backward),
            Err(DBError::Internal(_))
        ));
    }
}
