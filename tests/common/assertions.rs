//! 自定义断言辅助模块
//!
//! 提供结果路径的常用断言函数

use graphdb_path::core::error::{DBError, ErrorKind};
use graphdb_path::core::{Path, VertexId};
use graphdb_path::query::executor::algorithms::CoordinatorOutput;

/// 断言结果失败并属于指定归类
pub fn assert_err_kind<T: std::fmt::Debug>(result: Result<T, DBError>, expected: ErrorKind) -> DBError {
    let err = result.expect_err("操作应该失败");
    assert_eq!(
        err.kind(),
        expected,
        "错误归类不匹配: 期望 {:?}, 实际是 '{}'",
        expected,
        err
    );
    err
}

/// 断言每条路径都从 `src` 出发、到达 `dst`
pub fn assert_endpoints(paths: &[&Path], src: i64, dst: i64) {
    for path in paths {
        assert_eq!(path.src.vid, VertexId::from(src), "路径起点错误: {}", path);
        assert_eq!(path.dst_vid(), &VertexId::from(dst), "路径终点错误: {}", path);
    }
}

/// 断言没有路径重复经过同一条边
pub fn assert_no_duplicate_edges(output: &CoordinatorOutput) {
    for row in &output.rows {
        assert!(!row.path.has_duplicate_edges(), "路径重复经过同一条边: {}", row.path);
    }
}

/// 断言所有路径长度相同，返回该长度
pub fn assert_uniform_length(output: &CoordinatorOutput) -> Option<usize> {
    let first = output.rows.first()?.path.len();
    for row in &output.rows {
        assert_eq!(row.path.len(), first, "最短路径长度不一致: {}", row.path);
    }
    Some(first)
}
