//! 执行器统计信息
//!
//! 记录执行器处理的行数、耗时以及算法层汇总上来的计数。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// 执行器统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorStats {
    /// 处理的行数
    pub num_rows: usize,
    /// 执行时间（微秒）
    pub exec_time_us: u64,
    /// 总时间（微秒）
    pub total_time_us: u64,
    /// 批量操作次数
    pub batch_count: usize,
    /// 其他统计信息
    pub other_stats: BTreeMap<String, String>,
}

impl ExecutorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, count: usize) {
        self.num_rows += count;
    }

    pub fn add_exec_time(&mut self, duration: Duration) {
        self.exec_time_us += duration.as_micros() as u64;
    }

    pub fn add_total_time(&mut self, duration: Duration) {
        self.total_time_us += duration.as_micros() as u64;
    }

    pub fn add_batch(&mut self, count: usize) {
        self.batch_count += count;
    }

    /// 添加自定义统计信息
    pub fn add_stat(&mut self, key: impl Into<String>, value: impl ToString) {
        self.other_stats.insert(key.into(), value.to_string());
    }

    pub fn get_stat(&self, key: &str) -> Option<&String> {
        self.other_stats.get(key)
    }

    /// 获取吞吐量（行/秒）
    pub fn throughput_rows_per_sec(&self) -> f64 {
        if self.total_time_us > 0 {
            self.num_rows as f64 * 1_000_000.0 / self.total_time_us as f64
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 导出为格式化字符串
    pub fn to_formatted_string(&self) -> String {
        let mut text = format!(
            "rows: {}, exec_time: {}us, total_time: {}us, batches: {}, throughput: {:.2} rows/sec",
            self.num_rows,
            self.exec_time_us,
            self.total_time_us,
            self.batch_count,
            self.throughput_rows_per_sec()
        );
        for (key, value) in &self.other_stats {
            text.push_str(&format!(", {}: {}", key, value));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_string_includes_custom_stats() {
        let mut stats = ExecutorStats::new();
        stats.add_row(3);
        stats.add_total_time(Duration::from_millis(2));
        stats.add_stat("rounds", 4);
        let text = stats.to_formatted_string();
        assert!(text.starts_with("rows: 3"));
        assert!(text.contains("rounds: 4"));
        assert_eq!(stats.get_stat("rounds"), Some(&"4".to_string()));
    }
}
