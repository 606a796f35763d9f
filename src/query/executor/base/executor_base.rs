//! 基础执行器实现
//!
//! 提供执行器 trait 和通用的生命周期、统计信息管理。

use async_trait::async_trait;

use crate::core::error::DBResult;

use super::execution_result::ExecutionResult;
use super::executor_stats::ExecutorStats;

/// 统一的执行器 trait
///
/// 执行过程中会等待存储层的异步扩展，因此 `execute` 是异步的。
#[async_trait]
pub trait Executor: Send {
    /// 执行查询
    async fn execute(&mut self) -> DBResult<ExecutionResult>;

    /// 打开执行器
    fn open(&mut self) -> DBResult<()>;

    /// 关闭执行器
    fn close(&mut self) -> DBResult<()>;

    /// 检查执行器是否已打开
    fn is_open(&self) -> bool;

    /// 获取执行器 ID
    fn id(&self) -> i64;

    /// 获取执行器名称
    fn name(&self) -> &str;

    /// 获取执行器描述
    fn description(&self) -> &str;

    /// 获取执行统计信息
    fn stats(&self) -> &ExecutorStats;

    /// 获取可变的执行统计信息
    fn stats_mut(&mut self) -> &mut ExecutorStats;
}

/// 基础执行器
///
/// 持有执行器的标识、统计信息和打开状态，具体执行器组合它来实现 `Executor`。
#[derive(Clone, Debug)]
pub struct BaseExecutor {
    /// 执行器 ID
    pub id: i64,
    /// 执行器名称
    pub name: String,
    /// 执行器描述
    pub description: String,
    is_open: bool,
    stats: ExecutorStats,
}

impl BaseExecutor {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            is_open: false,
            stats: ExecutorStats::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn open(&mut self) -> DBResult<()> {
        self.is_open = true;
        Ok(())
    }

    pub fn close(&mut self) -> DBResult<()> {
        self.is_open = false;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn get_stats(&self) -> &ExecutorStats {
        &self.stats
    }

    pub fn get_stats_mut(&mut self) -> &mut ExecutorStats {
        &mut self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_executor_lifecycle() {
        let mut base = BaseExecutor::new(7, "Base").with_description("find path");
        assert!(!base.is_open());
        base.open().expect("open");
        assert!(base.is_open());
        base.get_stats_mut().add_row(3);
        assert_eq!(base.get_stats().num_rows, 3);
        base.close().expect("close");
        assert!(!base.is_open());
        assert_eq!(base.id, 7);
        assert_eq!(base.description, "find path");
    }
}
