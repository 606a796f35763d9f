//! 执行结果类型

use crate::core::DataSet;

/// 执行结果类型
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// 结构化数据集
    DataSet(DataSet),
}

impl ExecutionResult {
    /// 获取结果中的元素计数
    pub fn count(&self) -> usize {
        match self {
            ExecutionResult::DataSet(ds) => ds.row_count(),
        }
    }

    pub fn as_dataset(&self) -> &DataSet {
        match self {
            ExecutionResult::DataSet(ds) => ds,
        }
    }

    pub fn into_dataset(self) -> DataSet {
        match self {
            ExecutionResult::DataSet(ds) => ds,
        }
    }
}

impl From<DataSet> for ExecutionResult {
    fn from(ds: DataSet) -> Self {
        ExecutionResult::DataSet(ds)
    }
}
