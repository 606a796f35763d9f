//! 路径算法模块
//!
//! 双向扩展的路径查找：单对顶点的搜索状态机，以及驱动多对顶点的协调器
//!
//! # 模块列表
//! - `hop_table`: 跳表与跳历史
//! - `meeting`: 按奇偶深度的交汇检测
//! - `reconstruct`: 半路径回溯与拼接
//! - `pair_runner`: 最短路径 / 所有路径
//! - `cost_path_runner`: 加权最短路径
//! - `multi_pair`: 笛卡尔积组合的协调与驱动

pub mod cost_path_runner;
pub mod hop_table;
pub mod meeting;
pub mod multi_pair;
pub mod pair_runner;
pub mod reconstruct;
pub mod traits;
pub mod types;

pub use cost_path_runner::CostPathRunner;
pub use hop_table::{HopEntry, HopHistory, HopTable};
pub use meeting::{MeetingDetector, ParityCheck};
pub use multi_pair::{drive_pair, CoordinatorOutput, MultiPairCoordinator, DEFAULT_MAX_STEPS_LIMIT};
pub use pair_runner::PairRunner;
pub use reconstruct::{PathFilter, PathReconstructor};
pub use traits::{CostFn, PairSearch, PathQueryContext};
pub use types::{
    AlgorithmStats, EdgeDedup, HopRequest, PairStatus, PathKind, PendingCombinations, ResultRow,
    RoundOutcome,
};
