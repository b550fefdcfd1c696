//! # 数据模型模块
//!
//! 定义运行记录与按分析类型聚合的统计数据。
//!
//! ## 依赖关系
//! - 被 `timing/`, `stats/` 和 `commands/` 使用
//! - 子模块: run

pub mod run;

pub use run::{AnalysisEntry, AnalysisStatistics, RunRecord, RunStatus, StatusCounts};
