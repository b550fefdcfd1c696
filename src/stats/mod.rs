//! # 运行统计模块
//!
//! 读取计时运行写出的统计文档，生成汇总、导出与图表。
//!
//! ## 子模块
//! - `summary`: 计数、成功率、耗时分布、直方图分箱
//! - `export`: CSV 导出
//! - `plot`: 图表生成
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs`, `commands/report.rs` 使用
//! - 使用 `models/run.rs`

pub mod export;
pub mod plot;
pub mod summary;

pub use summary::{summarize, AnalysisSummary, DurationSummary};
