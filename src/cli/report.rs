//! # report 子命令 CLI 定义
//!
//! 打印统计汇总并导出 CSV
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/report.rs`

use clap::Args;
use std::path::PathBuf;

/// report 子命令参数
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Statistics document [default: <root>/output/logs/analysis_data.json]
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Write the per-analysis summary to this CSV file
    #[arg(long)]
    pub summary_csv: Option<PathBuf>,

    /// Write every run record to this CSV file
    #[arg(long)]
    pub runs_csv: Option<PathBuf>,
}
