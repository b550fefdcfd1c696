//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `time`: 计时运行外部分析程序，维护慢文件登记表与统计文档
//! - `generate`: 将 C 源文件转换为程序图
//! - `plot`: 由统计文档生成图表
//! - `report`: 打印汇总表并导出 CSV
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: time, generate, plot, report

pub mod generate;
pub mod plot;
pub mod report;
pub mod time;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// labeltimer - 程序图标签生成计时工具
#[derive(Parser)]
#[command(name = "labeltimer")]
#[command(version)]
#[command(
    about = "Time program-graph label generation, track slow inputs and report statistics",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project root (defaults to $HOME/ProGraML-GraphGen)
    #[arg(long, global = true, env = "LABELTIMER_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Run the analyzer over every program graph with a per-file time budget
    Time(time::TimeArgs),

    /// Convert C source files into serialized program graphs
    Generate(generate::GenerateArgs),

    /// Render timing and status figures from the statistics document
    Plot(plot::PlotArgs),

    /// Print a per-analysis summary and optionally export CSV files
    Report(report::ReportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_time_defaults() {
        let cli = Cli::try_parse_from(["labeltimer", "time"]).unwrap();
        match cli.command {
            Commands::Time(args) => {
                assert_eq!(args.analysis, vec!["liveness".to_string()]);
                assert_eq!(args.timeout, 120.0);
                assert_eq!(args.margin, 10.0);
            }
            _ => panic!("expected time command"),
        }
    }

    #[test]
    fn test_global_project_root() {
        let cli = Cli::try_parse_from([
            "labeltimer",
            "report",
            "--project-root",
            "/data/proj",
        ])
        .unwrap();
        assert_eq!(cli.project_root, Some(PathBuf::from("/data/proj")));
    }
}
