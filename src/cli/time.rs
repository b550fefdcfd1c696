//! # time 子命令 CLI 定义
//!
//! 计时运行外部分析程序
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/time.rs`

use clap::Args;
use std::path::PathBuf;

/// time 子命令参数
#[derive(Args, Debug)]
pub struct TimeArgs {
    /// Analysis kinds to run (repeatable)
    #[arg(short, long = "analysis", default_values_t = vec!["liveness".to_string()])]
    pub analysis: Vec<String>,

    /// Per-file wall-clock budget in seconds
    #[arg(short, long, default_value_t = 120.0)]
    pub timeout: f64,

    /// Completions within this many seconds of the budget count as timeouts
    #[arg(short, long, default_value_t = 10.0)]
    pub margin: f64,

    /// Path to the analyzer executable
    #[arg(long, env = "PROGRAML_ANALYZE", default_value = "analyze")]
    pub analyzer: PathBuf,

    /// Extra argument passed to the analyzer before the analysis kind (repeatable)
    #[arg(long = "analyzer-arg", allow_hyphen_values = true)]
    pub analyzer_args: Vec<String>,

    /// Directory containing *.ProgramGraph.pb inputs [default: <root>/data/processed/graphs]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Glob pattern for input files
    #[arg(short, long, default_value = "*.ProgramGraph.pb")]
    pub pattern: String,

    /// Directory receiving label outputs [default: <root>/data/temp/labels]
    #[arg(long)]
    pub labels_dir: Option<PathBuf>,

    /// Slow-file registry [default: <root>/output/logs/slow_files.txt]
    #[arg(long)]
    pub slow_files: Option<PathBuf>,

    /// Statistics document written at the end of the run [default: <root>/output/logs/analysis_data.json]
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}
