//! # generate 子命令 CLI 定义
//!
//! 将 C 源文件转换为程序图 (.ProgramGraph.pb)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/generate.rs`

use clap::Args;
use std::path::PathBuf;

/// generate 子命令参数
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory containing C sources [default: <root>/data/raw/code]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for program graphs [default: <root>/data/processed/graphs]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for error_files.txt [default: <root>/output/errors]
    #[arg(long)]
    pub error_dir: Option<PathBuf>,

    /// Glob pattern for source files
    #[arg(short, long, default_value = "*.c")]
    pub pattern: String,

    /// Graph builder executable (reads source on stdin, writes the graph to stdout)
    #[arg(long, env = "PROGRAML_GRAPH_BUILDER", default_value = "clang2graph")]
    pub builder: PathBuf,

    /// Extra argument passed to the graph builder (repeatable)
    #[arg(long = "builder-arg", allow_hyphen_values = true)]
    pub builder_args: Vec<String>,

    /// Regenerate graphs for the files listed in the slow-file registry instead
    #[arg(long, default_value_t = false)]
    pub clean: bool,

    /// Slow-file registry read in --clean mode [default: <root>/output/logs/slow_files.txt]
    #[arg(long)]
    pub slow_files: Option<PathBuf>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
