//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `timing/`, `graph/`, `stats/`, `utils/`
//! - 子模块: time, generate, plot, report

pub mod generate;
pub mod plot;
pub mod report;
pub mod time;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::config::ProjectLayout;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let layout = ProjectLayout::resolve(cli.project_root)?;
    match cli.command {
        Commands::Time(args) => time::execute(args, &layout),
        Commands::Generate(args) => generate::execute(args, &layout),
        Commands::Plot(args) => plot::execute(args, &layout),
        Commands::Report(args) => report::execute(args, &layout),
    }
}
