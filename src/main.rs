//! # labeltimer - 程序图标签生成计时工具
//!
//! 在固定时间预算内批量调用外部数据流分析程序，记录成功/错误/超时统计，
//! 维护跨运行持久化的慢文件登记表，并提供图生成、绘图与汇总报告。
//!
//! ## 子命令
//! - `time`     - 计时运行分析程序（慢文件登记表 + 统计文档）
//! - `generate` - C 源文件 → 程序图
//! - `plot`     - 统计图表
//! - `report`   - 汇总表与 CSV 导出
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── timing/   (计时执行、分类、慢文件登记表)
//!   │     ├── graph/    (程序图生成)
//!   │     ├── stats/    (汇总、导出、绘图)
//!   │     └── models/   (数据模型)
//!   ├── batch/      (文件收集与并行处理)
//!   ├── config.rs   (项目目录布局)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod graph;
mod models;
mod stats;
mod timing;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
