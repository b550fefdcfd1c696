//! # plot 子命令 CLI 定义
//!
//! 由统计文档生成图表
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/plot.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 图表输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FigureFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
}

/// plot 子命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Statistics document [default: <root>/output/logs/analysis_data.json]
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Output directory for figures [default: <root>/output/figures]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Figure format
    #[arg(short, long, value_enum, default_value_t = FigureFormat::Png)]
    pub format: FigureFormat,

    /// Figure width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}
