//! # plot 命令实现
//!
//! 读取统计文档并生成耗时分布与状态统计图。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的参数
//! - 使用 `stats/plot.rs` 渲染图表
//! - 使用 `utils/output.rs`

use crate::cli::plot::{FigureFormat, PlotArgs};
use crate::config::{self, ProjectLayout};
use crate::error::Result;
use crate::models::AnalysisStatistics;
use crate::stats::plot::{self, FigureOptions};
use crate::utils::output;

/// 执行 plot 命令
pub fn execute(args: PlotArgs, layout: &ProjectLayout) -> Result<()> {
    output::print_header("Plotting Label Generation Statistics");

    let data_file = args.data_file.clone().unwrap_or_else(|| layout.statistics_file());
    let figures_dir = args.output.clone().unwrap_or_else(|| layout.figures_dir());

    let statistics = AnalysisStatistics::load(&data_file)?;
    output::print_info(&format!(
        "Loaded {} analysis kinds from '{}'",
        statistics.len(),
        data_file.display()
    ));

    if statistics.is_empty() {
        output::print_warning("Statistics document is empty, nothing to plot.");
        return Ok(());
    }

    config::ensure_dir(&figures_dir)?;

    let options = FigureOptions {
        width: args.width,
        height: args.height,
        use_svg: args.format == FigureFormat::Svg,
    };

    if plot::success_series(&statistics).is_empty() {
        output::print_warning("No successful runs; skipping timing distribution figures.");
    }

    let written = plot::render_all(&statistics, &figures_dir, &options)?;
    for path in &written {
        output::print_success(&format!("Saved {}", path.display()));
    }

    output::print_done(&format!(
        "{} figures written to '{}'",
        written.len(),
        figures_dir.display()
    ));

    Ok(())
}
