//! # 统计图表生成
//!
//! 使用 `plotters` 库绘制运行统计图。
//!
//! ## 图表
//! - `processing_times_scatter`: 各分析类型成功耗时（排序后）散点图，对数 y 轴
//! - `processing_times_histogram`: 成功耗时直方图（50 箱），对数 y 轴
//! - `processing_statistics`: 各分析类型 success/timeout/error 分组柱状图，对数 y 轴
//!
//! 没有成功记录的分析类型不出现在前两张图中。支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `stats/summary.rs` 的直方图分箱
//! - 使用 `plotters` 渲染图表

use crate::error::{LabelTimerError, Result};
use crate::models::{AnalysisStatistics, RunStatus};
use crate::stats::summary::histogram;

use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

pub const SCATTER_FIGURE: &str = "processing_times_scatter";
pub const HISTOGRAM_FIGURE: &str = "processing_times_histogram";
pub const STATUS_FIGURE: &str = "processing_statistics";

const HISTOGRAM_BINS: usize = 50;
/// 对数轴上计数柱的底边
const LOG_COUNT_FLOOR: f64 = 0.5;

/// 图表尺寸与格式
#[derive(Debug, Clone, Copy)]
pub struct FigureOptions {
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
}

impl FigureOptions {
    pub fn extension(&self) -> &'static str {
        if self.use_svg {
            "svg"
        } else {
            "png"
        }
    }

    pub fn figure_path(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.{}", name, self.extension()))
    }
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            use_svg: false,
        }
    }
}

/// (分析类型, 成功耗时)，跳过没有成功记录的类型
pub fn success_series(stats: &AnalysisStatistics) -> Vec<(String, Vec<f64>)> {
    stats
        .iter()
        .map(|(kind, entry)| (kind.to_string(), entry.success_durations()))
        .filter(|(_, durations)| !durations.is_empty())
        .collect()
}

/// 生成全部图表，返回已写出的文件
pub fn render_all(
    stats: &AnalysisStatistics,
    figures_dir: &Path,
    options: &FigureOptions,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let series = success_series(stats);

    if !series.is_empty() {
        let path = options.figure_path(figures_dir, SCATTER_FIGURE);
        plot_timing_scatter(&series, &path, options)?;
        written.push(path);

        let path = options.figure_path(figures_dir, HISTOGRAM_FIGURE);
        plot_timing_histogram(&series, &path, options)?;
        written.push(path);
    }

    if !stats.is_empty() {
        let path = options.figure_path(figures_dir, STATUS_FIGURE);
        plot_status_statistics(stats, &path, options)?;
        written.push(path);
    }

    Ok(written)
}

/// 成功耗时散点图
pub fn plot_timing_scatter(
    series: &[(String, Vec<f64>)],
    output_path: &Path,
    options: &FigureOptions,
) -> Result<()> {
    let size = (options.width, options.height);
    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_timing_scatter(&root, series)?;
        root.present().map_err(|e| plot_err(SCATTER_FIGURE, e))?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_timing_scatter(&root, series)?;
        root.present().map_err(|e| plot_err(SCATTER_FIGURE, e))?;
    }
    Ok(())
}

/// 成功耗时直方图
pub fn plot_timing_histogram(
    series: &[(String, Vec<f64>)],
    output_path: &Path,
    options: &FigureOptions,
) -> Result<()> {
    let size = (options.width, options.height);
    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_timing_histogram(&root, series)?;
        root.present().map_err(|e| plot_err(HISTOGRAM_FIGURE, e))?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_timing_histogram(&root, series)?;
        root.present().map_err(|e| plot_err(HISTOGRAM_FIGURE, e))?;
    }
    Ok(())
}

/// 状态计数柱状图
pub fn plot_status_statistics(
    stats: &AnalysisStatistics,
    output_path: &Path,
    options: &FigureOptions,
) -> Result<()> {
    let size = (options.width.min(1000), options.height);
    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_status_statistics(&root, stats)?;
        root.present().map_err(|e| plot_err(STATUS_FIGURE, e))?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_status_statistics(&root, stats)?;
        root.present().map_err(|e| plot_err(STATUS_FIGURE, e))?;
    }
    Ok(())
}

fn plot_err<E: Debug>(figure: &str, e: E) -> LabelTimerError {
    LabelTimerError::PlotError {
        figure: figure.to_string(),
        reason: format!("{:?}", e),
    }
}

/// 对数轴范围（只考虑正值）
fn log_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.01, 1.0);
    }
    (min / 2.0, max * 2.0)
}

fn series_color(idx: usize) -> RGBAColor {
    Palette99::pick(idx).to_rgba()
}

fn draw_timing_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[(String, Vec<f64>)],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let err = |e| plot_err(SCATTER_FIGURE, e);
    root.fill(&WHITE).map_err(err)?;

    let max_len = series.iter().map(|(_, v)| v.len()).max().unwrap_or(1);
    let (y_min, y_max) = log_bounds(series.iter().flat_map(|(_, v)| v.iter().copied()));

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Distribution of Processing Times (Scatter)",
            ("sans-serif", 28).into_font(),
        )
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..max_len as f64, (y_min..y_max).log_scale())
        .map_err(err)?;

    chart
        .configure_mesh()
        .x_desc("Sample Index")
        .y_desc("Duration (seconds) - Log Scale")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(err)?;

    for (idx, (kind, durations)) in series.iter().enumerate() {
        let color = series_color(idx);
        let mut sorted = durations.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        chart
            .draw_series(sorted.into_iter().enumerate().map(move |(i, y)| {
                Circle::new((i as f64, y.max(y_min)), 3, color.mix(0.5).filled())
            }))
            .map_err(err)?
            .label(kind.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(err)?;

    Ok(())
}

fn draw_timing_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[(String, Vec<f64>)],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let err = |e| plot_err(HISTOGRAM_FIGURE, e);
    root.fill(&WHITE).map_err(err)?;

    let binned: Vec<_> = series
        .iter()
        .map(|(kind, durations)| (kind.as_str(), histogram(durations, HISTOGRAM_BINS)))
        .collect();

    let x_min = binned
        .iter()
        .flat_map(|(_, bins)| bins.iter().map(|b| b.start))
        .fold(f64::INFINITY, f64::min);
    let x_max = binned
        .iter()
        .flat_map(|(_, bins)| bins.iter().map(|b| b.end))
        .fold(f64::NEG_INFINITY, f64::max);
    let (x_min, x_max) = if x_min.is_finite() && x_max > x_min {
        (x_min, x_max)
    } else {
        (0.0, 1.0)
    };
    let max_count = binned
        .iter()
        .flat_map(|(_, bins)| bins.iter().map(|b| b.count))
        .max()
        .unwrap_or(1)
        .max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Distribution of Processing Times (Histogram)",
            ("sans-serif", 28).into_font(),
        )
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            x_min..x_max,
            (LOG_COUNT_FLOOR..max_count as f64 * 2.0).log_scale(),
        )
        .map_err(err)?;

    chart
        .configure_mesh()
        .x_desc("Duration (seconds)")
        .y_desc("Frequency (Log Scale)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(err)?;

    for (idx, (kind, bins)) in binned.iter().enumerate() {
        let color = series_color(idx);
        chart
            .draw_series(bins.iter().filter(|b| b.count > 0).map(move |b| {
                Rectangle::new(
                    [(b.start, LOG_COUNT_FLOOR), (b.end, b.count as f64)],
                    color.mix(0.5).filled(),
                )
            }))
            .map_err(err)?
            .label(*kind)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(err)?;

    Ok(())
}

fn draw_status_statistics<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    stats: &AnalysisStatistics,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let err = |e| plot_err(STATUS_FIGURE, e);
    root.fill(&WHITE).map_err(err)?;

    let kinds: Vec<String> = stats.iter().map(|(kind, _)| kind.to_string()).collect();
    let counts: Vec<_> = stats.iter().map(|(_, entry)| *entry.statistics()).collect();
    let max_count = counts
        .iter()
        .flat_map(|c| RunStatus::ALL.iter().map(move |s| c.get(*s)))
        .max()
        .unwrap_or(1)
        .max(1);

    let n = kinds.len().max(1) as f64;
    let width = 0.25;

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Processing Statistics by Analysis Type",
            ("sans-serif", 28).into_font(),
        )
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            -0.5..n - 0.5,
            (LOG_COUNT_FLOOR..max_count as f64 * 2.0).log_scale(),
        )
        .map_err(err)?;

    let label_for = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < kinds.len() {
            kinds[idx as usize].clone()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(kinds.len().max(1) * 2 + 1)
        .x_label_formatter(&label_for)
        .x_desc("Analysis Type")
        .y_desc("Count (Log Scale)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(err)?;

    let status_colors = [
        (RunStatus::Success, -width, RGBColor(44, 160, 44)),
        (RunStatus::Timeout, 0.0, RGBColor(255, 127, 14)),
        (RunStatus::Error, width, RGBColor(214, 39, 40)),
    ];

    for (status, offset, color) in status_colors {
        let bars = counts.iter().enumerate().filter_map(move |(i, c)| {
            let count = c.get(status);
            if count == 0 {
                return None;
            }
            let center = i as f64 + offset;
            Some(Rectangle::new(
                [
                    (center - width / 2.0, LOG_COUNT_FLOOR),
                    (center + width / 2.0, count as f64),
                ],
                color.filled(),
            ))
        });

        let label = match status {
            RunStatus::Success => "Success",
            RunStatus::Timeout => "Timeout",
            RunStatus::Error => "Error",
        };

        chart
            .draw_series(bars)
            .map_err(err)?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(err)?;

    Ok(())
}
