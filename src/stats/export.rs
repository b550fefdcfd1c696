//! # 统计数据导出
//!
//! 导出运行记录与汇总为 CSV。
//!
//! ## 支持格式
//! - runs: analysis, file, duration, status（每条记录一行）
//! - summary: 每个分析类型一行，包含计数与耗时分布
//!
//! ## 依赖关系
//! - 被 `commands/report.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{LabelTimerError, Result};
use crate::models::AnalysisStatistics;
use crate::stats::AnalysisSummary;

use std::path::Path;

/// 导出全部运行记录
pub fn runs_to_csv(stats: &AnalysisStatistics, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["analysis", "file", "duration", "status"])?;

    for (kind, entry) in stats.iter() {
        for run in entry.runs() {
            wtr.write_record([
                kind.to_string(),
                run.file.clone(),
                format!("{:.4}", run.duration),
                run.status.to_string(),
            ])?;
        }
    }

    wtr.flush().map_err(|e| LabelTimerError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出汇总
pub fn summary_to_csv(summaries: &[AnalysisSummary], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "analysis",
        "success",
        "timeout",
        "error",
        "success_rate",
        "min_s",
        "mean_s",
        "median_s",
        "max_s",
    ])?;

    for summary in summaries {
        let fmt = |v: Option<f64>| v.map(|x| format!("{:.4}", x)).unwrap_or_default();
        let d = summary.durations;
        wtr.write_record([
            summary.kind.clone(),
            summary.counts.success.to_string(),
            summary.counts.timeout.to_string(),
            summary.counts.error.to_string(),
            format!("{:.2}", summary.success_rate()),
            fmt(d.map(|d| d.min)),
            fmt(d.map(|d| d.mean)),
            fmt(d.map(|d| d.median)),
            fmt(d.map(|d| d.max)),
        ])?;
    }

    wtr.flush().map_err(|e| LabelTimerError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
