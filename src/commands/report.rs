//! # report 命令实现
//!
//! 打印各分析类型的汇总表，可选导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/report.rs` 定义的参数
//! - 使用 `stats/summary.rs`, `stats/export.rs`
//! - 使用 `tabled` 渲染终端表格

use crate::cli::report::ReportArgs;
use crate::config::ProjectLayout;
use crate::error::Result;
use crate::models::AnalysisStatistics;
use crate::stats::{self, export, AnalysisSummary};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 汇总表行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Analysis")]
    analysis: String,
    #[tabled(rename = "Runs")]
    runs: usize,
    #[tabled(rename = "Success")]
    success: usize,
    #[tabled(rename = "Timeout")]
    timeout: usize,
    #[tabled(rename = "Error")]
    error: usize,
    #[tabled(rename = "Success %")]
    success_rate: String,
    #[tabled(rename = "Min (s)")]
    min: String,
    #[tabled(rename = "Mean (s)")]
    mean: String,
    #[tabled(rename = "Median (s)")]
    median: String,
    #[tabled(rename = "Max (s)")]
    max: String,
}

impl From<&AnalysisSummary> for SummaryRow {
    fn from(summary: &AnalysisSummary) -> Self {
        let fmt = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".to_string());
        let d = summary.durations;
        Self {
            analysis: summary.kind.clone(),
            runs: summary.counts.total(),
            success: summary.counts.success,
            timeout: summary.counts.timeout,
            error: summary.counts.error,
            success_rate: format!("{:.1}", summary.success_rate()),
            min: fmt(d.map(|d| d.min)),
            mean: fmt(d.map(|d| d.mean)),
            median: fmt(d.map(|d| d.median)),
            max: fmt(d.map(|d| d.max)),
        }
    }
}

/// 执行 report 命令
pub fn execute(args: ReportArgs, layout: &ProjectLayout) -> Result<()> {
    output::print_header("Label Generation Report");

    let data_file = args.data_file.clone().unwrap_or_else(|| layout.statistics_file());
    let statistics = AnalysisStatistics::load(&data_file)?;

    if statistics.is_empty() {
        output::print_warning("Statistics document is empty.");
        return Ok(());
    }

    let summaries = stats::summarize(&statistics);

    for summary in summaries.iter().filter(|s| !s.consistent) {
        output::print_warning(&format!(
            "Stored counts for '{}' do not match its run list",
            summary.kind
        ));
    }

    let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
    println!("{}", Table::new(&rows));

    if let Some(path) = &args.summary_csv {
        export::summary_to_csv(&summaries, path)?;
        output::print_success(&format!("Summary written to '{}'", path.display()));
    }

    if let Some(path) = &args.runs_csv {
        export::runs_to_csv(&statistics, path)?;
        output::print_success(&format!("Run records written to '{}'", path.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunRecord, RunStatus};

    #[test]
    fn test_summary_row() {
        let mut statistics = AnalysisStatistics::new();
        statistics.record("liveness", RunRecord::new("/a", 3.0, RunStatus::Success));
        statistics.record("liveness", RunRecord::new("/b", 120.0, RunStatus::Timeout));

        let summaries = stats::summarize(&statistics);
        let row = SummaryRow::from(&summaries[0]);

        assert_eq!(row.runs, 2);
        assert_eq!(row.success_rate, "50.0");
        assert_eq!(row.median, "3.00");

        let table = Table::new(vec![row]).to_string();
        assert!(table.contains("liveness"));
        assert!(table.contains("Success %"));
    }

    #[test]
    fn test_summary_row_without_successes() {
        let mut statistics = AnalysisStatistics::new();
        statistics.record("liveness", RunRecord::new("/a", 0.0, RunStatus::Error));

        let row = SummaryRow::from(&stats::summarize(&statistics)[0]);
        assert_eq!(row.min, "-");
        assert_eq!(row.success_rate, "0.0");
    }
}
