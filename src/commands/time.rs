//! # time 命令实现
//!
//! 对图目录中每个程序图、每个分析类型计时运行外部分析程序。
//!
//! ## 功能
//! - 已登记的慢文件直接记为超时，不启动进程
//! - 超时或接近超时的文件立即追加到慢文件登记表
//! - 正常结束时一次性写出统计文档；收到 SIGINT/SIGTERM 时立即 kill 子进程并退出，不写统计
//!
//! ## 依赖关系
//! - 使用 `cli/time.rs` 定义的参数
//! - 使用 `timing/` 执行与分类
//! - 使用 `batch/collector.rs` 收集输入
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::batch::FileCollector;
use crate::cli::time::TimeArgs;
use crate::config::{self, ProjectLayout};
use crate::error::{LabelTimerError, Result};
use crate::models::{AnalysisStatistics, RunStatus};
use crate::timing::{
    AnalyzerCommand, AttemptDetail, CancelToken, FileReport, SlowFileRegistry, TimeBudget,
    TimedRunner,
};
use crate::utils::{output, progress};

/// 执行 time 命令
pub fn execute(args: TimeArgs, layout: &ProjectLayout) -> Result<()> {
    output::print_header("Label Generation Timing");

    validate(&args)?;

    let input_dir = config::existing_dir(&args.input.clone().unwrap_or_else(|| layout.graphs_dir()))?;
    let labels_dir = args.labels_dir.clone().unwrap_or_else(|| layout.labels_dir());
    let slow_files = args.slow_files.clone().unwrap_or_else(|| layout.slow_files());
    let data_file = args.data_file.clone().unwrap_or_else(|| layout.statistics_file());

    for kind in &args.analysis {
        config::ensure_dir(&labels_dir.join(kind))?;
    }

    // 收集输入文件
    let files = FileCollector::new(input_dir.clone())
        .with_pattern(&args.pattern)?
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}' in '{}'",
            args.pattern,
            input_dir.display()
        ));
        return Ok(());
    }

    let registry = SlowFileRegistry::new(&slow_files);
    let known = registry.entries()?.len();
    let budget = TimeBudget::from_secs_f64(args.timeout, args.margin);

    output::print_info(&format!(
        "Found {} program graphs in '{}'",
        files.len(),
        input_dir.display()
    ));
    output::print_info(&format!(
        "Time budget: {:.0}s (completions after {:.0}s count as timeouts)",
        budget.limit.as_secs_f64(),
        budget.safe_limit().as_secs_f64()
    ));
    output::print_info(&format!(
        "Slow-file registry: '{}' ({} entries)",
        slow_files.display(),
        known
    ));

    let cancel = CancelToken::new();
    cancel.install_signal_handler()?;

    let analyzer = AnalyzerCommand::new(&args.analyzer).with_leading_args(args.analyzer_args.clone());
    let mut runner = TimedRunner::new(analyzer, registry, budget, labels_dir)
        .with_cancel_token(cancel);

    let total = (files.len() * args.analysis.len()) as u64;
    let pb = progress::create_progress_bar(total, "Timing");

    for kind in &args.analysis {
        pb.suspend(|| output::print_info(&format!("Processing analysis: {}", kind)));

        let result = runner.run(std::slice::from_ref(kind), &files, |report| {
            pb.suspend(|| print_report(report));
            pb.inc(1);
        });

        if let Err(e) = result {
            pb.abandon();
            if matches!(e, LabelTimerError::Interrupted) {
                output::print_warning("Received interrupt signal. Analyzer killed, statistics discarded.");
            }
            return Err(e);
        }
    }

    pb.finish_and_clear();

    // 最后一个进程结束后收到的信号同样放弃统计
    if runner.cancel_token().is_cancelled() {
        output::print_warning("Received interrupt signal. Statistics discarded.");
        return Err(LabelTimerError::Interrupted);
    }

    let statistics = runner.into_statistics();
    print_summary(&statistics);

    statistics.save(&data_file)?;
    output::print_done(&format!("Statistics written to '{}'", data_file.display()));

    Ok(())
}

/// 参数检查
fn validate(args: &TimeArgs) -> Result<()> {
    if !(args.timeout.is_finite() && args.timeout > 0.0) {
        return Err(LabelTimerError::InvalidArgument(format!(
            "--timeout must be a positive number of seconds, got {}",
            args.timeout
        )));
    }
    if !(args.margin.is_finite() && args.margin >= 0.0) {
        return Err(LabelTimerError::InvalidArgument(format!(
            "--margin must be non-negative, got {}",
            args.margin
        )));
    }
    if args.analysis.iter().any(|k| k.trim().is_empty() || k.contains('/')) {
        return Err(LabelTimerError::InvalidArgument(
            "analysis kinds must be non-empty names without '/'".to_string(),
        ));
    }
    Ok(())
}

/// 打印单个文件的处理结果
fn print_report(report: &FileReport) {
    let file = &report.record.file;
    match &report.detail {
        AttemptDetail::KnownSlow => output::print_skip(&format!(
            "Known slow file: {} (recording {:.0}s)",
            file, report.record.duration
        )),
        AttemptDetail::Completed { exit_code } => {
            if report.record.status == RunStatus::Success {
                output::print_success(&format!(
                    "Processed: {} -> {} ({:.2}s)",
                    file,
                    report.output.display(),
                    report.record.duration
                ));
            } else {
                let code = exit_code
                    .map(|c| format!("exit code {}", c))
                    .unwrap_or_else(|| "killed by signal".to_string());
                output::print_error(&format!(
                    "Error processing: {} for analysis: {} ({})",
                    file, report.kind, code
                ));
            }
        }
        AttemptDetail::NearDeadline { elapsed } => output::print_timeout(&format!(
            "Finished too close to the budget: {} ({:.2}s)",
            file,
            elapsed.as_secs_f64()
        )),
        AttemptDetail::Killed => {
            output::print_timeout(&format!("File took too long to process: {}", file))
        }
        AttemptDetail::LaunchFailed(reason) => {
            output::print_error(&format!("Could not run analyzer on {}: {}", file, reason))
        }
    }

    if let Some(err) = &report.registry_error {
        output::print_warning(&format!("Failed to record slow file {}: {}", file, err));
    }
    if let Some(err) = &report.cleanup_error {
        output::print_warning(&format!(
            "Failed to remove output {}: {}",
            report.output.display(),
            err
        ));
    }
}

/// 打印各分析类型的计数
fn print_summary(statistics: &AnalysisStatistics) {
    output::print_separator();
    for (kind, entry) in statistics.iter() {
        let counts = entry.statistics();
        output::print_success(&format!(
            "{}: {} success, {} timeout, {} error",
            kind, counts.success, counts.timeout, counts.error
        ));
    }
}
