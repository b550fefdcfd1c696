//! # 计时批量执行器
//!
//! 顺序处理输入文件：对每个 (分析类型, 文件) 调用一次外部分析程序，
//! 按时间预算分类为 success / error / timeout，维护慢文件登记表并累计统计。
//!
//! ## 持久化
//! - 慢文件登记表：每发现一个超时立即追加（中断后仍保留）
//! - 统计数据：只在内存中累计，由调用方在正常结束时一次性写出
//!
//! ## 依赖关系
//! - 被 `commands/time.rs` 使用
//! - 使用 `timing/classify.rs`, `timing/process.rs`, `timing/registry.rs`
//! - 使用 `models/run.rs` 的统计结构

use crate::config::{self, GRAPH_SUFFIX, LABEL_SUFFIX};
use crate::error::{LabelTimerError, Result};
use crate::models::{AnalysisStatistics, RunRecord, RunStatus};
use crate::timing::classify::{self, TimeBudget};
use crate::timing::process::{AnalyzerCommand, WaitOutcome};
use crate::timing::{CancelToken, SlowFileRegistry};

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 单次尝试的细节（用于进度输出）
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptDetail {
    /// 已登记为慢文件，未启动进程
    KnownSlow,
    /// 在安全区内完成
    Completed { exit_code: Option<i32> },
    /// 完成但落在危险边界内
    NearDeadline { elapsed: Duration },
    /// 超过期限被 kill
    Killed,
    /// 无法打开输入/输出或无法启动进程
    LaunchFailed(String),
}

/// 单个文件的处理报告
#[derive(Debug, Clone)]
pub struct FileReport {
    pub kind: String,
    pub record: RunRecord,
    pub detail: AttemptDetail,
    pub output: PathBuf,
    /// 本次是否新登记为慢文件
    pub newly_registered: bool,
    /// 登记表写入失败的原因
    pub registry_error: Option<String>,
    /// 非成功输出删除失败的原因
    pub cleanup_error: Option<String>,
}

/// 计时批量执行器
pub struct TimedRunner {
    analyzer: AnalyzerCommand,
    registry: SlowFileRegistry,
    budget: TimeBudget,
    labels_dir: PathBuf,
    cancel: CancelToken,
    statistics: AnalysisStatistics,
}

impl TimedRunner {
    pub fn new(
        analyzer: AnalyzerCommand,
        registry: SlowFileRegistry,
        budget: TimeBudget,
        labels_dir: PathBuf,
    ) -> Self {
        Self {
            analyzer,
            registry,
            budget,
            labels_dir,
            cancel: CancelToken::new(),
            statistics: AnalysisStatistics::new(),
        }
    }

    /// 使用外部提供的取消令牌
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn statistics(&self) -> &AnalysisStatistics {
        &self.statistics
    }

    /// 结束运行并交出统计数据
    pub fn into_statistics(self) -> AnalysisStatistics {
        self.statistics
    }

    /// 输出文件路径 `<labels>/<kind>/<stem>.ProgramGraphFeaturesList.pb`
    pub fn output_path(&self, kind: &str, input: &Path) -> PathBuf {
        let stem = config::strip_suffix(input, GRAPH_SUFFIX);
        self.labels_dir
            .join(kind)
            .join(format!("{}{}", stem, LABEL_SUFFIX))
    }

    /// 依次处理所有分析类型与文件；只有中断会提前返回
    pub fn run<F>(&mut self, kinds: &[String], files: &[PathBuf], mut on_report: F) -> Result<()>
    where
        F: FnMut(&FileReport),
    {
        for kind in kinds {
            for file in files {
                let report = self.process_file(kind, file)?;
                on_report(&report);
            }
        }
        Ok(())
    }

    /// 处理单个文件，恰好产生一条 RunRecord
    ///
    /// 除 `Interrupted` 外，所有失败都记录为数据而不是返回错误。
    pub fn process_file(&mut self, kind: &str, input: &Path) -> Result<FileReport> {
        // 两次启动之间或命中登记表时不会进入等待循环，这里单独检查
        if self.cancel.is_cancelled() {
            return Err(LabelTimerError::Interrupted);
        }

        let file_id = input.display().to_string();
        let output = self.output_path(kind, input);

        // 登记表读取失败时按未登记处理，仍尝试运行
        let known_slow = self.registry.contains(&file_id).unwrap_or(false);

        let (status, duration, detail) = if known_slow {
            (
                RunStatus::Timeout,
                self.budget.limit_secs(),
                AttemptDetail::KnownSlow,
            )
        } else {
            match self.attempt(kind, input, &output) {
                Ok(WaitOutcome::Exited { code, elapsed }) => {
                    let status = classify::classify(code, elapsed, &self.budget);
                    if status == RunStatus::Timeout {
                        (
                            status,
                            self.budget.limit_secs(),
                            AttemptDetail::NearDeadline { elapsed },
                        )
                    } else {
                        (
                            status,
                            elapsed.as_secs_f64(),
                            AttemptDetail::Completed { exit_code: code },
                        )
                    }
                }
                Ok(WaitOutcome::DeadlineExceeded { .. }) => (
                    RunStatus::Timeout,
                    self.budget.limit_secs(),
                    AttemptDetail::Killed,
                ),
                Err(LabelTimerError::Interrupted) => {
                    let _ = remove_if_exists(&output);
                    return Err(LabelTimerError::Interrupted);
                }
                Err(e) => (RunStatus::Error, 0.0, AttemptDetail::LaunchFailed(e.to_string())),
            }
        };

        let mut cleanup_error = None;
        if !classify::keeps_output(status) {
            if let Err(e) = remove_if_exists(&output) {
                cleanup_error = Some(e.to_string());
            }
        }

        let mut newly_registered = false;
        let mut registry_error = None;
        if classify::marks_slow(status) && !known_slow {
            match self.registry.insert(&file_id) {
                Ok(added) => newly_registered = added,
                Err(e) => registry_error = Some(e.to_string()),
            }
        }

        let record = RunRecord::new(file_id, duration, status);
        self.statistics.record(kind, record.clone());

        Ok(FileReport {
            kind: kind.to_string(),
            record,
            detail,
            output,
            newly_registered,
            registry_error,
            cleanup_error,
        })
    }

    /// 打开输入/输出并运行外部进程
    fn attempt(&self, kind: &str, input: &Path, output: &Path) -> Result<WaitOutcome> {
        if let Some(parent) = output.parent() {
            config::ensure_dir(parent)?;
        }

        let input_file = File::open(input).map_err(|e| LabelTimerError::FileReadError {
            path: input.display().to_string(),
            source: e,
        })?;
        let output_file = File::create(output).map_err(|e| LabelTimerError::FileWriteError {
            path: output.display().to_string(),
            source: e,
        })?;

        self.analyzer.run_with_deadline(
            kind,
            input_file,
            output_file,
            self.budget.limit,
            &self.cancel,
        )
    }
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
