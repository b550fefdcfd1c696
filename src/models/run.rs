//! # 运行记录与统计数据模型
//!
//! 定义单次尝试结果 `RunRecord` 以及按分析类型聚合的 `AnalysisStatistics`。
//!
//! ## 不变量
//! - `RunRecord` 创建后不可变，只追加不删除
//! - `statistics[s]` 始终等于 `runs` 中状态为 `s` 的记录数（增量维护）
//!
//! ## 依赖关系
//! - 被 `timing/runner.rs` 写入
//! - 被 `stats/` 和 `commands/` 读取
//! - 使用 `serde_json` 持久化

use crate::error::{LabelTimerError, Result};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 单次尝试的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
    Timeout,
}

impl RunStatus {
    pub const ALL: [RunStatus; 3] = [RunStatus::Success, RunStatus::Timeout, RunStatus::Error];
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Error => write!(f, "error"),
            RunStatus::Timeout => write!(f, "timeout"),
        }
    }
}

/// 一次尝试的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// 输入文件（绝对路径字符串）
    pub file: String,
    /// 耗时（秒）
    pub duration: f64,
    pub status: RunStatus,
}

impl RunRecord {
    pub fn new(file: impl Into<String>, duration: f64, status: RunStatus) -> Self {
        Self {
            file: file.into(),
            duration: duration.max(0.0),
            status,
        }
    }
}

/// 各状态计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCounts {
    pub success: usize,
    pub error: usize,
    pub timeout: usize,
}

impl StatusCounts {
    pub fn get(&self, status: RunStatus) -> usize {
        match status {
            RunStatus::Success => self.success,
            RunStatus::Error => self.error,
            RunStatus::Timeout => self.timeout,
        }
    }

    fn increment(&mut self, status: RunStatus) {
        match status {
            RunStatus::Success => self.success += 1,
            RunStatus::Error => self.error += 1,
            RunStatus::Timeout => self.timeout += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.error + self.timeout
    }
}

/// 单个分析类型的全部记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    runs: Vec<RunRecord>,
    #[serde(default)]
    statistics: StatusCounts,
}

impl AnalysisEntry {
    /// 追加记录并同步计数
    pub fn push(&mut self, record: RunRecord) {
        self.statistics.increment(record.status);
        self.runs.push(record);
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn statistics(&self) -> &StatusCounts {
        &self.statistics
    }

    /// 从 `runs` 重新统计
    pub fn recount(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for run in &self.runs {
            counts.increment(run.status);
        }
        counts
    }

    /// 存储的计数与记录列表是否一致（手工编辑过的文档可能不一致）
    pub fn is_consistent(&self) -> bool {
        self.recount() == self.statistics
    }

    /// 成功记录的耗时
    pub fn success_durations(&self) -> Vec<f64> {
        self.runs
            .iter()
            .filter(|r| r.status == RunStatus::Success)
            .map(|r| r.duration)
            .collect()
    }
}

/// 分析类型 → 记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisStatistics {
    analyses: BTreeMap<String, AnalysisEntry>,
}

impl AnalysisStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: &str, record: RunRecord) {
        self.analyses
            .entry(kind.to_string())
            .or_default()
            .push(record);
    }

    pub fn get(&self, kind: &str) -> Option<&AnalysisEntry> {
        self.analyses.get(kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnalysisEntry)> {
        self.analyses.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    /// 从 JSON 文档加载
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LabelTimerError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let file = File::open(path).map_err(|e| LabelTimerError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| LabelTimerError::JsonError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// 整体写出 JSON 文档（覆盖已有文件）
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_err = |e: std::io::Error| LabelTimerError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let file = File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
            LabelTimerError::JsonError {
                path: path.display().to_string(),
                source: e,
            }
        })?;
        writer.write_all(b"\n").map_err(write_err)?;
        writer.flush().map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_counts_follow_runs() {
        let mut stats = AnalysisStatistics::new();
        stats.record("liveness", RunRecord::new("/a", 1.5, RunStatus::Success));
        stats.record("liveness", RunRecord::new("/b", 120.0, RunStatus::Timeout));
        stats.record("liveness", RunRecord::new("/c", 0.2, RunStatus::Error));
        stats.record("liveness", RunRecord::new("/d", 3.0, RunStatus::Success));

        let entry = stats.get("liveness").unwrap();
        assert_eq!(entry.runs().len(), 4);
        assert_eq!(entry.statistics().success, 2);
        assert_eq!(entry.statistics().timeout, 1);
        assert_eq!(entry.statistics().error, 1);
        assert!(entry.is_consistent());
        assert_eq!(entry.success_durations(), vec![1.5, 3.0]);
    }

    #[test]
    fn test_document_layout() {
        let mut stats = AnalysisStatistics::new();
        stats.record("liveness", RunRecord::new("/x.ProgramGraph.pb", 120.0, RunStatus::Timeout));

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["liveness"]["runs"][0]["status"], "timeout");
        assert_eq!(value["liveness"]["runs"][0]["file"], "/x.ProgramGraph.pb");
        assert_eq!(value["liveness"]["statistics"]["timeout"], 1);
        assert_eq!(value["liveness"]["statistics"]["success"], 0);
        assert_eq!(value["liveness"]["statistics"]["error"], 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("analysis_data.json");

        let mut stats = AnalysisStatistics::new();
        stats.record("liveness", RunRecord::new("/a", 2.25, RunStatus::Success));
        stats.record("reachability", RunRecord::new("/a", 0.0, RunStatus::Error));
        stats.save(&path).unwrap();

        let loaded = AnalysisStatistics::load(&path).unwrap();
        assert_eq!(loaded, stats);
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_load_partial_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis_data.json");
        fs::write(
            &path,
            r#"{"liveness": {"runs": [{"file": "/a", "duration": 4.0, "status": "success"}],
                "statistics": {"success": 1}}}"#,
        )
        .unwrap();

        let loaded = AnalysisStatistics::load(&path).unwrap();
        let entry = loaded.get("liveness").unwrap();
        assert_eq!(entry.statistics().success, 1);
        assert_eq!(entry.statistics().timeout, 0);
        assert!(entry.is_consistent());
    }

    #[test]
    fn test_load_detects_inconsistent_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis_data.json");
        fs::write(
            &path,
            r#"{"liveness": {"runs": [], "statistics": {"success": 3}}}"#,
        )
        .unwrap();

        let loaded = AnalysisStatistics::load(&path).unwrap();
        assert!(!loaded.get("liveness").unwrap().is_consistent());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = AnalysisStatistics::load(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, LabelTimerError::FileNotFound { .. }));
    }
}
