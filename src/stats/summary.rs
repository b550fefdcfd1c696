//! # 统计汇总
//!
//! 由统计文档计算每个分析类型的计数、成功率与耗时分布。
//!
//! ## 依赖关系
//! - 被 `commands/report.rs`, `stats/plot.rs`, `stats/export.rs` 使用
//! - 使用 `models/run.rs`

use crate::models::{AnalysisEntry, AnalysisStatistics, StatusCounts};

/// 单个分析类型的汇总
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub kind: String,
    /// 文档中存储的计数
    pub counts: StatusCounts,
    /// 存储计数是否与记录一致
    pub consistent: bool,
    /// 成功耗时分布（无成功记录时为 None）
    pub durations: Option<DurationSummary>,
}

impl AnalysisSummary {
    pub fn from_entry(kind: &str, entry: &AnalysisEntry) -> Self {
        Self {
            kind: kind.to_string(),
            counts: *entry.statistics(),
            consistent: entry.is_consistent(),
            durations: DurationSummary::from_values(&entry.success_durations()),
        }
    }

    /// 成功率（百分比）
    pub fn success_rate(&self) -> f64 {
        let total = self.counts.total();
        if total == 0 {
            0.0
        } else {
            self.counts.success as f64 / total as f64 * 100.0
        }
    }
}

/// 耗时分布
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationSummary {
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
}

impl DurationSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Some(Self {
            min: sorted[0],
            mean: sorted.iter().sum::<f64>() / n as f64,
            median,
            max: sorted[n - 1],
        })
    }
}

/// 汇总全部分析类型
pub fn summarize(stats: &AnalysisStatistics) -> Vec<AnalysisSummary> {
    stats
        .iter()
        .map(|(kind, entry)| AnalysisSummary::from_entry(kind, entry))
        .collect()
}

/// 直方图分箱
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// 等宽分箱；所有值相同时只返回一个箱
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![HistogramBin {
            start: min,
            end: min + 1.0,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        // 最大值归入最后一个箱
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunRecord, RunStatus};

    #[test]
    fn test_duration_summary() {
        let summary = DurationSummary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.median, 2.5);

        let odd = DurationSummary::from_values(&[9.0, 1.0, 5.0]).unwrap();
        assert_eq!(odd.median, 5.0);

        assert!(DurationSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_summarize() {
        let mut stats = AnalysisStatistics::new();
        stats.record("liveness", RunRecord::new("/a", 2.0, RunStatus::Success));
        stats.record("liveness", RunRecord::new("/b", 120.0, RunStatus::Timeout));
        stats.record("liveness", RunRecord::new("/c", 1.0, RunStatus::Error));
        stats.record("liveness", RunRecord::new("/d", 4.0, RunStatus::Success));

        let summaries = summarize(&stats);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.kind, "liveness");
        assert_eq!(s.success_rate(), 50.0);
        assert!(s.consistent);
        // 超时和错误不计入耗时分布
        assert_eq!(s.durations.unwrap().max, 4.0);
    }

    #[test]
    fn test_histogram_bins() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[3].end, 4.0);
        let counts: Vec<_> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn test_histogram_degenerate() {
        assert!(histogram(&[], 50).is_empty());
        let bins = histogram(&[3.0, 3.0], 50);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }
}
