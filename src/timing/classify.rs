//! # 结果分类
//!
//! 将 (退出码, 耗时, 时间预算) 映射为 `RunStatus`，与进程如何运行无关；
//! 清理动作只由分类结果决定。
//!
//! ## 规则
//! - `d > T - M` → `Timeout`（接近超时的完成同样视为超时）
//! - `d <= T - M` 且退出码为 0 → `Success`
//! - 其余 → `Error`（包括被信号终止、无退出码的情况）
//!
//! ## 依赖关系
//! - 被 `timing/runner.rs` 使用

use crate::models::RunStatus;

use std::time::Duration;

/// 单文件时间预算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBudget {
    /// 硬超时 T
    pub limit: Duration,
    /// 危险边界 M
    pub margin: Duration,
}

impl TimeBudget {
    pub fn new(limit: Duration, margin: Duration) -> Self {
        Self { limit, margin }
    }

    pub fn from_secs_f64(limit: f64, margin: f64) -> Self {
        Self::new(
            Duration::from_secs_f64(limit.max(0.0)),
            Duration::from_secs_f64(margin.max(0.0)),
        )
    }

    /// 安全区上界 `T - M`
    pub fn safe_limit(&self) -> Duration {
        self.limit.saturating_sub(self.margin)
    }

    /// 超时记录使用的耗时
    pub fn limit_secs(&self) -> f64 {
        self.limit.as_secs_f64()
    }
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self::new(Duration::from_secs(120), Duration::from_secs(10))
    }
}

/// 分类一次已完成的尝试
pub fn classify(exit_code: Option<i32>, elapsed: Duration, budget: &TimeBudget) -> RunStatus {
    if elapsed > budget.safe_limit() {
        RunStatus::Timeout
    } else if exit_code == Some(0) {
        RunStatus::Success
    } else {
        RunStatus::Error
    }
}

/// 只有成功结果保留输出文件
pub fn keeps_output(status: RunStatus) -> bool {
    status == RunStatus::Success
}

/// 超时的输入需要登记为慢文件
pub fn marks_slow(status: RunStatus) -> bool {
    status == RunStatus::Timeout
}
