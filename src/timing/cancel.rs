//! # 取消令牌
//!
//! 信号处理器只负责置位令牌；等待循环轮询令牌并强制终止正在运行的子进程。
//!
//! ## 依赖关系
//! - 被 `timing/process.rs` 轮询
//! - 被 `commands/time.rs` 安装到 SIGINT/SIGTERM
//! - 使用 `ctrlc` crate

use crate::error::{LabelTimerError, Result};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 可跨线程共享的取消标记
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 将 SIGINT / SIGTERM 绑定到该令牌（每个进程只能安装一次）
    pub fn install_signal_handler(&self) -> Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || token.cancel())
            .map_err(|e| LabelTimerError::SignalHandler(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
