//! # 计时执行模块
//!
//! 在固定墙钟预算内逐个调用外部分析程序，记录成功/错误/超时，
//! 并维护跨运行持久化的慢文件登记表。
//!
//! ## 子模块
//! - `classify`: 纯函数分类 (退出码, 耗时, 预算) → 状态
//! - `process`: 外部进程启动与期限等待
//! - `registry`: 慢文件登记表
//! - `cancel`: 取消令牌（SIGINT/SIGTERM）
//! - `runner`: 顺序批量执行器
//!
//! ## 依赖关系
//! - 被 `commands/time.rs` 使用
//! - 使用 `models/run.rs`, `config.rs`

pub mod cancel;
pub mod classify;
pub mod process;
pub mod registry;
pub mod runner;

pub use cancel::CancelToken;
pub use classify::TimeBudget;
pub use process::AnalyzerCommand;
pub use registry::SlowFileRegistry;
pub use runner::{AttemptDetail, FileReport, TimedRunner};
