//! # 程序图生成模块
//!
//! 将 C 源文件转换为序列化程序图文件，实际构建交给外部程序完成。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 子模块: builder

pub mod builder;

pub use builder::GraphBuilder;
