//! # 慢文件登记表
//!
//! 纯文本文件，每行一个输入文件的绝对路径，只追加不改写。
//! 成员检查在每次查询时重新读取文件，按整行精确匹配。
//!
//! ## 依赖关系
//! - 被 `timing/runner.rs` 查询与追加
//! - 被 `commands/generate.rs` 读取（--clean 模式）

use crate::error::{LabelTimerError, Result};

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 慢文件登记表
#[derive(Debug, Clone)]
pub struct SlowFileRegistry {
    path: PathBuf,
}

impl SlowFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部登记项（文件不存在时为空）
    pub fn entries(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| LabelTimerError::FileReadError {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// 是否已登记
    pub fn contains(&self, file: &str) -> Result<bool> {
        Ok(self.entries()?.iter().any(|entry| entry == file))
    }

    /// 登记文件；已存在时不重复写入，返回是否新增
    pub fn insert(&self, file: &str) -> Result<bool> {
        if self.contains(file)? {
            return Ok(false);
        }

        let write_err = |e: std::io::Error| LabelTimerError::FileWriteError {
            path: self.path.display().to_string(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let separator = if self.ends_without_newline().map_err(write_err)? {
            "\n"
        } else {
            ""
        };

        let mut file_handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        writeln!(file_handle, "{}{}", separator, file).map_err(write_err)?;
        file_handle.sync_data().map_err(write_err)?;
        Ok(true)
    }

    /// 手工编辑后的文件可能缺少末尾换行
    fn ends_without_newline(&self) -> std::io::Result<bool> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes.last().is_some_and(|b| *b != b'\n')),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
