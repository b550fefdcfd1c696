//! # 文件收集器
//!
//! 根据输入路径和文件名模式收集待处理文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式）
//! - 可选递归目录搜索
//! - 结果按路径排序，保证同一文件系统上顺序稳定
//!
//! ## 依赖关系
//! - 被 `commands/time.rs`, `commands/generate.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{LabelTimerError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器（默认匹配所有文件）
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    LabelTimerError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 检查文件名是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collects_matching_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.ProgramGraph.pb", "a.ProgramGraph.pb", "a.c", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.ProgramGraph.pb"), b"").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.ProgramGraph.pb")
            .unwrap()
            .collect();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.ProgramGraph.pb", "b.ProgramGraph.pb"]);
    }

    #[test]
    fn test_recursive_and_multi_pattern() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("top.c"), b"").unwrap();
        fs::write(dir.path().join("nested").join("deep.cpp"), b"").unwrap();
        fs::write(dir.path().join("nested").join("skip.h"), b"").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.c, *.cpp")
            .unwrap()
            .recursive(true)
            .collect();

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_single_file_and_missing_input() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("x.ProgramGraph.pb");
        fs::write(&file, b"").unwrap();

        assert_eq!(FileCollector::new(file.clone()).collect(), vec![file]);
        assert!(FileCollector::new(dir.path().join("missing"))
            .collect()
            .is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileCollector::new(PathBuf::from("."))
            .with_pattern("[")
            .is_err());
    }
}
