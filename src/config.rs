//! # 项目目录布局
//!
//! 所有默认路径都从同一个项目根目录推导，各子命令可单独覆盖。
//!
//! ```text
//! <project-root>/
//!   ├── data/raw/code/                 C 源文件
//!   ├── data/processed/graphs/         *.ProgramGraph.pb
//!   ├── data/temp/labels/<kind>/       *.ProgramGraphFeaturesList.pb
//!   ├── output/logs/slow_files.txt     慢文件登记表
//!   ├── output/logs/analysis_data.json 统计文档
//!   ├── output/errors/error_files.txt  图生成失败列表
//!   └── output/figures/                图表
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 无外部模块依赖

use crate::error::{LabelTimerError, Result};

use std::fs;
use std::path::{Path, PathBuf};

/// 输入程序图后缀
pub const GRAPH_SUFFIX: &str = ".ProgramGraph.pb";
/// 标签输出后缀
pub const LABEL_SUFFIX: &str = ".ProgramGraphFeaturesList.pb";
/// C 源文件后缀
pub const SOURCE_SUFFIX: &str = ".c";

/// 默认项目目录名（位于 $HOME 下）
const DEFAULT_PROJECT_DIR: &str = "ProGraML-GraphGen";

/// 项目目录布局
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 使用显式根目录，否则回退到 `$HOME/ProGraML-GraphGen`
    pub fn resolve(root: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = root {
            return Ok(Self::new(root));
        }
        let home = std::env::var_os("HOME").ok_or_else(|| {
            LabelTimerError::InvalidArgument(
                "HOME is not set; pass --project-root or LABELTIMER_PROJECT_ROOT".to_string(),
            )
        })?;
        Ok(Self::new(PathBuf::from(home).join(DEFAULT_PROJECT_DIR)))
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join("data").join("raw").join("code")
    }

    pub fn graphs_dir(&self) -> PathBuf {
        self.root.join("data").join("processed").join("graphs")
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.root.join("data").join("temp").join("labels")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("output").join("logs")
    }

    pub fn slow_files(&self) -> PathBuf {
        self.logs_dir().join("slow_files.txt")
    }

    pub fn statistics_file(&self) -> PathBuf {
        self.logs_dir().join("analysis_data.json")
    }

    pub fn errors_dir(&self) -> PathBuf {
        self.root.join("output").join("errors")
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.root.join("output").join("figures")
    }
}

/// 去掉文件名中的固定后缀，得到 stem
///
/// `foo.ProgramGraph.pb` → `foo`；不带该后缀时退回 `Path::file_stem`。
pub fn strip_suffix(path: &Path, suffix: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.strip_suffix(suffix) {
        Some(stem) => stem.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or(name),
    }
}

/// 确保目录存在
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| LabelTimerError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })
}

/// 校验输入目录存在并返回其绝对路径
pub fn existing_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(LabelTimerError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }
    dir.canonicalize().map_err(|e| LabelTimerError::FileReadError {
        path: dir.display().to_string(),
        source: e,
    })
}
