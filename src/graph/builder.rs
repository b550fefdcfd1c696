//! # 程序图生成
//!
//! 调用外部图构建程序：源代码文本经 stdin 传入，序列化程序图从 stdout 读出，
//! 写入 `<graphs>/<stem>.ProgramGraph.pb`。已有输出会被替换。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 调用
//! - 使用 `config.rs` 的路径约定

use crate::config::{self, GRAPH_SUFFIX, SOURCE_SUFFIX};
use crate::error::{LabelTimerError, Result};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// 外部图构建程序
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl GraphBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// 源文件对应的程序图路径
    pub fn output_path(source: &Path, output_dir: &Path) -> PathBuf {
        let stem = config::strip_suffix(source, SOURCE_SUFFIX);
        output_dir.join(format!("{}{}", stem, GRAPH_SUFFIX))
    }

    /// 由源代码文本生成序列化程序图
    pub fn build_bytes(&self, source_text: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LabelTimerError::CommandNotFound {
                command: self.program.display().to_string(),
                reason: e.to_string(),
            })?;

        // 单独线程写入 stdin，避免双方管道缓冲区写满后互相等待
        let writer = child.stdin.take().map(|mut stdin| {
            let bytes = source_text.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&bytes))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| LabelTimerError::CommandFailed {
                command: self.describe(),
                stderr: e.to_string(),
            })?;

        if let Some(handle) = writer {
            // 构建程序可能不读完 stdin 就退出，此时的 BrokenPipe 以退出状态为准
            let _ = handle.join();
        }

        if !output.status.success() {
            return Err(LabelTimerError::CommandFailed {
                command: self.describe(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if output.stdout.is_empty() {
            return Err(LabelTimerError::CommandFailed {
                command: self.describe(),
                stderr: "builder produced an empty graph".to_string(),
            });
        }

        Ok(output.stdout)
    }

    /// 生成单个源文件的程序图，返回输出路径
    pub fn build_file(&self, source: &Path, output_dir: &Path) -> Result<PathBuf> {
        let source_text =
            fs::read_to_string(source).map_err(|e| LabelTimerError::FileReadError {
                path: source.display().to_string(),
                source: e,
            })?;

        let graph = self.build_bytes(&source_text)?;

        let output_path = Self::output_path(source, output_dir);
        let write_err = |e: std::io::Error| LabelTimerError::FileWriteError {
            path: output_path.display().to_string(),
            source: e,
        };
        if output_path.exists() {
            fs::remove_file(&output_path).map_err(write_err)?;
        }
        fs::write(&output_path, graph).map_err(write_err)?;

        Ok(output_path)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn shell(script: &str) -> GraphBuilder {
        GraphBuilder::new("/bin/sh").with_args(vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            GraphBuilder::output_path(Path::new("/src/foo.c"), Path::new("/graphs")),
            PathBuf::from("/graphs/foo.ProgramGraph.pb")
        );
    }

    #[test]
    fn test_build_file_replaces_existing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("prog.c");
        fs::write(&source, "int main() { return 0; }").unwrap();
        let out_dir = dir.path().join("graphs");
        fs::create_dir(&out_dir).unwrap();
        fs::write(out_dir.join("prog.ProgramGraph.pb"), b"stale").unwrap();

        let output = shell("tr a-z A-Z").build_file(&source, &out_dir).unwrap();

        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "INT MAIN() { RETURN 0; }"
        );
    }

    #[test]
    fn test_failure_reports_stderr() {
        let err = shell("echo 'parse error' >&2; exit 1")
            .build_bytes("int x")
            .unwrap_err();
        match err {
            LabelTimerError::CommandFailed { stderr, .. } => assert_eq!(stderr, "parse error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_output_is_failure() {
        assert!(shell("cat > /dev/null").build_bytes("int x;").is_err());
    }

    #[test]
    fn test_missing_builder() {
        let err = GraphBuilder::new("/nonexistent/clang2graph")
            .build_bytes("")
            .unwrap_err();
        assert!(matches!(err, LabelTimerError::CommandNotFound { .. }));
    }
}
