//! # 外部分析进程调用
//!
//! 以 `<program> [leading-args] <kind> --stdin_fmt=pb --stdout_fmt=pb` 形式调用外部分析程序，
//! 输入文件经 stdin 传入，stdout 写入输出文件，stderr 丢弃。
//! 等待过程受硬性墙钟期限约束：超时或收到取消请求时直接 kill，不做优雅退出。
//!
//! ## 依赖关系
//! - 被 `timing/runner.rs` 使用
//! - 使用 `timing/cancel.rs` 的 CancelToken

use crate::error::{LabelTimerError, Result};
use crate::timing::CancelToken;

use std::fs::File;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 外部分析程序
#[derive(Debug, Clone)]
pub struct AnalyzerCommand {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl AnalyzerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// 在分析类型之前插入的参数
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    fn args(&self, kind: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push(kind.to_string());
        args.push("--stdin_fmt=pb".to_string());
        args.push("--stdout_fmt=pb".to_string());
        args
    }

    /// 用于提示信息的命令行文本
    pub fn describe(&self, kind: &str) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args(kind));
        parts.join(" ")
    }

    /// 启动进程并在期限内等待
    pub fn run_with_deadline(
        &self,
        kind: &str,
        input: File,
        output: File,
        limit: Duration,
        cancel: &CancelToken,
    ) -> Result<WaitOutcome> {
        let started = Instant::now();

        let child = Command::new(&self.program)
            .args(self.args(kind))
            .stdin(Stdio::from(input))
            .stdout(Stdio::from(output))
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LabelTimerError::CommandNotFound {
                command: self.program.display().to_string(),
                reason: e.to_string(),
            })?;

        wait_with_deadline(child, started, limit, cancel, &self.describe(kind))
    }
}

/// 等待结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// 进程在期限内退出
    Exited {
        code: Option<i32>,
        elapsed: Duration,
    },
    /// 超过期限，进程已被 kill 并回收
    DeadlineExceeded { elapsed: Duration },
}

/// 轮询子进程直到退出、超过期限或被取消
///
/// 每轮先检查退出，再检查期限，因此在期限时刻观察到的退出按退出处理。
fn wait_with_deadline(
    mut child: Child,
    started: Instant,
    limit: Duration,
    cancel: &CancelToken,
    command: &str,
) -> Result<WaitOutcome> {
    loop {
        if cancel.is_cancelled() {
            kill_and_reap(&mut child);
            return Err(LabelTimerError::Interrupted);
        }

        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(WaitOutcome::Exited {
                    code: status.code(),
                    elapsed: started.elapsed(),
                });
            }
            Ok(None) => {
                let elapsed = started.elapsed();
                if elapsed >= limit {
                    kill_and_reap(&mut child);
                    return Ok(WaitOutcome::DeadlineExceeded { elapsed });
                }
                thread::sleep(POLL_INTERVAL.min(limit - elapsed));
            }
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(LabelTimerError::CommandFailed {
                    command: command.to_string(),
                    stderr: e.to_string(),
                });
            }
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    // 进程可能恰好已退出，kill 失败无需处理
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn shell(script: &str) -> AnalyzerCommand {
        AnalyzerCommand::new("/bin/sh").with_leading_args(vec![
            "-c".to_string(),
            script.to_string(),
            "analyze".to_string(),
        ])
    }

    fn files(dir: &std::path::Path, content: &[u8]) -> (File, File, PathBuf) {
        let input_path = dir.join("in.ProgramGraph.pb");
        let output_path = dir.join("out.pb");
        fs::write(&input_path, content).unwrap();
        (
            File::open(&input_path).unwrap(),
            File::create(&output_path).unwrap(),
            output_path,
        )
    }

    #[test]
    fn test_arguments_passed() {
        let cmd = AnalyzerCommand::new("analyze");
        assert_eq!(
            cmd.describe("liveness"),
            "analyze liveness --stdin_fmt=pb --stdout_fmt=pb"
        );
    }

    #[test]
    fn test_pipes_stdin_to_stdout() {
        let dir = tempdir().unwrap();
        let (input, output, output_path) = files(dir.path(), b"graph-bytes");
        let cmd = shell(r#"[ "$1" = liveness ] && [ "$2" = --stdin_fmt=pb ] && cat"#);

        let outcome = cmd
            .run_with_deadline("liveness", input, output, Duration::from_secs(10), &CancelToken::new())
            .unwrap();

        assert!(matches!(outcome, WaitOutcome::Exited { code: Some(0), .. }));
        assert_eq!(fs::read(&output_path).unwrap(), b"graph-bytes");
    }

    #[test]
    fn test_nonzero_exit_code() {
        let dir = tempdir().unwrap();
        let (input, output, _) = files(dir.path(), b"");
        let outcome = shell("exit 2")
            .run_with_deadline("liveness", input, output, Duration::from_secs(10), &CancelToken::new())
            .unwrap();
        assert!(matches!(outcome, WaitOutcome::Exited { code: Some(2), .. }));
    }

    #[test]
    fn test_deadline_kills_process() {
        let dir = tempdir().unwrap();
        let (input, output, _) = files(dir.path(), b"");
        let started = Instant::now();
        let outcome = shell("exec sleep 30")
            .run_with_deadline("liveness", input, output, Duration::from_millis(300), &CancelToken::new())
            .unwrap();

        assert!(matches!(outcome, WaitOutcome::DeadlineExceeded { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_cancel_interrupts_wait() {
        let dir = tempdir().unwrap();
        let (input, output, _) = files(dir.path(), b"");
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            trigger.cancel();
        });

        let started = Instant::now();
        let result = shell("exec sleep 30").run_with_deadline(
            "liveness",
            input,
            output,
            Duration::from_secs(60),
            &cancel,
        );
        handle.join().unwrap();

        assert!(matches!(result, Err(LabelTimerError::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_program() {
        let dir = tempdir().unwrap();
        let (input, output, _) = files(dir.path(), b"");
        let result = AnalyzerCommand::new(dir.path().join("no-such-analyzer")).run_with_deadline(
            "liveness",
            input,
            output,
            Duration::from_secs(1),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(LabelTimerError::CommandNotFound { .. })));
    }
}
