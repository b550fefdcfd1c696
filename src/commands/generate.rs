//! # generate 命令实现
//!
//! 将 C 源文件转换为程序图。
//!
//! ## 功能
//! - 普通模式：转换源目录中所有匹配文件，失败的文件名追加到 `error_files.txt`
//! - --clean 模式：按慢文件登记表中的条目找回对应源文件并重新生成
//! - 并行处理（rayon）
//!
//! ## 依赖关系
//! - 使用 `cli/generate.rs` 定义的参数
//! - 使用 `graph/builder.rs` 调用外部图构建程序
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `timing/registry.rs` 读取慢文件登记表

use crate::batch::{BatchResult, BatchRunner, FileCollector, ProcessResult};
use crate::cli::generate::GenerateArgs;
use crate::config::{self, ProjectLayout, GRAPH_SUFFIX, SOURCE_SUFFIX};
use crate::error::{LabelTimerError, Result};
use crate::graph::GraphBuilder;
use crate::timing::SlowFileRegistry;
use crate::utils::output;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 图生成失败列表文件名
const ERROR_LOG: &str = "error_files.txt";

/// 执行 generate 命令
pub fn execute(args: GenerateArgs, layout: &ProjectLayout) -> Result<()> {
    let input_dir = args.input.clone().unwrap_or_else(|| layout.source_dir());
    let output_dir = args.output.clone().unwrap_or_else(|| layout.graphs_dir());
    let error_dir = args.error_dir.clone().unwrap_or_else(|| layout.errors_dir());

    config::ensure_dir(&output_dir)?;
    config::ensure_dir(&error_dir)?;

    let input_dir = config::existing_dir(&input_dir)?;
    let builder = GraphBuilder::new(&args.builder).with_args(args.builder_args.clone());
    let runner = BatchRunner::new(args.jobs);

    if args.clean {
        output::print_header("Regenerating Graphs for Slow Files");
        let slow_files = args.slow_files.clone().unwrap_or_else(|| layout.slow_files());
        execute_clean(&builder, &runner, &slow_files, &input_dir, &output_dir)
    } else {
        output::print_header("Generating Program Graphs");
        execute_normal(&builder, &runner, &args.pattern, &input_dir, &output_dir, &error_dir)
    }
}

/// 普通模式
fn execute_normal(
    builder: &GraphBuilder,
    runner: &BatchRunner,
    pattern: &str,
    input_dir: &Path,
    output_dir: &Path,
    error_dir: &Path,
) -> Result<()> {
    let files = FileCollector::new(input_dir.to_path_buf())
        .with_pattern(pattern)?
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            pattern
        ));
        return Ok(());
    }

    output::print_info(&format!(
        "Found {} source files, using {} jobs",
        files.len(),
        runner.jobs()
    ));

    let error_log_path = error_dir.join(ERROR_LOG);
    let error_log = Mutex::new(open_error_log(&error_log_path)?);

    let result = runner.run(files, |source| {
        match build_one(builder, source, output_dir) {
            ProcessResult::Failed(path, err) => match log_failure(&error_log, source) {
                Ok(()) => ProcessResult::Failed(path, err),
                Err(e) => ProcessResult::Failed(
                    path,
                    format!("{} (not recorded in {}: {})", err, ERROR_LOG, e),
                ),
            },
            other => other,
        }
    })?;

    print_batch_result(&result);
    if result.failed > 0 {
        output::print_info(&format!(
            "Failed files appended to '{}'",
            error_log_path.display()
        ));
    }

    Ok(())
}

/// --clean 模式
fn execute_clean(
    builder: &GraphBuilder,
    runner: &BatchRunner,
    slow_files: &Path,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    if !slow_files.exists() {
        return Err(LabelTimerError::FileNotFound {
            path: slow_files.display().to_string(),
        });
    }

    let entries = SlowFileRegistry::new(slow_files).entries()?;
    if entries.is_empty() {
        output::print_warning("Slow-file registry is empty, nothing to regenerate.");
        return Ok(());
    }

    let sources: Vec<PathBuf> = entries
        .iter()
        .map(|entry| source_for_registry_entry(entry, input_dir))
        .collect();

    output::print_info(&format!(
        "Regenerating {} graphs listed in '{}'",
        sources.len(),
        slow_files.display()
    ));

    let result = runner.run(sources, |source| {
        if !source.exists() {
            return ProcessResult::Skipped(format!(
                "Source file not found: {}",
                source.display()
            ));
        }
        build_one(builder, source, output_dir)
    })?;

    print_batch_result(&result);
    for skip in result.skips.iter().take(10) {
        output::print_skip(skip);
    }

    Ok(())
}

/// 登记表条目 `<dir>/<stem>.ProgramGraph.pb` → `<input>/<stem>.c`
fn source_for_registry_entry(entry: &str, input_dir: &Path) -> PathBuf {
    let stem = config::strip_suffix(Path::new(entry.trim()), GRAPH_SUFFIX);
    input_dir.join(format!("{}{}", stem, SOURCE_SUFFIX))
}

fn build_one(builder: &GraphBuilder, source: &Path, output_dir: &Path) -> ProcessResult {
    match builder.build_file(source, output_dir) {
        Ok(output) => ProcessResult::Success(output.display().to_string()),
        Err(e) => ProcessResult::Failed(source.display().to_string(), e.to_string()),
    }
}

fn open_error_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LabelTimerError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
}

/// 追加一条失败记录；其他线程 panic 导致的锁中毒不影响写入
fn log_failure(log: &Mutex<File>, source: &Path) -> std::io::Result<()> {
    let mut log = log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    writeln!(log, "{}", file_name(source))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// 打印统计
fn print_batch_result(result: &BatchResult) {
    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_for_registry_entry() {
        assert_eq!(
            source_for_registry_entry(
                "/proj/data/processed/graphs/prog_12.ProgramGraph.pb",
                Path::new("/proj/data/raw/code")
            ),
            PathBuf::from("/proj/data/raw/code/prog_12.c")
        );
        assert_eq!(
            source_for_registry_entry("  /g/x.ProgramGraph.pb \n", Path::new("/src")),
            PathBuf::from("/src/x.c")
        );
    }

    #[test]
    fn test_log_failure_survives_poisoned_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ERROR_LOG);
        let log = std::sync::Arc::new(Mutex::new(open_error_log(&path).unwrap()));

        let poisoner = std::sync::Arc::clone(&log);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(log.is_poisoned());

        log_failure(&log, Path::new("/src/broken.c")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "broken.c\n");
    }

    #[test]
    fn test_log_failure_reports_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ERROR_LOG);
        std::fs::write(&path, "").unwrap();
        // 只读句柄上的写入失败必须返回错误
        let log = Mutex::new(File::open(&path).unwrap());

        assert!(log_failure(&log, Path::new("/src/broken.c")).is_err());
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use std::fs;
        use tempfile::tempdir;

        fn builder(script: &str) -> GraphBuilder {
            GraphBuilder::new("/bin/sh").with_args(vec!["-c".to_string(), script.to_string()])
        }

        #[test]
        fn test_normal_mode_logs_failures() {
            let dir = tempdir().unwrap();
            let src = dir.path().join("code");
            let graphs = dir.path().join("graphs");
            let errors = dir.path().join("errors");
            fs::create_dir_all(&src).unwrap();
            fs::create_dir_all(&graphs).unwrap();
            fs::create_dir_all(&errors).unwrap();
            fs::write(src.join("good.c"), "int main(){}").unwrap();
            fs::write(src.join("bad.c"), "#error nope").unwrap();

            // 含 #error 的源文件构建失败
            let b = builder("input=$(cat); case \"$input\" in *'#error'*) exit 1;; esac; printf '%s' \"$input\"");
            execute_normal(&b, &BatchRunner::new(2), "*.c", &src, &graphs, &errors).unwrap();

            assert!(graphs.join("good.ProgramGraph.pb").exists());
            assert!(!graphs.join("bad.ProgramGraph.pb").exists());
            assert_eq!(
                fs::read_to_string(errors.join(ERROR_LOG)).unwrap(),
                "bad.c\n"
            );
        }

        #[test]
        fn test_clean_mode_regenerates_registry_entries() {
            let dir = tempdir().unwrap();
            let src = dir.path().join("code");
            let graphs = dir.path().join("graphs");
            fs::create_dir_all(&src).unwrap();
            fs::create_dir_all(&graphs).unwrap();
            fs::write(src.join("slow.c"), "int slow;").unwrap();
            fs::write(src.join("fast.c"), "int fast;").unwrap();

            let registry_path = dir.path().join("slow_files.txt");
            let registry = SlowFileRegistry::new(&registry_path);
            registry
                .insert(&graphs.join("slow.ProgramGraph.pb").display().to_string())
                .unwrap();
            registry
                .insert(&graphs.join("gone.ProgramGraph.pb").display().to_string())
                .unwrap();

            execute_clean(&builder("cat"), &BatchRunner::new(1), &registry_path, &src, &graphs)
                .unwrap();

            assert_eq!(
                fs::read_to_string(graphs.join("slow.ProgramGraph.pb")).unwrap(),
                "int slow;"
            );
            assert!(!graphs.join("fast.ProgramGraph.pb").exists());
            assert!(!graphs.join("gone.ProgramGraph.pb").exists());
        }

        #[test]
        fn test_clean_mode_requires_registry() {
            let dir = tempdir().unwrap();
            let result = execute_clean(
                &builder("cat"),
                &BatchRunner::new(1),
                &dir.path().join("missing.txt"),
                dir.path(),
                dir.path(),
            );
            assert!(matches!(result, Err(LabelTimerError::FileNotFound { .. })));
        }
    }
}
