//! # 批量执行器
//!
//! 为每个单元并发执行“解析真实路径 -> 读取 -> 格式化 -> 写回或缓存”，
//! 并在最后一个单元完成时恰好汇总一次结果。
//!
//! ## 功能
//! - 单线程协作式并发：每个单元一个 tokio 任务，I/O 处让出
//! - 按原始索引存放结果，输出顺序与完成顺序无关
//! - 格式化失败只记录，I/O 失败立即中止整个批次
//! - 原地写回时显示进度条
//!
//! ## 依赖关系
//! - 被 `commands/beautify.rs` 调用
//! - 使用 `batch/transform.rs` 执行格式化
//! - 使用 `utils/progress.rs` 创建进度条

use super::transform::{self, JsBeautifier, Transform};
use crate::error::{BeautError, Result, TransformError};
use crate::models::{Configuration, InputSource, Unit, UnitState};
use crate::utils::{output, progress};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinSet;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 结果输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// 按输入顺序拼接后写到标准输出
    Buffered,
    /// 写回原文件，标准输出只打印摘要
    InPlace,
}

/// 单个单元的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitResult {
    Buffered(String),
    Written { changed: bool },
    Failed(TransformError),
}

/// 单元完成信号
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub unit: Unit,
    pub result: UnitResult,
}

/// 整个批次的汇总结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub mode: OutputMode,
    pub text: String,
    /// 按输入顺序排列的失败单元
    pub failures: Vec<TransformError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 一次调用的批次状态
///
/// 每个单元只写自己的索引槽位；剩余计数归零时恰好汇总一次。
#[derive(Debug)]
pub struct BatchState {
    mode: OutputMode,
    total: usize,
    remaining: usize,
    results: Vec<Option<String>>,
    completed: Vec<bool>,
    failures: Vec<(usize, TransformError)>,
    finalized: bool,
}

impl BatchState {
    pub fn new(total: usize, mode: OutputMode) -> Self {
        BatchState {
            mode,
            total,
            remaining: total,
            results: vec![None; total],
            completed: vec![false; total],
            failures: Vec::new(),
            finalized: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// 记录一个单元的完成；仅在最后一个单元完成时返回汇总结果
    pub fn complete(&mut self, report: UnitReport) -> Option<BatchOutcome> {
        let index = report.unit.index;
        if self.finalized || index >= self.total || self.completed[index] {
            tracing::warn!(index, "ignored duplicate or late unit completion");
            return None;
        }
        self.completed[index] = true;

        match report.result {
            UnitResult::Buffered(text) => self.results[index] = Some(text),
            UnitResult::Written { changed } => {
                self.results[index] = Some(confirmation(&report.unit, changed));
            }
            UnitResult::Failed(err) => self.failures.push((index, err)),
        }

        self.remaining -= 1;
        tracing::debug!(
            index,
            state = ?report.unit.state(),
            remaining = self.remaining,
            "unit completed"
        );
        if self.remaining > 0 {
            return None;
        }
        self.finalized = true;
        Some(self.finalize())
    }

    fn finalize(&mut self) -> BatchOutcome {
        let mut failures = std::mem::take(&mut self.failures);
        failures.sort_by_key(|(index, _)| *index);
        let failures: Vec<TransformError> = failures.into_iter().map(|(_, e)| e).collect();

        let mut parts: Vec<String> = self.results.iter_mut().filter_map(Option::take).collect();
        let text = match self.mode {
            OutputMode::Buffered => parts.join("\n\n"),
            OutputMode::InPlace => {
                parts.push(summary(self.total, failures.len()));
                parts.join("\n")
            }
        };

        BatchOutcome {
            mode: self.mode,
            text,
            failures,
        }
    }
}

fn confirmation(unit: &Unit, changed: bool) -> String {
    if changed {
        format!("Beautified {}", unit.label())
    } else {
        format!("Unchanged {}", unit.label())
    }
}

fn summary(total: usize, failed: usize) -> String {
    if failed == 0 {
        "Beautification complete!".to_string()
    } else {
        format!(
            "Beautification failed for {} of {} file(s)",
            failed, total
        )
    }
}

/// 批量执行器
pub struct BatchRunner<T = JsBeautifier> {
    config: Arc<Configuration>,
    transformer: Arc<T>,
    write_in_place: bool,
}

impl<T> BatchRunner<T>
where
    T: Transform + 'static,
{
    pub fn new(config: Configuration, transformer: T, write_in_place: bool) -> Self {
        BatchRunner {
            config: Arc::new(config),
            transformer: Arc::new(transformer),
            write_in_place,
        }
    }

    /// 处理整个输入源；`stream` 仅在输入源为 `Stream` 时被读取
    pub async fn run<R>(&self, source: InputSource, stream: R) -> Result<BatchOutcome>
    where
        R: AsyncRead + Unpin,
    {
        match source {
            InputSource::Stream => self.run_stream(stream).await,
            InputSource::FileSet(paths) => self.run_files(paths).await,
        }
    }

    async fn run_stream<R>(&self, mut stream: R) -> Result<BatchOutcome>
    where
        R: AsyncRead + Unpin,
    {
        if self.write_in_place {
            output::print_warning("--replace has no effect on standard input; writing to stdout");
        }

        let mut unit = Unit::stream();
        unit.advance(UnitState::Reading);
        let mut raw = String::new();
        stream
            .read_to_string(&mut raw)
            .await
            .map_err(BeautError::StdinReadError)?;
        let text = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        unit.advance(UnitState::Transforming);
        let result = match transform::run(self.transformer.as_ref(), &unit, text, &self.config) {
            Ok(formatted) => {
                unit.advance(UnitState::Buffered);
                unit.advance(UnitState::Done);
                UnitResult::Buffered(formatted)
            }
            Err(err) => {
                unit.advance(UnitState::Failed);
                UnitResult::Failed(err)
            }
        };

        let mut state = BatchState::new(1, OutputMode::Buffered);
        state
            .complete(UnitReport { unit, result })
            .ok_or_else(|| BeautError::Interrupted("stream unit did not finalize".to_string()))
    }

    async fn run_files(&self, paths: Vec<PathBuf>) -> Result<BatchOutcome> {
        if paths.is_empty() {
            return Err(BeautError::NoMatch {
                patterns: Vec::new(),
            });
        }

        let total = paths.len();
        let mode = if self.write_in_place {
            OutputMode::InPlace
        } else {
            OutputMode::Buffered
        };
        let mut state = BatchState::new(total, mode);
        let pb = (self.write_in_place && total > 1)
            .then(|| progress::create_progress_bar(total as u64, "Beautifying"));

        let mut tasks = JoinSet::new();
        for (index, path) in paths.into_iter().enumerate() {
            tasks.spawn(process_unit(
                Unit::file(index, path),
                Arc::clone(&self.config),
                Arc::clone(&self.transformer),
                self.write_in_place,
            ));
        }

        while let Some(joined) = tasks.join_next().await {
            let report = match joined {
                Ok(Ok(report)) => report,
                Ok(Err(err)) => {
                    tasks.abort_all();
                    if let Some(pb) = &pb {
                        pb.abandon();
                    }
                    return Err(err);
                }
                Err(err) => {
                    tasks.abort_all();
                    return Err(BeautError::Interrupted(err.to_string()));
                }
            };

            if let UnitResult::Failed(err) = &report.result {
                tracing::warn!(unit = %err.unit, reason = %err.reason, "transform failed");
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            if let Some(outcome) = state.complete(report) {
                if let Some(pb) = &pb {
                    pb.finish_and_clear();
                }
                return Ok(outcome);
            }
        }

        Err(BeautError::Interrupted(format!(
            "{} unit(s) never reported completion",
            state.remaining()
        )))
    }
}

/// 单个文件单元：解析真实路径、读取、格式化，然后写回或缓存
async fn process_unit<T>(
    mut unit: Unit,
    config: Arc<Configuration>,
    transformer: Arc<T>,
    write_in_place: bool,
) -> Result<UnitReport>
where
    T: Transform + ?Sized,
{
    let Some(path) = unit.path().map(Path::to_path_buf) else {
        return Err(BeautError::Interrupted(format!(
            "unit {} has no source path",
            unit.index
        )));
    };
    let display = path.display().to_string();

    unit.advance(UnitState::Reading);
    let real = match tokio::fs::canonicalize(&path).await {
        Ok(real) => real,
        Err(source) => {
            unit.advance(UnitState::Failed);
            return Err(BeautError::PathResolveError {
                path: display,
                source,
            });
        }
    };
    let bytes = match tokio::fs::read(&real).await {
        Ok(bytes) => bytes,
        Err(source) => {
            unit.advance(UnitState::Failed);
            return Err(BeautError::FileReadError {
                path: display,
                source,
            });
        }
    };
    let (bom, text) = match decode(&bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            unit.advance(UnitState::Failed);
            return Err(BeautError::FileReadError {
                path: display,
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            });
        }
    };

    unit.advance(UnitState::Transforming);
    let formatted = match transform::run(transformer.as_ref(), &unit, text, &config) {
        Ok(formatted) => formatted,
        Err(err) => {
            unit.advance(UnitState::Failed);
            return Ok(UnitReport {
                unit,
                result: UnitResult::Failed(err),
            });
        }
    };

    if !write_in_place {
        unit.advance(UnitState::Buffered);
        unit.advance(UnitState::Done);
        return Ok(UnitReport {
            unit,
            result: UnitResult::Buffered(formatted),
        });
    }

    unit.advance(UnitState::WritingInPlace);
    let encoded = encode(bom, &formatted);
    let changed = encoded != bytes;
    if changed {
        if let Err(source) = tokio::fs::write(&real, &encoded).await {
            unit.advance(UnitState::Failed);
            return Err(BeautError::FileWriteError {
                path: display,
                source,
            });
        }
    }
    unit.advance(UnitState::Done);
    Ok(UnitReport {
        unit,
        result: UnitResult::Written { changed },
    })
}

/// 按 UTF-8 解码，剥离并记住 BOM
fn decode(bytes: &[u8]) -> std::result::Result<(bool, &str), std::str::Utf8Error> {
    let (bom, body) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (true, rest),
        None => (false, bytes),
    };
    Ok((bom, std::str::from_utf8(body)?))
}

/// 以读入时的编码写回，非空内容以单个换行结尾
fn encode(bom: bool, text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 4);
    if bom {
        out.extend_from_slice(UTF8_BOM);
    }
    out.extend_from_slice(text.as_bytes());
    if !text.is_empty() {
        out.push(b'\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beautify::FormatError;
    use std::fs;

    /// 对含 `FAIL` 的文本报错，其余原样加标记返回
    struct Marking;

    impl Transform for Marking {
        fn transform(&self, text: &str, _config: &Configuration) -> std::result::Result<String, FormatError> {
            if text.contains("FAIL") {
                Err(FormatError::Unmatched {
                    found: ')',
                    line: 1,
                    column: 1,
                })
            } else {
                Ok(format!("<{}>", text.trim()))
            }
        }
    }

    fn report(index: usize, result: UnitResult) -> UnitReport {
        UnitReport {
            unit: Unit::file(index, PathBuf::from(format!("f{}.js", index))),
            result,
        }
    }

    fn failure(index: usize) -> TransformError {
        TransformError {
            unit: format!("f{}.js", index),
            reason: "bad".to_string(),
        }
    }

    #[test]
    fn test_output_order_ignores_completion_order() {
        let mut state = BatchState::new(3, OutputMode::Buffered);
        assert!(state.complete(report(2, UnitResult::Buffered("c".into()))).is_none());
        assert!(state.complete(report(0, UnitResult::Buffered("a".into()))).is_none());
        assert_eq!(state.remaining(), 1);
        let outcome = state
            .complete(report(1, UnitResult::Buffered("b".into())))
            .unwrap();
        assert_eq!(outcome.text, "a\n\nb\n\nc");
        assert!(outcome.is_success());
    }

    #[test]
    fn test_finalizes_exactly_once_even_with_failures() {
        let mut state = BatchState::new(2, OutputMode::Buffered);
        assert!(state.complete(report(1, UnitResult::Failed(failure(1)))).is_none());
        // 重复完成不会提前汇总
        assert!(state.complete(report(1, UnitResult::Failed(failure(1)))).is_none());
        assert_eq!(state.remaining(), 1);

        let outcome = state
            .complete(report(0, UnitResult::Buffered("a".into())))
            .unwrap();
        assert_eq!(outcome.text, "a");
        assert_eq!(outcome.failures, vec![failure(1)]);
        assert!(!outcome.is_success());

        assert!(state.complete(report(0, UnitResult::Buffered("a".into()))).is_none());
        assert!(state.complete(report(7, UnitResult::Buffered("x".into()))).is_none());
    }

    #[test]
    fn test_in_place_summary() {
        let mut state = BatchState::new(2, OutputMode::InPlace);
        state.complete(report(1, UnitResult::Written { changed: false }));
        let outcome = state
            .complete(report(0, UnitResult::Written { changed: true }))
            .unwrap();
        assert_eq!(
            outcome.text,
            "Beautified f0.js\nUnchanged f1.js\nBeautification complete!"
        );

        let mut state = BatchState::new(2, OutputMode::InPlace);
        state.complete(report(0, UnitResult::Failed(failure(0))));
        let outcome = state
            .complete(report(1, UnitResult::Written { changed: true }))
            .unwrap();
        assert_eq!(
            outcome.text,
            "Beautified f1.js\nBeautification failed for 1 of 2 file(s)"
        );
    }

    #[test]
    fn test_decode_encode_keep_bom() {
        let bytes = b"\xEF\xBB\xBFvar a";
        let (bom, text) = decode(bytes).unwrap();
        assert!(bom);
        assert_eq!(text, "var a");
        assert_eq!(encode(bom, "var a = 1"), b"\xEF\xBB\xBFvar a = 1\n".to_vec());
        assert_eq!(encode(false, ""), Vec::<u8>::new());
        assert!(decode(b"\xFF\xFE").is_err());
    }

    #[tokio::test]
    async fn test_stream_is_a_single_buffered_unit() {
        let runner = BatchRunner::new(Configuration::default(), JsBeautifier, false);
        let outcome = runner
            .run(InputSource::Stream, &b"\xEF\xBB\xBFvar x=1"[..])
            .await
            .unwrap();
        assert_eq!(outcome.text, "var x = 1");
        assert_eq!(outcome.mode, OutputMode::Buffered);
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_stream_failure_is_recorded() {
        let runner = BatchRunner::new(Configuration::default(), Marking, false);
        let outcome = runner
            .run(InputSource::Stream, &b"FAIL"[..])
            .await
            .unwrap();
        assert_eq!(outcome.text, "");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].unit, "stream");
    }

    fn write_files(dir: &Path, contents: &[&str]) -> Vec<PathBuf> {
        contents
            .iter()
            .enumerate()
            .map(|(i, body)| {
                let path = dir.join(format!("f{}.js", i));
                fs::write(&path, body).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_buffered_files_in_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_files(dir.path(), &["one", "two", "three"]);
        paths.reverse();

        let runner = BatchRunner::new(Configuration::default(), Marking, false);
        let outcome = runner
            .run(InputSource::FileSet(paths), tokio::io::empty())
            .await
            .unwrap();
        assert_eq!(outcome.text, "<three>\n\n<two>\n\n<one>");
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_in_place_failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_files(dir.path(), &["one", "FAIL", "three"]);

        let runner = BatchRunner::new(Configuration::default(), Marking, true);
        let outcome = runner
            .run(InputSource::FileSet(paths.clone()), tokio::io::empty())
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "<one>\n");
        assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "FAIL");
        assert_eq!(fs::read_to_string(&paths[2]).unwrap(), "<three>\n");
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].unit.ends_with("f1.js"));
        assert!(outcome.text.ends_with("Beautification failed for 1 of 3 file(s)"));
    }

    #[tokio::test]
    async fn test_missing_file_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_files(dir.path(), &["one"]);
        paths.push(dir.path().join("missing.js"));

        let runner = BatchRunner::new(Configuration::default(), Marking, false);
        let err = runner
            .run(InputSource::FileSet(paths), tokio::io::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, BeautError::PathResolveError { .. }));
    }
}
