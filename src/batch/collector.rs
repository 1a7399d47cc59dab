//! # 输入源解析
//!
//! 根据位置参数和标准输入状态决定输入源，并把参数展开为有序文件列表。
//!
//! ## 功能
//! - 无参数且标准输入不是终端：读取标准输入
//! - 目录：递归收集所有 `.js` 文件
//! - 含通配符的参数：glob 模式匹配，只保留 `.js` 文件
//! - 其余参数：按字面路径原样保留（缺失文件在读取时报错）
//!
//! ## 依赖关系
//! - 被 `commands/beautify.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配模式

use crate::error::{BeautError, Result};
use crate::models::InputSource;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 目录展开时收集的扩展名
const SOURCE_EXTENSION: &str = "js";

/// 决定本次调用的输入源
pub fn resolve(raw_args: &[String], stdin_is_interactive: bool) -> Result<InputSource> {
    if raw_args.is_empty() {
        if stdin_is_interactive {
            return Err(BeautError::NoInput);
        }
        return Ok(InputSource::Stream);
    }

    let files = expand_patterns(raw_args)?;
    if files.is_empty() {
        return Err(BeautError::NoMatch {
            patterns: raw_args.to_vec(),
        });
    }

    tracing::debug!(count = files.len(), "resolved input files");
    Ok(InputSource::FileSet(files))
}

/// 按参数顺序展开所有模式（不去重）
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_dir() {
            collect_directory(path, &mut files);
        } else if is_glob(pattern) {
            collect_glob(pattern, &mut files)?;
        } else {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// 检查参数是否包含通配符
fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn collect_directory(dir: &Path, out: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());

    out.extend(
        walker
            .filter(|e| has_source_extension(e.path()))
            .map(|e| e.path().to_path_buf()),
    );
}

fn collect_glob(pattern: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = glob::glob(pattern).map_err(|e| BeautError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => {
                if has_source_extension(&path) {
                    out.push(path);
                }
            }
            Ok(path) if path.is_dir() => collect_directory(&path, out),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(pattern, error = %e, "skipping unreadable glob entry");
            }
        }
    }
    Ok(())
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(SOURCE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_stream_when_piped_without_arguments() {
        assert_eq!(resolve(&[], false).unwrap(), InputSource::Stream);
    }

    #[test]
    fn test_no_input_on_terminal_without_arguments() {
        assert!(matches!(resolve(&[], true), Err(BeautError::NoInput)));
    }

    #[test]
    fn test_arguments_win_over_piped_stdin() {
        let source = resolve(&args(&["missing.js"]), false).unwrap();
        assert_eq!(
            source,
            InputSource::FileSet(vec![PathBuf::from("missing.js")])
        );
    }

    #[test]
    fn test_no_match_is_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.js").display().to_string();
        match resolve(&[pattern.clone()], true) {
            Err(BeautError::NoMatch { patterns }) => assert_eq!(patterns, vec![pattern]),
            other => panic!("expected NoMatch, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            expand_patterns(&args(&["src/[.js"])),
            Err(BeautError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_directory_walk_collects_js_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.js"), "b").unwrap();
        fs::write(dir.path().join("a.js"), "a").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("nested").join("c.js"), "c").unwrap();

        let files = expand_patterns(&[dir.path().display().to_string()]).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("a.js"),
                dir.path().join("b.js"),
                dir.path().join("nested").join("c.js"),
            ]
        );
    }

    #[test]
    fn test_match_order_follows_arguments_and_keeps_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "a").unwrap();
        fs::write(dir.path().join("b.js"), "b").unwrap();

        let b = dir.path().join("b.js").display().to_string();
        let all = dir.path().join("*.js").display().to_string();
        let files = expand_patterns(&[b.clone(), all, b]).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("b.js"),
                dir.path().join("a.js"),
                dir.path().join("b.js"),
                dir.path().join("b.js"),
            ]
        );
    }

    #[test]
    fn test_glob_keeps_only_js_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "Hello world. See it").unwrap();
        fs::write(dir.path().join("data.json"), "{}").unwrap();
        fs::write(dir.path().join("a.js"), "a").unwrap();

        let all = dir.path().join("*").display().to_string();
        assert_eq!(expand_patterns(&[all]).unwrap(), vec![dir.path().join("a.js")]);

        // 字面路径不做扩展名过滤
        let readme = dir.path().join("README.md").display().to_string();
        assert_eq!(
            expand_patterns(&[readme]).unwrap(),
            vec![dir.path().join("README.md")]
        );
    }

    #[test]
    fn test_is_glob() {
        assert!(is_glob("src/**/*.js"));
        assert!(is_glob("file?.js"));
        assert!(!is_glob("src/app.js"));
    }
}
