//! # 统一错误处理模块
//!
//! 定义 beaut 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `BeautError`: 致命错误（用法错误、无匹配文件、I/O 错误），立即终止整个批次
//! - `TransformError`: 单个单元的格式化失败，只记录并汇总，不影响其他单元
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// beaut 致命错误类型
#[derive(Error, Debug)]
pub enum BeautError {
    // ─────────────────────────────────────────────────────────────
    // 用法错误
    // ─────────────────────────────────────────────────────────────
    #[error("No input given: pass file paths or pipe source text on STDIN")]
    NoInput,

    #[error("No files matched: {}", .patterns.join(", "))]
    NoMatch { patterns: Vec<String> },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to resolve path: {path}")]
    PathResolveError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read standard input")]
    StdinReadError(#[source] std::io::Error),

    #[error("Failed to write standard output")]
    StdoutWriteError(#[source] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Batch interrupted: {0}")]
    Interrupted(String),
}

impl BeautError {
    /// 是否为用法错误（需要同时打印帮助信息）
    pub fn is_usage(&self) -> bool {
        matches!(self, BeautError::NoInput)
    }
}

/// 单元格式化失败
///
/// `unit` 是文件路径，或对标准输入使用 `"stream"`。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{unit}: {reason}")]
pub struct TransformError {
    pub unit: String,
    pub reason: String,
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, BeautError>;
