//! # JavaScript 美化器
//!
//! 批处理驱动调用的格式化函数：接收完整源文本与配置，返回格式化后的文本。
//! 输出没有行尾空白，也不带结尾换行（由输出端补上）。
//!
//! ## 依赖关系
//! - 被 `batch/transform.rs` 调用
//! - 使用 `models/config.rs`
//! - 子模块: tokenizer, printer

pub mod printer;
pub mod tokenizer;

use crate::models::Configuration;
use thiserror::Error;

/// 格式化失败（通常是语法不完整）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unterminated {what} starting at line {line}, column {column}")]
    Unterminated {
        what: &'static str,
        line: usize,
        column: usize,
    },

    #[error("unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedChar { ch: char, line: usize, column: usize },

    #[error("unmatched '{found}' at line {line}, column {column}")]
    Unmatched {
        found: char,
        line: usize,
        column: usize,
    },

    #[error("'{open}' opened at line {line}, column {column} is never closed")]
    Unclosed {
        open: char,
        line: usize,
        column: usize,
    },

    #[error("formatter panicked: {0}")]
    Panicked(String),
}

/// 美化一段 JavaScript 源码
pub fn beautify(source: &str, config: &Configuration) -> Result<String, FormatError> {
    let tokens = tokenizer::tokenize(source)?;
    printer::print(&tokens, config)
}
