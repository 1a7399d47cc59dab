//! # 美化输出工具
//!
//! 提供统一的终端输出样式。标准输出只承载批处理结果，
//! 因此所有提示信息都写到标准错误。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `commands/` 和 `batch/` 使用
//! - 使用 `colored` crate

use colored::Colorize;
use std::error::Error;

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    eprintln!("{} {}", "[*]".blue().bold(), msg);
}

/// 错误及其完整原因链，以 `: ` 连接
pub fn describe(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
