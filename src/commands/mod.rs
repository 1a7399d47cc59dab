//! # 命令执行模块
//!
//! 实现命令行的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/`
//! - 子模块: beautify

pub mod beautify;

use crate::cli::Cli;
use crate::error::Result;
use std::process::ExitCode;

/// 执行命令
pub async fn run(cli: Cli) -> Result<ExitCode> {
    beautify::execute(cli).await
}
