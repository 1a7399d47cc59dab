//! # beaut - 批量 JavaScript 美化工具
//!
//! 从标准输入或一组文件路径/模式读取 JavaScript，格式化后按参数顺序
//! 输出到标准输出，或原地写回每个文件。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (输入解析、并发批处理、结果输出)
//!   │     ├── beautify/  (JavaScript 美化器)
//!   │     └── models/    (配置与数据模型)
//!   ├── utils/      (输出、进度条、日志)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod beautify;
mod cli;
mod commands;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    utils::logging::init(cli.verbose);

    match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            utils::output::print_error(&utils::output::describe(&e));
            ExitCode::FAILURE
        }
    }
}
