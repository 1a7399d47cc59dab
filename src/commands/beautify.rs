//! # beautify 命令实现
//!
//! 解析输入源、运行批处理并输出结果。
//!
//! ## 流程
//! 1. `--help`: 打印帮助，不读取任何输入
//! 2. 解析输入源（用法错误时同时打印帮助）
//! 3. 运行批处理（I/O 错误立即返回）
//! 4. 输出结果并得到退出码
//!
//! ## 依赖关系
//! - 使用 `cli/mod.rs` 定义的参数
//! - 使用 `batch/`
//! - 使用 `utils/output.rs`

use crate::batch::{collector, sink, BatchRunner, JsBeautifier};
use crate::cli::Cli;
use crate::error::Result;
use crate::models::InputSource;
use crate::utils::output;

use clap::CommandFactory;
use std::io::IsTerminal;
use std::process::ExitCode;

/// 执行 beautify 命令
pub async fn execute(cli: Cli) -> Result<ExitCode> {
    if cli.usage {
        print_usage(false);
        return Ok(ExitCode::SUCCESS);
    }

    let stdin_is_interactive = std::io::stdin().is_terminal();
    let source = match collector::resolve(&cli.inputs, stdin_is_interactive) {
        Ok(source) => source,
        Err(err) if err.is_usage() => {
            output::print_error(&err.to_string());
            print_usage(true);
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err),
    };

    if let InputSource::FileSet(files) = &source {
        if cli.replace {
            output::print_info(&format!("Beautifying {} file(s) in place", files.len()));
        }
    }

    let runner = BatchRunner::new(cli.configuration(), JsBeautifier, cli.replace);
    let outcome = runner.run(source, tokio::io::stdin()).await?;
    Ok(sink::emit(&outcome).await)
}

/// 打印帮助；用法错误时写到标准错误
fn print_usage(to_stderr: bool) {
    let help = Cli::command().render_help();
    if to_stderr {
        eprintln!("{}", help);
    } else {
        println!("{}", help);
    }
}
