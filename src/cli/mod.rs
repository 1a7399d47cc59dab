//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数，并把它们转换为不可变的格式化配置。
//!
//! ## 简写
//! - `-b` 等价于 `--brace-style expand`
//! - `-i 1` 且未指定缩进字符时使用制表符缩进
//! - `-h` / `--help` / `--usage` / `-?` 打印帮助并退出
//!
//! ## 依赖关系
//! - 被 `main.rs` 和 `commands/` 使用
//! - 构造 `models/config.rs` 中的 `Configuration`

use crate::models::{BraceStyle, Configuration};
use clap::{ArgAction, Parser};

/// beaut - 批量 JavaScript 美化工具
#[derive(Parser, Debug)]
#[command(name = "beaut")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Beautify JavaScript from STDIN or from files, to stdout or in place", long_about = None)]
#[command(disable_help_flag = true)]
#[command(after_help = "Examples:\n  beaut -i 2 example.js\n  beaut -r 'src/**/*.js'\n  beaut < example.js")]
pub struct Cli {
    /// Files, directories or glob patterns (reads STDIN when omitted)
    pub inputs: Vec<String>,

    /// Indent size (1 for TAB unless --indent-char is given)
    #[arg(short = 'i', long, default_value_t = 4)]
    pub indent_size: usize,

    /// Indent character [default: space]
    #[arg(short = 'c', long)]
    pub indent_char: Option<String>,

    /// Brace placement style
    #[arg(long, value_enum, default_value_t = BraceStyle::Collapse)]
    pub brace_style: BraceStyle,

    /// Put braces on own line (same as --brace-style expand)
    #[arg(short = 'b', long = "expand-braces", conflicts_with = "brace_style")]
    pub expand_braces: bool,

    /// Keep the original indentation of array contents
    #[arg(short = 'a', long)]
    pub keep_array_indentation: bool,

    /// Preserve blank lines between statements (`-n=false` to drop them)
    #[arg(
        short = 'n',
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub preserve_newlines: bool,

    /// Maximum newlines preserved in one place (0 = unlimited)
    #[arg(short = 'm', long, default_value_t = 10)]
    pub max_preserve_newlines: usize,

    /// JSLint-pedantic mode, currently only adds space between "function ()"
    #[arg(short = 'p', long)]
    pub jslint_happy: bool,

    /// Write the beautified content back to each file
    #[arg(short = 'r', long, visible_alias = "write")]
    pub replace: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print this help
    #[arg(short = 'h', long = "help", visible_alias = "usage", short_alias = '?', action = ArgAction::SetTrue)]
    pub usage: bool,
}

impl Cli {
    /// 由参数构造格式化配置
    pub fn configuration(&self) -> Configuration {
        let indent_char = match &self.indent_char {
            Some(c) => c.clone(),
            None if self.indent_size == 1 => "\t".to_string(),
            None => " ".to_string(),
        };
        let brace_style = if self.expand_braces {
            BraceStyle::Expand
        } else {
            self.brace_style
        };

        Configuration {
            indent_size: self.indent_size,
            indent_char,
            brace_style,
            keep_array_indentation: self.keep_array_indentation,
            preserve_newlines: self.preserve_newlines,
            max_preserve_newlines: self.max_preserve_newlines,
            jslint_happy: self.jslint_happy,
        }
    }
}
