//! # 格式化配置
//!
//! 由命令行参数构造的不可变配置，在一次运行中原样传递给每个单元。
//!
//! ## 依赖关系
//! - 由 `cli/mod.rs` 构造
//! - 被 `beautify/` 和 `batch/transform.rs` 使用

use clap::ValueEnum;

/// 花括号风格
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum BraceStyle {
    /// Opening brace on the same line, `} else {` collapsed
    #[default]
    Collapse,
    /// Braces on their own lines (Allman / ANSI style)
    Expand,
    /// Opening brace on the same line, `else`/`catch` on a new line
    EndExpand,
}

impl std::fmt::Display for BraceStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BraceStyle::Collapse => write!(f, "collapse"),
            BraceStyle::Expand => write!(f, "expand"),
            BraceStyle::EndExpand => write!(f, "end-expand"),
        }
    }
}

/// 格式化配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// 每级缩进重复 `indent_char` 的次数
    pub indent_size: usize,
    pub indent_char: String,
    pub brace_style: BraceStyle,
    pub keep_array_indentation: bool,
    pub preserve_newlines: bool,
    /// 一处最多保留的换行数（0 = 不限）
    pub max_preserve_newlines: usize,
    /// `function ()` 而非 `function()`
    pub jslint_happy: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            indent_size: 4,
            indent_char: " ".to_string(),
            brace_style: BraceStyle::Collapse,
            keep_array_indentation: false,
            preserve_newlines: true,
            max_preserve_newlines: 10,
            jslint_happy: false,
        }
    }
}

impl Configuration {
    /// 单级缩进字符串
    pub fn indent_unit(&self) -> String {
        self.indent_char.repeat(self.indent_size)
    }

    /// 两个 token 之间最多保留的空行数
    pub fn blank_line_limit(&self, newlines: usize) -> usize {
        if !self.preserve_newlines || newlines < 2 {
            return 0;
        }
        let kept = match self.max_preserve_newlines {
            0 => newlines,
            max => newlines.min(max),
        };
        kept.saturating_sub(1)
    }
}
