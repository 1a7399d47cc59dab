//! # 输出打印器
//!
//! 逐个消费 token，维护缩进与括号栈，生成格式化后的文本。
//!
//! ## 规则概要
//! - 语句块与对象字面量各自增加一级缩进
//! - `case` / `default` 与 `switch` 对齐
//! - 二元运算符两侧留空格，一元运算符紧贴操作数
//! - 依据配置保留空行与数组原始缩进
//!
//! ## 依赖关系
//! - 被 `beautify/mod.rs` 调用
//! - 使用 `beautify/tokenizer.rs` 的 token

use super::tokenizer::{Token, TokenKind};
use super::FormatError;
use crate::models::{BraceStyle, Configuration};

/// 其后的 `(` 前需要空格的关键字
const SPACED_PAREN_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "typeof", "in", "of", "case",
    "new", "await", "yield", "void", "delete", "throw", "else", "do", "instanceof", "async",
];

/// 其后的 `[` 或 `{` 属于表达式的关键字
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "in",
    "of",
    "yield",
    "await",
    "throw",
    "void",
    "delete",
    "instanceof",
    "case",
    "else",
    "do",
];

/// 不能结束一个表达式的关键字
const NON_VALUE_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "instanceof", "new", "delete", "void", "throw",
    "yield", "await", "of", "var", "let", "const", "function", "class", "extends", "if", "for",
    "while", "switch", "catch", "with", "export", "import", "try", "finally", "default",
];

/// 换行后会触发自动分号插入的关键字
const RESTRICTED_KEYWORDS: &[&str] = &["return", "break", "continue", "debugger"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Block,
    Object,
    Paren,
    Bracket,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    opener: char,
    line: usize,
    column: usize,
    /// 未闭合的 `?` 数量
    ternary: usize,
    in_case: bool,
    is_switch: bool,
    is_do: bool,
}

impl Frame {
    fn new(kind: FrameKind, opener: char, line: usize, column: usize) -> Self {
        Frame {
            kind,
            opener,
            line,
            column,
            ternary: 0,
            in_case: false,
            is_switch: false,
            is_do: false,
        }
    }
}

/// 最近输出的非注释 token
#[derive(Debug, Clone, Copy)]
struct Last<'a> {
    kind: TokenKind,
    text: &'a str,
    /// 紧跟在 `.` 之后的属性名，不当作关键字
    property: bool,
    unary: bool,
    value_end: bool,
    /// `case x:` 或标签后的冒号
    block_colon: bool,
}

impl Last<'_> {
    fn is_keyword(&self, keywords: &[&str]) -> bool {
        self.kind == TokenKind::Word && !self.property && keywords.contains(&self.text)
    }
}

/// 打印整个 token 序列
pub fn print(tokens: &[Token<'_>], config: &Configuration) -> Result<String, FormatError> {
    let mut printer = Printer::new(config);
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;
        match token.kind {
            TokenKind::LineComment => printer.line_comment(token),
            TokenKind::BlockComment => printer.block_comment(token, tokens.get(i)),
            _ => {
                let next = next_significant(tokens, i);
                printer.before_token(token);
                printer.token(token, tokens.get(i), next)?;
            }
        }
    }
    printer.finish()
}

fn next_significant<'t, 'a>(tokens: &'t [Token<'a>], from: usize) -> Option<&'t Token<'a>> {
    tokens[from.min(tokens.len())..]
        .iter()
        .find(|t| !t.kind.is_comment())
}

struct Printer<'a, 'c> {
    config: &'c Configuration,
    indent_unit: String,
    lines: Vec<String>,
    line: String,
    line_indent: usize,
    /// 保留数组缩进时使用的原始行首空白
    line_prefix: Option<&'a str>,
    indent: usize,
    stack: Vec<Frame>,
    last: Option<Last<'a>>,
    break_pending: bool,
    dedent_next_line: bool,
    pending_switch: bool,
    pending_do: bool,
}

impl<'a, 'c> Printer<'a, 'c> {
    fn new(config: &'c Configuration) -> Self {
        Printer {
            config,
            indent_unit: config.indent_unit(),
            lines: Vec::new(),
            line: String::new(),
            line_indent: 0,
            line_prefix: None,
            indent: 0,
            stack: vec![Frame::new(FrameKind::Block, ' ', 0, 0)],
            last: None,
            break_pending: false,
            dedent_next_line: false,
            pending_switch: false,
            pending_do: false,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // 行缓冲
    // ─────────────────────────────────────────────────────────────

    fn newline(&mut self) {
        if self.line.is_empty() {
            self.line_prefix = None;
            return;
        }
        let prefix = match self.line_prefix.take() {
            Some(raw) => raw.to_string(),
            None => self.indent_unit.repeat(self.line_indent),
        };
        let committed = format!("{}{}", prefix, self.line);
        self.lines.push(committed.trim_end().to_string());
        self.line.clear();
    }

    fn blank_lines(&mut self, count: usize) {
        self.newline();
        if self.lines.is_empty() {
            return;
        }
        let existing = self.lines.iter().rev().take_while(|l| l.is_empty()).count();
        for _ in existing..count {
            self.lines.push(String::new());
        }
    }

    fn write(&mut self, text: &str, space: bool) {
        if self.line.is_empty() {
            self.line_indent = if self.dedent_next_line {
                self.indent.saturating_sub(1)
            } else {
                self.indent
            };
            self.dedent_next_line = false;
        } else if space {
            self.line.push(' ');
        }
        self.line.push_str(text);
    }

    fn space_default(&self) -> bool {
        match self.last {
            None => false,
            Some(last) => {
                !(last.unary
                    || matches!(
                        last.kind,
                        TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::Dot
                    ))
            }
        }
    }

    fn top(&self) -> &Frame {
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn remember(&mut self, token: &Token<'a>, unary: bool, value_end: bool) {
        let property = token.kind == TokenKind::Word
            && self.last.is_some_and(|l| l.kind == TokenKind::Dot);
        self.last = Some(Last {
            kind: token.kind,
            text: token.text,
            property,
            unary,
            value_end,
            block_colon: false,
        });
    }

    // ─────────────────────────────────────────────────────────────
    // 换行决策
    // ─────────────────────────────────────────────────────────────

    fn before_token(&mut self, token: &Token<'a>) {
        if self.break_pending {
            self.newline();
            self.break_pending = false;
        }

        if token.newlines_before > 0
            && self.top().kind == FrameKind::Block
            && self.ends_statement()
            && starts_statement(token)
        {
            self.newline();
        }

        if self.line.is_empty() && token.kind != TokenKind::CloseBrace {
            let blanks = self.config.blank_line_limit(token.newlines_before);
            if blanks > 0 {
                self.blank_lines(blanks);
            }
        }

        if self.config.keep_array_indentation
            && self.top().kind == FrameKind::Bracket
            && token.newlines_before > 0
        {
            self.newline();
            self.line_prefix = Some(token.indent_before);
        }
    }

    fn ends_statement(&self) -> bool {
        self.last
            .is_some_and(|l| l.value_end || l.is_keyword(RESTRICTED_KEYWORDS))
    }

    // ─────────────────────────────────────────────────────────────
    // 注释
    // ─────────────────────────────────────────────────────────────

    fn line_comment(&mut self, token: &Token<'a>) {
        let text = token.text.trim_end();
        if token.newlines_before == 0 && !self.line.is_empty() {
            self.write(text, true);
        } else {
            self.newline();
            self.break_pending = false;
            let blanks = self.config.blank_line_limit(token.newlines_before);
            if blanks > 0 {
                self.blank_lines(blanks);
            }
            self.write(text, false);
        }
        self.break_pending = true;
    }

    fn block_comment(&mut self, token: &Token<'a>, next: Option<&Token<'a>>) {
        let own_line = token.newlines_before > 0 || self.line.is_empty() || self.break_pending;
        if own_line {
            self.newline();
            self.break_pending = false;
            let blanks = self.config.blank_line_limit(token.newlines_before);
            if blanks > 0 {
                self.blank_lines(blanks);
            }
        }

        let mut parts = token.text.lines();
        if let Some(first) = parts.next() {
            let space = self.space_default();
            self.write(first.trim_end(), space);
        }
        for part in parts {
            self.newline();
            let trimmed = part.trim();
            if trimmed.is_empty() {
                self.lines.push(String::new());
            } else if trimmed.starts_with('*') {
                self.write(&format!(" {}", trimmed), false);
            } else {
                self.write(trimmed, false);
            }
        }

        if own_line && next.is_some_and(|n| n.newlines_before > 0) {
            self.break_pending = true;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // token 分派
    // ─────────────────────────────────────────────────────────────

    fn token(
        &mut self,
        token: &Token<'a>,
        following: Option<&Token<'a>>,
        next: Option<&Token<'a>>,
    ) -> Result<(), FormatError> {
        match token.kind {
            TokenKind::Word => self.word(token, next),
            TokenKind::Number | TokenKind::String | TokenKind::Regex => {
                let space = self.space_default();
                self.write(token.text, space);
                self.remember(token, false, true);
            }
            TokenKind::OpenParen => self.open_paren(token),
            TokenKind::CloseParen => {
                self.pop(token, '(')?;
                self.write(")", false);
                self.remember(token, false, true);
            }
            TokenKind::OpenBracket => self.open_bracket(token),
            TokenKind::CloseBracket => {
                self.pop(token, '[')?;
                self.write("]", false);
                self.remember(token, false, true);
            }
            TokenKind::OpenBrace => self.open_brace(token, following),
            TokenKind::CloseBrace => self.close_brace(token, following, next)?,
            TokenKind::Semicolon => {
                self.write(";", false);
                if self.top().kind != FrameKind::Paren {
                    self.break_pending = true;
                }
                self.remember(token, false, false);
            }
            TokenKind::Comma => {
                self.write(",", false);
                if self.top().kind == FrameKind::Object {
                    self.break_pending = true;
                }
                self.remember(token, false, false);
            }
            TokenKind::Dot => {
                self.write(token.text, false);
                self.remember(token, false, false);
            }
            TokenKind::Question => {
                self.top_mut().ternary += 1;
                self.write("?", true);
                self.remember(token, false, false);
            }
            TokenKind::Colon => self.colon(token),
            TokenKind::Operator => self.operator(token),
            TokenKind::LineComment | TokenKind::BlockComment => {}
        }
        Ok(())
    }

    fn word(&mut self, token: &Token<'a>, next: Option<&Token<'a>>) {
        let text = token.text;
        let after_dot = self.last.is_some_and(|l| l.kind == TokenKind::Dot);

        if after_dot {
            self.write(text, false);
            self.remember(token, false, true);
            return;
        }

        let case_label = self.top().is_switch
            && (text == "case"
                || (text == "default" && next.is_some_and(|n| n.kind == TokenKind::Colon)));
        if case_label {
            self.newline();
            self.dedent_next_line = true;
            self.write(text, false);
            self.top_mut().in_case = true;
            self.remember(token, false, false);
            return;
        }

        match text {
            "else" | "catch" | "finally" => {
                let after_brace = self.last.is_some_and(|l| l.kind == TokenKind::CloseBrace);
                if !after_brace || self.config.brace_style != BraceStyle::Collapse {
                    self.newline();
                }
                self.write(text, true);
            }
            _ => {
                let space = self.space_default();
                self.write(text, space);
            }
        }

        match text {
            "switch" => self.pending_switch = true,
            "do" => self.pending_do = true,
            _ => {}
        }
        let value_end = !NON_VALUE_KEYWORDS.contains(&text);
        self.remember(token, false, value_end);
    }

    fn open_paren(&mut self, token: &Token<'a>) {
        let space = match self.last {
            None => false,
            Some(last) => match last.kind {
                TokenKind::Word if last.is_keyword(&["function"]) => self.config.jslint_happy,
                TokenKind::Word => last.is_keyword(SPACED_PAREN_KEYWORDS),
                TokenKind::Operator => !last.unary,
                TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Question
                | TokenKind::Semicolon => true,
                _ => false,
            },
        };
        self.write("(", space);
        self.stack
            .push(Frame::new(FrameKind::Paren, '(', token.line, token.column));
        self.remember(token, false, false);
    }

    fn open_bracket(&mut self, token: &Token<'a>) {
        let space = match self.last {
            None => false,
            Some(last) => match last.kind {
                TokenKind::Word => last.is_keyword(EXPRESSION_KEYWORDS),
                TokenKind::Operator => !last.unary,
                TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Question
                | TokenKind::Semicolon => true,
                _ => false,
            },
        };
        self.write("[", space);
        self.stack
            .push(Frame::new(FrameKind::Bracket, '[', token.line, token.column));
        self.remember(token, false, false);
    }

    fn is_object_context(&self) -> bool {
        let Some(last) = self.last else {
            return false;
        };
        match last.kind {
            TokenKind::OpenParen
            | TokenKind::OpenBracket
            | TokenKind::Comma
            | TokenKind::Question => true,
            TokenKind::Colon => !last.block_colon,
            TokenKind::Operator => last.text != "=>",
            TokenKind::Word => {
                last.is_keyword(EXPRESSION_KEYWORDS) && !last.is_keyword(&["else", "do"])
            }
            _ => false,
        }
    }

    fn open_brace(&mut self, token: &Token<'a>, following: Option<&Token<'a>>) {
        let empty = following.is_some_and(|t| t.kind == TokenKind::CloseBrace);
        let mut frame = Frame::new(FrameKind::Block, '{', token.line, token.column);

        if self.is_object_context() {
            frame.kind = FrameKind::Object;
            let space = self.space_default();
            self.write("{", space);
        } else {
            if self.config.brace_style == BraceStyle::Expand && !empty {
                self.newline();
            }
            let space = self.space_default();
            self.write("{", space);
            frame.is_switch = std::mem::take(&mut self.pending_switch);
            frame.is_do = std::mem::take(&mut self.pending_do);
        }

        self.stack.push(frame);
        self.indent += 1;
        if !empty {
            self.break_pending = true;
        }
        self.remember(token, false, false);
    }

    fn close_brace(
        &mut self,
        token: &Token<'a>,
        following: Option<&Token<'a>>,
        next: Option<&Token<'a>>,
    ) -> Result<(), FormatError> {
        let frame = self.pop(token, '{')?;
        self.indent = self.indent.saturating_sub(1);

        let empty = self.last.is_some_and(|l| l.kind == TokenKind::OpenBrace);
        if !empty {
            self.newline();
        }
        self.write("}", false);

        let is_block = frame.kind == FrameKind::Block;
        self.remember(token, false, !is_block);
        if !is_block {
            return Ok(());
        }

        // 行尾注释留在 `}` 同一行
        if following.is_some_and(|t| t.kind == TokenKind::LineComment && t.newlines_before == 0) {
            self.break_pending = true;
            return Ok(());
        }

        let keep_on_line = next.is_some_and(|n| match n.kind {
            TokenKind::CloseParen
            | TokenKind::CloseBracket
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Dot
            | TokenKind::OpenParen => true,
            TokenKind::Colon => self.top().ternary > 0,
            TokenKind::Word => match n.text {
                "else" | "catch" | "finally" => self.config.brace_style == BraceStyle::Collapse,
                "while" => frame.is_do,
                _ => false,
            },
            _ => false,
        });
        if !keep_on_line {
            self.break_pending = true;
        }
        Ok(())
    }

    fn colon(&mut self, token: &Token<'a>) {
        let frame = self.top_mut();
        if frame.ternary > 0 {
            frame.ternary -= 1;
            self.write(":", true);
            self.remember(token, false, false);
        } else if frame.in_case {
            frame.in_case = false;
            self.write(":", false);
            self.break_pending = true;
            self.remember(token, false, false);
            self.mark_block_colon();
        } else {
            let label = frame.kind == FrameKind::Block;
            self.write(":", false);
            self.remember(token, false, false);
            if label {
                self.mark_block_colon();
            }
        }
    }

    fn mark_block_colon(&mut self) {
        if let Some(last) = self.last.as_mut() {
            last.block_colon = true;
        }
    }

    fn operator(&mut self, token: &Token<'a>) {
        let text = token.text;
        let space = self.space_default() || self.joins_previous_sign(text);
        match text {
            "++" | "--" => {
                let postfix =
                    token.newlines_before == 0 && self.last.is_some_and(|l| l.value_end);
                if postfix {
                    self.write(text, false);
                    self.remember(token, false, true);
                } else {
                    self.write(text, space);
                    self.remember(token, true, false);
                }
            }
            "!" | "~" | "..." => {
                self.write(text, space);
                self.remember(token, true, false);
            }
            "+" | "-" if !self.last.is_some_and(|l| l.value_end) => {
                self.write(text, space);
                self.remember(token, true, false);
            }
            _ => {
                self.write(text, true);
                self.remember(token, false, false);
            }
        }
    }

    /// `- -x` 与 `+ +x` 不能写成 `--x` / `++x`
    fn joins_previous_sign(&self, text: &str) -> bool {
        self.last.is_some_and(|l| {
            l.unary
                && l.kind == TokenKind::Operator
                && matches!(l.text.chars().last(), Some(c @ ('+' | '-')) if text.starts_with(c))
        })
    }

    fn pop(&mut self, token: &Token<'a>, opener: char) -> Result<Frame, FormatError> {
        let found = token.text.chars().next().unwrap_or(opener);
        if self.stack.len() <= 1 || self.top().opener != opener {
            return Err(FormatError::Unmatched {
                found,
                line: token.line,
                column: token.column,
            });
        }
        Ok(self.stack.pop().unwrap_or_else(|| Frame::new(FrameKind::Block, opener, 0, 0)))
    }

    fn finish(mut self) -> Result<String, FormatError> {
        self.newline();
        if self.stack.len() > 1 {
            let frame = self.top();
            return Err(FormatError::Unclosed {
                open: frame.opener,
                line: frame.line,
                column: frame.column,
            });
        }
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        Ok(self.lines.join("\n"))
    }
}

/// token 能否作为新语句的开头（用于无分号换行）
fn starts_statement(token: &Token<'_>) -> bool {
    match token.kind {
        TokenKind::Word => !matches!(
            token.text,
            "in" | "instanceof" | "of" | "else" | "catch" | "finally"
        ),
        TokenKind::Number | TokenKind::String | TokenKind::Regex => true,
        TokenKind::Operator => matches!(token.text, "++" | "--" | "!" | "~"),
        _ => false,
    }
}
