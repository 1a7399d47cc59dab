//! # JavaScript 词法分析
//!
//! 把源文本切分为 token，同时记录每个 token 之前的换行数和行首空白，
//! 供打印器保留空行与数组缩进。
//!
//! ## 依赖关系
//! - 被 `beautify/printer.rs` 使用

use super::FormatError;

/// token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// 标识符或关键字
    Word,
    Number,
    /// 字符串或模板字符串
    String,
    Regex,
    LineComment,
    BlockComment,
    Operator,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Comma,
    /// `.` 或 `?.`
    Dot,
    Colon,
    Question,
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// 一个 token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// token 之前的换行数
    pub newlines_before: usize,
    /// token 所在行的原始行首空白（仅当 token 前有换行时）
    pub indent_before: &'a str,
    pub line: usize,
    pub column: usize,
}

/// 可紧跟正则字面量的关键字
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "case",
    "do",
    "else",
    "in",
    "instanceof",
    "new",
    "delete",
    "void",
    "throw",
    "yield",
    "await",
    "of",
];

/// 多字符运算符，按长度降序匹配
const OPERATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "**", "<<", ">>", "=", "+", "-", "*", "/", "%", "&", "|", "^", "!", "~", "<", ">",
];

/// 对整段源文本分词
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, FormatError> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    /// 上一个非注释 token，用于区分除号和正则
    prev: Option<(TokenKind, &'a str)>,
    /// 每个未闭合的 `(` 是否是 `if`/`while`/`for`/`with` 的条件
    parens: Vec<bool>,
    /// 上一个 `)` 结束了一个条件，其后可以是正则
    condition_closed: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Tokenizer {
            src,
            pos: 0,
            line: 1,
            column: 1,
            prev: None,
            parens: Vec::new(),
            condition_closed: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, FormatError> {
        let mut newlines = 0;
        let mut line_start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                newlines += 1;
                self.bump();
                line_start = self.pos;
            } else if c.is_whitespace() || c == '\u{feff}' {
                self.bump();
            } else {
                break;
            }
        }
        let indent_before = if newlines > 0 {
            &self.src[line_start..self.pos]
        } else {
            ""
        };

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let start = self.pos;
        let (line, column) = (self.line, self.column);
        let kind = self.scan(c, line, column)?;
        let text = &self.src[start..self.pos];

        match kind {
            TokenKind::OpenParen => {
                let condition = matches!(
                    self.prev,
                    Some((TokenKind::Word, "if" | "while" | "for" | "with"))
                );
                self.parens.push(condition);
            }
            TokenKind::CloseParen => {
                self.condition_closed = self.parens.pop().unwrap_or(false);
            }
            _ => {}
        }
        if !kind.is_comment() {
            self.prev = Some((kind, text));
        }

        Ok(Some(Token {
            kind,
            text,
            newlines_before: newlines,
            indent_before,
            line,
            column,
        }))
    }

    fn scan(&mut self, c: char, line: usize, column: usize) -> Result<TokenKind, FormatError> {
        if self.pos == 0 && self.rest().starts_with("#!") {
            while self.peek().is_some_and(|c| c != '\n') {
                self.bump();
            }
            return Ok(TokenKind::LineComment);
        }
        if is_word_start(c) {
            while self.peek().is_some_and(is_word_char) {
                self.bump();
            }
            return Ok(TokenKind::Word);
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
        {
            self.scan_number();
            return Ok(TokenKind::Number);
        }

        match c {
            '"' | '\'' => {
                self.scan_string(c, line, column)?;
                Ok(TokenKind::String)
            }
            '`' => {
                self.scan_template(line, column)?;
                Ok(TokenKind::String)
            }
            '/' if self.rest().starts_with("//") => {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
                Ok(TokenKind::LineComment)
            }
            '/' if self.rest().starts_with("/*") => {
                self.bump();
                self.bump();
                loop {
                    if self.rest().starts_with("*/") {
                        self.bump();
                        self.bump();
                        break;
                    }
                    if self.bump().is_none() {
                        return Err(FormatError::Unterminated {
                            what: "block comment",
                            line,
                            column,
                        });
                    }
                }
                Ok(TokenKind::BlockComment)
            }
            '/' if self.regex_allowed() => {
                self.scan_regex(line, column)?;
                Ok(TokenKind::Regex)
            }
            '(' | ')' | '[' | ']' | '{' | '}' | ';' | ',' | ':' => {
                self.bump();
                Ok(match c {
                    '(' => TokenKind::OpenParen,
                    ')' => TokenKind::CloseParen,
                    '[' => TokenKind::OpenBracket,
                    ']' => TokenKind::CloseBracket,
                    '{' => TokenKind::OpenBrace,
                    '}' => TokenKind::CloseBrace,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Colon,
                })
            }
            '.' if !self.rest().starts_with("...") => {
                self.bump();
                Ok(TokenKind::Dot)
            }
            '?' => {
                let rest = self.rest();
                if rest.starts_with("??") {
                    return Ok(self.scan_operator());
                }
                self.bump();
                // `a ? .5 : 1` 中的 `?.` 不是可选链
                if self.peek() == Some('.') && !self.peek_at(1).is_some_and(|n| n.is_ascii_digit())
                {
                    self.bump();
                    return Ok(TokenKind::Dot);
                }
                Ok(TokenKind::Question)
            }
            _ => {
                if OPERATORS.iter().any(|op| self.rest().starts_with(op)) {
                    Ok(self.scan_operator())
                } else {
                    Err(FormatError::UnexpectedChar { ch: c, line, column })
                }
            }
        }
    }

    fn scan_operator(&mut self) -> TokenKind {
        let rest = self.rest();
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            for _ in 0..op.len() {
                self.bump();
            }
        }
        TokenKind::Operator
    }

    fn scan_number(&mut self) {
        let hex_like = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign =
                (c == '+' || c == '-') && !hex_like && (prev == 'e' || prev == 'E');
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                prev = c;
                self.bump();
            } else {
                break;
            }
        }
    }

    fn scan_string(&mut self, quote: char, line: usize, column: usize) -> Result<(), FormatError> {
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => return Ok(()),
                Some('\n') | None => {
                    return Err(FormatError::Unterminated {
                        what: "string literal",
                        line,
                        column,
                    })
                }
                Some(_) => {}
            }
        }
    }

    fn scan_template(&mut self, line: usize, column: usize) -> Result<(), FormatError> {
        let unterminated = || FormatError::Unterminated {
            what: "template literal",
            line,
            column,
        };
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('`') => return Ok(()),
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    let mut depth = 1usize;
                    while depth > 0 {
                        match self.bump() {
                            Some('{') => depth += 1,
                            Some('}') => depth -= 1,
                            Some(q @ ('"' | '\'')) => {
                                // 回退到引号，复用字符串扫描
                                self.pos -= 1;
                                self.column -= 1;
                                self.scan_string(q, self.line, self.column)?;
                            }
                            Some('`') => {
                                self.pos -= 1;
                                self.column -= 1;
                                self.scan_template(line, column)?;
                            }
                            Some(_) => {}
                            None => return Err(unterminated()),
                        }
                    }
                }
                Some(_) => {}
                None => return Err(unterminated()),
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        match self.prev {
            None => true,
            Some((kind, text)) => match kind {
                TokenKind::Word => REGEX_PREFIX_KEYWORDS.contains(&text),
                TokenKind::Operator
                | TokenKind::OpenParen
                | TokenKind::OpenBracket
                | TokenKind::OpenBrace
                | TokenKind::CloseBrace
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Question => true,
                TokenKind::CloseParen => self.condition_closed,
                _ => false,
            },
        }
    }

    fn scan_regex(&mut self, line: usize, column: usize) -> Result<(), FormatError> {
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                Some('\\') => {
                    if self.peek() == Some('\n') {
                        break;
                    }
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => {
                    while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                        self.bump();
                    }
                    return Ok(());
                }
                Some('\n') | None => break,
                Some(_) => {}
            }
        }
        Err(FormatError::Unterminated {
            what: "regular expression",
            line,
            column,
        })
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$' | '#' | '@')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
