//! Lexer for TypeScript source code
//!
//! Converts source text into a stream of tokens. Comments and whitespace are
//! skipped; they never become tokens, so anything between two token spans is
//! trivia that the serializer copies back untouched.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::string_dict::{Atom, StringDict};

/// Source span information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// A span that covers no source text.
    ///
    /// Synthesized nodes carry this span. Parsed nodes always cover at least one
    /// token, so a zero-width span at offset zero never names real source.
    pub fn is_detached(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Span from the start of `self` to the end of `other`.
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start, other.end, self.line, self.column)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Token types for TypeScript
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(Atom),
    BigInt(String),         // decimal digits without the `n` suffix
    RegExp(String, String), // (pattern, flags)
    True,
    False,
    Null,

    // Identifiers & Keywords
    Identifier(Atom),

    // JavaScript Keywords
    Let,
    Const,
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    This,
    Super,
    Class,
    Extends,
    Static,
    Import,
    Export,
    From,
    As,
    Typeof,
    Instanceof,
    In,
    Of,
    Void,
    Delete,
    Yield,
    Await,
    Async,
    Debugger,
    With,

    // TypeScript Keywords
    Type,
    Interface,
    Enum,
    Namespace,
    Module,
    Declare,
    Abstract,
    Readonly,
    Accessor,
    Public,
    Private,
    Protected,
    Override,
    Implements,
    Keyof,
    Infer,
    Is,
    Any,
    Unknown,
    Never,
    Asserts,
    Satisfies,
    Unique,

    // Operators
    Plus,             // +
    Minus,            // -
    Star,             // *
    Slash,            // /
    Percent,          // %
    StarStar,         // **
    PlusPlus,         // ++
    MinusMinus,       // --
    Eq,               // =
    EqEq,             // ==
    EqEqEq,           // ===
    BangEq,           // !=
    BangEqEq,         // !==
    Lt,               // <
    LtEq,             // <=
    Gt,               // >
    GtEq,             // >=
    LtLt,             // <<
    GtGt,             // >>
    GtGtGt,           // >>>
    Amp,              // &
    AmpAmp,           // &&
    Pipe,             // |
    PipePipe,         // ||
    Caret,            // ^
    Tilde,            // ~
    Bang,             // !
    Question,         // ?
    QuestionQuestion, // ??
    QuestionDot,      // ?.

    // Assignment Operators
    PlusEq,             // +=
    MinusEq,            // -=
    StarEq,             // *=
    SlashEq,            // /=
    PercentEq,          // %=
    StarStarEq,         // **=
    AmpEq,              // &=
    PipeEq,             // |=
    CaretEq,            // ^=
    LtLtEq,             // <<=
    GtGtEq,             // >>=
    GtGtGtEq,           // >>>=
    AmpAmpEq,           // &&=
    PipePipeEq,         // ||=
    QuestionQuestionEq, // ??=

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Dot,       // .
    DotDotDot, // ...
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    Arrow,     // =>
    At,        // @
    Hash,      // #

    // Template literals
    TemplateHead(Atom),   // `...${
    TemplateMiddle(Atom), // }...${
    TemplateTail(Atom),   // }...`
    TemplateNoSub(Atom),  // `...` (no substitutions)

    // Special
    Eof,
    Invalid(char),
}

/// A token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(pos: usize, line: u32, column: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos, line, column),
        }
    }
}

/// Lexer state checkpoint for backtracking
#[derive(Clone)]
pub struct LexerCheckpoint {
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    saw_newline: bool,
}

/// Lexer for tokenizing TypeScript source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Base offset added to char_indices positions (needed when resetting chars from middle of source)
    chars_base_offset: usize,
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    /// Tracks if we just saw a newline (for ASI)
    saw_newline: bool,
    string_dict: &'a mut StringDict,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        let mut lexer = Self {
            source,
            chars: source.char_indices().peekable(),
            chars_base_offset: 0,
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            saw_newline: false,
            string_dict,
        };
        lexer.skip_hashbang();
        lexer
    }

    /// Get mutable reference to the string dictionary for interning
    pub fn string_dict(&mut self) -> &mut StringDict {
        self.string_dict
    }

    /// The full source text being scanned.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Create a checkpoint of the current lexer state for backtracking
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            current_pos: self.current_pos,
            line: self.line,
            column: self.column,
            start_pos: self.start_pos,
            start_line: self.start_line,
            start_column: self.start_column,
            saw_newline: self.saw_newline,
        }
    }

    /// Restore the lexer state from a checkpoint
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.start_pos = checkpoint.start_pos;
        self.start_line = checkpoint.start_line;
        self.start_column = checkpoint.start_column;
        self.saw_newline = checkpoint.saw_newline;
        self.reset_chars(checkpoint.current_pos);
    }

    /// Reset the lexer to the start of `span` and scan a regexp literal.
    /// Used when the parser determines that a `/` starts a regexp.
    pub fn rescan_as_regexp(&mut self, span: Span) -> Token {
        self.line = span.line;
        self.column = span.column;
        self.start_pos = span.start;
        self.start_line = span.line;
        self.start_column = span.column;
        self.reset_chars(span.start);
        self.scan_regexp()
    }

    /// Point the char iterator at an absolute offset. O(1): the iterator is
    /// rebuilt over the tail slice and `chars_base_offset` maps it back.
    fn reset_chars(&mut self, pos: usize) {
        self.current_pos = pos;
        self.chars_base_offset = pos;
        self.chars = self
            .source
            .get(pos..)
            .unwrap_or("")
            .char_indices()
            .peekable();
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;

        let Some((_pos, ch)) = self.advance() else {
            return Token::eof(self.current_pos, self.line, self.column);
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '~' => TokenKind::Tilde,
            '@' => TokenKind::At,
            '#' => TokenKind::Hash,
            ':' => TokenKind::Colon,

            '.' => self.scan_dot(),
            '+' => self.scan_operator('+', TokenKind::Plus, TokenKind::PlusPlus, TokenKind::PlusEq),
            '-' => {
                self.scan_operator('-', TokenKind::Minus, TokenKind::MinusMinus, TokenKind::MinusEq)
            }
            '*' => self.scan_star(),
            '/' => self.scan_with_eq(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.scan_with_eq(TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.scan_with_eq(TokenKind::Caret, TokenKind::CaretEq),
            '=' => self.scan_equals(),
            '!' => self.scan_bang(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '&' => self.scan_logical('&', TokenKind::Amp, TokenKind::AmpEq, TokenKind::AmpAmp, TokenKind::AmpAmpEq),
            '|' => self.scan_logical(
                '|',
                TokenKind::Pipe,
                TokenKind::PipeEq,
                TokenKind::PipePipe,
                TokenKind::PipePipeEq,
            ),
            '?' => self.scan_question(),

            '"' | '\'' => self.scan_string(ch),
            '`' => self.scan_template_part(true),
            '0'..='9' => self.scan_number(ch),

            c if is_id_start(c) => self.scan_identifier(c),
            '\\' => self.scan_escaped_identifier(),

            c => TokenKind::Invalid(c),
        };

        Token::new(kind, self.make_span())
    }

    /// Check if there was a newline before the current token
    pub fn had_newline_before(&self) -> bool {
        self.saw_newline
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = self.chars_base_offset + pos + ch.len_utf8();
            if is_line_terminator(ch) {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let slice = self.source.get(self.current_pos..)?;
        let mut iter = slice.chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    /// `#!` on the very first line is a comment for our purposes.
    fn skip_hashbang(&mut self) {
        if self.source.starts_with("#!") {
            while let Some(ch) = self.peek() {
                if is_line_terminator(ch) {
                    break;
                }
                self.advance();
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        self.saw_newline = false;

        loop {
            match self.peek() {
                // \r alone does not trigger ASI; the \n of a CRLF pair does.
                Some(' ' | '\t' | '\r' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}') => {
                    self.advance();
                }
                Some(ch) if is_line_terminator(ch) => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if is_line_terminator(ch) {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        loop {
                            match self.advance() {
                                Some((_, '*')) if self.peek() == Some('/') => {
                                    self.advance();
                                    break;
                                }
                                Some((_, ch)) if is_line_terminator(ch) => {
                                    self.saw_newline = true;
                                }
                                Some(_) => {}
                                None => break,
                            }
                        }
                    }
                    _ => break,
                },
                _ => break,
            }
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek() == Some('.') && self.peek_next() == Some('.') {
            self.advance();
            self.advance();
            TokenKind::DotDotDot
        } else if matches!(self.peek(), Some('0'..='9')) {
            self.scan_number('.')
        } else {
            TokenKind::Dot
        }
    }

    /// `+`, `++`, `+=` and the `-` family.
    fn scan_operator(
        &mut self,
        ch: char,
        single: TokenKind,
        double: TokenKind,
        assign: TokenKind,
    ) -> TokenKind {
        if self.match_char(ch) {
            double
        } else if self.match_char('=') {
            assign
        } else {
            single
        }
    }

    fn scan_with_eq(&mut self, single: TokenKind, assign: TokenKind) -> TokenKind {
        if self.match_char('=') { assign } else { single }
    }

    /// `&`, `&=`, `&&`, `&&=` and the `|` family.
    fn scan_logical(
        &mut self,
        ch: char,
        single: TokenKind,
        single_assign: TokenKind,
        double: TokenKind,
        double_assign: TokenKind,
    ) -> TokenKind {
        if self.match_char(ch) {
            self.scan_with_eq(double, double_assign)
        } else {
            self.scan_with_eq(single, single_assign)
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        if self.match_char('*') {
            self.scan_with_eq(TokenKind::StarStar, TokenKind::StarStarEq)
        } else {
            self.scan_with_eq(TokenKind::Star, TokenKind::StarEq)
        }
    }

    /// Scan a regular expression literal.
    /// The leading `/` must be at the current position (not yet consumed).
    pub fn scan_regexp(&mut self) -> Token {
        let start_pos = self.current_pos;
        let start_line = self.line;
        let start_column = self.column;

        self.advance();

        let mut pattern = String::new();
        let mut in_class = false;

        loop {
            match self.advance() {
                Some((_, '/')) if !in_class => break,
                Some((_, '[')) => {
                    in_class = true;
                    pattern.push('[');
                }
                Some((_, ']')) => {
                    in_class = false;
                    pattern.push(']');
                }
                Some((_, '\\')) => {
                    pattern.push('\\');
                    if let Some((_, c)) = self.advance() {
                        pattern.push(c);
                    }
                }
                Some((_, c)) if is_line_terminator(c) => break,
                Some((_, c)) => pattern.push(c),
                None => break,
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphabetic() {
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let span = Span::new(start_pos, self.current_pos, start_line, start_column);
        Token::new(TokenKind::RegExp(pattern, flags), span)
    }

    fn scan_equals(&mut self) -> TokenKind {
        if self.match_char('=') {
            self.scan_with_eq(TokenKind::EqEq, TokenKind::EqEqEq)
        } else if self.match_char('>') {
            TokenKind::Arrow
        } else {
            TokenKind::Eq
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.match_char('=') {
            self.scan_with_eq(TokenKind::BangEq, TokenKind::BangEqEq)
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.match_char('<') {
            self.scan_with_eq(TokenKind::LtLt, TokenKind::LtLtEq)
        } else {
            self.scan_with_eq(TokenKind::Lt, TokenKind::LtEq)
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.match_char('>') {
            if self.match_char('>') {
                self.scan_with_eq(TokenKind::GtGtGt, TokenKind::GtGtGtEq)
            } else {
                self.scan_with_eq(TokenKind::GtGt, TokenKind::GtGtEq)
            }
        } else {
            self.scan_with_eq(TokenKind::Gt, TokenKind::GtEq)
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        if self.match_char('?') {
            self.scan_with_eq(TokenKind::QuestionQuestion, TokenKind::QuestionQuestionEq)
        } else if self.peek() == Some('.') && !matches!(self.peek_next(), Some('0'..='9')) {
            // `a?.5:b` is a conditional, not an optional chain
            self.advance();
            TokenKind::QuestionDot
        } else {
            TokenKind::Question
        }
    }

    /// Decode one escape sequence after a consumed backslash.
    /// Returns `None` for a line continuation.
    fn scan_escape(&mut self) -> Option<char> {
        let (_, ch) = self.advance()?;
        match ch {
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'b' => Some('\x08'),
            'f' => Some('\x0C'),
            'v' => Some('\x0B'),
            '0' if !matches!(self.peek(), Some('0'..='9')) => Some('\0'),
            '0'..='7' => {
                // Legacy octal escape; sloppy-mode scripts still contain them.
                let mut code = ch.to_digit(8).unwrap_or(0);
                let mut digits = 1;
                while digits < 3 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) if code * 8 + d <= 0o377 => {
                            code = code * 8 + d;
                            digits += 1;
                            self.advance();
                        }
                        _ => break,
                    }
                }
                char::from_u32(code)
            }
            'x' => self.scan_hex_escape(2).and_then(char::from_u32),
            'u' => self.scan_unicode_escape(),
            '\r' => {
                self.match_char('\n');
                None
            }
            c if is_line_terminator(c) => None,
            c => Some(c),
        }
    }

    /// `\uXXXX` or `\u{X...}`, with the `u` already consumed.
    fn scan_unicode_escape(&mut self) -> Option<char> {
        if self.match_char('{') {
            let mut code: u32 = 0;
            while let Some(ch) = self.peek() {
                self.advance();
                if ch == '}' {
                    break;
                }
                code = code.checked_mul(16)?.checked_add(ch.to_digit(16)?)?;
            }
            char::from_u32(code)
        } else {
            self.scan_hex_escape(4).and_then(char::from_u32)
        }
    }

    fn scan_hex_escape(&mut self, count: usize) -> Option<u32> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            self.advance();
            code = code * 16 + digit;
        }
        Some(code)
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => {
                    if let Some(c) = self.scan_escape() {
                        value.push(c);
                    }
                }
                // Unterminated string
                Some((_, '\n')) | None => break,
                Some((_, c)) => value.push(c),
            }
        }

        TokenKind::String(self.string_dict.get_or_insert(&value))
    }

    /// Scan template text up to `${` or the closing backtick. `head` selects
    /// between the opening form and the continuation after a substitution.
    fn scan_template_part(&mut self, head: bool) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some((_, '`')) => {
                    let atom = self.string_dict.get_or_insert(&value);
                    return if head {
                        TokenKind::TemplateNoSub(atom)
                    } else {
                        TokenKind::TemplateTail(atom)
                    };
                }
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    let atom = self.string_dict.get_or_insert(&value);
                    return if head {
                        TokenKind::TemplateHead(atom)
                    } else {
                        TokenKind::TemplateMiddle(atom)
                    };
                }
                Some((_, '\\')) => {
                    if let Some(c) = self.scan_escape() {
                        value.push(c);
                    }
                }
                Some((_, c)) => value.push(c),
                None => break,
            }
        }

        // Unterminated template
        let atom = self.string_dict.get_or_insert(&value);
        if head {
            TokenKind::TemplateNoSub(atom)
        } else {
            TokenKind::TemplateTail(atom)
        }
    }

    /// Rescan template text after the `}` that closes a substitution.
    pub fn rescan_template_continuation(&mut self, rbrace_span: Span) -> Token {
        self.line = rbrace_span.line;
        self.column = rbrace_span.column + 1;
        self.start_pos = rbrace_span.start;
        self.start_line = rbrace_span.line;
        self.start_column = rbrace_span.column;
        self.reset_chars(rbrace_span.end);
        let kind = self.scan_template_part(false);
        Token::new(kind, self.make_span())
    }

    /// Collect digits valid in `radix`, dropping numeric separators.
    fn scan_digits(&mut self, radix: u32, out: &mut String) {
        while let Some(ch) = self.peek() {
            if ch == '_' {
                self.advance();
            } else if ch.is_digit(radix) {
                out.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut digits = String::new();

        if first == '0' {
            let radix = match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.scan_digits(radix, &mut digits);
                let value = u128::from_str_radix(&digits, radix).unwrap_or(0);
                if self.match_char('n') {
                    return TokenKind::BigInt(value.to_string());
                }
                return TokenKind::Number(value as f64);
            }
            if matches!(self.peek(), Some('0'..='7')) {
                // Legacy octal literal such as 0777
                self.scan_digits(10, &mut digits);
                return match u64::from_str_radix(&digits, 8) {
                    Ok(value) => TokenKind::Number(value as f64),
                    Err(_) => TokenKind::Number(digits.parse().unwrap_or(f64::NAN)),
                };
            }
        }

        if first == '.' {
            digits.push_str("0.");
        } else {
            digits.push(first);
            self.scan_digits(10, &mut digits);
            // `1.toString()` is not valid but `1..toString()` and `1.5` are
            if self.peek() == Some('.') && !matches!(self.peek_next(), Some('.')) {
                if matches!(self.peek_next(), Some(c) if is_id_start(c) && c != 'e' && c != 'E') {
                    return TokenKind::Number(digits.parse().unwrap_or(f64::NAN));
                }
                self.advance();
                digits.push('.');
            }
        }
        if digits.ends_with('.') || first == '.' {
            self.scan_digits(10, &mut digits);
        }

        if !digits.contains('.') && self.match_char('n') {
            return TokenKind::BigInt(digits);
        }

        if matches!(self.peek(), Some('e' | 'E'))
            && matches!(self.peek_next(), Some('0'..='9' | '+' | '-'))
        {
            self.advance();
            digits.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                digits.push(sign);
                self.advance();
            }
            self.scan_digits(10, &mut digits);
        }

        TokenKind::Number(digits.parse().unwrap_or(f64::NAN))
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::new();
        name.push(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else if ch == '\\' {
                self.advance();
                match self.advance() {
                    Some((_, 'u')) => {
                        if let Some(c) = self.scan_unicode_escape() {
                            name.push(c);
                        }
                    }
                    _ => return TokenKind::Invalid('\\'),
                }
            } else {
                break;
            }
        }

        keyword_kind(&name)
            .unwrap_or_else(|| TokenKind::Identifier(self.string_dict.get_or_insert(&name)))
    }

    /// An identifier that starts with a `\uXXXX` escape. Escaped keywords stay identifiers.
    fn scan_escaped_identifier(&mut self) -> TokenKind {
        if !self.match_char('u') {
            return TokenKind::Invalid('\\');
        }
        match self.scan_unicode_escape() {
            Some(first) if is_id_start(first) => match self.scan_identifier(first) {
                TokenKind::Identifier(atom) => TokenKind::Identifier(atom),
                _ => {
                    let text = self
                        .source
                        .get(self.start_pos..self.current_pos)
                        .unwrap_or_default();
                    TokenKind::Identifier(self.string_dict.get_or_insert(text))
                }
            },
            _ => TokenKind::Invalid('\\'),
        }
    }
}

/// Map reserved and contextual words to their token kinds.
pub fn keyword_kind(name: &str) -> Option<TokenKind> {
    let kind = match name {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,

        "let" => TokenKind::Let,
        "const" => TokenKind::Const,
        "var" => TokenKind::Var,
        "function" => TokenKind::Function,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "throw" => TokenKind::Throw,
        "new" => TokenKind::New,
        "this" => TokenKind::This,
        "super" => TokenKind::Super,
        "class" => TokenKind::Class,
        "extends" => TokenKind::Extends,
        "static" => TokenKind::Static,
        "import" => TokenKind::Import,
        "export" => TokenKind::Export,
        "from" => TokenKind::From,
        "as" => TokenKind::As,
        "typeof" => TokenKind::Typeof,
        "instanceof" => TokenKind::Instanceof,
        "in" => TokenKind::In,
        "of" => TokenKind::Of,
        "void" => TokenKind::Void,
        "delete" => TokenKind::Delete,
        "yield" => TokenKind::Yield,
        "await" => TokenKind::Await,
        "async" => TokenKind::Async,
        "debugger" => TokenKind::Debugger,
        "with" => TokenKind::With,

        "type" => TokenKind::Type,
        "interface" => TokenKind::Interface,
        "enum" => TokenKind::Enum,
        "namespace" => TokenKind::Namespace,
        "module" => TokenKind::Module,
        "declare" => TokenKind::Declare,
        "abstract" => TokenKind::Abstract,
        "readonly" => TokenKind::Readonly,
        "accessor" => TokenKind::Accessor,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "override" => TokenKind::Override,
        "implements" => TokenKind::Implements,
        "keyof" => TokenKind::Keyof,
        "infer" => TokenKind::Infer,
        "is" => TokenKind::Is,
        "any" => TokenKind::Any,
        "unknown" => TokenKind::Unknown,
        "never" => TokenKind::Never,
        "asserts" => TokenKind::Asserts,
        "satisfies" => TokenKind::Satisfies,
        "unique" => TokenKind::Unique,

        _ => return None,
    };
    Some(kind)
}

/// ECMAScript line terminators: LF, CR, LS (U+2028), PS (U+2029).
/// CR is handled as plain whitespace by the trivia scanner so a CRLF pair counts once.
fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\u{2028}' | '\u{2029}')
}

/// Check if a character can start an identifier
pub fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Check if a character can continue an identifier
pub fn is_id_continue(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

/// Whether `text` is a single identifier (keywords included).
pub fn is_identifier_text(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_id_start) && chars.all(is_id_continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut dict = StringDict::new();
        let mut lexer = Lexer::new(source, &mut dict);
        let mut out = vec![];
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_spans_cover_token_text() {
        let source = "function sum(a, b) {}";
        let toks = tokens(source);
        let texts: Vec<&str> = toks
            .iter()
            .map(|t| source.get(t.span.start..t.span.end).unwrap_or(""))
            .collect();
        assert_eq!(
            texts,
            vec!["function", "sum", "(", "a", ",", "b", ")", "{", "}"]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let toks = tokens("a\n  b\r\n    c");
        let positions: Vec<(u32, u32)> = toks.iter().map(|t| (t.span.line, t.span.column)).collect();
        assert_eq!(positions, vec![(1, 1), (2, 3), (3, 5)]);
    }

    #[test]
    fn test_newline_flag_for_asi() {
        let mut dict = StringDict::new();
        let mut lexer = Lexer::new("a /* x\n */ b c", &mut dict);
        lexer.next_token();
        lexer.next_token();
        assert!(lexer.had_newline_before());
        lexer.next_token();
        assert!(!lexer.had_newline_before());
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut dict = StringDict::new();
        let mut lexer = Lexer::new("(a, b) => a", &mut dict);
        let checkpoint = lexer.checkpoint();
        let first = lexer.next_token();
        lexer.next_token();
        lexer.restore(checkpoint);
        assert_eq!(lexer.next_token(), first);
    }

    #[test]
    fn test_hashbang_is_skipped() {
        let toks = tokens("#!/usr/bin/env node\nlet x");
        assert_eq!(toks.first().map(|t| t.kind.clone()), Some(TokenKind::Let));
    }

    #[test]
    fn test_template_rescan() {
        let mut dict = StringDict::new();
        let mut lexer = Lexer::new("`a${x}b`", &mut dict);
        let head = lexer.next_token();
        assert!(matches!(head.kind, TokenKind::TemplateHead(ref s) if &**s == "a"));
        lexer.next_token();
        let rbrace = lexer.next_token();
        assert_eq!(rbrace.kind, TokenKind::RBrace);
        let tail = lexer.rescan_template_continuation(rbrace.span);
        assert!(matches!(tail.kind, TokenKind::TemplateTail(ref s) if &**s == "b"));
    }
}
