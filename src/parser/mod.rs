//! Parser for TypeScript source code
//!
//! Uses recursive descent with Pratt parsing for expressions. The grammar is
//! split across submodules that each add an `impl Parser` block:
//! statements and declarations, expressions, and type annotations.

mod expressions;
mod statements;
mod types;

use crate::ast::*;
use crate::error::AnnotateError;
use crate::lexer::{Lexer, LexerCheckpoint, Span, Token, TokenKind};
use crate::string_dict::{Atom, StringDict};

/// Nesting of statements, expressions and types the parser accepts before
/// giving up with a syntax error instead of exhausting the stack.
const MAX_NESTING: u32 = 32;

/// Parser for TypeScript source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    /// Set while parsing a `for` header initializer, where `in` ends the
    /// expression instead of being a binary operator.
    no_in: bool,
    depth: u32,
}

/// Saved parser position for speculative parsing.
struct Snapshot {
    lexer: LexerCheckpoint,
    current: Token,
    previous: Token,
    no_in: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        let mut lexer = Lexer::new(source, string_dict);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::eof(0, 1, 1),
            no_in: false,
            depth: 0,
        }
    }

    /// Helper to intern a string in the dictionary
    #[inline]
    fn intern(&mut self, s: &str) -> Atom {
        self.lexer.string_dict().get_or_insert(s)
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, AnnotateError> {
        let mut body = Vec::new();
        let mut source_type = SourceType::Script;

        while !self.is_at_end() {
            let stmt = self.parse_statement()?;
            if matches!(stmt, Statement::Import(_) | Statement::Export(_)) {
                source_type = SourceType::Module;
            }
            body.push(stmt);
        }

        Ok(Program {
            body: body.into(),
            source_type,
        })
    }

    // ============ SPECULATION ============

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lexer: self.lexer.checkpoint(),
            current: self.current.clone(),
            previous: self.previous.clone(),
            no_in: self.no_in,
        }
    }

    fn rewind(&mut self, snapshot: Snapshot) {
        self.lexer.restore(snapshot.lexer);
        self.current = snapshot.current;
        self.previous = snapshot.previous;
        self.no_in = snapshot.no_in;
    }

    /// Run `f`; if it fails or declines, put the parser back where it was.
    fn try_parse<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Option<T>, AnnotateError>,
    ) -> Option<T> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(Some(value)) => Some(value),
            Ok(None) | Err(_) => {
                self.rewind(snapshot);
                None
            }
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, AnnotateError>,
    ) -> Result<T, AnnotateError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("Nesting is too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ============ TOKENS ============

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    fn require_token(&mut self, kind: &TokenKind) -> Result<(), AnnotateError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected_token(&format!("{:?}", kind)))
        }
    }

    /// Consume a `>` in type context, splitting `>>` and `>>>` if needed.
    fn consume_gt_in_type_context(&mut self) -> Result<(), AnnotateError> {
        let rest = match &self.current.kind {
            TokenKind::Gt => {
                self.advance();
                return Ok(());
            }
            TokenKind::GtGt => TokenKind::Gt,
            TokenKind::GtGtGt => TokenKind::GtGt,
            TokenKind::GtEq => TokenKind::Eq,
            TokenKind::GtGtEq => TokenKind::GtEq,
            _ => return Err(self.unexpected_token("'>'")),
        };
        let span = self.current.span;
        self.previous = Token::new(
            TokenKind::Gt,
            Span::new(span.start, span.start + 1, span.line, span.column),
        );
        self.current = Token::new(
            rest,
            Span::new(span.start + 1, span.end, span.line, span.column + 1),
        );
        Ok(())
    }

    fn check_gt_in_type_context(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Gt | TokenKind::GtGt | TokenKind::GtGtGt | TokenKind::GtEq | TokenKind::GtGtEq
        )
    }

    fn expect_semicolon(&mut self) -> Result<(), AnnotateError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }

        // ASI: accept if at end, before }, or after newline
        if self.is_at_end() || self.check(&TokenKind::RBrace) || self.lexer.had_newline_before() {
            return Ok(());
        }

        Err(self.unexpected_token("';'"))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// The token after `current`, without consuming anything.
    fn peek_token(&mut self) -> Token {
        let checkpoint = self.lexer.checkpoint();
        let next = self.lexer.next_token();
        self.lexer.restore(checkpoint);
        next
    }

    /// Check if the next token (after current) is of the given kind
    fn peek_is(&mut self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek_token().kind) == std::mem::discriminant(kind)
    }

    /// Whether the token after `current` starts on the same line.
    fn peek_on_same_line(&mut self) -> bool {
        let checkpoint = self.lexer.checkpoint();
        self.lexer.next_token();
        let same_line = !self.lexer.had_newline_before();
        self.lexer.restore(checkpoint);
        same_line
    }

    fn check_identifier(&self) -> bool {
        matches!(self.current.kind, TokenKind::Identifier(_))
            || is_contextual_keyword(&self.current.kind)
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(s) if s.as_ref() == keyword)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    // ============ NAMES ============

    fn parse_identifier(&mut self) -> Result<Identifier, AnnotateError> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.clone(),
            kind if is_contextual_keyword(kind) => {
                let text = keyword_text(kind).unwrap_or_default();
                self.intern(text)
            }
            _ => return Err(self.unexpected_token("identifier")),
        };
        let span = self.current.span;
        self.advance();
        Ok(Identifier { name, span })
    }

    /// Parse a private identifier (after `#` token has been consumed).
    /// Returns an Identifier with name including the `#` prefix (e.g., "#foo").
    fn parse_private_identifier(&mut self) -> Result<Identifier, AnnotateError> {
        let hash_span = self.previous.span;
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let private_name = format!("#{}", name);
                let name = self.intern(&private_name);
                let span = hash_span.to(self.current.span);
                self.advance();
                Ok(Identifier { name, span })
            }
            _ => Err(self.unexpected_token("identifier after #")),
        }
    }

    /// Parse identifier or keyword as a property name (after a dot).
    /// Reserved words are valid property names.
    fn parse_identifier_name(&mut self) -> Result<Identifier, AnnotateError> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            let span = self.current.span;
            self.advance();
            return Ok(Identifier { name, span });
        }
        if let Some(text) = keyword_text(&self.current.kind) {
            let name = self.intern(text);
            let span = self.current.span;
            self.advance();
            return Ok(Identifier { name, span });
        }
        Err(self.unexpected_token("identifier"))
    }

    fn parse_property_name(&mut self) -> Result<ObjectPropertyKey, AnnotateError> {
        match &self.current.kind {
            TokenKind::String(s) => {
                let value = s.clone();
                let span = self.current.span;
                self.advance();
                Ok(ObjectPropertyKey::String(StringLiteral { value, span }))
            }
            TokenKind::Number(n) => {
                let n = *n;
                let span = self.current.span;
                self.advance();
                Ok(ObjectPropertyKey::Number(Literal {
                    value: LiteralValue::Number(n),
                    span,
                }))
            }
            TokenKind::BigInt(digits) => {
                let value = self.intern(&digits.clone());
                let span = self.current.span;
                self.advance();
                Ok(ObjectPropertyKey::String(StringLiteral { value, span }))
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = self.parse_assignment_expression()?;
                self.require_token(&TokenKind::RBracket)?;
                Ok(ObjectPropertyKey::Computed(std::rc::Rc::new(expr)))
            }
            TokenKind::Hash => {
                self.advance();
                Ok(ObjectPropertyKey::PrivateIdentifier(
                    self.parse_private_identifier()?,
                ))
            }
            _ => Ok(ObjectPropertyKey::Identifier(self.parse_identifier_name()?)),
        }
    }

    fn parse_string_literal(&mut self) -> Result<StringLiteral, AnnotateError> {
        match &self.current.kind {
            TokenKind::String(s) => {
                let value = s.clone();
                let span = self.current.span;
                self.advance();
                Ok(StringLiteral { value, span })
            }
            _ => Err(self.unexpected_token("string")),
        }
    }

    // ============ SPANS AND ERRORS ============

    fn span_from(&self, start: Span) -> Span {
        Span::new(
            start.start,
            self.previous.span.end,
            start.line,
            start.column,
        )
    }

    fn error(&self, message: &str) -> AnnotateError {
        AnnotateError::syntax_error(message, self.current.span.line, self.current.span.column)
    }

    fn unexpected_token(&self, expected: &str) -> AnnotateError {
        AnnotateError::syntax_error(
            format!("Unexpected {:?}, expected {}", self.current.kind, expected),
            self.current.span.line,
            self.current.span.column,
        )
    }
}

/// Keywords that may still be used as identifiers.
fn is_contextual_keyword(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Type
            | TokenKind::From
            | TokenKind::As
            | TokenKind::Of
            | TokenKind::Any
            | TokenKind::Unknown
            | TokenKind::Never
            | TokenKind::Keyof
            | TokenKind::Infer
            | TokenKind::Is
            | TokenKind::Asserts
            | TokenKind::Readonly
            | TokenKind::Async
            | TokenKind::Declare
            | TokenKind::Abstract
            | TokenKind::Namespace
            | TokenKind::Module
            | TokenKind::Accessor
            | TokenKind::Override
            | TokenKind::Satisfies
            | TokenKind::Unique
            | TokenKind::Public
            | TokenKind::Private
            | TokenKind::Protected
            | TokenKind::Implements
            | TokenKind::Interface
            | TokenKind::Static
    )
}

fn token_starts_property_name(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::LBracket
            | TokenKind::Hash
    ) || keyword_text(kind).is_some()
}

/// Source text of a keyword token.
fn keyword_text(kind: &TokenKind) -> Option<&'static str> {
    let text = match kind {
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        TokenKind::Let => "let",
        TokenKind::Const => "const",
        TokenKind::Var => "var",
        TokenKind::Function => "function",
        TokenKind::Return => "return",
        TokenKind::If => "if",
        TokenKind::Else => "else",
        TokenKind::For => "for",
        TokenKind::While => "while",
        TokenKind::Do => "do",
        TokenKind::Break => "break",
        TokenKind::Continue => "continue",
        TokenKind::Switch => "switch",
        TokenKind::Case => "case",
        TokenKind::Default => "default",
        TokenKind::Try => "try",
        TokenKind::Catch => "catch",
        TokenKind::Finally => "finally",
        TokenKind::Throw => "throw",
        TokenKind::New => "new",
        TokenKind::This => "this",
        TokenKind::Super => "super",
        TokenKind::Class => "class",
        TokenKind::Extends => "extends",
        TokenKind::Static => "static",
        TokenKind::Import => "import",
        TokenKind::Export => "export",
        TokenKind::From => "from",
        TokenKind::As => "as",
        TokenKind::Typeof => "typeof",
        TokenKind::Instanceof => "instanceof",
        TokenKind::In => "in",
        TokenKind::Of => "of",
        TokenKind::Void => "void",
        TokenKind::Delete => "delete",
        TokenKind::Yield => "yield",
        TokenKind::Await => "await",
        TokenKind::Async => "async",
        TokenKind::Debugger => "debugger",
        TokenKind::With => "with",
        TokenKind::Type => "type",
        TokenKind::Interface => "interface",
        TokenKind::Enum => "enum",
        TokenKind::Namespace => "namespace",
        TokenKind::Module => "module",
        TokenKind::Declare => "declare",
        TokenKind::Abstract => "abstract",
        TokenKind::Readonly => "readonly",
        TokenKind::Accessor => "accessor",
        TokenKind::Public => "public",
        TokenKind::Private => "private",
        TokenKind::Protected => "protected",
        TokenKind::Override => "override",
        TokenKind::Implements => "implements",
        TokenKind::Keyof => "keyof",
        TokenKind::Infer => "infer",
        TokenKind::Is => "is",
        TokenKind::Any => "any",
        TokenKind::Unknown => "unknown",
        TokenKind::Never => "never",
        TokenKind::Asserts => "asserts",
        TokenKind::Satisfies => "satisfies",
        TokenKind::Unique => "unique",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, AnnotateError> {
        let mut dict = StringDict::new();
        Parser::new(source, &mut dict).parse_program()
    }

    fn first_function(program: &Program) -> Option<&FunctionDeclaration> {
        match program.body.first() {
            Some(Statement::FunctionDeclaration(func)) => Some(func),
            _ => None,
        }
    }

    #[test]
    fn params_span_covers_the_parentheses() {
        let source = "function f<T>(a: T, b = 1) {}";
        let program = parse(source).ok();
        let span = program
            .as_ref()
            .and_then(first_function)
            .map(|func| func.params_span);
        let text = span.and_then(|span| source.get(span.start..span.end));
        assert_eq!(text, Some("(a: T, b = 1)"));
    }

    #[test]
    fn overload_signatures_have_no_body() {
        let program = parse("function f(x: string): string;\nfunction f(x: any) { return x; }").ok();
        let bodies: Vec<bool> = program
            .iter()
            .flat_map(|p| p.body.iter())
            .filter_map(|stmt| match stmt {
                Statement::FunctionDeclaration(func) => Some(func.body.is_some()),
                _ => None,
            })
            .collect();
        assert_eq!(bodies, vec![false, true]);
    }

    #[test]
    fn exports_make_a_module() {
        let kinds: Vec<Option<SourceType>> = ["let a = 1;", "export const a = 1;"]
            .iter()
            .map(|source| parse(source).ok().map(|p| p.source_type))
            .collect();
        assert_eq!(kinds, vec![Some(SourceType::Script), Some(SourceType::Module)]);
    }

    #[test]
    fn syntax_errors_carry_a_location() {
        let line = match parse("let x = 1;\nfunction (") {
            Err(AnnotateError::SyntaxError { location, .. }) => Some(location.line),
            _ => None,
        };
        assert_eq!(line, Some(2));
    }
}
