//! Tests for the lexer
//!
//! The annotator splices text at token boundaries, so besides token kinds
//! these tests pin down spans, lines and columns.

use std::rc::Rc;

use tsannotate::lexer::{Lexer, Span, Token, TokenKind, is_identifier_text};
use tsannotate::string_dict::{Atom, StringDict};

fn s(value: &str) -> Atom {
    Rc::from(value)
}

fn tokens(source: &str) -> Vec<Token> {
    let mut dict = StringDict::new();
    let mut lexer = Lexer::new(source, &mut dict);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn lex(source: &str) -> Vec<TokenKind> {
    tokens(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_numbers_and_bigints() {
    assert_eq!(lex("42"), vec![TokenKind::Number(42.0)]);
    assert_eq!(lex("0x1F 1e3 .5"), vec![
        TokenKind::Number(31.0),
        TokenKind::Number(1000.0),
        TokenKind::Number(0.5)
    ]);
    assert_eq!(lex("1_000"), vec![TokenKind::Number(1000.0)]);
    assert_eq!(lex("10n"), vec![TokenKind::BigInt("10".to_string())]);
}

#[test]
fn test_strings_and_templates() {
    assert_eq!(lex(r#""a\tb""#), vec![TokenKind::String(s("a\tb"))]);
    assert_eq!(lex(r"'it\'s'"), vec![TokenKind::String(s("it's"))]);
    assert_eq!(lex("`plain`"), vec![TokenKind::TemplateNoSub(s("plain"))]);
    assert!(matches!(
        lex("`a${x}b`").first(),
        Some(TokenKind::TemplateHead(head)) if &**head == "a"
    ));
}

#[test]
fn test_type_syntax_tokens() {
    assert_eq!(
        lex("type T = keyof U | readonly V[];"),
        vec![
            TokenKind::Type,
            TokenKind::Identifier(s("T")),
            TokenKind::Eq,
            TokenKind::Keyof,
            TokenKind::Identifier(s("U")),
            TokenKind::Pipe,
            TokenKind::Readonly,
            TokenKind::Identifier(s("V")),
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Semicolon,
        ]
    );
    assert_eq!(
        lex("x is string"),
        vec![TokenKind::Identifier(s("x")), TokenKind::Is, TokenKind::Identifier(s("string"))]
    );
    assert_eq!(
        lex("(a?: number) => void"),
        vec![
            TokenKind::LParen,
            TokenKind::Identifier(s("a")),
            TokenKind::Question,
            TokenKind::Colon,
            TokenKind::Identifier(s("number")),
            TokenKind::RParen,
            TokenKind::Arrow,
            TokenKind::Void,
        ]
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        lex("a ?? b?.c ** 2 >>>= 1"),
        vec![
            TokenKind::Identifier(s("a")),
            TokenKind::QuestionQuestion,
            TokenKind::Identifier(s("b")),
            TokenKind::QuestionDot,
            TokenKind::Identifier(s("c")),
            TokenKind::StarStar,
            TokenKind::Number(2.0),
            TokenKind::GtGtGtEq,
            TokenKind::Number(1.0),
        ]
    );
    assert_eq!(lex("...rest"), vec![TokenKind::DotDotDot, TokenKind::Identifier(s("rest"))]);
}

#[test]
fn test_keywords_and_contextual_keywords() {
    assert_eq!(
        lex("async function* g() { yield await x; }")
            .into_iter()
            .take(3)
            .collect::<Vec<_>>(),
        vec![TokenKind::Async, TokenKind::Function, TokenKind::Star]
    );
    assert_eq!(
        lex("declare abstract satisfies asserts infer"),
        vec![
            TokenKind::Declare,
            TokenKind::Abstract,
            TokenKind::Satisfies,
            TokenKind::Asserts,
            TokenKind::Infer,
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        lex("1 // line\n/* block */ 2 /** doc */"),
        vec![TokenKind::Number(1.0), TokenKind::Number(2.0)]
    );
}

#[test]
fn test_spans_lines_and_columns() {
    let source = "function f(a) {\n  return a;\n}";
    let toks = tokens(source);
    let text: Vec<&str> = toks
        .iter()
        .map(|t| source.get(t.span.start..t.span.end).unwrap_or_default())
        .collect();
    assert_eq!(
        text,
        vec!["function", "f", "(", "a", ")", "{", "return", "a", ";", "}"]
    );
    let ret = toks.iter().find(|t| t.kind == TokenKind::Return).map(|t| t.span);
    assert_eq!(ret.map(|span| (span.line, span.column)), Some((2, 3)));
}

#[test]
fn test_spans_count_bytes_for_non_ascii_text() {
    let source = "const é = \"ü\";";
    let toks = tokens(source);
    let last = toks.last().map(|t| t.span);
    assert_eq!(last.map(|span| span.start), Some(source.len() - 1));
}

#[test]
fn test_regexp_rescan() {
    let mut dict = StringDict::new();
    let mut lexer = Lexer::new("/[/]x/gi", &mut dict);
    let token = lexer.scan_regexp();
    assert_eq!(
        token.kind,
        TokenKind::RegExp("[/]x".to_string(), "gi".to_string())
    );
}

#[test]
fn test_unicode_escape_identifiers() {
    assert_eq!(lex(r"\u0078"), vec![TokenKind::Identifier(s("x"))]);
    assert_eq!(lex(r"a\u{62}c"), vec![TokenKind::Identifier(s("abc"))]);
    // An escaped keyword is an identifier.
    assert_eq!(lex(r"\u0069f"), vec![TokenKind::Identifier(s("if"))]);
}

#[test]
fn test_identifier_text() {
    assert!(is_identifier_text("camelCase"));
    assert!(is_identifier_text("$_1"));
    assert!(is_identifier_text("ünïcode"));
    assert!(!is_identifier_text("1abc"));
    assert!(!is_identifier_text("has-dash"));
    assert!(!is_identifier_text(""));
}

#[test]
fn test_detached_span() {
    let detached = Span::default();
    assert!(detached.is_detached());
    assert_eq!((detached.line, detached.column), (1, 1));
    assert!(!Span::new(0, 1, 1, 1).is_detached());
}
