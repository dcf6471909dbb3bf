//! Tests for the parser
//!
//! These tests verify that the parser correctly parses TypeScript source into an AST
//! and records the spans the serializer splices against.

use tsannotate::ast::*;
use tsannotate::error::AnnotateError;
use tsannotate::lexer::Span;
use tsannotate::parser::Parser;
use tsannotate::string_dict::StringDict;

#[allow(clippy::unwrap_used)]
fn parse(source: &str) -> Program {
    let mut dict = StringDict::new();
    let mut parser = Parser::new(source, &mut dict);
    parser.parse_program().unwrap()
}

#[allow(clippy::unwrap_used)]
fn parse_err(source: &str) -> AnnotateError {
    let mut dict = StringDict::new();
    let mut parser = Parser::new(source, &mut dict);
    parser.parse_program().unwrap_err()
}

fn first_expression(program: &Program) -> &Expression {
    match program.body.first() {
        Some(Statement::Expression(stmt)) => &stmt.expression,
        Some(Statement::VariableDeclaration(decl)) => decl.declarations[0]
            .init
            .as_deref()
            .expect("initializer"),
        other => panic!("expected expression, got {:?}", other),
    }
}

fn slice(source: &str, span: Span) -> &str {
    source.get(span.start..span.end).unwrap_or_default()
}

#[test]
fn test_variable_declaration() {
    let prog = parse("let x: number = 1;");
    assert_eq!(prog.body.len(), 1);
    assert!(matches!(prog.body[0], Statement::VariableDeclaration(_)));
}

#[test]
fn test_binary_expression() {
    let prog = parse("1 + 2 * 3;");
    match first_expression(&prog) {
        Expression::Binary(b) => {
            assert_eq!(b.operator, BinaryOp::Add);
            assert!(matches!(&*b.right, Expression::Binary(r) if r.operator == BinaryOp::Mul));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_function_declaration_params_span() {
    let source = "function add(a: number, b: number) { return a + b; }";
    let prog = parse(source);
    let Statement::FunctionDeclaration(func) = &prog.body[0] else {
        panic!("expected function");
    };
    assert_eq!(slice(source, func.params_span), "(a: number, b: number)");
    assert_eq!(func.params.len(), 2);
    assert!(func.body.is_some());
}

#[test]
fn test_overload_signatures_have_no_body() {
    let prog = parse("function f(a: string): string;\nfunction f(a: any) { return a; }");
    let Statement::FunctionDeclaration(sig) = &prog.body[0] else {
        panic!("expected function");
    };
    assert!(sig.body.is_none());
    let Statement::FunctionDeclaration(imp) = &prog.body[1] else {
        panic!("expected function");
    };
    assert!(imp.body.is_some());
}

#[test]
fn test_arrow_function() {
    let source = "const f = (a, b) => a + b;";
    let prog = parse(source);
    match first_expression(&prog) {
        Expression::ArrowFunction(arrow) => {
            assert_eq!(arrow.params.len(), 2);
            assert_eq!(slice(source, arrow.params_span), "(a, b)");
        }
        other => panic!("expected arrow, got {:?}", other),
    }
}

#[test]
fn test_bare_arrow_param_span() {
    let source = "const f = x => x * 2;";
    let prog = parse(source);
    match first_expression(&prog) {
        Expression::ArrowFunction(arrow) => assert_eq!(slice(source, arrow.params_span), "x"),
        other => panic!("expected arrow, got {:?}", other),
    }
}

#[test]
fn test_async_arrow() {
    let prog = parse("const f = async (x: number) => x;");
    assert!(matches!(
        first_expression(&prog),
        Expression::ArrowFunction(ArrowFunctionExpression { async_: true, .. })
    ));
}

#[test]
fn test_generic_arrow() {
    let prog = parse("const id = <T,>(x: T): T => x;");
    match first_expression(&prog) {
        Expression::ArrowFunction(arrow) => {
            assert!(arrow.type_parameters.is_some());
            assert!(arrow.return_type.is_some());
        }
        other => panic!("expected arrow, got {:?}", other),
    }
}

#[test]
fn test_angle_bracket_assertion() {
    let prog = parse("const n = <number>value;");
    assert!(matches!(
        first_expression(&prog),
        Expression::TypeAssertion(_)
    ));
}

#[test]
fn test_conditional_with_parenthesized_branch() {
    let prog = parse("const v = ok ? (a) : b;");
    assert!(matches!(first_expression(&prog), Expression::Conditional(_)));
}

#[test]
fn test_parenthesized_sequence_is_not_arrow() {
    let prog = parse("(a, b);");
    assert!(matches!(
        first_expression(&prog),
        Expression::Parenthesized(..)
    ));
}

#[test]
fn test_object_literal() {
    let prog = parse("const o = { a: 1, b, m() { return 1; }, get g() { return 2; } };");
    match first_expression(&prog) {
        Expression::Object(obj) => {
            assert_eq!(obj.properties.len(), 4);
            let ObjectProperty::Property(m) = &obj.properties[2] else {
                panic!("expected property");
            };
            assert!(m.method);
            let ObjectProperty::Property(g) = &obj.properties[3] else {
                panic!("expected property");
            };
            assert_eq!(g.kind, PropertyKind::Get);
        }
        other => panic!("expected object, got {:?}", other),
    }
}

#[test]
fn test_generator_methods() {
    let prog = parse("class A { *items() { yield 1; } }\nconst o = { *gen() { yield 2; } };");
    let Statement::ClassDeclaration(class) = &prog.body[0] else {
        panic!("expected class");
    };
    let ClassMember::Method(method) = &class.body.members[0] else {
        panic!("expected method");
    };
    assert!(method.value.generator);
}

#[test]
fn test_array_literal() {
    let prog = parse("[1, 2, 3];");
    assert!(matches!(first_expression(&prog), Expression::Array(a) if a.elements.len() == 3));
}

#[test]
fn test_array_holes() {
    let prog = parse("[1, , 3];");
    match first_expression(&prog) {
        Expression::Array(arr) => {
            assert_eq!(arr.elements.len(), 3);
            assert!(arr.elements[1].is_none());
        }
        other => panic!("expected array, got {:?}", other),
    }
}

#[test]
fn test_function_type_expression() {
    let prog = parse("type Fn = (a: number, b?: string) => void;");
    let Statement::TypeAlias(alias) = &prog.body[0] else {
        panic!("expected type alias");
    };
    match &alias.type_annotation {
        TypeAnnotation::Function(f) => {
            assert_eq!(f.params.len(), 2);
            assert!(f.params[1].optional);
        }
        other => panic!("expected function type, got {:?}", other),
    }
}

#[test]
fn test_interface_declaration() {
    let prog = parse(
        "interface Point { readonly x: number; y?: number; move(dx: number): void; [key: string]: any; (): void; new (x: number): Point }",
    );
    let Statement::InterfaceDeclaration(iface) = &prog.body[0] else {
        panic!("expected interface");
    };
    assert_eq!(iface.body.len(), 6);
    assert!(matches!(iface.body[3], TypeMember::Index(_)));
    assert!(matches!(iface.body[4], TypeMember::Call(_)));
    assert!(matches!(iface.body[5], TypeMember::Construct(_)));
}

#[test]
fn test_union_type_has_real_span() {
    let source = "type U = string | number;";
    let prog = parse(source);
    let Statement::TypeAlias(alias) = &prog.body[0] else {
        panic!("expected type alias");
    };
    assert!(matches!(alias.type_annotation, TypeAnnotation::Union(_)));
    assert_eq!(slice(source, alias.type_annotation.span()), "string | number");
}

#[test]
fn test_nested_generic_types() {
    let prog = parse("let m: Map<string, Array<number>>;");
    let Statement::VariableDeclaration(decl) = &prog.body[0] else {
        panic!("expected declaration");
    };
    assert!(decl.declarations[0].type_annotation.is_some());
}

#[test]
fn test_deeply_nested_generic_types() {
    let prog = parse("let m: Promise<Array<Set<number>>> = x;");
    assert_eq!(prog.body.len(), 1);
}

#[test]
fn test_conditional_and_mapped_types() {
    let prog = parse(
        "type A<T> = T extends string ? 'str' : never;\ntype R<T> = { readonly [K in keyof T]?: T[K] };\ntype I<T> = T extends Promise<infer U> ? U : T;",
    );
    let Statement::TypeAlias(cond) = &prog.body[0] else {
        panic!("expected alias");
    };
    assert!(matches!(cond.type_annotation, TypeAnnotation::Conditional(_)));
    let Statement::TypeAlias(mapped) = &prog.body[1] else {
        panic!("expected alias");
    };
    assert!(matches!(mapped.type_annotation, TypeAnnotation::Mapped(_)));
}

#[test]
fn test_template_literal_type() {
    let prog = parse("type Ev = `on${string}`;");
    let Statement::TypeAlias(alias) = &prog.body[0] else {
        panic!("expected alias");
    };
    assert!(matches!(
        alias.type_annotation,
        TypeAnnotation::TemplateLiteral(_)
    ));
}

#[test]
fn test_type_predicate_return() {
    let prog = parse("function isStr(x: unknown): x is string { return typeof x === 'string'; }");
    let Statement::FunctionDeclaration(func) = &prog.body[0] else {
        panic!("expected function");
    };
    assert!(matches!(func.return_type, Some(TypeAnnotation::Predicate(_))));
}

#[test]
fn test_class_declaration() {
    let prog = parse(
        "abstract class Animal<T> extends Base<T> implements Named {\n  private name: string;\n  static count = 0;\n  constructor(public readonly id: number) { super(); }\n  abstract speak(): string;\n  get label() { return this.name; }\n  move(d = 0) { return d; }\n  [key: string]: any;\n}",
    );
    let Statement::ClassDeclaration(class) = &prog.body[0] else {
        panic!("expected class");
    };
    assert!(class.abstract_);
    assert!(class.super_type_arguments.is_some());
    let members = &class.body.members;
    assert!(matches!(members[2], ClassMember::Constructor(_)));
    assert!(matches!(members[3], ClassMember::MethodSignature(_)));
    assert!(matches!(&members[4], ClassMember::Method(m) if m.kind == MethodKind::Get));
    assert!(matches!(members[6], ClassMember::Index(_)));
    let ClassMember::Constructor(ctor) = &members[2] else {
        panic!("expected constructor");
    };
    assert_eq!(ctor.params[0].accessibility, Some(Accessibility::Public));
    assert!(ctor.params[0].readonly);
}

#[test]
fn test_method_named_like_modifier() {
    let prog = parse("class A { static() { return 1; } get() { return 2; } readonly = true; }");
    let Statement::ClassDeclaration(class) = &prog.body[0] else {
        panic!("expected class");
    };
    assert_eq!(class.body.members.len(), 3);
    assert!(matches!(
        &class.body.members[1],
        ClassMember::Method(m) if m.kind == MethodKind::Method
    ));
}

#[test]
fn test_enum_declaration() {
    let prog = parse("const enum Color { Red, Green = 'g', }");
    let Statement::EnumDeclaration(e) = &prog.body[0] else {
        panic!("expected enum");
    };
    assert!(e.const_);
    assert_eq!(e.members.len(), 2);
}

#[test]
fn test_declare_forms() {
    let prog = parse(
        "declare const VERSION: string;\ndeclare function greet(name: string): void;\ndeclare module 'pkg' { export const x: number; }\ndeclare global { interface Window { app: any } }\nnamespace A.B { export function f() { return 1; } }",
    );
    assert_eq!(prog.body.len(), 5);
    let Statement::FunctionDeclaration(func) = &prog.body[1] else {
        panic!("expected function");
    };
    assert!(func.declare);
    assert!(func.body.is_none());
    let Statement::NamespaceDeclaration(ns) = &prog.body[4] else {
        panic!("expected namespace");
    };
    assert_eq!(ns.id.name.as_ref(), "A.B");
}

#[test]
fn test_for_loops() {
    let prog = parse(
        "for (let i = 0; i < 10; i++) {}\nfor (const x of xs) {}\nfor (const k in obj) {}\nfor (;;) { break; }",
    );
    assert!(matches!(prog.body[0], Statement::For(_)));
    assert!(matches!(prog.body[1], Statement::ForOf(_)));
    assert!(matches!(prog.body[2], Statement::ForIn(_)));
    assert!(matches!(prog.body[3], Statement::For(_)));
}

#[test]
fn test_in_operator_inside_for_init_parens() {
    let prog = parse("for (let i = ('a' in o) ? 1 : 0; i < 1; i++) {}");
    assert!(matches!(prog.body[0], Statement::For(_)));
}

#[test]
fn test_switch_and_try() {
    let prog = parse(
        "switch (x) { case 1: break; default: y(); }\ntry { a(); } catch (e: unknown) { b(); } finally { c(); }",
    );
    assert!(matches!(prog.body[0], Statement::Switch(_)));
    assert!(matches!(prog.body[1], Statement::Try(_)));
}

#[test]
fn test_destructuring() {
    let prog = parse("const { a, b: [c, ...d], e = 1 } = obj;\n[x, y] = [y, x];\n({ p, q = 2 } = other);");
    assert_eq!(prog.body.len(), 3);
}

#[test]
fn test_template_literal() {
    let prog = parse("`a${b}c${d}e`;");
    match first_expression(&prog) {
        Expression::Template(t) => {
            assert_eq!(t.quasis.len(), 3);
            assert_eq!(t.expressions.len(), 2);
        }
        other => panic!("expected template, got {:?}", other),
    }
}

#[test]
fn test_tagged_template() {
    let prog = parse("html`<p>${x}</p>`;");
    assert!(matches!(
        first_expression(&prog),
        Expression::TaggedTemplate(_)
    ));
}

#[test]
fn test_optional_chaining_and_nullish() {
    let prog = parse("a?.b?.[c]?.(d) ?? e;");
    assert!(matches!(
        first_expression(&prog),
        Expression::Logical(l) if l.operator == LogicalOp::NullishCoalescing
    ));
}

#[test]
fn test_as_and_satisfies_bind_looser_than_call() {
    let prog = parse("const v = f(x) as string;\nconst c = [1, 2] as const;\nconst s = { a: 1 } satisfies object;");
    assert!(matches!(first_expression(&prog), Expression::TypeAssertion(_)));
    assert_eq!(prog.body.len(), 3);
}

#[test]
fn test_call_type_arguments() {
    let prog = parse("const s = new Set<string>();\nconst r = identity<number>(1);\nconst cmp = a < b && c > d;");
    assert!(matches!(
        first_expression(&prog),
        Expression::New(n) if n.type_arguments.is_some()
    ));
    let Statement::VariableDeclaration(cmp) = &prog.body[2] else {
        panic!("expected declaration");
    };
    assert!(matches!(
        cmp.declarations[0].init.as_deref(),
        Some(Expression::Logical(_))
    ));
}

#[test]
fn test_non_null_assertion() {
    let prog = parse("value!.length;");
    assert!(matches!(first_expression(&prog), Expression::Member(_)));
}

#[test]
fn test_regexp_literal() {
    let prog = parse("const re = /ab+c/gi;");
    match first_expression(&prog) {
        Expression::Literal(Literal {
            value: LiteralValue::RegExp { pattern, flags },
            ..
        }) => {
            assert_eq!(pattern, "ab+c");
            assert_eq!(flags, "gi");
        }
        other => panic!("expected regexp, got {:?}", other),
    }
}

#[test]
fn test_bigint_literal() {
    let prog = parse("const n = 123n;");
    assert!(matches!(
        first_expression(&prog),
        Expression::Literal(Literal {
            value: LiteralValue::BigInt(_),
            ..
        })
    ));
}

#[test]
fn test_import_export() {
    let prog = parse(
        "import fs, { readFile as rf } from 'fs';\nimport * as path from 'path';\nimport type { T } from './t';\nexport { rf as read };\nexport default function main() {}\nexport * from './all';",
    );
    assert_eq!(prog.source_type, SourceType::Module);
    assert_eq!(prog.body.len(), 6);
}

#[test]
fn test_labeled_statement() {
    let prog = parse("outer: for (;;) { break outer; }");
    assert!(matches!(prog.body[0], Statement::Labeled(_)));
}

#[test]
fn test_contextual_keywords_as_identifiers() {
    let prog = parse("const type = 1;\nlet async = 2;\nasync(3);\nconst module = { declare: true };");
    assert_eq!(prog.body.len(), 4);
}

#[test]
fn test_decorators() {
    let prog = parse("@Component({ selector: 'x' })\nclass A { @Input() name: string; }");
    let Statement::ClassDeclaration(class) = &prog.body[0] else {
        panic!("expected class");
    };
    assert_eq!(class.decorators.len(), 1);
}

#[test]
fn test_asi_return() {
    let prog = parse("function f() {\n  return\n  42;\n}");
    let Statement::FunctionDeclaration(func) = &prog.body[0] else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    assert!(matches!(
        &body.body[0],
        Statement::Return(ReturnStatement { argument: None, .. })
    ));
}

#[test]
fn test_syntax_error_location() {
    let err = parse_err("function (");
    assert!(err.to_string().starts_with("SyntaxError:"));
}

#[test]
fn test_deep_nesting_is_a_syntax_error() {
    let source = format!("x = {}1{};", "(".repeat(200), ")".repeat(200));
    let err = parse_err(&source);
    assert!(err.to_string().contains("Nesting is too deep"));

    let types = format!("type T = {}string{};", "(".repeat(200), ")".repeat(200));
    assert!(parse_err(&types).to_string().starts_with("SyntaxError:"));

    // Shallow nesting still parses.
    let shallow = format!("x = {}1{};", "(".repeat(8), ")".repeat(8));
    assert_eq!(parse(&shallow).body.len(), 1);
}
