//! Tests for return-type inference
//!
//! Each case annotates a small program and checks the type text inferred for
//! one named function.

use tsannotate::{AnnotateOptions, annotate};

#[allow(clippy::unwrap_used)]
fn inferred_with(source: &str, options: &AnnotateOptions, name: &str) -> String {
    let annotated = annotate(source, options).unwrap();
    annotated
        .annotations
        .into_iter()
        .find(|a| a.name.as_deref() == Some(name))
        .map(|a| a.return_type)
        .unwrap_or_else(|| "<not annotated>".to_string())
}

fn inferred(source: &str, name: &str) -> String {
    inferred_with(source, &AnnotateOptions::default(), name)
}

fn inferred_strict(source: &str, name: &str) -> String {
    let options = AnnotateOptions {
        strict_null_checks: true,
        ..AnnotateOptions::default()
    };
    inferred_with(source, &options, name)
}

#[test]
fn test_single_literal_is_widened() {
    assert_eq!(inferred("function f() { return 1; }", "f"), "number");
    assert_eq!(inferred("function f() { return 'a'; }", "f"), "string");
    assert_eq!(inferred("function f() { return true; }", "f"), "boolean");
    assert_eq!(inferred("function f() { return 10n; }", "f"), "bigint");
}

#[test]
fn test_literal_unions_are_kept() {
    let source = "function f(x: boolean) { if (x) { return 1; } return \"string\"; }";
    assert_eq!(inferred(source, "f"), "1 | \"string\"");
}

#[test]
fn test_declared_literal_types_are_not_widened() {
    assert_eq!(inferred("function f(x: 'a') { return x; }", "f"), "\"a\"");
    let source = "type Kind = 'circle';\nfunction g(k: Kind) { return k; }";
    assert_eq!(inferred(source, "g"), "\"circle\"");
    let source = "function g(n: 1 | 2) { return n; }";
    assert_eq!(inferred(source, "g"), "1 | 2");
}

#[test]
fn test_const_assertions_keep_literals() {
    assert_eq!(inferred("function f() { return 'a' as const; }", "f"), "\"a\"");
    let source = "function g() { return { kind: 'a' as const }; }";
    assert_eq!(inferred(source, "g"), "{ kind: \"a\"; }");
    let source = "function h() { return { kind: 'a' as const, size: 1 }; }";
    assert_eq!(inferred(source, "h"), "{ kind: \"a\"; size: number; }");
}

#[test]
fn test_literals_read_through_bindings() {
    let source = "const k = 'a';\nfunction f() { return k; }";
    assert_eq!(inferred(source, "f"), "string");
    let source = "function f(x: 'a') { let y = x; return y; }";
    assert_eq!(inferred(source, "f"), "\"a\"");
    assert_eq!(inferred("function f() { return -1; }", "f"), "number");
}

#[test]
fn test_no_value_is_void() {
    assert_eq!(inferred("function f() {}", "f"), "void");
    assert_eq!(inferred("function f(x: number) { if (x) return; }", "f"), "void");
    assert_eq!(inferred("function f() { throw new Error(); }", "f"), "void");
}

#[test]
fn test_throwing_arrow_is_never() {
    assert_eq!(inferred("const f = () => { throw new Error(\"x\"); };", "f"), "never");
    assert_eq!(
        inferred("const f = function () { while (true) {} };", "f"),
        "never"
    );
}

#[test]
fn test_arithmetic_and_strings() {
    let source = "function sum(a: number, b: number) { return a + b; }";
    assert_eq!(inferred(source, "sum"), "number");
    let source = "function greet(name: string) { return `hi ${name}`; }";
    assert_eq!(inferred(source, "greet"), "string");
    let source = "function join(a: string, b: number) { return a + b; }";
    assert_eq!(inferred(source, "join"), "string");
}

#[test]
fn test_arrays_and_callbacks() {
    let source = "function f(xs: number[]) { return xs.map(x => x * 2); }";
    assert_eq!(inferred(source, "f"), "number[]");
    assert_eq!(inferred("function f() { return [1, 2]; }", "f"), "number[]");
    let source = "function f() { return [1, \"a\"]; }";
    assert_eq!(inferred(source, "f"), "(string | number)[]");
}

#[test]
fn test_object_literals_widen_properties() {
    let source = "function f() { return { a: 1, b: \"x\", c: [true] }; }";
    assert_eq!(inferred(source, "f"), "{ a: number; b: string; c: boolean[]; }");
}

#[test]
fn test_async_functions_return_promises() {
    assert_eq!(inferred("async function f() { return 1; }", "f"), "Promise<number>");
    assert_eq!(inferred("async function f() {}", "f"), "Promise<void>");
    let source = "async function load(url: string) { const res = await fetch(url); return res; }";
    assert_eq!(inferred(source, "load"), "Promise<Response>");
}

#[test]
fn test_generators() {
    let source = "function* g() { yield 1; yield 2; }";
    assert_eq!(inferred(source, "g"), "Generator<number, void, unknown>");
    let source = "async function* g() { yield \"a\"; return 1; }";
    assert_eq!(inferred(source, "g"), "AsyncGenerator<string, number, unknown>");
}

#[test]
fn test_null_and_undefined_without_strict_checks() {
    assert_eq!(inferred("function f() { return null; }", "f"), "any");
    assert_eq!(inferred("function f() { return undefined; }", "f"), "any");
    let source = "function f(x: boolean) { if (x) return 1; return null; }";
    assert_eq!(inferred(source, "f"), "number");
}

#[test]
fn test_strict_null_checks() {
    assert_eq!(inferred_strict("function f() { return null; }", "f"), "null");
    let source = "function f(x: boolean) { if (x) return 1; }";
    assert_eq!(inferred_strict(source, "f"), "1 | undefined");
    let source = "function f(x: string | null) { return x ?? \"d\"; }";
    assert_eq!(inferred_strict(source, "f"), "string");
    let source = "function f(x: boolean) { if (x) return \"a\"; return null; }";
    assert_eq!(inferred_strict(source, "f"), "\"a\" | null");
}

#[test]
fn test_recursion_resolves() {
    let source = "function fact(n: number) { return n <= 1 ? 1 : n * fact(n - 1); }";
    assert_eq!(inferred(source, "fact"), "number");
}

#[test]
fn test_methods_and_this() {
    let source = "class Counter {\n  count = 0;\n  next() { return this.count + 1; }\n  self() { return this; }\n}";
    assert_eq!(inferred(source, "next"), "number");
    assert_eq!(inferred(source, "self"), "Counter");
}

#[test]
fn test_declared_return_types_flow_into_callers() {
    let source = "function id(x: string): string { return x; }\nfunction call() { return id(\"a\"); }";
    assert_eq!(inferred(source, "call"), "string");
}

#[test]
fn test_generic_calls_are_instantiated() {
    let source = "function first<T>(xs: T[]): T { return xs[0]; }\nfunction f() { return first([1, 2]); }";
    assert_eq!(inferred(source, "f"), "number");
    let source = "function f() { const m: Map<string, number> = new Map(); return m; }";
    assert_eq!(inferred(source, "f"), "Map<string, number>");
}

#[test]
fn test_explicit_type_arguments_pick_the_generic_overload() {
    let source = "function f() { return new Map<string, number>(); }";
    assert_eq!(inferred(source, "f"), "Map<string, number>");
    let source = "function g() { return new Array<string>(); }";
    assert_eq!(inferred(source, "g"), "string[]");
    let source = "function h() { return new Set<number>(); }";
    assert_eq!(inferred(source, "h"), "Set<number>");
    assert_eq!(inferred("function k() { return new Map(); }", "k"), "Map<any, any>");
}

#[test]
fn test_functions_returning_functions() {
    let source = "function adder(a: number) { return (b: number) => a + b; }";
    assert_eq!(inferred(source, "adder"), "(b: number) => number");
}

#[test]
fn test_calls_to_type_predicates_are_boolean() {
    let source = "function check(x: unknown): x is string { return typeof x === \"string\"; }\n\
                  function f(x: unknown) { return check(x); }";
    assert_eq!(inferred(source, "f"), "boolean");
}

#[test]
fn test_without_the_declaration_library() {
    let options = AnnotateOptions {
        include_lib: false,
        ..AnnotateOptions::default()
    };
    assert_eq!(inferred_with("function f() { return 1; }", &options, "f"), "number");
}
