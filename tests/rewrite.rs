//! End-to-end tests for the rewrite
//!
//! These run whole sources through `rewrite` and compare the output text.

use tsannotate::{AnnotateOptions, NewLine, preprocess, rewrite, rewrite_with_options};

#[allow(clippy::unwrap_used)]
fn run(source: &str) -> String {
    rewrite(source).unwrap()
}

#[test]
fn test_function_declaration() {
    assert_eq!(
        run("function sum(a: number, b: number) {\n  return a + b;\n}\n"),
        "function sum(a: number, b: number): number {\n  return a + b;\n}\n"
    );
}

#[test]
fn test_explicit_annotation_is_kept_once() {
    let source = "function log(msg: string): void {\n  console.log(msg);\n}\n";
    let out = run(source);
    assert_eq!(out, source);
    assert_eq!(out.matches(": void").count(), 1);
}

#[test]
fn test_wrong_annotation_is_not_reinferred() {
    let source = "function f(): string { return 1 as any; }";
    assert_eq!(run(source), source);
}

#[test]
fn test_arrow_in_binding() {
    assert_eq!(
        run("const multiply = (a: number, b: number) => a * b;"),
        "const multiply = (a: number, b: number): number => a * b;"
    );
}

#[test]
fn test_bare_arrow_parameter_is_parenthesized() {
    assert_eq!(
        run("const double = (xs: number[]) => xs.map(x => x * 2);"),
        "const double = (xs: number[]): number[] => xs.map((x): number => x * 2);"
    );
}

#[test]
fn test_async_function() {
    assert_eq!(
        run("async function get(url: string) {\n  const res = await fetch(url);\n  return res;\n}"),
        "async function get(url: string): Promise<Response> {\n  const res = await fetch(url);\n  return res;\n}"
    );
}

#[test]
fn test_multi_branch_union() {
    assert_eq!(
        run("function pick(flag: boolean) {\n  if (flag) {\n    return 1;\n  }\n  return \"string\";\n}"),
        "function pick(flag: boolean): 1 | \"string\" {\n  if (flag) {\n    return 1;\n  }\n  return \"string\";\n}"
    );
}

#[test]
fn test_no_value_is_void() {
    let out = run("function noop() {}");
    assert_eq!(out, "function noop(): void {}");
    assert_eq!(out.matches("void").count(), 1);
}

#[test]
fn test_methods_and_function_expressions() {
    let source = "class Greeter {\n  greet(name: string) { return `hi ${name}`; }\n  get size() { return 1; }\n}\n\
                  const api = { ping() { return true; }, run: function (n: number) { return n; } };\n";
    let expected = "class Greeter {\n  greet(name: string): string { return `hi ${name}`; }\n  get size() { return 1; }\n}\n\
                    const api = { ping(): boolean { return true; }, run: function (n: number): number { return n; } };\n";
    assert_eq!(run(source), expected);
}

#[test]
fn test_generics_and_type_parameters_stay_in_place() {
    assert_eq!(
        run("function wrap<T>(value: T) { return [value]; }"),
        "function wrap<T>(value: T): T[] { return [value]; }"
    );
    assert_eq!(
        run("function id<T extends object>(x: T) { return x; }"),
        "function id<T extends object>(x: T): T { return x; }"
    );
}

#[test]
fn test_comments_and_formatting_are_preserved() {
    let source = "// leading\n/** doc */\nfunction f(/* inline */ a: number) /* after */ {\n\treturn a; // trailing\n}\n\n\nlet  x =  'single';\n";
    let expected = "// leading\n/** doc */\nfunction f(/* inline */ a: number): number /* after */ {\n\treturn a; // trailing\n}\n\n\nlet  x =  'single';\n";
    assert_eq!(run(source), expected);
}

#[test]
fn test_source_without_functions_is_unchanged() {
    let source = "import { a } from \"./a\";\nexport const b = a + 1;\ntype T = { x: number };\n";
    assert_eq!(run(source), source);
}

#[test]
fn test_idempotent() {
    let sources = [
        "function sum(a: number, b: number) { return a + b; }",
        "const f = x => [x];",
        "class C { m() { return this; } }",
        "async function* g() { yield 1; }",
        "export default function () { return () => 1; }",
    ];
    for source in sources {
        let once = run(source);
        assert_eq!(run(&once), once, "second pass changed {source:?}");
    }
}

#[test]
fn test_anonymous_default_export_is_descended_into() {
    assert_eq!(
        run("export default function () { return () => 1; }"),
        "export default function () { return (): number => 1; }"
    );
}

#[test]
fn test_nested_functions_are_annotated() {
    assert_eq!(
        run("function outer() {\n  function inner() { return 1; }\n  return inner;\n}"),
        "function outer(): () => number {\n  function inner(): number { return 1; }\n  return inner;\n}"
    );
}

#[test]
fn test_line_endings() {
    let source = "function f() {\r\n  return 1;\r\n}\r\n";
    assert_eq!(run(source), "function f(): number {\n  return 1;\n}\n");

    let options = AnnotateOptions {
        new_line: NewLine::Crlf,
        ..AnnotateOptions::default()
    };
    let out = rewrite_with_options("function f() {\n  return 1;\n}\n", &options).ok();
    assert_eq!(out.as_deref(), Some("function f(): number {\r\n  return 1;\r\n}\r\n"));
}

#[test]
fn test_strict_option() {
    let options = AnnotateOptions {
        strict_null_checks: true,
        ..AnnotateOptions::default()
    };
    let out = rewrite_with_options("function f() { return null; }", &options).ok();
    assert_eq!(out.as_deref(), Some("function f(): null { return null; }"));
    assert_eq!(run("function f() { return null; }"), "function f(): any { return null; }");
}

#[test]
fn test_unicode_source() {
    assert_eq!(
        run("const grüß = (名前: string) => \"👋 \" + 名前;"),
        "const grüß = (名前: string): string => \"👋 \" + 名前;"
    );
}

#[test]
fn test_syntax_error_is_reported() {
    let err = rewrite("function (").err().map(|e| e.to_string());
    assert!(err.is_some_and(|msg| msg.starts_with("SyntaxError:")));
}

#[test]
fn test_preprocess_hook() {
    let options = AnnotateOptions::default();
    assert_eq!(preprocess("const f = () => 1;", &options), "const f = (): number => 1;");
    let broken = "const = ;";
    assert_eq!(preprocess(broken, &options), broken);
}

#[test]
fn test_preprocess_leaves_deeply_nested_source_alone() {
    let source = format!("const f = () => {}1{};", "(".repeat(500), ")".repeat(500));
    assert!(rewrite(&source).is_err());
    assert_eq!(preprocess(&source, &AnnotateOptions::default()), source);
}
