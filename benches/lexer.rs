//! Lexer benchmarks
//!
//! Run with: cargo bench --bench lexer

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tsannotate::lexer::{Lexer, TokenKind};
use tsannotate::string_dict::StringDict;

/// Declarations and type syntax
const TYPES: &str = r#"
interface User { id: number; name: string; tags?: readonly string[]; }
type Handler<T> = (event: T, ctx: { retries: number }) => Promise<void> | void;
type Keys = keyof User;
declare function fetch(input: string, init?: RequestInit): Promise<Response>;
"#;

/// Unannotated functions, the input the annotator is run on
const FUNCTIONS: &str = r#"
function sum(a: number, b: number) { return a + b; }
const multiply = (a: number, b: number) => a * b;
async function load(url: string) {
    const res = await fetch(url);
    return res.json();
}
class Counter {
    #count = 0;
    next() { return ++this.#count; }
}
"#;

/// Strings, templates and comments
const TEXT: &str = r#"
// line comment
/* block
   comment */
const greeting = `Hello, ${user.name}! You have ${count} new messages.`;
const escaped = "tab\there\nnewline \u{1F600}";
"#;

fn generate_large_source(size: usize) -> String {
    let patterns = [TYPES, FUNCTIONS, TEXT];
    let mut source = String::with_capacity(size);
    for pattern in patterns.iter().cycle() {
        if source.len() >= size {
            break;
        }
        source.push_str(pattern);
    }
    source
}

fn lex_all(source: &str, dict: &mut StringDict) {
    let mut lexer = Lexer::new(black_box(source), dict);
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        black_box(&token);
    }
}

fn bench_lexer_individual(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer/individual");
    for (name, source) in [("types", TYPES), ("functions", FUNCTIONS), ("text", TEXT)] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("bytes", name), source, |b, s| {
            let mut dict = StringDict::new();
            b.iter(|| lex_all(s, &mut dict));
        });
    }
    group.finish();
}

fn bench_lexer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer/throughput");
    for size in [10_000, 100_000] {
        let source = generate_large_source(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("large_source", format!("{}KB", source.len() / 1024)),
            &source,
            |b, s| {
                let mut dict = StringDict::new();
                b.iter(|| lex_all(s, &mut dict));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_lexer_individual, bench_lexer_throughput);
criterion_main!(benches);
