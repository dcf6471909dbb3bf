//! Parser benchmarks
//!
//! Run with: cargo bench --bench parser

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tsannotate::parser::Parser;
use tsannotate::string_dict::StringDict;

const FUNCTIONS: &str = r#"
function sum(a: number, b: number) { return a + b; }
const multiply = (a: number, b: number) => a * b;
const double = (xs: number[]) => xs.map(x => x * 2);
async function load(url: string) {
    const res = await fetch(url);
    if (!res.ok) { throw new Error(`status ${res.status}`); }
    return res.json();
}
function* ids() { let i = 0; while (true) { yield i++; } }
"#;

const CLASSES: &str = r#"
abstract class Shape<T extends object = {}> implements Named {
    private static count = 0;
    constructor(public readonly name: string, protected meta?: T) { Shape.count++; }
    abstract area(): number;
    describe() { return `${this.name}: ${this.area().toFixed(2)}`; }
    get label() { return this.name.toUpperCase(); }
}
"#;

const TYPES: &str = r#"
type Result<T, E = Error> = { ok: true; value: T } | { ok: false; error: E };
type Mutable<T> = { -readonly [K in keyof T]: T[K] };
type Unwrap<T> = T extends Promise<infer U> ? Unwrap<U> : T;
interface Api { get<T>(path: string): Promise<T>; (input: string): void; new (): Api; }
"#;

/// The embedded declaration library, the largest input parsed on every run.
const LIB: &str = tsannotate::checker::LIB_SOURCE;

fn generate_large_source(size: usize) -> String {
    let patterns = [FUNCTIONS, CLASSES, TYPES];
    let mut source = String::with_capacity(size);
    for pattern in patterns.iter().cycle() {
        if source.len() >= size {
            break;
        }
        source.push_str(pattern);
    }
    source
}

fn parse(source: &str) {
    let mut dict = StringDict::new();
    let program = Parser::new(black_box(source), &mut dict).parse_program();
    let _ = black_box(program);
}

fn bench_parser_individual(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/individual");
    let cases = [
        ("functions", FUNCTIONS),
        ("classes", CLASSES),
        ("types", TYPES),
        ("lib", LIB),
    ];
    for (name, source) in cases {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("bytes", name), source, |b, s| {
            b.iter(|| parse(s));
        });
    }
    group.finish();
}

fn bench_parser_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/throughput");
    for size in [10_000, 100_000] {
        let source = generate_large_source(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("large_source", format!("{}KB", source.len() / 1024)),
            &source,
            |b, s| b.iter(|| parse(s)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_parser_individual, bench_parser_throughput);
criterion_main!(benches);
