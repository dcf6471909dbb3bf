//! End-to-end annotation benchmarks
//!
//! Run with: cargo bench --bench rewrite

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tsannotate::{AnnotateOptions, rewrite_with_options};

const SMALL: &str = r#"
function sum(a: number, b: number) { return a + b; }
const multiply = (a: number, b: number) => a * b;
"#;

const MIXED: &str = r#"
interface Item { id: number; price: number; tags: string[]; }
function total(items: Item[]) {
    return items.reduce((acc, item) => acc + item.price, 0);
}
function byTag(items: Item[], tag: string) {
    return items.filter(item => item.tags.includes(tag)).map(item => item.id);
}
class Cart {
    private items: Item[] = [];
    add(item: Item) { this.items.push(item); return this; }
    isEmpty() { return this.items.length === 0; }
    summary() { return { count: this.items.length, total: total(this.items) }; }
}
async function checkout(cart: Cart) {
    const res = await fetch("/checkout", { method: "POST" });
    if (!res.ok) { return null; }
    return res;
}
"#;

fn generate_large_source(functions: usize) -> String {
    (0..functions)
        .map(|i| format!("function f{i}(x: number) {{ if (x > {i}) {{ return x; }} return \"{i}\"; }}\n"))
        .collect()
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    let options = AnnotateOptions::default();
    let large = generate_large_source(200);
    let cases = [("small", SMALL), ("mixed", MIXED), ("200_functions", large.as_str())];
    for (name, source) in cases {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("source", name), source, |b, s| {
            b.iter(|| rewrite_with_options(black_box(s), &options));
        });
    }
    group.finish();
}

fn bench_rewrite_without_lib(c: &mut Criterion) {
    let options = AnnotateOptions {
        include_lib: false,
        ..AnnotateOptions::default()
    };
    c.bench_function("rewrite/without_lib", |b| {
        b.iter(|| rewrite_with_options(black_box(SMALL), &options));
    });
}

criterion_group!(benches, bench_rewrite, bench_rewrite_without_lib);
criterion_main!(benches);
