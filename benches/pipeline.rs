//! Generator pipeline benchmarks
//!
//! Measures each stage separately:
//! 1. Grammar notation parsing
//! 2. Spec compilation and type synthesis
//! 3. Rendering Rust source
//! 4. Parsing input with the compiled spec, with and without building the AST
//!
//! Run with: cargo bench --bench pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gllgen::{
    compile_parser_spec, parse_grammar_text, render_rust, synthesize_types, Generator,
    GeneratorConfig,
};

// ============================================================================
// Test Data
// ============================================================================

const GRAMMAR: &str = r#"
    File = items:Item*;
    Item = | Fn: FnDecl | Use: UseDecl | Const: ConstDecl;
    UseDecl = "use" path:Path ";";
    ConstDecl = "const" name:IDENT ":" ty:Path "=" value:LITERAL ";";
    FnDecl = vis:"pub"? "fn" name:IDENT "(" params:Param* %% "," ")" ret:{ "->" Path }? body:TOKEN_TREE;
    Param = name:IDENT ":" ty:Path;
    Path = segments:IDENT+ % "::";
"#;

fn source(items: usize) -> String {
    let mut out = String::new();
    for i in 0..items {
        out.push_str(&format!(
            "use std::collections::map{i};\n\
             const LIMIT{i}: u32 = {i};\n\
             pub fn item{i}(a: u8, b: std::string::String,) -> Option {{ let x = [a, {i}]; }}\n"
        ));
    }
    out
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_front_end(c: &mut Criterion) {
    let mut g = c.benchmark_group("front_end");
    g.bench_function("parse_grammar_text", |b| {
        b.iter(|| parse_grammar_text(black_box(GRAMMAR)))
    });

    let grammar = parse_grammar_text(GRAMMAR).expect("Should parse grammar");
    g.bench_function("compile_parser_spec", |b| {
        b.iter(|| compile_parser_spec(black_box(&grammar)))
    });
    g.bench_function("synthesize_types", |b| {
        b.iter(|| synthesize_types(black_box(&grammar)))
    });

    let synthesis = synthesize_types(&grammar).expect("Should synthesize");
    let config = GeneratorConfig::default();
    g.bench_function("render_rust", |b| {
        b.iter(|| render_rust(black_box(&synthesis), &config))
    });
    g.finish();
}

fn bench_parse(c: &mut Criterion) {
    let generated = Generator::default()
        .generate(GRAMMAR)
        .expect("Should generate");

    let mut g = c.benchmark_group("parse");
    for items in [1, 10, 100] {
        let input = source(items);
        g.throughput(Throughput::Bytes(input.len() as u64));
        g.bench_with_input(BenchmarkId::new("value", items), &input, |b, input| {
            b.iter(|| generated.parse("File", black_box(input)))
        });
        g.bench_with_input(BenchmarkId::new("ast", items), &input, |b, input| {
            b.iter(|| generated.parse_ast("File", black_box(input)))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_front_end, bench_parse);
criterion_main!(benches);
