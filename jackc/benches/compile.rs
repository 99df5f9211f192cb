use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jackc::prelude::*;

const SQUARE: &str = include_str!("../tests/programs/Square.jack");

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("lex square", |b| {
        b.iter(|| black_box(Lexer::tokenize(black_box(SQUARE))))
    });

    {
        let mut out = Vec::with_capacity(16 * 1024);

        c.bench_function("compile square", |b| {
            b.iter(|| {
                out.clear();
                let engine = CompilationEngine::new(black_box(SQUARE), &mut out).unwrap();
                black_box(engine.compile_class()).unwrap();
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
