use criterion::{criterion_group, criterion_main, Criterion};

use gf2rand::*;

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut mt = MersenneTwister::new(5489);
    c.bench_function("MersenneTwister::generate", move |b| {
        b.iter(|| mt.generate())
    });
    let mut tiny = TinyMt32::new_reference();
    c.bench_function("TinyMt32::generate", move |b| b.iter(|| tiny.generate()));
    let tiny = TinyMt32::new_reference();
    c.bench_function("equidistribution(TinyMt32)", move |b| {
        b.iter(|| equidistribution(&tiny).unwrap())
    });
    let mut little = RLittle32::new_reference();
    little.seed(1);
    c.bench_function("minpoly(RLittle32)", move |b| {
        b.iter(|| minpoly(&mut little.clone(), 0))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
