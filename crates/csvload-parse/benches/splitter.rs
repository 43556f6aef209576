//! Benchmarks for logical-line field splitting.

#![allow(clippy::unwrap_used, missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use csvload_parse::{split_line, QuoteMode, SplitOptions};
use std::hint::black_box;

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_line");

    let plain = "alpha,beta,gamma,delta,epsilon,zeta,eta,theta";
    let quoted = "\"alpha\",\"beta, with comma\",\"gam\"\"ma\",delta,\"multi word field\"";
    let strict = SplitOptions::default();
    let lenient = SplitOptions {
        mode: QuoteMode::Lenient,
        ..SplitOptions::default()
    };
    let multi = SplitOptions {
        delimiter: "^!".to_string(),
        ..SplitOptions::default()
    };
    let multi_line = "alpha^!beta^!gamma^!delta^!epsilon";

    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("plain_strict", |b| {
        b.iter(|| split_line(black_box(plain), &strict))
    });
    group.throughput(Throughput::Bytes(quoted.len() as u64));
    group.bench_function("quoted_strict", |b| {
        b.iter(|| split_line(black_box(quoted), &strict))
    });
    group.bench_function("quoted_lenient", |b| {
        b.iter(|| split_line(black_box(quoted), &lenient))
    });
    group.throughput(Throughput::Bytes(multi_line.len() as u64));
    group.bench_function("multi_char_delimiter", |b| {
        b.iter(|| split_line(black_box(multi_line), &multi))
    });

    group.finish();
}

criterion_group!(benches, bench_split);
criterion_main!(benches);
