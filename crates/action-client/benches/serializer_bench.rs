//! 序列化与字符串化性能基准测试
//!
//! 覆盖构造、序列化、multipart 前的字符串化三个阶段，以及树深度的扩展性。

use action_client::{Operation, args, data, decimal, logic, num, serialize, stringify};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// 典型的会员折扣规则
fn create_typical_rule() -> Operation {
    logic::if_then_else(
        logic::and(args![
            true,
            num::gte(data::input("age"), 18),
            data::bool(data::input("vip")),
        ]),
        decimal::mul(decimal::add(args![data::input("price"), 9.99]), 0.85),
        decimal::round(data::input("price"), 2),
    )
}

/// 深度为 n 的嵌套加法
fn create_nested_rule(depth: usize) -> Operation {
    (0..depth).fold(decimal::add([1.5]), |acc, i| decimal::add(args![acc, i as i64]))
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_typical_rule", |b| b.iter(|| black_box(create_typical_rule())));
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    let typical = create_typical_rule();
    group.bench_function("typical", |b| b.iter(|| serialize(black_box(&typical))));

    for depth in [4, 16, 64] {
        let rule = create_nested_rule(depth);
        group.bench_with_input(BenchmarkId::new("nested_depth", depth), &rule, |b, rule| {
            b.iter(|| serialize(black_box(rule)))
        });
    }

    group.finish();
}

fn bench_stringify(c: &mut Criterion) {
    let mut group = c.benchmark_group("stringify");

    let typical = create_typical_rule().to_rule().map(|r| r.into_value());
    if let Ok(value) = typical {
        group.bench_function("typical", |b| b.iter(|| stringify(black_box(&value))));
    }

    for depth in [4, 16, 64] {
        if let Ok(rule) = create_nested_rule(depth).to_rule() {
            let value = rule.into_value();
            group.bench_with_input(BenchmarkId::new("nested_depth", depth), &value, |b, value| {
                b.iter(|| stringify(black_box(value)))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_serialize, bench_stringify);
criterion_main!(benches);
