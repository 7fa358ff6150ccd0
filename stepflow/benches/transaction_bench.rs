//! Benchmarks for transaction execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use stepflow::adapters::Merge;
use stepflow::core::StepOptions;
use stepflow::prelude::*;

fn merge_benchmark(c: &mut Criterion) {
    let options = StepOptions::new("user");
    c.bench_function("merge_new_keys", |b| {
        b.iter(|| Merge::new_keys(black_box(&options), json!({"id": 7, "name": "Jane"})))
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let txn = Transaction::builder("Bench")
        .merge("user", operation(|_| Ok(StepResult::success(json!({"id": 7})))))
        .expect("merge step")
        .tap("noop", operation(|_| Ok(StepResult::success(json!(null)))))
        .expect("tap step")
        .build();

    c.bench_function("transaction_merge_tap", |b| {
        b.iter(|| runtime.block_on(txn.call(black_box(json!({"email": "jane@doe.com"})))))
    });
}

criterion_group!(benches, merge_benchmark);
criterion_main!(benches);
