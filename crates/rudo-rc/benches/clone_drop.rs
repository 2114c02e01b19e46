//! Benchmark: handle traffic on the hot paths.
//!
//! Measures clone/drop of owners, lock of observers and the cost of the two
//! block layouts at construction time.

use criterion::{criterion_group, criterion_main, Criterion};
use rudo_rc::{Managed, SelfRef, Shared, SharedFromThis};
use std::hint::black_box;

#[derive(Managed)]
struct Node {
    value: i64,
    this: SelfRef<Self>,
}

fn bench_clone_drop(c: &mut Criterion) {
    let shared = Shared::new(42_u64);
    c.bench_function("shared_clone_drop", |b| {
        b.iter(|| {
            let copy = Shared::clone(black_box(&shared));
            black_box(&copy);
        });
    });
}

fn bench_weak_lock(c: &mut Criterion) {
    let shared = Shared::new(42_u64);
    let weak = Shared::downgrade(&shared);
    c.bench_function("weak_lock", |b| {
        b.iter(|| {
            let locked = black_box(&weak).lock();
            black_box(&locked);
        });
    });
}

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");
    group.bench_function("combined", |b| {
        b.iter(|| Shared::new(black_box([0_u64; 8])));
    });
    group.bench_function("adopting", |b| {
        b.iter(|| Shared::from_box(Box::new(black_box([0_u64; 8]))));
    });
    group.finish();
}

fn bench_shared_from_this(c: &mut Criterion) {
    let node = Shared::new(Node {
        value: 7,
        this: SelfRef::new(),
    });
    c.bench_function("shared_from_this", |b| {
        b.iter(|| {
            let again = black_box(&node).shared_from_this();
            black_box(again.map(|n| n.value).unwrap_or_default());
        });
    });
}

criterion_group!(
    benches,
    bench_clone_drop,
    bench_weak_lock,
    bench_construct,
    bench_shared_from_this
);
criterion_main!(benches);
