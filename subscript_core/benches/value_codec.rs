//! Value Codec Benchmarks
//!
//! Measures range-checked construction and little-endian encoding of wire
//! values, including compound identifier resolution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use subscript_core::{TypeId, Value, ValueKind};

// =============================================================================
// Construction
// =============================================================================

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");

    group.bench_function("word", |b| {
        b.iter(|| black_box(Value::new(ValueKind::Word, black_box(0x1234))))
    });

    // First candidate fits
    group.bench_function("flag_or_variable_hit", |b| {
        b.iter(|| black_box(TypeId::FlagOrVariable.construct(black_box(0x4000))))
    });

    // Falls through to the second candidate
    group.bench_function("flag_or_variable_fallback", |b| {
        b.iter(|| black_box(TypeId::FlagOrVariable.construct(black_box(0x200))))
    });

    group.finish();
}

// =============================================================================
// Encoding
// =============================================================================

fn bench_encode(c: &mut Criterion) {
    let pointer = Value::new(ValueKind::Pointer, 0x0874_0000).unwrap();
    let mut out = Vec::with_capacity(1024);

    c.bench_function("encode_pointer", |b| {
        b.iter(|| {
            out.clear();
            black_box(&pointer).encode_into(&mut out);
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_construct, bench_encode);
criterion_main!(benches);
