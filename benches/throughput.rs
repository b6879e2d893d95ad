//! Throughput Benchmark for respkv
//!
//! Measures the store, the command dispatcher and the frame parser in
//! isolation from the network.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use respkv::commands::CommandHandler;
use respkv::protocol::{FrameParser, FramingMode, Reply};
use respkv::storage::Store;
use std::sync::Arc;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = Store::new();

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set(format!("key:{}", i), "small_value");
            i += 1;
        });
    });

    group.bench_function("set_medium", |b| {
        let mut i = 0u64;
        let value = "x".repeat(1024); // 1KB value
        b.iter(|| {
            store.set(format!("key:{}", i), value.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Store::new();

    for i in 0..100_000 {
        store.set(format!("key:{}", i), format!("value:{}", i));
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark the numeric update path
fn bench_incr(c: &mut Criterion) {
    let handler = CommandHandler::new(Arc::new(Store::new()));

    let mut group = c.benchmark_group("incr");
    group.throughput(Throughput::Elements(1));

    group.bench_function("incr_same_key", |b| {
        b.iter(|| black_box(handler.execute("INCR", &["counter"])));
    });

    group.bench_function("incrby_many_keys", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("counter:{}", i % 1024);
            black_box(handler.execute("INCRBY", &[key.as_str(), "7"]));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark frame decoding and reply encoding
fn bench_protocol(c: &mut Criterion) {
    let frame = b"*3\r\n$3\r\nSET\r\n$8\r\nuser:101\r\n$4\r\nAriz\r\n";

    let mut group = c.benchmark_group("protocol");
    group.throughput(Throughput::Bytes(frame.len() as u64));

    for (name, mode) in [("lenient", FramingMode::Lenient), ("strict", FramingMode::Strict)] {
        let parser = FrameParser::new(mode);
        group.bench_function(format!("parse_set_{}", name), |b| {
            b.iter(|| black_box(parser.parse(black_box(frame))));
        });
    }

    let reply = Reply::bulk_string("x".repeat(256));
    group.bench_function("encode_bulk_string", |b| {
        let mut buf = Vec::with_capacity(512);
        b.iter(|| {
            buf.clear();
            reply.serialize_into(&mut buf);
            black_box(buf.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_incr, bench_protocol);
criterion_main!(benches);
