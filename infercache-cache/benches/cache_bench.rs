//! Criterion benchmarks for the TTL cache: put, hit, miss, expired lookup.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use infercache_cache::{ManualClock, TtlCache};
use infercache_core::CacheKey;

fn keys(n: usize) -> Vec<CacheKey> {
    (0..n).map(|i| CacheKey::from_raw(format!("{:064x}", i))).collect()
}

fn bench_put(c: &mut Criterion) {
    let cache = TtlCache::new(Duration::from_secs(500));
    let keys = keys(1024);
    let mut g = c.benchmark_group("put");
    g.throughput(Throughput::Elements(1));
    g.bench_function("put_overwrite", |b| {
        let mut i = 0;
        b.iter(|| {
            cache.put(keys[i % keys.len()].clone(), String::from("Processed text: hello"));
            i += 1;
        });
    });
    g.finish();
}

fn bench_get(c: &mut Criterion) {
    let cache = TtlCache::new(Duration::from_secs(500));
    let keys = keys(1024);
    for k in &keys {
        cache.put(k.clone(), String::from("Processed text: hello"));
    }
    let missing = CacheKey::from_raw("missing");

    let mut g = c.benchmark_group("get");
    g.throughput(Throughput::Elements(1));
    g.bench_function("hit", |b| {
        let mut i = 0;
        b.iter(|| {
            black_box(cache.get(&keys[i % keys.len()]));
            i += 1;
        });
    });
    g.bench_function("miss", |b| {
        b.iter(|| black_box(cache.get(&missing)));
    });
    g.finish();
}

fn bench_expired_lookup(c: &mut Criterion) {
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::with_clock(Duration::from_secs(1), clock.clone());
    let key = CacheKey::from_raw("expiring");

    let mut g = c.benchmark_group("expired");
    g.throughput(Throughput::Elements(1));
    g.bench_function("put_then_expired_get", |b| {
        b.iter(|| {
            cache.put(key.clone(), 1u64);
            clock.advance(Duration::from_secs(1));
            black_box(cache.get(&key))
        });
    });
    g.finish();
}

criterion_group!(benches, bench_put, bench_get, bench_expired_lookup);
criterion_main!(benches);
