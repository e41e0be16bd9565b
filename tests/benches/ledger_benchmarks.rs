//! # Asset-Ledger Benchmarks
//!
//! | Path | Expectation |
//! |------|-------------|
//! | Create (gate + batch + history append) | constant per record |
//! | Read by key | O(log n) |
//! | Query range | linear in the window, not the store |
//! | Query by owner | linear in the owner's records |
//! | History read | linear in the key's entries |

use asset_ledger::test_utils::{admin, invocation, sample_asset};
use asset_ledger::{AssetLedgerApi, InMemoryLedger, LedgerConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

const OWNERS: [&str; 4] = ["Alice", "Bob", "Carol", "Dave"];

fn populated(records: usize) -> InMemoryLedger {
    let mut ledger = InMemoryLedger::in_memory(LedgerConfig::default());
    for i in 0..records {
        let id = format!("asset{:08}", i);
        ledger
            .create_asset(
                &invocation(admin(), &id, 1),
                sample_asset(&id, OWNERS[i % OWNERS.len()]),
            )
            .unwrap();
    }
    ledger
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger-create");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("create_asset", |b| {
        let mut ledger = InMemoryLedger::in_memory(LedgerConfig::default());
        let mut next = 0u64;
        b.iter(|| {
            let id = format!("asset{:012}", next);
            next += 1;
            ledger
                .create_asset(&invocation(admin(), &id, 1), sample_asset(&id, "Alice"))
                .unwrap();
        })
    });

    group.finish();
}

fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger-read");

    for size in [1_000usize, 10_000] {
        let ledger = populated(size);
        let key = format!("asset{:08}", size / 2);
        group.bench_with_input(BenchmarkId::new("read_asset", size), &key, |b, key| {
            b.iter(|| black_box(ledger.read_asset(key).unwrap()))
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger-query");
    let ledger = populated(10_000);

    for window in [10usize, 100, 1_000] {
        let start = format!("asset{:08}", 5_000);
        let end = format!("asset{:08}", 5_000 + window);
        group.throughput(Throughput::Elements(window as u64));
        group.bench_with_input(
            BenchmarkId::new("query_range", window),
            &(start, end),
            |b, (start, end)| b.iter(|| black_box(ledger.query_range(start, end).unwrap().count())),
        );
    }

    group.throughput(Throughput::Elements(2_500));
    group.bench_function("query_by_owner", |b| {
        b.iter(|| black_box(ledger.query_by_owner("Carol").unwrap().count()))
    });

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger-history");

    for transfers in [10usize, 100] {
        let mut ledger = populated(1);
        for i in 0..transfers {
            ledger
                .transfer_asset(
                    &invocation(admin(), "transfer", i as u64),
                    "asset00000000",
                    OWNERS[i % OWNERS.len()],
                )
                .unwrap();
        }
        group.throughput(Throughput::Elements(transfers as u64 + 1));
        group.bench_function(BenchmarkId::new("get_history", transfers), |b| {
            b.iter(|| black_box(ledger.get_history("asset00000000").unwrap().count()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create, bench_reads, bench_queries, bench_history);
criterion_main!(benches);
