use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use retinai::archive::ImageArchive;
use retinai::history::{HistoryStore, RiskLevel, ScanRecord};
use retinai::store::{MemoryStore, SqliteStore};
use std::fs;
use tempfile::TempDir;

/// Fixture generator for histories of a given size
mod fixtures {
    use super::*;

    pub fn record(i: usize) -> ScanRecord {
        let mut record = ScanRecord::new(
            format!("/docs/images/{i}-abcdef.jpg"),
            RiskLevel::High,
            "Cataract",
            0.4,
        );
        record.created_at += chrono::Duration::seconds(i as i64);
        record
    }

    pub fn memory_history(size: usize) -> HistoryStore<MemoryStore> {
        let mut history = HistoryStore::with_default_key(MemoryStore::new());
        for i in 0..size {
            history.add(record(i)).unwrap();
        }
        history
    }
}

/// Benchmark: list (parse + sort) as the stored history grows
fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_list");

    for size in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("records", size), &size, |b, &size| {
            let history = fixtures::memory_history(size);

            b.iter(|| {
                black_box(history.list());
            });
        });
    }

    group.finish();
}

/// Benchmark: add rewrites the whole list, so cost grows with history size
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_add");

    for size in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("records", size), &size, |b, &size| {
            b.iter_batched(
                || fixtures::memory_history(size),
                |mut history| {
                    history.add(fixtures::record(size + 1)).unwrap();
                    black_box(history);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark: add against the sqlite backend
fn bench_sqlite_add(c: &mut Criterion) {
    c.bench_function("history_add_sqlite", |b| {
        let temp_dir = TempDir::new().unwrap();
        let kv = SqliteStore::open(&temp_dir.path().join("bench.db")).unwrap();
        let mut history = HistoryStore::with_default_key(kv);
        let mut i = 0;

        b.iter(|| {
            i += 1;
            history.add(fixtures::record(i)).unwrap();
        });
    });
}

/// Benchmark: copying a capture into the archive
fn bench_persist(c: &mut Criterion) {
    c.bench_function("archive_persist_1mb", |b| {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("capture.jpg");
        fs::write(&source, vec![0u8; 1_024 * 1_024]).unwrap();
        let archive = ImageArchive::new(temp_dir.path().join("images"));

        b.iter(|| {
            let persisted = archive.persist(black_box(&source));
            assert!(persisted.is_durable());
        });
    });
}

criterion_group!(benches, bench_list, bench_add, bench_sqlite_add, bench_persist);

criterion_main!(benches);
