//! Storage backend benchmarks for the operations record shifting uses.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use roledb_bench::random_data;
use roledb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use tempfile::TempDir;

/// Benchmark positioned reads and writes of one shift-buffer chunk.
fn bench_chunk_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_copy");

    for size in [256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("inmemory", size), size, |b, &size| {
            let mut backend = InMemoryBackend::with_data(random_data(size * 2));
            let mut buf = vec![0u8; size];

            b.iter(|| {
                backend.read_into(black_box(0), &mut buf).unwrap();
                backend.write_at(black_box(size as u64), &buf).unwrap();
            });
        });

        group.bench_with_input(BenchmarkId::new("file", size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let mut backend = FileBackend::open(&temp_dir.path().join("bench.dat")).unwrap();
            backend.append(&random_data(size * 2)).unwrap();
            let mut buf = vec![0u8; size];

            b.iter(|| {
                backend.read_into(black_box(0), &mut buf).unwrap();
                backend.write_at(black_box(size as u64), &buf).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark growing and shrinking the file.
fn bench_extend_truncate(c: &mut Criterion) {
    let mut group = c.benchmark_group("extend_truncate");
    group.sample_size(50);

    group.bench_function("file_64b", |b| {
        let temp_dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(&temp_dir.path().join("bench.dat")).unwrap();
        backend.append(&random_data(4096)).unwrap();

        b.iter(|| {
            backend.extend(black_box(64)).unwrap();
            backend.truncate(black_box(4096)).unwrap();
        });
    });

    group.bench_function("inmemory_64b", |b| {
        let mut backend = InMemoryBackend::with_data(random_data(4096));

        b.iter(|| {
            backend.extend(black_box(64)).unwrap();
            backend.truncate(black_box(4096)).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_chunk_copy, bench_extend_truncate);
criterion_main!(benches);
