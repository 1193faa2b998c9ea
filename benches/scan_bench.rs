use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use roster::config::{ComparisonPolicy, ScanConfig};
use roster::scanner::Scanner;
use roster::storage::Index;
use roster::utils::hash::hash_file_streaming;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;

fn create_tree(dir: &Path, count: usize) {
    for i in 0..count {
        let sub = dir.join(format!("d{}", i % 16));
        fs::create_dir_all(&sub).unwrap();
        let content = format!("This is test file number {i} with some content to hash");
        fs::write(sub.join(format!("file_{i}.txt")), content).unwrap();
    }
}

fn benchmark_hashing(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let small_file = dir.path().join("small.txt");
    let large_file = dir.path().join("large.txt");

    fs::write(&small_file, vec![b'a'; 1024]).unwrap(); // 1KB
    fs::write(&large_file, vec![b'c'; 1024 * 1024 * 10]).unwrap(); // 10MB

    let mut group = c.benchmark_group("file_hashing");
    group.bench_function("hash_1kb", |b| {
        b.iter(|| hash_file_streaming(black_box(&small_file)));
    });
    group.bench_function("hash_10mb", |b| {
        b.iter(|| hash_file_streaming(black_box(&large_file)));
    });
    group.finish();
}

fn benchmark_scan(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_tree(dir.path(), 2000);

    let mut group = c.benchmark_group("rescan_2000_files");
    for threads in [1, 4, 8] {
        for (name, policy) in [
            ("stat_only", ComparisonPolicy {
                checksum: false,
                ..ComparisonPolicy::all()
            }),
            ("with_checksum", ComparisonPolicy::all()),
        ] {
            let config = ScanConfig {
                verify: policy,
                ..ScanConfig::default()
            };
            let scanner = Scanner::new(&config).unwrap().with_threads(threads);
            let mut index = Index::new();
            scanner.scan(dir.path(), &mut index).unwrap();

            group.bench_with_input(BenchmarkId::new(name, threads), &threads, |b, _| {
                b.iter(|| scanner.scan(black_box(dir.path()), &mut index).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_hashing, benchmark_scan);
criterion_main!(benches);
