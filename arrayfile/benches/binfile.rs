use arrayfile::{Array, ArrayShape, BinFile, ElementType, OpenMode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Square matrix sides; each file holds `SAMPLES` of them
const SIDES: &[usize] = &[16, 64, 256];
const SAMPLES: usize = 32;

fn matrix(side: usize, seed: f64) -> Array {
    let shape = ArrayShape::new(&[side, side]).unwrap();
    let values = (0..side * side).map(|i| seed + i as f64 * 0.5).collect();
    Array::new(shape, values).unwrap()
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("BinFile write");
    let dir = tempfile::tempdir().unwrap();

    for &side in SIDES {
        let arrays: Vec<Array> = (0..SAMPLES).map(|i| matrix(side, i as f64)).collect();
        let path = dir.path().join(format!("write_{side}.bin"));

        group.throughput(Throughput::Bytes((SAMPLES * side * side * 8) as u64));
        group.bench_with_input(BenchmarkId::new("float64", side), &side, |bencher, _| {
            bencher.iter(|| {
                let mut file = BinFile::create(&path).unwrap();
                for array in &arrays {
                    file.write(black_box(array)).unwrap();
                }
                file.close().unwrap();
            })
        });
    }

    group.finish();
}

fn prepare(dir: &tempfile::TempDir, side: usize) -> std::path::PathBuf {
    let path = dir.path().join(format!("read_{side}.bin"));
    let mut file = BinFile::create(&path).unwrap();
    for i in 0..SAMPLES {
        file.write(&matrix(side, i as f64)).unwrap();
    }
    file.close().unwrap();
    path
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("BinFile read");
    let dir = tempfile::tempdir().unwrap();

    for &side in SIDES {
        let path = prepare(&dir, side);
        group.throughput(Throughput::Bytes((SAMPLES * side * side * 8) as u64));

        group.bench_with_input(BenchmarkId::new("sequential", side), &side, |bencher, _| {
            bencher.iter(|| {
                let mut file = BinFile::open(&path, OpenMode::In).unwrap();
                for _ in 0..SAMPLES {
                    black_box(file.read().unwrap());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("cast_float32", side), &side, |bencher, _| {
            bencher.iter(|| {
                let mut file = BinFile::open(&path, OpenMode::In).unwrap();
                for _ in 0..SAMPLES {
                    black_box(file.read_cast(ElementType::Float32).unwrap());
                }
            })
        });

        #[cfg(feature = "mmap")]
        group.bench_with_input(BenchmarkId::new("mapped_view", side), &side, |bencher, _| {
            let mapped = arrayfile::MappedBinFile::open(&path).unwrap();
            bencher.iter(|| {
                for i in 0..SAMPLES {
                    black_box(mapped.view::<f64>(i).unwrap());
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
