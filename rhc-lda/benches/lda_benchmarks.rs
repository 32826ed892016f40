use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rhc_core::SplitMix64;
use rhc_lda::{invert, FisherModel, Matrix, TwoClassData};

/// Diagonally dominant n x n matrix, always invertible.
fn dominant_matrix(n: usize, rng: &mut SplitMix64) -> Matrix {
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        n as f64 + 1.0
                    } else {
                        rng.next_f64() - 0.5
                    }
                })
                .collect()
        })
        .collect();
    Matrix::from_rows(&rows).unwrap()
}

fn bench_invert(c: &mut Criterion) {
    let mut group = c.benchmark_group("invert");
    let mut rng = SplitMix64::new(42);
    for &n in &[4, 16, 64] {
        let m = dominant_matrix(n, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter(|| invert(&m).unwrap());
        });
    }
    group.finish();
}

fn bench_fisher_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fisher_fit");
    let mut rng = SplitMix64::new(7);
    for &dim in &[2, 8, 32] {
        let a: Vec<Vec<f64>> = (0..200)
            .map(|_| (0..dim).map(|_| rng.next_f64() - 1.0).collect())
            .collect();
        let b: Vec<Vec<f64>> = (0..200)
            .map(|_| (0..dim).map(|_| rng.next_f64()).collect())
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |bench, &_dim| {
            bench.iter(|| {
                let data = TwoClassData::new(
                    a.iter().map(|v| v.as_slice()),
                    b.iter().map(|v| v.as_slice()),
                )
                .unwrap();
                FisherModel::fit(&data).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_invert, bench_fisher_fit);
criterion_main!(benches);
