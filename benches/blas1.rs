//! Benchmark suite for BLAS level-1 routines
//!
//! Compares the host reference kernels against device dispatch across
//! vector sizes spanning the sequential/parallel switch-over.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use escalar::{reference, Executor};

const SIZES: [usize; 3] = [11, 1002, 102_400];

fn input(n: usize) -> Vec<f32> {
    (0..n).map(|i| ((i % 251) as f32).mul_add(0.013, -1.5)).collect()
}

fn benchmark_scal_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("scal_reference");

    for &n in SIZES.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let host = input(n);
            b.iter(|| {
                let mut x = host.clone();
                reference::scal(n, black_box(1.5), &mut x, 1);
                black_box(x)
            });
        });
    }

    group.finish();
}

fn benchmark_scal_device(c: &mut Criterion) {
    let ex = Executor::auto().unwrap();
    let mut group = c.benchmark_group("scal_device");

    for &n in SIZES.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let host = input(n);
            b.iter(|| {
                let x = ex.alloc_from_host(&host).unwrap();
                ex.scal(n, black_box(1.5), &x, 1).unwrap().wait().unwrap();
                ex.free(x).unwrap();
            });
        });
        ex.wait_all().unwrap();
    }

    group.finish();
}

fn benchmark_dot_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_reference");

    for &n in SIZES.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let x = input(n);
            let y = input(n);
            b.iter(|| black_box(reference::dot(n, black_box(&x), 1, black_box(&y), 1)));
        });
    }

    group.finish();
}

fn benchmark_dot_device(c: &mut Criterion) {
    let ex = Executor::auto().unwrap();
    let mut group = c.benchmark_group("dot_device");

    for &n in SIZES.iter() {
        let x = ex.alloc_from_host(&input(n)).unwrap();
        let y = ex.alloc_from_host(&input(n)).unwrap();
        ex.wait_all().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let result = ex.dot(n, &x, 1, &y, 1).unwrap().wait().unwrap();
                black_box(result)
            });
        });

        ex.free(x).unwrap();
        ex.free(y).unwrap();
        ex.wait_all().unwrap();
    }

    group.finish();
}

fn benchmark_strided_scal(c: &mut Criterion) {
    let ex = Executor::auto().unwrap();
    let n = 102_400;

    let mut group = c.benchmark_group("scal_strided");
    for &incx in [1usize, 4].iter() {
        let host = input((n - 1) * incx + 1);
        group.bench_with_input(BenchmarkId::from_parameter(incx), &incx, |b, &incx| {
            b.iter(|| {
                let x = ex.alloc_from_host(&host).unwrap();
                ex.scal(n, black_box(1.5), &x, incx).unwrap().wait().unwrap();
                ex.free(x).unwrap();
            });
        });
        ex.wait_all().unwrap();
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_scal_reference,
    benchmark_scal_device,
    benchmark_dot_reference,
    benchmark_dot_device,
    benchmark_strided_scal
);
criterion_main!(benches);
