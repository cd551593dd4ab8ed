//! Device-side strided kernels
//!
//! The worker thread runs these against buffer storage. Each kernel has a
//! sequential path for small vectors and a rayon-parallel path above
//! [`PARALLEL_THRESHOLD`]; the `parallel` flag (resolved from the executor's
//! backend) gates the parallel path entirely, so the Host backend always runs
//! the sequential code.
//!
//! F16 kernels compute each element in f32 and re-round to f16, matching the
//! quantized-buffer model: precision is lost at storage, not in arithmetic.

use half::f16;

/// Below this element count the sequential path is used even on the Device
/// backend: per-task rayon overhead (~10µs) dominates sub-microsecond loops.
pub(crate) const PARALLEL_THRESHOLD: usize = 8192;

/// Chunk floor for parallel iteration, tuned so each rayon task touches a
/// few cache lines' worth of strided elements.
const CHUNK_SIZE: usize = 1024;

#[inline]
fn use_parallel(n: usize, parallel: bool) -> bool {
    parallel && n >= PARALLEL_THRESHOLD
}

// ── scal ───────────────────────────────────────────────────────────────

pub(crate) fn scal_f32(n: usize, alpha: f32, x: &mut [f32], incx: usize, parallel: bool) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        x.par_chunks_mut(incx)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .for_each(|chunk| chunk[0] *= alpha);
    } else {
        for i in 0..n {
            x[i * incx] *= alpha;
        }
    }
}

pub(crate) fn scal_f16(n: usize, alpha: f32, x: &mut [f16], incx: usize, parallel: bool) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        x.par_chunks_mut(incx)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .for_each(|chunk| chunk[0] = f16::from_f32(chunk[0].to_f32() * alpha));
    } else {
        for i in 0..n {
            let idx = i * incx;
            x[idx] = f16::from_f32(x[idx].to_f32() * alpha);
        }
    }
}

// ── axpy ───────────────────────────────────────────────────────────────

pub(crate) fn axpy_f32(
    n: usize,
    alpha: f32,
    x: &[f32],
    incx: usize,
    y: &mut [f32],
    incy: usize,
    parallel: bool,
) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        y.par_chunks_mut(incy)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .enumerate()
            .for_each(|(i, chunk)| chunk[0] += alpha * x[i * incx]);
    } else {
        for i in 0..n {
            y[i * incy] += alpha * x[i * incx];
        }
    }
}

pub(crate) fn axpy_f16(
    n: usize,
    alpha: f32,
    x: &[f16],
    incx: usize,
    y: &mut [f16],
    incy: usize,
    parallel: bool,
) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        y.par_chunks_mut(incy)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .enumerate()
            .for_each(|(i, chunk)| {
                chunk[0] = f16::from_f32(chunk[0].to_f32() + alpha * x[i * incx].to_f32());
            });
    } else {
        for i in 0..n {
            let yi = i * incy;
            y[yi] = f16::from_f32(y[yi].to_f32() + alpha * x[i * incx].to_f32());
        }
    }
}

// ── copy / swap ────────────────────────────────────────────────────────

pub(crate) fn copy_f32(
    n: usize,
    x: &[f32],
    incx: usize,
    y: &mut [f32],
    incy: usize,
    parallel: bool,
) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        y.par_chunks_mut(incy)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .enumerate()
            .for_each(|(i, chunk)| chunk[0] = x[i * incx]);
    } else {
        for i in 0..n {
            y[i * incy] = x[i * incx];
        }
    }
}

pub(crate) fn copy_f16(
    n: usize,
    x: &[f16],
    incx: usize,
    y: &mut [f16],
    incy: usize,
    parallel: bool,
) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        y.par_chunks_mut(incy)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .enumerate()
            .for_each(|(i, chunk)| chunk[0] = x[i * incx]);
    } else {
        for i in 0..n {
            y[i * incy] = x[i * incx];
        }
    }
}

pub(crate) fn swap_f32(
    n: usize,
    x: &mut [f32],
    incx: usize,
    y: &mut [f32],
    incy: usize,
    parallel: bool,
) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        x.par_chunks_mut(incx)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .zip(y.par_chunks_mut(incy).take(n))
            .for_each(|(cx, cy)| std::mem::swap(&mut cx[0], &mut cy[0]));
    } else {
        for i in 0..n {
            std::mem::swap(&mut x[i * incx], &mut y[i * incy]);
        }
    }
}

pub(crate) fn swap_f16(
    n: usize,
    x: &mut [f16],
    incx: usize,
    y: &mut [f16],
    incy: usize,
    parallel: bool,
) {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        x.par_chunks_mut(incx)
            .take(n)
            .with_min_len(CHUNK_SIZE)
            .zip(y.par_chunks_mut(incy).take(n))
            .for_each(|(cx, cy)| std::mem::swap(&mut cx[0], &mut cy[0]));
    } else {
        for i in 0..n {
            std::mem::swap(&mut x[i * incx], &mut y[i * incy]);
        }
    }
}

// ── reductions ─────────────────────────────────────────────────────────

pub(crate) fn dot_f32(
    n: usize,
    x: &[f32],
    incx: usize,
    y: &[f32],
    incy: usize,
    parallel: bool,
) -> f32 {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| x[i * incx] * y[i * incy])
            .sum()
    } else {
        (0..n).map(|i| x[i * incx] * y[i * incy]).sum()
    }
}

pub(crate) fn dot_f16(
    n: usize,
    x: &[f16],
    incx: usize,
    y: &[f16],
    incy: usize,
    parallel: bool,
) -> f32 {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| x[i * incx].to_f32() * y[i * incy].to_f32())
            .sum()
    } else {
        (0..n)
            .map(|i| x[i * incx].to_f32() * y[i * incy].to_f32())
            .sum()
    }
}

pub(crate) fn asum_f32(n: usize, x: &[f32], incx: usize, parallel: bool) -> f32 {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| x[i * incx].abs())
            .sum()
    } else {
        (0..n).map(|i| x[i * incx].abs()).sum()
    }
}

pub(crate) fn asum_f16(n: usize, x: &[f16], incx: usize, parallel: bool) -> f32 {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| x[i * incx].to_f32().abs())
            .sum()
    } else {
        (0..n).map(|i| x[i * incx].to_f32().abs()).sum()
    }
}

/// Merge two scaled sum-of-squares states `(scale, ssq)`.
///
/// `(0.0, 1.0)` is the identity, so the same combiner serves both the
/// sequential fold and the parallel reduction. Merging a single element's
/// state `(|x|, 1.0)` reproduces the classic snrm2 update step.
#[inline]
fn ssq_combine(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    if b.0 == 0.0 {
        a
    } else if a.0 >= b.0 {
        let r = b.0 / a.0;
        (a.0, a.1 + b.1 * r * r)
    } else {
        let r = a.0 / b.0;
        (b.0, b.1 + a.1 * r * r)
    }
}

pub(crate) fn nrm2_f32(n: usize, x: &[f32], incx: usize, parallel: bool) -> f32 {
    // Scaled formulation, matching the reference kernel: no intermediate
    // overflow for elements whose squares exceed f32::MAX.
    let (scale, ssq) = if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| (x[i * incx].abs(), 1.0))
            .reduce(|| (0.0, 1.0), ssq_combine)
    } else {
        (0..n)
            .map(|i| (x[i * incx].abs(), 1.0))
            .fold((0.0, 1.0), ssq_combine)
    };
    scale * ssq.sqrt()
}

pub(crate) fn nrm2_f16(n: usize, x: &[f16], incx: usize, parallel: bool) -> f32 {
    let (scale, ssq) = if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| (x[i * incx].to_f32().abs(), 1.0))
            .reduce(|| (0.0, 1.0), ssq_combine)
    } else {
        (0..n)
            .map(|i| (x[i * incx].to_f32().abs(), 1.0))
            .fold((0.0, 1.0), ssq_combine)
    };
    scale * ssq.sqrt()
}

/// Index of the first element with maximum absolute value. `n` must be > 0.
pub(crate) fn iamax_f32(n: usize, x: &[f32], incx: usize, parallel: bool) -> usize {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| (i, x[i * incx].abs()))
            .reduce_with(pick_max_abs)
            .map_or(0, |(i, _)| i)
    } else {
        let mut best = 0;
        let mut best_abs = x[0].abs();
        for i in 1..n {
            let xi = x[i * incx].abs();
            if xi > best_abs {
                best = i;
                best_abs = xi;
            }
        }
        best
    }
}

pub(crate) fn iamax_f16(n: usize, x: &[f16], incx: usize, parallel: bool) -> usize {
    if use_parallel(n, parallel) {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .with_min_len(CHUNK_SIZE)
            .map(|i| (i, x[i * incx].to_f32().abs()))
            .reduce_with(pick_max_abs)
            .map_or(0, |(i, _)| i)
    } else {
        let mut best = 0;
        let mut best_abs = x[0].to_f32().abs();
        for i in 1..n {
            let xi = x[i * incx].to_f32().abs();
            if xi > best_abs {
                best = i;
                best_abs = xi;
            }
        }
        best
    }
}

/// Deterministic parallel max-abs combiner: larger magnitude wins, ties
/// resolve to the smaller logical index regardless of reduction order.
#[inline]
fn pick_max_abs(a: (usize, f32), b: (usize, f32)) -> (usize, f32) {
    if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
        b
    } else {
        a
    }
}
