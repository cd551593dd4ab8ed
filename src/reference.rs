//! Host reference BLAS level-1 kernels
//!
//! Straight-line scalar implementations used as the trusted baseline for
//! parity validation of the executor-dispatched kernels. All routines are
//! strided and operate in place on host slices; none of them allocates.
//!
//! Strides are element counts, not bytes: logical element `i` of a vector
//! lives at flat index `i * inc`. Callers must pass a slice of at least
//! `(n - 1) * inc + 1` elements (debug-asserted).

use num_traits::Float;

#[inline]
fn check_vector<T>(x: &[T], n: usize, inc: usize) {
    debug_assert!(inc > 0, "stride must be positive");
    debug_assert!(
        n == 0 || x.len() >= (n - 1) * inc + 1,
        "slice too short: need {} elements, have {}",
        (n - 1) * inc + 1,
        x.len()
    );
}

/// Scale a vector in place: `x[i*incx] *= alpha` for `i in 0..n`.
///
/// `n == 0` is a no-op. Elements between strides are left untouched.
pub fn scal<T: Float>(n: usize, alpha: T, x: &mut [T], incx: usize) {
    check_vector(x, n, incx);
    for i in 0..n {
        let idx = i * incx;
        x[idx] = x[idx] * alpha;
    }
}

/// AXPY: `y[i*incy] += alpha * x[i*incx]` for `i in 0..n`.
pub fn axpy<T: Float>(n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize) {
    check_vector(x, n, incx);
    check_vector(y, n, incy);
    for i in 0..n {
        let yi = i * incy;
        y[yi] = y[yi] + alpha * x[i * incx];
    }
}

/// Copy x into y: `y[i*incy] = x[i*incx]` for `i in 0..n`.
pub fn copy<T: Float>(n: usize, x: &[T], incx: usize, y: &mut [T], incy: usize) {
    check_vector(x, n, incx);
    check_vector(y, n, incy);
    for i in 0..n {
        y[i * incy] = x[i * incx];
    }
}

/// Swap the logical elements of x and y in place.
pub fn swap<T: Float>(n: usize, x: &mut [T], incx: usize, y: &mut [T], incy: usize) {
    check_vector(x, n, incx);
    check_vector(y, n, incy);
    for i in 0..n {
        core::mem::swap(&mut x[i * incx], &mut y[i * incy]);
    }
}

/// Dot product of x and y. Returns zero for `n == 0`.
pub fn dot<T: Float>(n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> T {
    check_vector(x, n, incx);
    check_vector(y, n, incy);
    let mut acc = T::zero();
    for i in 0..n {
        acc = acc + x[i * incx] * y[i * incy];
    }
    acc
}

/// Sum of absolute values. Returns zero for `n == 0`.
pub fn asum<T: Float>(n: usize, x: &[T], incx: usize) -> T {
    check_vector(x, n, incx);
    let mut acc = T::zero();
    for i in 0..n {
        acc = acc + x[i * incx].abs();
    }
    acc
}

/// Euclidean norm using the scaled sum-of-squares formulation.
///
/// Avoids intermediate overflow/underflow for extreme magnitudes by tracking
/// a running scale, the way reference BLAS `snrm2` does.
pub fn nrm2<T: Float>(n: usize, x: &[T], incx: usize) -> T {
    check_vector(x, n, incx);
    let mut scale = T::zero();
    let mut ssq = T::one();
    for i in 0..n {
        let xi = x[i * incx].abs();
        if xi > T::zero() {
            if scale < xi {
                ssq = T::one() + ssq * (scale / xi).powi(2);
                scale = xi;
            } else {
                ssq = ssq + (xi / scale).powi(2);
            }
        }
    }
    scale * ssq.sqrt()
}

/// Index of the first element with maximum absolute value.
///
/// Returns the logical index (not the flat index), or `None` for `n == 0`.
/// Ties resolve to the smallest index, per reference BLAS convention.
pub fn iamax<T: Float>(n: usize, x: &[T], incx: usize) -> Option<usize> {
    check_vector(x, n, incx);
    if n == 0 {
        return None;
    }
    let mut best = 0;
    let mut best_abs = x[0].abs();
    for i in 1..n {
        let xi = x[i * incx].abs();
        if xi > best_abs {
            best = i;
            best_abs = xi;
        }
    }
    Some(best)
}
