//! Parameter grids and case naming for the parity suites
//!
//! The suites run every combination of (size, alpha, stride) from a grid.
//! Two grids exist: the default quick grid, and a stress grid with large
//! sizes and extra alphas/strides, selected by the `stress` cargo feature.

use serde::{Deserialize, Serialize};

/// One (size, alpha, stride) combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blas1Case {
    /// Logical element count
    pub size: usize,
    /// Scalar multiplier
    pub alpha: f32,
    /// Stride into the flat buffer
    pub incx: usize,
}

impl Blas1Case {
    /// Flat allocation length for this case: `size * incx`.
    ///
    /// Deliberately larger than the `(size - 1) * incx + 1` minimum a kernel
    /// needs, so the comparison also proves the trailing `incx - 1` gap
    /// elements survive untouched.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.size * self.incx
    }

    /// Generated case name: `scal__n_1002__alpha_1_5__incx_4`.
    ///
    /// `.` becomes `_` and `-` becomes `m` so names stay identifier-safe.
    #[must_use]
    pub fn name(&self, op: &str) -> String {
        format!(
            "{op}__n_{}__alpha_{}__incx_{}",
            self.size,
            fmt_scalar(self.alpha),
            self.incx
        )
    }
}

fn fmt_scalar(value: f32) -> String {
    format!("{value}").replace('.', "_").replace('-', "m")
}

/// Cartesian parameter grid for the BLAS level-1 parity suites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blas1Grid {
    /// Element counts to test
    pub sizes: Vec<usize>,
    /// Scalar multipliers to test
    pub alphas: Vec<f32>,
    /// Strides to test
    pub strides: Vec<usize>,
}

impl Blas1Grid {
    /// Quick grid: {11, 1002} × {0.0, 1.5} × {4}.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            sizes: vec![11, 1002],
            alphas: vec![0.0, 1.5],
            strides: vec![4],
        }
    }

    /// Stress grid: {11, 65, 1002, 1002400} × {0.0, 1.0, 1.5} × {1, 4}.
    #[must_use]
    pub fn stress() -> Self {
        Self {
            sizes: vec![11, 65, 1002, 1_002_400],
            alphas: vec![0.0, 1.0, 1.5],
            strides: vec![1, 4],
        }
    }

    /// The grid selected by the `stress` feature, quick otherwise.
    #[must_use]
    pub fn for_build() -> Self {
        if cfg!(feature = "stress") {
            Self::stress()
        } else {
            Self::quick()
        }
    }

    /// All combinations in deterministic (size-major) order.
    #[must_use]
    pub fn cases(&self) -> Vec<Blas1Case> {
        let mut cases = Vec::with_capacity(self.sizes.len() * self.alphas.len() * self.strides.len());
        for &size in &self.sizes {
            for &alpha in &self.alphas {
                for &incx in &self.strides {
                    cases.push(Blas1Case { size, alpha, incx });
                }
            }
        }
        cases
    }
}
