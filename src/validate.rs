//! Numerical closeness checks and parity reporting
//!
//! Device results are never expected to be bit-identical to the host
//! reference: the parallel reductions reassociate sums, and quantized (f16)
//! buffers lose precision at the transfer boundary. Comparisons are relative
//! with an absolute floor, and the per-precision margins here are what the
//! parity suites use.
//!
//! [`ParityReport`] aggregates one outcome per parameter combination so a
//! grid failure names every diverging case, not just the first.

use serde::{Deserialize, Serialize};

use crate::device::buffer::Precision;

/// Relative margin for f32 element-wise results (scal, axpy, copy, swap).
pub const F32_ELEMENTWISE_MARGIN: f32 = 1e-4;

/// Relative margin for f32 reductions (dot, asum, nrm2): looser, since the
/// parallel path reassociates the accumulation.
pub const F32_REDUCTION_MARGIN: f32 = 5e-4;

/// Relative margin for quantized f16 buffers: dominated by the two storage
/// roundings (in and out), each up to 2^-11 relative.
pub const F16_MARGIN: f32 = 1e-2;

/// Default element-wise margin for a storage precision.
#[must_use]
pub fn margin_for(precision: Precision) -> f32 {
    match precision {
        Precision::F32 => F32_ELEMENTWISE_MARGIN,
        Precision::F16 => F16_MARGIN,
    }
}

/// Relative comparison with an absolute floor of 1.0.
///
/// Passes when `|a - b| <= epsilon * max(|a|, |b|, 1)`, so values near zero
/// are compared absolutely and large values relatively.
#[must_use]
pub fn compare_scalars(a: f32, b: f32, epsilon: f32) -> bool {
    let diff = (a - b).abs();
    diff <= epsilon * a.abs().max(b.abs()).max(1.0)
}

/// Element-wise closeness of two equally sized vectors.
///
/// Length mismatch counts as a failure.
#[must_use]
pub fn compare_vectors(result: &[f32], reference: &[f32], epsilon: f32) -> bool {
    result.len() == reference.len()
        && result
            .iter()
            .zip(reference.iter())
            .all(|(&a, &b)| compare_scalars(a, b, epsilon))
}

/// Largest per-element relative error (with the same absolute floor as
/// [`compare_scalars`]). Returns 0.0 for empty input.
///
/// Both slices must be the same length.
#[must_use]
pub fn max_relative_error(result: &[f32], reference: &[f32]) -> f32 {
    debug_assert_eq!(result.len(), reference.len());
    result
        .iter()
        .zip(reference.iter())
        .map(|(&a, &b)| (a - b).abs() / a.abs().max(b.abs()).max(1.0))
        .fold(0.0, f32::max)
}

/// Outcome of one parity case (one parameter combination)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParityCase {
    /// Generated case name, e.g. `scal__n_1002__alpha_1_5__incx_4`
    pub name: String,
    /// Whether device and reference agreed within the margin
    pub passed: bool,
    /// Largest relative error observed across the compared elements
    pub max_rel_error: f32,
    /// Margin the case was held to
    pub margin: f32,
}

/// Aggregated parity outcomes for a whole parameter grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParityReport {
    /// Individual case outcomes, in grid order
    pub cases: Vec<ParityCase>,
}

impl ParityReport {
    /// Empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one case outcome.
    pub fn record(&mut self, name: impl Into<String>, max_rel_error: f32, margin: f32) {
        self.cases.push(ParityCase {
            name: name.into(),
            passed: max_rel_error <= margin,
            max_rel_error,
            margin,
        });
    }

    /// Number of cases recorded.
    #[must_use]
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    /// Number of passing cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    /// Whether every recorded case passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }

    /// One-line summary; failing cases are named with their observed error.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_passed() {
            format!("{}/{} parity cases passed", self.passed(), self.total())
        } else {
            let failed: Vec<String> = self
                .cases
                .iter()
                .filter(|c| !c.passed)
                .map(|c| {
                    format!(
                        "{} (rel_err {:.3e} > margin {:.1e})",
                        c.name, c.max_rel_error, c.margin
                    )
                })
                .collect();
            format!(
                "{}/{} failed: {}",
                self.total() - self.passed(),
                self.total(),
                failed.join(", ")
            )
        }
    }

    /// Serialize the full report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialization failure (does not happen for this type).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
