//! BLAS level-1 entry points dispatched through the executor
//!
//! These are the device-side counterparts of the [`reference`](crate::reference)
//! kernels. In-place operations return an [`Event`]; reductions return a
//! [`Pending`] carrying the host-side result. Nothing is valid until the
//! returned handle has been waited on (or a later fence has).
//!
//! Argument validation happens synchronously at submission: zero strides,
//! allocations too short for `(n - 1) * inc + 1`, precision mismatches, and
//! aliased operand pairs are rejected before any task is queued.

use crate::device::buffer::{DeviceBuffer, DeviceData};
use crate::device::event::{Event, Pending};
use crate::device::executor::Executor;
use crate::device::kernels;
use crate::error::{EscalarError, Result};

fn check_vector(buffer: &DeviceBuffer, n: usize, inc: usize, name: &str) -> Result<()> {
    if inc == 0 {
        return Err(EscalarError::InvalidStride {
            reason: format!("inc{name} must be > 0, got 0"),
        });
    }
    if n > 0 {
        let needed = (n - 1) * inc + 1;
        if buffer.len() < needed {
            return Err(EscalarError::BufferMismatch {
                reason: format!(
                    "{name} too short: n={n} inc{name}={inc} needs {needed} elements, have {}",
                    buffer.len()
                ),
            });
        }
    }
    Ok(())
}

/// Mutating two-operand ops reject aliased handles; the read-only dot path
/// only needs matching precision.
fn check_pair(x: &DeviceBuffer, y: &DeviceBuffer) -> Result<()> {
    if x.id() == y.id() {
        return Err(EscalarError::BufferMismatch {
            reason: "x and y alias the same buffer".to_string(),
        });
    }
    check_same_precision(x, y)
}

fn check_same_precision(x: &DeviceBuffer, y: &DeviceBuffer) -> Result<()> {
    if x.precision() != y.precision() {
        return Err(EscalarError::BufferMismatch {
            reason: format!(
                "precision mismatch: x is {:?}, y is {:?}",
                x.precision(),
                y.precision()
            ),
        });
    }
    Ok(())
}

impl Executor {
    /// SCAL: scale a device vector in place, `x[i*incx] *= alpha`.
    ///
    /// `n == 0` returns an already-completed event without queuing work.
    ///
    /// # Errors
    ///
    /// `InvalidStride` for `incx == 0`, `BufferMismatch` if the allocation is
    /// shorter than `(n - 1) * incx + 1`, `QueueClosed` after shutdown.
    pub fn scal(&self, n: usize, alpha: f32, x: &DeviceBuffer, incx: usize) -> Result<Event> {
        check_vector(x, n, incx, "x")?;
        if n == 0 {
            return Ok(Event::completed());
        }
        let id = x.id();
        let parallel = self.parallel();
        self.submit(move |memory| {
            match memory.get_mut(id)? {
                DeviceData::F32(v) => kernels::scal_f32(n, alpha, v, incx, parallel),
                DeviceData::F16(v) => kernels::scal_f16(n, alpha, v, incx, parallel),
            }
            Ok(())
        })
    }

    /// AXPY: `y[i*incy] += alpha * x[i*incx]` on device buffers.
    ///
    /// # Errors
    ///
    /// Stride/length errors as for [`scal`](Executor::scal); additionally
    /// `BufferMismatch` if x and y alias or differ in precision.
    pub fn axpy(
        &self,
        n: usize,
        alpha: f32,
        x: &DeviceBuffer,
        incx: usize,
        y: &DeviceBuffer,
        incy: usize,
    ) -> Result<Event> {
        check_vector(x, n, incx, "x")?;
        check_vector(y, n, incy, "y")?;
        check_pair(x, y)?;
        if n == 0 {
            return Ok(Event::completed());
        }
        let (x_id, y_id) = (x.id(), y.id());
        let parallel = self.parallel();
        self.submit(move |memory| {
            // Take x out of the table so y can be borrowed mutably.
            let x_data = memory.take(x_id)?;
            let outcome = match (&x_data, memory.get_mut(y_id)) {
                (DeviceData::F32(xv), Ok(DeviceData::F32(yv))) => {
                    kernels::axpy_f32(n, alpha, xv, incx, yv, incy, parallel);
                    Ok(())
                }
                (DeviceData::F16(xv), Ok(DeviceData::F16(yv))) => {
                    kernels::axpy_f16(n, alpha, xv, incx, yv, incy, parallel);
                    Ok(())
                }
                (_, Ok(_)) => Err(EscalarError::BufferMismatch {
                    reason: "precision mismatch between device allocations".to_string(),
                }),
                (_, Err(e)) => Err(e),
            };
            memory.insert(x_id, x_data);
            outcome
        })
    }

    /// COPY: `y[i*incy] = x[i*incx]` on device buffers.
    ///
    /// # Errors
    ///
    /// Same conditions as [`axpy`](Executor::axpy).
    pub fn copy(
        &self,
        n: usize,
        x: &DeviceBuffer,
        incx: usize,
        y: &DeviceBuffer,
        incy: usize,
    ) -> Result<Event> {
        check_vector(x, n, incx, "x")?;
        check_vector(y, n, incy, "y")?;
        check_pair(x, y)?;
        if n == 0 {
            return Ok(Event::completed());
        }
        let (x_id, y_id) = (x.id(), y.id());
        let parallel = self.parallel();
        self.submit(move |memory| {
            let x_data = memory.take(x_id)?;
            let outcome = match (&x_data, memory.get_mut(y_id)) {
                (DeviceData::F32(xv), Ok(DeviceData::F32(yv))) => {
                    kernels::copy_f32(n, xv, incx, yv, incy, parallel);
                    Ok(())
                }
                (DeviceData::F16(xv), Ok(DeviceData::F16(yv))) => {
                    kernels::copy_f16(n, xv, incx, yv, incy, parallel);
                    Ok(())
                }
                (_, Ok(_)) => Err(EscalarError::BufferMismatch {
                    reason: "precision mismatch between device allocations".to_string(),
                }),
                (_, Err(e)) => Err(e),
            };
            memory.insert(x_id, x_data);
            outcome
        })
    }

    /// SWAP: exchange the logical elements of two device vectors in place.
    ///
    /// # Errors
    ///
    /// Same conditions as [`axpy`](Executor::axpy).
    pub fn swap(
        &self,
        n: usize,
        x: &DeviceBuffer,
        incx: usize,
        y: &DeviceBuffer,
        incy: usize,
    ) -> Result<Event> {
        check_vector(x, n, incx, "x")?;
        check_vector(y, n, incy, "y")?;
        check_pair(x, y)?;
        if n == 0 {
            return Ok(Event::completed());
        }
        let (x_id, y_id) = (x.id(), y.id());
        let parallel = self.parallel();
        self.submit(move |memory| {
            let mut x_data = memory.take(x_id)?;
            let outcome = match (&mut x_data, memory.get_mut(y_id)) {
                (DeviceData::F32(xv), Ok(DeviceData::F32(yv))) => {
                    kernels::swap_f32(n, xv, incx, yv, incy, parallel);
                    Ok(())
                }
                (DeviceData::F16(xv), Ok(DeviceData::F16(yv))) => {
                    kernels::swap_f16(n, xv, incx, yv, incy, parallel);
                    Ok(())
                }
                (_, Ok(_)) => Err(EscalarError::BufferMismatch {
                    reason: "precision mismatch between device allocations".to_string(),
                }),
                (_, Err(e)) => Err(e),
            };
            memory.insert(x_id, x_data);
            outcome
        })
    }

    /// DOT: inner product of two device vectors, computed in f32.
    ///
    /// F16 buffers are widened per element before multiplying.
    ///
    /// # Errors
    ///
    /// Same conditions as [`axpy`](Executor::axpy).
    pub fn dot(
        &self,
        n: usize,
        x: &DeviceBuffer,
        incx: usize,
        y: &DeviceBuffer,
        incy: usize,
    ) -> Result<Pending<f32>> {
        check_vector(x, n, incx, "x")?;
        check_vector(y, n, incy, "y")?;
        check_same_precision(x, y)?;
        let (x_id, y_id) = (x.id(), y.id());
        let parallel = self.parallel();
        self.submit_with(move |memory| {
            if n == 0 {
                return Ok(0.0);
            }
            match (memory.get(x_id)?, memory.get(y_id)?) {
                (DeviceData::F32(xv), DeviceData::F32(yv)) => {
                    Ok(kernels::dot_f32(n, xv, incx, yv, incy, parallel))
                }
                (DeviceData::F16(xv), DeviceData::F16(yv)) => {
                    Ok(kernels::dot_f16(n, xv, incx, yv, incy, parallel))
                }
                _ => Err(EscalarError::BufferMismatch {
                    reason: "precision mismatch between device allocations".to_string(),
                }),
            }
        })
    }

    /// ASUM: sum of absolute values of a device vector.
    ///
    /// # Errors
    ///
    /// Same conditions as [`scal`](Executor::scal).
    pub fn asum(&self, n: usize, x: &DeviceBuffer, incx: usize) -> Result<Pending<f32>> {
        check_vector(x, n, incx, "x")?;
        let id = x.id();
        let parallel = self.parallel();
        self.submit_with(move |memory| {
            if n == 0 {
                return Ok(0.0);
            }
            match memory.get(id)? {
                DeviceData::F32(v) => Ok(kernels::asum_f32(n, v, incx, parallel)),
                DeviceData::F16(v) => Ok(kernels::asum_f16(n, v, incx, parallel)),
            }
        })
    }

    /// NRM2: Euclidean norm of a device vector.
    ///
    /// # Errors
    ///
    /// Same conditions as [`scal`](Executor::scal).
    pub fn nrm2(&self, n: usize, x: &DeviceBuffer, incx: usize) -> Result<Pending<f32>> {
        check_vector(x, n, incx, "x")?;
        let id = x.id();
        let parallel = self.parallel();
        self.submit_with(move |memory| {
            if n == 0 {
                return Ok(0.0);
            }
            match memory.get(id)? {
                DeviceData::F32(v) => Ok(kernels::nrm2_f32(n, v, incx, parallel)),
                DeviceData::F16(v) => Ok(kernels::nrm2_f16(n, v, incx, parallel)),
            }
        })
    }

    /// IAMAX: logical index of the first element with maximum absolute value.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` for `n == 0` (there is no index to return), plus
    /// the conditions of [`scal`](Executor::scal).
    pub fn iamax(&self, n: usize, x: &DeviceBuffer, incx: usize) -> Result<Pending<usize>> {
        if n == 0 {
            return Err(EscalarError::InvalidDimension {
                reason: "iamax requires n > 0".to_string(),
            });
        }
        check_vector(x, n, incx, "x")?;
        let id = x.id();
        let parallel = self.parallel();
        self.submit_with(move |memory| match memory.get(id)? {
            DeviceData::F32(v) => Ok(kernels::iamax_f32(n, v, incx, parallel)),
            DeviceData::F16(v) => Ok(kernels::iamax_f16(n, v, incx, parallel)),
        })
    }
}
