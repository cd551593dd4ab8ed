//! # Escalar
//!
//! Strided BLAS level-1 primitives with unified host/device execution and
//! parity validation.
//!
//! Escalar (Spanish: "to scale") provides the two sides of a BLAS level-1
//! parity contract: trusted host [`reference`] kernels, and the same
//! operations dispatched asynchronously through an [`Executor`] onto
//! device-resident buffers, plus the comparison and parameter-grid machinery
//! to validate one against the other.
//!
//! ## Execution model
//!
//! The executor uses submit-then-synchronize semantics: every dispatch
//! returns immediately with an [`Event`] (or a [`Pending`] for operations
//! that produce host data), and results are only valid after an explicit
//! wait. The queue is a single FIFO, so tasks run in submission order.
//!
//! ## Example
//!
//! ```
//! use escalar::{reference, validate, Executor};
//!
//! let (n, alpha, incx) = (11, 1.5f32, 4);
//! let host: Vec<f32> = (0..(n - 1) * incx + 1).map(|i| i as f32 * 0.1).collect();
//!
//! // Reference implementation, in place on a host copy.
//! let mut expected = host.clone();
//! reference::scal(n, alpha, &mut expected, incx);
//!
//! // Device dispatch through the executor.
//! let ex = Executor::auto().unwrap();
//! let x = ex.alloc_from_host(&host).unwrap();
//! ex.scal(n, alpha, &x, incx).unwrap();
//! let result = ex.read_back(&x).unwrap().wait().unwrap();
//! ex.wait_all().unwrap();
//!
//! assert!(validate::compare_vectors(
//!     &result,
//!     &expected,
//!     validate::F32_ELEMENTWISE_MARGIN
//! ));
//! ```
//!
//! ## Quantized buffers
//!
//! [`Executor::alloc_quantized`] stores f16 on the device, converting at the
//! transfer boundary. Kernels on quantized buffers compute in f32 and
//! re-round, and the parity margins in [`validate`] account for the storage
//! rounding.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)] // usize -> f32 in tests and fixtures
#![allow(clippy::float_cmp)] // exact comparisons are intentional in tests
#![allow(clippy::uninlined_format_args)]

pub mod device;
pub mod error;
pub mod grid;
pub mod reference;
pub mod validate;

mod ops;

pub use device::{ComputeBackend, DeviceBuffer, Event, Executor, Pending, Precision};
pub use error::{EscalarError, Result};
pub use grid::{Blas1Case, Blas1Grid};
pub use validate::{compare_scalars, compare_vectors, ParityCase, ParityReport};
