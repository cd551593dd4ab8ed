//! Device execution: executor queue, buffers, events, and kernels
//!
//! The submit-then-synchronize model lives here. [`Executor`] owns a worker
//! thread and a FIFO task queue; [`DeviceBuffer`] handles name allocations in
//! the worker's memory table; [`Event`] / [`Pending`] are the only way to
//! observe completion. Kernels (private) run inside the worker and switch
//! between sequential and rayon-parallel paths based on the backend and
//! vector size.

pub mod buffer;
pub mod event;
pub mod executor;
pub(crate) mod kernels;

pub use buffer::{DeviceBuffer, Precision};
pub use event::{Event, Pending};
pub use executor::{ComputeBackend, Executor};
