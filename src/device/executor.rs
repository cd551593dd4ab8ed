//! Executor: asynchronous work queue with explicit synchronization
//!
//! The executor owns a dedicated worker thread that drains a FIFO task queue.
//! Submitting work never blocks; completion is observed through [`Event`]s.
//! Because the queue is a single FIFO, tasks run in submission order — an
//! allocation submitted before a kernel is guaranteed to be visible to it
//! without any host-side wait.
//!
//! Backend selection follows the auto-with-fallback pattern: `Device` runs
//! kernels rayon-parallel, `Host` forces the sequential paths, and `Auto`
//! picks `Device` when more than one worker thread is available.

use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use crate::device::buffer::{
    next_buffer_id, quantize, DeviceBuffer, DeviceData, DeviceMemory, Precision,
};
use crate::device::event::{Event, Pending};
use crate::error::{EscalarError, Result};

/// Compute backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeBackend {
    /// Parallel kernel execution on the executor worker
    Device,
    /// Sequential kernel execution (baseline)
    Host,
    /// Auto-select: `Device` when more than one thread is available
    #[default]
    Auto,
}

type Job = Box<dyn FnOnce(&mut DeviceMemory) -> Result<()> + Send>;

enum Task {
    Run { job: Job, event: Event },
    Shutdown,
}

/// Asynchronous device executor
///
/// Owns the device memory table and the worker thread that mutates it. All
/// BLAS entry points live on this type (see the `ops` module); each submits
/// a task and returns an [`Event`] or [`Pending`] immediately. Dropping the
/// executor shuts the queue down and joins the worker.
#[derive(Debug)]
pub struct Executor {
    backend: ComputeBackend,
    parallel: bool,
    sender: Sender<Task>,
    worker: Option<JoinHandle<()>>,
}

impl Executor {
    /// Create an executor with an auto-selected backend.
    ///
    /// # Errors
    ///
    /// Propagates worker spawn failure (does not happen on supported
    /// platforms).
    pub fn auto() -> Result<Self> {
        Self::new(ComputeBackend::Auto)
    }

    /// Create an executor with the given backend.
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` if the worker thread cannot be spawned.
    pub fn new(backend: ComputeBackend) -> Result<Self> {
        let resolved = match backend {
            ComputeBackend::Auto => {
                if rayon::current_num_threads() > 1 {
                    ComputeBackend::Device
                } else {
                    ComputeBackend::Host
                }
            }
            other => other,
        };
        let parallel = resolved == ComputeBackend::Device;

        let (sender, receiver) = mpsc::channel::<Task>();
        let worker = std::thread::Builder::new()
            .name("escalar-executor".to_string())
            .spawn(move || {
                let mut memory = DeviceMemory::new();
                while let Ok(task) = receiver.recv() {
                    match task {
                        Task::Run { job, event } => {
                            let outcome = job(&mut memory);
                            event.complete(outcome.err());
                        }
                        Task::Shutdown => break,
                    }
                }
            })
            .map_err(|e| EscalarError::BackendUnavailable {
                reason: format!("failed to spawn executor worker: {e}"),
            })?;

        Ok(Self {
            backend: resolved,
            parallel,
            sender,
            worker: Some(worker),
        })
    }

    /// The resolved backend (`Auto` is never returned).
    #[must_use]
    pub fn backend(&self) -> ComputeBackend {
        self.backend
    }

    /// Whether kernels take the parallel path for large vectors.
    pub(crate) fn parallel(&self) -> bool {
        self.parallel
    }

    /// Submit a task, returning its completion event.
    pub(crate) fn submit<F>(&self, job: F) -> Result<Event>
    where
        F: FnOnce(&mut DeviceMemory) -> Result<()> + Send + 'static,
    {
        let event = Event::new();
        self.sender
            .send(Task::Run {
                job: Box::new(job),
                event: event.clone(),
            })
            .map_err(|_| EscalarError::QueueClosed)?;
        Ok(event)
    }

    /// Submit a value-producing task, returning a [`Pending`] for its result.
    pub(crate) fn submit_with<T, F>(&self, job: F) -> Result<Pending<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut DeviceMemory) -> Result<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let event = self.submit(move |memory| {
            let value = job(memory)?;
            // A dropped Pending just discards the value.
            let _ = tx.send(value);
            Ok(())
        })?;
        Ok(Pending::new(event, rx))
    }

    /// Allocate a device buffer and copy f32 host data into it.
    ///
    /// The transfer is asynchronous; FIFO ordering makes the data visible to
    /// every subsequently submitted task without waiting.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the executor has shut down.
    pub fn alloc_from_host(&self, data: &[f32]) -> Result<DeviceBuffer> {
        let id = next_buffer_id();
        let host = data.to_vec();
        self.submit(move |memory| {
            memory.insert(id, DeviceData::F32(host));
            Ok(())
        })?;
        Ok(DeviceBuffer::new(id, data.len(), Precision::F32))
    }

    /// Allocate a quantized (f16) device buffer from f32 host data.
    ///
    /// Quantization happens on transfer; reading back dequantizes to f32.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the executor has shut down.
    pub fn alloc_quantized(&self, data: &[f32]) -> Result<DeviceBuffer> {
        let id = next_buffer_id();
        let host = data.to_vec();
        self.submit(move |memory| {
            memory.insert(id, DeviceData::F16(quantize(&host)));
            Ok(())
        })?;
        Ok(DeviceBuffer::new(id, data.len(), Precision::F16))
    }

    /// Copy a device buffer back to the host, dequantizing F16 storage.
    ///
    /// The returned [`Pending`] must be waited on before the data is valid.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the executor has shut down.
    pub fn read_back(&self, buffer: &DeviceBuffer) -> Result<Pending<Vec<f32>>> {
        let id = buffer.id();
        self.submit_with(move |memory| Ok(memory.get(id)?.to_f32_vec()))
    }

    /// Release a device buffer, consuming its handle.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the executor has shut down. Freeing an
    /// already-freed id surfaces as `UnknownBuffer` on the returned event.
    pub fn free(&self, buffer: DeviceBuffer) -> Result<Event> {
        let id = buffer.id();
        self.submit(move |memory| memory.remove(id))
    }

    /// Fence: block until every previously submitted task has run.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the executor has shut down.
    pub fn wait_all(&self) -> Result<()> {
        self.submit(|_| Ok(()))?.wait()
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        // Queue is FIFO: every task submitted before the shutdown marker
        // still runs. A failed send means the worker is already gone.
        let _ = self.sender.send(Task::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resolves_away_from_auto() {
        let ex = Executor::auto().unwrap();
        assert_ne!(ex.backend(), ComputeBackend::Auto);
    }

    #[test]
    fn alloc_and_read_back_round_trip() {
        let ex = Executor::new(ComputeBackend::Host).unwrap();
        let data = vec![1.0f32, -2.0, 3.5];
        let buf = ex.alloc_from_host(&data).unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.precision(), Precision::F32);
        let back = ex.read_back(&buf).unwrap().wait().unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn queue_runs_in_submission_order() {
        let ex = Executor::new(ComputeBackend::Host).unwrap();
        let buf = ex.alloc_from_host(&[1.0]).unwrap();
        let pending = ex.read_back(&buf).unwrap();
        let free_event = ex.free(buf).unwrap();
        // The read-back was queued before the free, so it succeeds.
        assert!(pending.wait().is_ok());
        assert!(free_event.wait().is_ok());
    }

    #[test]
    fn double_free_surfaces_unknown_buffer() {
        let ex = Executor::new(ComputeBackend::Host).unwrap();
        let buf = ex.alloc_from_host(&[1.0]).unwrap();
        let id = buf.id();
        ex.free(buf).unwrap().wait().unwrap();
        // Re-submit a free for the stale id through the internal API.
        let event = ex.submit(move |memory| memory.remove(id)).unwrap();
        assert!(matches!(
            event.wait(),
            Err(EscalarError::UnknownBuffer { id: stale }) if stale == id
        ));
    }

    #[test]
    fn wait_all_fences_prior_work() {
        let ex = Executor::auto().unwrap();
        let buf = ex.alloc_from_host(&vec![1.0f32; 1000]).unwrap();
        let pending = ex.read_back(&buf).unwrap();
        ex.wait_all().unwrap();
        // Everything before the fence has run.
        assert!(pending.event().is_complete());
        assert_eq!(pending.wait().unwrap().len(), 1000);
    }

    #[test]
    fn quantized_alloc_reports_f16_precision() {
        let ex = Executor::new(ComputeBackend::Host).unwrap();
        let buf = ex.alloc_quantized(&[0.5, 1.5]).unwrap();
        assert_eq!(buf.precision(), Precision::F16);
        let back = ex.read_back(&buf).unwrap().wait().unwrap();
        assert_eq!(back, vec![0.5, 1.5]);
    }
}
