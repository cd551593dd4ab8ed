//! Device-resident buffers and quantized storage
//!
//! Buffers live inside the executor worker; the host holds only an opaque
//! [`DeviceBuffer`] handle (unique id, logical length, precision). Handles
//! are not `Clone`: one handle per allocation, consumed by
//! [`Executor::free`](crate::Executor::free).
//!
//! Quantized buffers store `f16` on the device. Quantization happens at the
//! transfer boundary: f32 host data is converted on allocation, and converted
//! back on copy-out. Kernels on F16 buffers compute each element in f32 and
//! re-round to f16.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::{EscalarError, Result};

/// Storage precision of a device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// Full-precision f32 storage
    F32,
    /// Quantized f16 storage (converted at the transfer boundary)
    F16,
}

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_buffer_id() -> u64 {
    NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Opaque handle to a device-resident vector
///
/// The handle records the logical element count and storage precision; the
/// data itself is owned by the executor worker and only reachable through
/// submitted tasks.
#[derive(Debug)]
pub struct DeviceBuffer {
    id: u64,
    len: usize,
    precision: Precision,
}

impl DeviceBuffer {
    pub(crate) fn new(id: u64, len: usize, precision: Precision) -> Self {
        Self { id, len, precision }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Number of elements in the allocation (flat length, not logical n).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the allocation holds zero elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Storage precision of the allocation.
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }
}

/// Worker-side storage for one allocation
#[derive(Debug)]
pub(crate) enum DeviceData {
    F32(Vec<f32>),
    F16(Vec<f16>),
}

impl DeviceData {
    /// Copy out as f32, dequantizing if needed.
    pub(crate) fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            DeviceData::F32(v) => v.clone(),
            DeviceData::F16(v) => dequantize(v),
        }
    }
}

pub(crate) fn quantize(host: &[f32]) -> Vec<f16> {
    host.iter().copied().map(f16::from_f32).collect()
}

pub(crate) fn dequantize(data: &[f16]) -> Vec<f32> {
    data.iter().map(|q| q.to_f32()).collect()
}

/// Handle-keyed table of device allocations, owned by the executor worker
#[derive(Debug, Default)]
pub(crate) struct DeviceMemory {
    table: HashMap<u64, DeviceData>,
}

impl DeviceMemory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: u64, data: DeviceData) {
        self.table.insert(id, data);
    }

    pub(crate) fn get(&self, id: u64) -> Result<&DeviceData> {
        self.table
            .get(&id)
            .ok_or(EscalarError::UnknownBuffer { id })
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Result<&mut DeviceData> {
        self.table
            .get_mut(&id)
            .ok_or(EscalarError::UnknownBuffer { id })
    }

    /// Remove an allocation temporarily so a second one can be borrowed
    /// mutably; callers must re-insert it.
    pub(crate) fn take(&mut self, id: u64) -> Result<DeviceData> {
        self.table
            .remove(&id)
            .ok_or(EscalarError::UnknownBuffer { id })
    }

    pub(crate) fn remove(&mut self, id: u64) -> Result<()> {
        self.take(id).map(|_| ())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_ids_are_unique() {
        let a = next_buffer_id();
        let b = next_buffer_id();
        assert_ne!(a, b);
    }

    #[test]
    fn quantize_round_trip_within_f16_precision() {
        let host = vec![0.0f32, 1.0, -1.5, 3.25, 100.0];
        let round = dequantize(&quantize(&host));
        for (orig, got) in host.iter().zip(round.iter()) {
            // f16 has ~3 decimal digits; these values are exactly representable
            assert_eq!(orig, got);
        }
    }

    #[test]
    fn quantize_loses_precision_gracefully() {
        let host = vec![1.0001f32];
        let round = dequantize(&quantize(&host));
        assert!((round[0] - 1.0001).abs() < 1e-3);
    }

    #[test]
    fn memory_take_then_reinsert() {
        let mut mem = DeviceMemory::new();
        mem.insert(3, DeviceData::F32(vec![1.0, 2.0]));
        let data = mem.take(3).unwrap();
        assert_eq!(mem.len(), 0);
        mem.insert(3, data);
        assert_eq!(mem.get(3).unwrap().to_f32_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn memory_missing_buffer_is_unknown_buffer() {
        let mut mem = DeviceMemory::new();
        assert!(matches!(
            mem.get_mut(99),
            Err(EscalarError::UnknownBuffer { id: 99 })
        ));
        assert!(matches!(
            mem.remove(99),
            Err(EscalarError::UnknownBuffer { id: 99 })
        ));
    }
}
