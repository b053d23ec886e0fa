//! Bulk transfers between global memory and a worker's local store
//!
//! A transfer is described by a reusable [`TransferDescriptor`] (direction,
//! size, completion signal). The substrate behind [`BulkTransfer`] issues the
//! copy and bumps the descriptor's [`CompletionSignal`] when it lands; the
//! worker blocks on that signal before touching the staging buffer again and
//! then resets it for the next chunk.
//!
//! There is no retry and no timeout. A fault ends the worker; a completion
//! that never arrives stalls it.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::global::GlobalRegion;
use crate::{Result, ScalError};

/// Direction of a bulk transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Global memory into the local store
    Get,
    /// Local store out to global memory
    Put,
}

#[derive(Debug, Default)]
struct SignalState {
    count: Mutex<usize>,
    completed: Condvar,
}

/// Completion counter shared between a worker and its transfer substrate
///
/// Cloning yields another handle to the same counter, so a substrate running
/// on a different thread can complete a transfer the worker is waiting on.
///
/// # Examples
///
/// ```
/// use trueno_scal::transfer::CompletionSignal;
///
/// let signal = CompletionSignal::new();
/// let substrate = signal.clone();
///
/// std::thread::scope(|s| {
///     s.spawn(move || substrate.signal());
///     signal.wait(1);
/// });
///
/// assert_eq!(signal.count(), 1);
/// signal.reset();
/// assert_eq!(signal.count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompletionSignal {
    state: Arc<SignalState>,
}

impl CompletionSignal {
    /// Create a signal at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        // The counter stays meaningful even if a signalling thread panicked
        self.state.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one completed transfer and wake any waiter
    pub fn signal(&self) {
        *self.lock() += 1;
        self.state.completed.notify_all();
    }

    /// Block until at least `expected` completions have been recorded
    pub fn wait(&self, expected: usize) {
        let mut count = self.lock();
        while *count < expected {
            count = self
                .state
                .completed
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Zero the counter for reuse
    pub fn reset(&self) {
        *self.lock() = 0;
    }

    /// Completions recorded since the last reset
    pub fn count(&self) -> usize {
        *self.lock()
    }
}

/// Reusable description of one direction of transfer
#[derive(Debug, Clone)]
pub struct TransferDescriptor {
    direction: Direction,
    size: usize,
    offset: usize,
    signal: CompletionSignal,
}

impl TransferDescriptor {
    /// Configure a descriptor with its own completion signal
    pub fn new(direction: Direction, size: usize) -> Self {
        Self::with_signal(direction, size, CompletionSignal::new())
    }

    /// Configure a descriptor bound to an existing completion signal
    pub fn with_signal(direction: Direction, size: usize, signal: CompletionSignal) -> Self {
        Self {
            direction,
            size,
            offset: 0,
            signal,
        }
    }

    /// Change the number of elements moved per transfer
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Record where in the partition the next transfer targets
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Direction of this descriptor
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Elements moved per transfer
    pub fn size(&self) -> usize {
        self.size
    }

    /// Partition offset of the most recently targeted block
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Completion signal bumped when a transfer lands
    pub fn signal(&self) -> &CompletionSignal {
        &self.signal
    }

    fn fault(&self, reason: String) -> ScalError {
        ScalError::TransferFault {
            direction: self.direction,
            offset: self.offset,
            reason,
        }
    }

    /// Check a transfer against this descriptor before it is issued
    ///
    /// Substrates call this so that every implementation rejects the same
    /// malformed requests.
    pub fn check(&self, direction: Direction, global_len: usize, local_len: usize) -> Result<()> {
        if direction != self.direction {
            return Err(self.fault(format!(
                "descriptor configured for {:?}, issued as {direction:?}",
                self.direction
            )));
        }
        if global_len < self.size || local_len < self.size {
            let size = self.size;
            return Err(self.fault(format!(
                "blocks of {global_len} (global) and {local_len} (local) elements, \
                 transfer needs {size}"
            )));
        }
        Ok(())
    }
}

/// Bulk-transfer substrate
///
/// Both operations move `desc.size()` elements between the start of the given
/// global block and the start of the local buffer, then signal
/// `desc.signal()` once the data has landed. Returning `Ok` only means the
/// transfer was issued; callers must wait on the signal before using the data.
pub trait BulkTransfer {
    /// Global → local
    fn get<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        global: &[T],
        local: &mut [T],
    ) -> Result<()>;

    /// Local → global
    fn put<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        local: &[T],
        global: &mut [T],
    ) -> Result<()>;
}

/// Substrate over host memory: copies immediately and signals completion
#[derive(Debug, Default, Clone, Copy)]
pub struct HostDma;

impl HostDma {
    /// Create a host-memory substrate
    pub fn new() -> Self {
        Self
    }
}

impl BulkTransfer for HostDma {
    fn get<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        global: &[T],
        local: &mut [T],
    ) -> Result<()> {
        desc.check(Direction::Get, global.len(), local.len())?;
        let n = desc.size();
        local[..n].copy_from_slice(&global[..n]);
        desc.signal().signal();
        Ok(())
    }

    fn put<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        local: &[T],
        global: &mut [T],
    ) -> Result<()> {
        desc.check(Direction::Put, global.len(), local.len())?;
        let n = desc.size();
        global[..n].copy_from_slice(&local[..n]);
        desc.signal().signal();
        Ok(())
    }
}

/// One worker's transfer state: an in-descriptor, an out-descriptor and the substrate
#[derive(Debug)]
pub struct TransferEngine<D> {
    dma: D,
    get: TransferDescriptor,
    put: TransferDescriptor,
    transfers_in: usize,
    transfers_out: usize,
}

impl<D: BulkTransfer> TransferEngine<D> {
    /// Configure both descriptors for blocks of `size` elements
    pub fn new(dma: D, size: usize) -> Self {
        Self {
            dma,
            get: TransferDescriptor::new(Direction::Get, size),
            put: TransferDescriptor::new(Direction::Put, size),
            transfers_in: 0,
            transfers_out: 0,
        }
    }

    /// Reconfigure both descriptors, e.g. for a final partial chunk
    pub fn resize(&mut self, size: usize) {
        self.get.set_size(size);
        self.put.set_size(size);
    }

    /// Current block size in elements
    pub fn block_size(&self) -> usize {
        self.get.size()
    }

    /// Copy the block at `offset` of the region's source into `local`, and wait for it
    pub fn fetch<T: Copy>(
        &mut self,
        region: &GlobalRegion<'_, T>,
        offset: usize,
        local: &mut [T],
    ) -> Result<()> {
        self.get.set_offset(offset);
        let global = region.source_block(offset, self.get.size())?;
        self.dma.get(&self.get, global, local)?;
        self.get.signal().wait(1);
        self.get.signal().reset();
        self.transfers_in += 1;
        Ok(())
    }

    /// Copy `local` into the block at `offset` of the region's destination, and wait for it
    pub fn store<T: Copy>(
        &mut self,
        local: &[T],
        region: &mut GlobalRegion<'_, T>,
        offset: usize,
    ) -> Result<()> {
        self.put.set_offset(offset);
        let global = region.destination_block(offset, self.put.size())?;
        self.dma.put(&self.put, local, global)?;
        self.put.signal().wait(1);
        self.put.signal().reset();
        self.transfers_out += 1;
        Ok(())
    }

    /// Completed global → local transfers
    pub fn transfers_in(&self) -> usize {
        self.transfers_in
    }

    /// Completed local → global transfers
    pub fn transfers_out(&self) -> usize {
        self.transfers_out
    }
}
