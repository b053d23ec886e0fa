//! Worker-local fast memory and its staging buffers
//!
//! A [`LocalStore`] models the small per-worker memory the pipeline stages
//! chunks through. Buffers are carved out with [`LocalStore::acquire`] and
//! hand their bytes back when dropped, so every exit path (normal completion,
//! an empty partition, or `?` on a failed transfer) releases exactly what was
//! acquired.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};

use crate::{Result, ScalError};

/// Capacity-limited local memory owned by one worker
#[derive(Debug)]
pub struct LocalStore {
    capacity: usize,
    used: Cell<usize>,
    peak: Cell<usize>,
    live: Cell<usize>,
}

impl LocalStore {
    /// Create a store with `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: Cell::new(0),
            peak: Cell::new(0),
            live: Cell::new(0),
        }
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently held by live buffers
    pub fn used_bytes(&self) -> usize {
        self.used.get()
    }

    /// Bytes still free
    pub fn available_bytes(&self) -> usize {
        self.capacity - self.used.get()
    }

    /// High-water mark of `used_bytes`
    pub fn peak_bytes(&self) -> usize {
        self.peak.get()
    }

    /// Number of buffers not yet released
    pub fn live_buffers(&self) -> usize {
        self.live.get()
    }

    /// Carve a zeroed buffer of `len` elements out of the store
    ///
    /// # Errors
    ///
    /// `ResourceExhausted` if the store cannot hold `len` more elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use trueno_scal::local_store::LocalStore;
    ///
    /// let store = LocalStore::new(1024);
    /// {
    ///     let buf = store.acquire::<f32>(128).unwrap();
    ///     assert_eq!(buf.len(), 128);
    ///     assert_eq!(store.used_bytes(), 512);
    /// }
    /// assert_eq!(store.used_bytes(), 0);
    /// assert!(store.acquire::<f64>(256).is_err());
    /// ```
    pub fn acquire<T: Copy + Default>(&self, len: usize) -> Result<StagingBuffer<'_, T>> {
        let available = self.available_bytes();
        let bytes = match len.checked_mul(std::mem::size_of::<T>()) {
            Some(bytes) if bytes <= available => bytes,
            requested => {
                return Err(ScalError::ResourceExhausted {
                    requested: requested.unwrap_or(usize::MAX),
                    available,
                })
            }
        };

        let used = self.used.get() + bytes;
        self.used.set(used);
        self.peak.set(self.peak.get().max(used));
        self.live.set(self.live.get() + 1);

        Ok(StagingBuffer {
            store: self,
            data: vec![T::default(); len],
            bytes,
        })
    }

    /// Acquire the input/output buffer pair used by one worker
    ///
    /// If the output buffer does not fit, the input buffer is released before
    /// the error is returned.
    pub fn acquire_pair<T: Copy + Default>(&self, len: usize) -> Result<StagingPair<'_, T>> {
        let input = self.acquire(len)?;
        let output = self.acquire(len)?;
        Ok(StagingPair { input, output })
    }

    fn release(&self, bytes: usize) {
        self.used.set(self.used.get() - bytes);
        self.live.set(self.live.get() - 1);
    }
}

/// Fixed-capacity buffer borrowed from a [`LocalStore`]
#[derive(Debug)]
pub struct StagingBuffer<'s, T> {
    store: &'s LocalStore,
    data: Vec<T>,
    bytes: usize,
}

impl<T> StagingBuffer<'_, T> {
    /// Bytes this buffer holds in its store
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl<T> Deref for StagingBuffer<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for StagingBuffer<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for StagingBuffer<'_, T> {
    fn drop(&mut self) {
        self.store.release(self.bytes);
    }
}

/// Input and output staging buffers of one worker
#[derive(Debug)]
pub struct StagingPair<'s, T> {
    /// Receives chunks from the global source
    pub input: StagingBuffer<'s, T>,
    /// Holds computed chunks bound for the global destination
    pub output: StagingBuffer<'s, T>,
}

impl<T> StagingPair<'_, T> {
    /// First `len` elements of the input and output buffers
    pub fn split(&mut self, len: usize) -> (&[T], &mut [T]) {
        (&self.input[..len], &mut self.output[..len])
    }

    /// Element capacity of each buffer
    pub fn capacity(&self) -> usize {
        self.input.len()
    }
}
