//! Chaos Engineering Configuration
//!
//! Fault injection for exercising the worker failure paths: a local store
//! that is too small for the staging buffers, and a transfer substrate that
//! faults partway through a worker's pipeline.
//!
//! # Examples
//!
//! ```
//! use trueno_scal::chaos::ChaosConfig;
//!
//! // No faults
//! let gentle = ChaosConfig::gentle();
//! assert!(!gentle.injects_transfer_faults());
//!
//! // Fail the very first transfer of every worker
//! let aggressive = ChaosConfig::aggressive();
//! assert_eq!(aggressive.fault_after_transfers, Some(0));
//!
//! // Custom configuration using builder pattern
//! let custom = ChaosConfig::new()
//!     .with_memory_limit(8 * 1024)   // 8 KiB local store
//!     .with_transfer_fault(3)        // 4th transfer faults
//!     .with_fault_worker(2)          // ...only on worker 2
//!     .build();
//! assert!(custom.faults_worker(2));
//! assert!(!custom.faults_worker(1));
//! ```

use crate::transfer::{BulkTransfer, TransferDescriptor};
use crate::{Result, ScalError};

/// Chaos engineering configuration for stress testing
///
/// All injections are disabled by default (`memory_limit == 0` means no limit).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChaosConfig {
    /// Cap on each worker's local store in bytes (0 = no limit)
    pub memory_limit: usize,
    /// Number of transfers that succeed before the substrate faults
    pub fault_after_transfers: Option<usize>,
    /// Restrict transfer faults to one worker (None = every worker)
    pub fault_worker: Option<usize>,
}

impl ChaosConfig {
    /// Create a new chaos configuration with default values (no injection)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set local store limit in bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use trueno_scal::chaos::ChaosConfig;
    ///
    /// let config = ChaosConfig::new().with_memory_limit(16 * 1024);
    /// assert_eq!(config.memory_limit, 16 * 1024);
    /// ```
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = bytes;
        self
    }

    /// Fault the transfer issued after `after` successful ones
    ///
    /// # Examples
    ///
    /// ```
    /// use trueno_scal::chaos::ChaosConfig;
    ///
    /// let config = ChaosConfig::new().with_transfer_fault(5);
    /// assert_eq!(config.fault_after_transfers, Some(5));
    /// ```
    pub fn with_transfer_fault(mut self, after: usize) -> Self {
        self.fault_after_transfers = Some(after);
        self
    }

    /// Only inject transfer faults on the given worker
    pub fn with_fault_worker(mut self, worker: usize) -> Self {
        self.fault_worker = Some(worker);
        self
    }

    /// Finalize configuration (no-op, for builder pattern consistency)
    pub fn build(self) -> Self {
        self
    }

    /// Whether any transfer fault is configured
    pub fn injects_transfer_faults(&self) -> bool {
        self.fault_after_transfers.is_some()
    }

    /// Whether the given worker gets a faulty substrate
    pub fn faults_worker(&self, worker: usize) -> bool {
        self.injects_transfer_faults() && self.fault_worker.map_or(true, |w| w == worker)
    }

    /// Wrap a worker's substrate according to this configuration
    pub fn wrap<D>(&self, worker: usize, dma: D) -> ChaosDma<D> {
        match self.fault_after_transfers {
            Some(after) if self.faults_worker(worker) => {
                ChaosDma::Faulty(FaultyDma::new(dma, after))
            }
            _ => ChaosDma::Passthrough(dma),
        }
    }

    /// Gentle chaos configuration preset
    ///
    /// - No local store limit
    /// - No transfer faults
    ///
    /// The baseline that every other preset is compared against.
    ///
    /// # Examples
    ///
    /// ```
    /// use trueno_scal::chaos::ChaosConfig;
    ///
    /// let config = ChaosConfig::gentle();
    /// assert_eq!(config.memory_limit, 0);
    /// assert_eq!(config.fault_after_transfers, None);
    /// ```
    pub fn gentle() -> Self {
        Self::new()
    }

    /// Aggressive chaos configuration preset
    ///
    /// - 4 KiB local store limit
    /// - First transfer on every worker faults
    ///
    /// # Examples
    ///
    /// ```
    /// use trueno_scal::chaos::ChaosConfig;
    ///
    /// let config = ChaosConfig::aggressive();
    /// assert_eq!(config.memory_limit, 4 * 1024);
    /// assert_eq!(config.fault_after_transfers, Some(0));
    /// assert_eq!(config.fault_worker, None);
    /// ```
    pub fn aggressive() -> Self {
        Self::new().with_memory_limit(4 * 1024).with_transfer_fault(0)
    }
}

/// Transfer substrate that faults after a fixed number of transfers
///
/// Wraps a working substrate and passes transfers through until the budget
/// is spent; every transfer after that returns `TransferFault` without
/// touching either side and without signalling completion.
#[derive(Debug)]
pub struct FaultyDma<D> {
    inner: D,
    remaining: usize,
}

impl<D> FaultyDma<D> {
    /// Let `after` transfers through, then fault
    pub fn new(inner: D, after: usize) -> Self {
        Self {
            inner,
            remaining: after,
        }
    }

    fn admit(&mut self, desc: &TransferDescriptor) -> Result<()> {
        if self.remaining == 0 {
            return Err(ScalError::TransferFault {
                direction: desc.direction(),
                offset: desc.offset(),
                reason: "injected fault".to_string(),
            });
        }
        self.remaining -= 1;
        Ok(())
    }
}

impl<D: BulkTransfer> BulkTransfer for FaultyDma<D> {
    fn get<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        global: &[T],
        local: &mut [T],
    ) -> Result<()> {
        self.admit(desc)?;
        self.inner.get(desc, global, local)
    }

    fn put<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        local: &[T],
        global: &mut [T],
    ) -> Result<()> {
        self.admit(desc)?;
        self.inner.put(desc, local, global)
    }
}

/// A worker's substrate, with or without injected faults
#[derive(Debug)]
pub enum ChaosDma<D> {
    /// Untouched substrate
    Passthrough(D),
    /// Substrate that faults after a budget of transfers
    Faulty(FaultyDma<D>),
}

impl<D: BulkTransfer> BulkTransfer for ChaosDma<D> {
    fn get<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        global: &[T],
        local: &mut [T],
    ) -> Result<()> {
        match self {
            ChaosDma::Passthrough(dma) => dma.get(desc, global, local),
            ChaosDma::Faulty(dma) => dma.get(desc, global, local),
        }
    }

    fn put<T: Copy>(
        &mut self,
        desc: &TransferDescriptor,
        local: &[T],
        global: &mut [T],
    ) -> Result<()> {
        match self {
            ChaosDma::Passthrough(dma) => dma.put(desc, local, global),
            ChaosDma::Faulty(dma) => dma.put(desc, local, global),
        }
    }
}
