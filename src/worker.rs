//! Per-worker pipeline
//!
//! ```text
//! acquire staging pair
//! while offset + BUFFSIZE <= local_count:
//!     fetch chunk -> wait -> scale -> store chunk -> wait
//! if tail > 0:
//!     resize descriptors -> fetch tail -> wait -> scale -> store tail -> wait
//! release staging pair
//! ```
//!
//! A worker never looks at another worker's elements and never blocks on
//! anything but its own two completion signals.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::backends::LANES;
use crate::global::GlobalRegion;
use crate::kernel::ScaleKernel;
use crate::local_store::LocalStore;
use crate::partition::Partition;
use crate::precision::Element;
use crate::transfer::{BulkTransfer, TransferEngine};
use crate::{Result, ScalError};

/// What one worker did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// The worker's share of the vector
    pub partition: Partition,
    /// Chunks of exactly `BUFFSIZE` elements processed
    pub full_chunks: usize,
    /// Length of the final partial chunk (0 if none)
    pub tail_len: usize,
    /// Completed global → local transfers
    pub transfers_in: usize,
    /// Completed local → global transfers
    pub transfers_out: usize,
    /// High-water mark of the worker's local store
    pub peak_local_bytes: usize,
}

impl WorkerReport {
    /// Zero-based worker index
    pub fn worker_id(&self) -> usize {
        self.partition.worker_id
    }

    /// Total transfers in both directions
    pub fn transfers(&self) -> usize {
        self.transfers_in + self.transfers_out
    }
}

/// One worker instance, ready to run
#[derive(Debug)]
pub struct Worker<'g, T, D> {
    region: GlobalRegion<'g, T>,
    kernel: ScaleKernel<T>,
    chunk: usize,
    local_store_bytes: usize,
    dma: D,
}

impl<'g, T, D> Worker<'g, T, D>
where
    T: Element,
    D: BulkTransfer,
{
    /// Bind a worker to its region, kernel, staging size and substrate
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `chunk` is zero or not a multiple of [`LANES`].
    pub fn new(
        region: GlobalRegion<'g, T>,
        kernel: ScaleKernel<T>,
        chunk: usize,
        local_store_bytes: usize,
        dma: D,
    ) -> Result<Self> {
        if chunk == 0 || chunk % LANES != 0 {
            return Err(ScalError::InvalidConfig(format!(
                "staging chunk must be a non-zero multiple of {LANES}, got {chunk}"
            )));
        }
        Ok(Self {
            region,
            kernel,
            chunk,
            local_store_bytes,
            dma,
        })
    }

    /// Partition this worker owns
    pub fn partition(&self) -> Partition {
        self.region.partition()
    }

    /// Run the pipeline to completion
    ///
    /// # Errors
    ///
    /// - `ResourceExhausted` if the staging pair does not fit the local store
    /// - `TransferFault` if the substrate faults; elements of earlier chunks
    ///   have already reached the destination, later ones have not
    #[cfg_attr(
        feature = "tracing",
        instrument(
            skip_all,
            fields(
                worker = self.region.partition().worker_id,
                local_count = self.region.partition().local_count,
                start_offset = self.region.partition().start_offset,
            )
        )
    )]
    pub fn run(self) -> Result<WorkerReport> {
        let Worker {
            mut region,
            kernel,
            chunk,
            local_store_bytes,
            dma,
        } = self;
        let partition = region.partition();
        let local_count = partition.local_count;

        let store = LocalStore::new(local_store_bytes);
        let mut staging = store.acquire_pair::<T>(chunk)?;
        let mut engine = TransferEngine::new(dma, chunk);

        let mut offset = 0;
        let mut full_chunks = 0;
        while offset + chunk <= local_count {
            engine.fetch(&region, offset, &mut staging.input[..])?;
            let (input, output) = staging.split(chunk);
            kernel.apply(input, output)?;
            engine.store(&staging.output[..], &mut region, offset)?;

            offset += chunk;
            full_chunks += 1;
        }

        let tail_len = local_count - offset;
        if tail_len > 0 {
            engine.resize(tail_len);
            engine.fetch(&region, offset, &mut staging.input[..])?;
            let (input, output) = staging.split(tail_len);
            kernel.apply(input, output)?;
            engine.store(&staging.output[..], &mut region, offset)?;
        }

        let report = WorkerReport {
            partition,
            full_chunks,
            tail_len,
            transfers_in: engine.transfers_in(),
            transfers_out: engine.transfers_out(),
            peak_local_bytes: store.peak_bytes(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            full_chunks = report.full_chunks,
            tail_len = report.tail_len,
            transfers = report.transfers(),
            "worker finished"
        );

        Ok(report)
    }
}
