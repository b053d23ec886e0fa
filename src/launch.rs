//! Host-side launcher
//!
//! Splits the global vectors into one region per worker, hands every worker
//! the same resolved kernel and staging size, runs them all and gathers their
//! reports. With the `parallel` feature workers run on the rayon pool;
//! otherwise they run in worker-id order on the calling thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::global::split_regions;
use crate::kernel::ScaleKernel;
use crate::partition::Partition;
use crate::precision::{Element, Precision};
use crate::transfer::{BulkTransfer, HostDma};
use crate::worker::{Worker, WorkerReport};
use crate::{Backend, Result, ScalConfig, ScalError};

/// Outcome of one launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    /// Precision the launch ran at
    pub precision: Precision,
    /// Resolved SIMD backend (never `Auto`)
    pub backend: Backend,
    /// One report per worker, in worker-id order
    pub workers: Vec<WorkerReport>,
}

impl LaunchReport {
    /// Elements written across all workers
    pub fn elements(&self) -> usize {
        self.workers.iter().map(|w| w.partition.local_count).sum()
    }

    /// Transfers issued across all workers, both directions
    pub fn transfers(&self) -> usize {
        self.workers.iter().map(WorkerReport::transfers).sum()
    }

    /// Workers that owned at least one element
    pub fn active_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| !w.partition.is_empty())
            .count()
    }

    /// Report of a single worker
    pub fn worker(&self, id: usize) -> Option<&WorkerReport> {
        self.workers.get(id)
    }
}

/// Compute `destination[i] = alpha * source[i]` over host memory
///
/// # Errors
///
/// - `InvalidConfig` / `UnsupportedBackend` if `config` is unusable
/// - `SizeMismatch` if the vectors differ in length
/// - `WorkerFailed` wrapping the first worker error, in worker-id order
///
/// # Examples
///
/// ```
/// use trueno_scal::{launch, ScalConfig};
///
/// let config = ScalConfig::new().with_workers(3).with_chunk(4);
/// let x = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
/// let mut y = [0.0f64; 7];
///
/// let report = launch(&config, -2.0, &x, &mut y).unwrap();
/// assert_eq!(y, [-2.0, -4.0, -6.0, -8.0, -10.0, -12.0, -14.0]);
/// assert_eq!(report.active_workers(), 3);
/// ```
pub fn launch<T: Element>(
    config: &ScalConfig,
    alpha: T,
    source: &[T],
    destination: &mut [T],
) -> Result<LaunchReport> {
    launch_with(config, alpha, source, destination, |_| HostDma::new())
}

/// [`launch`] with a caller-supplied transfer substrate per worker
///
/// `substrate` is called once per worker id. Chaos settings in `config` are
/// layered on top of whatever it returns.
#[cfg_attr(
    feature = "tracing",
    instrument(
        skip_all,
        fields(
            precision = ?T::PRECISION,
            elements = source.len(),
            workers = config.workers,
        )
    )
)]
pub fn launch_with<T, D, F>(
    config: &ScalConfig,
    alpha: T,
    source: &[T],
    destination: &mut [T],
    substrate: F,
) -> Result<LaunchReport>
where
    T: Element,
    D: BulkTransfer + Send,
    F: Fn(usize) -> D,
{
    config.validate()?;
    if source.len() != destination.len() {
        return Err(ScalError::SizeMismatch {
            expected: source.len(),
            actual: destination.len(),
        });
    }

    let backend = config.resolved_backend()?;
    let kernel = ScaleKernel::new(backend, alpha)?;
    let chunk = T::chunk_len(config);
    let store_bytes = config.effective_local_store_bytes();

    let partitions = Partition::all(source.len(), config.workers)?;
    let workers = split_regions(source, destination, &partitions)?
        .into_iter()
        .map(|region| {
            let id = region.partition().worker_id;
            let dma = config.chaos.wrap(id, substrate(id));
            Worker::new(region, kernel, chunk, store_bytes, dma)
        })
        .collect::<Result<Vec<_>>>()?;

    #[cfg(feature = "parallel")]
    let results: Vec<Result<WorkerReport>> = workers.into_par_iter().map(Worker::run).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<WorkerReport>> = workers.into_iter().map(Worker::run).collect();

    let mut reports = Vec::with_capacity(results.len());
    for (worker, result) in results.into_iter().enumerate() {
        match result {
            Ok(report) => reports.push(report),
            Err(source) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(worker, error = %source, "worker failed");
                return Err(ScalError::WorkerFailed {
                    worker,
                    source: Box::new(source),
                });
            }
        }
    }

    Ok(LaunchReport {
        precision: T::PRECISION,
        backend,
        workers: reports,
    })
}
