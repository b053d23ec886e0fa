//! Worker partitioning of the global index space
//!
//! `[0, N)` is split into `P` contiguous ranges. The first `N mod P` workers
//! take one extra element each, so range sizes differ by at most one and the
//! ranges tile the index space exactly: no gaps, no overlaps.

use std::ops::Range;

use crate::{Result, ScalError};

/// One worker's contiguous share of the global vector
///
/// # Examples
///
/// ```
/// use trueno_scal::Partition;
///
/// let parts = Partition::all(10, 4).unwrap();
/// let counts: Vec<usize> = parts.iter().map(|p| p.local_count).collect();
/// let offsets: Vec<usize> = parts.iter().map(|p| p.start_offset).collect();
///
/// assert_eq!(counts, vec![3, 3, 2, 2]);
/// assert_eq!(offsets, vec![0, 3, 6, 8]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Zero-based worker index
    pub worker_id: usize,
    /// Number of elements owned by the worker (may be zero)
    pub local_count: usize,
    /// Index of the first owned element
    pub start_offset: usize,
}

impl Partition {
    /// Compute the share of `worker_id` out of `population` workers
    ///
    /// - `local_count = N/P + (1 if id < N mod P else 0)`
    /// - `start_offset = id*(N/P) + min(id, N mod P)`
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `population` is zero or `worker_id` is not below it.
    pub fn for_worker(element_count: usize, population: usize, worker_id: usize) -> Result<Self> {
        if population == 0 {
            return Err(ScalError::InvalidConfig(
                "worker population must be > 0".to_string(),
            ));
        }
        if worker_id >= population {
            return Err(ScalError::InvalidConfig(format!(
                "worker id {worker_id} out of range for population {population}"
            )));
        }

        let base = element_count / population;
        let remainder = element_count % population;

        Ok(Self {
            worker_id,
            local_count: base + usize::from(worker_id < remainder),
            start_offset: worker_id * base + worker_id.min(remainder),
        })
    }

    /// Partitions for every worker, in worker order
    pub fn all(element_count: usize, population: usize) -> Result<Vec<Self>> {
        if population == 0 {
            return Err(ScalError::InvalidConfig(
                "worker population must be > 0".to_string(),
            ));
        }
        (0..population)
            .map(|id| Self::for_worker(element_count, population, id))
            .collect()
    }

    /// One past the last owned element
    pub fn end(&self) -> usize {
        self.start_offset + self.local_count
    }

    /// Owned global index range
    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end()
    }

    /// Whether the worker owns nothing
    pub fn is_empty(&self) -> bool {
        self.local_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_split() {
        let parts = Partition::all(10, 4).unwrap();
        assert_eq!(
            parts,
            vec![
                Partition {
                    worker_id: 0,
                    local_count: 3,
                    start_offset: 0,
                },
                Partition {
                    worker_id: 1,
                    local_count: 3,
                    start_offset: 3,
                },
                Partition {
                    worker_id: 2,
                    local_count: 2,
                    start_offset: 6,
                },
                Partition {
                    worker_id: 3,
                    local_count: 2,
                    start_offset: 8,
                },
            ]
        );
    }

    #[test]
    fn test_zero_elements() {
        let parts = Partition::all(0, 64).unwrap();
        assert_eq!(parts.len(), 64);
        assert!(parts.iter().all(|p| p.is_empty() && p.start_offset == 0));
    }

    #[test]
    fn test_fewer_elements_than_workers() {
        let parts = Partition::all(3, 8).unwrap();
        let counts: Vec<usize> = parts.iter().map(|p| p.local_count).collect();
        assert_eq!(counts, vec![1, 1, 1, 0, 0, 0, 0, 0]);
        // Empty tail partitions sit at the end of the index space
        assert!(parts[3..].iter().all(|p| p.start_offset == 3));
    }

    #[test]
    fn test_single_worker_owns_everything() {
        let p = Partition::for_worker(12345, 1, 0).unwrap();
        assert_eq!(p.range(), 0..12345);
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        assert!(Partition::for_worker(10, 0, 0).is_err());
        assert!(Partition::for_worker(10, 4, 4).is_err());
        assert!(Partition::all(10, 0).is_err());
    }

    #[test]
    fn test_range_helpers() {
        let p = Partition::for_worker(10, 4, 1).unwrap();
        assert_eq!(p.end(), 6);
        assert_eq!(p.range(), 3..6);
        assert!(!p.is_empty());
    }
}
