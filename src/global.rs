//! Per-worker windows into global memory
//!
//! The source is shared read-only; the destination is cut with `split_at_mut`
//! along partition boundaries, so each worker holds the only mutable borrow of
//! the elements it owns. Regions are only read and written through the
//! transfer engine.

use crate::partition::Partition;
use crate::transfer::Direction;
use crate::{Result, ScalError};

/// A worker's share of the global source and destination vectors
#[derive(Debug)]
pub struct GlobalRegion<'g, T> {
    partition: Partition,
    source: &'g [T],
    destination: &'g mut [T],
}

impl<'g, T> GlobalRegion<'g, T> {
    /// Partition this region was cut for
    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Number of elements in the region
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the region is empty
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Source block `[offset, offset + len)` relative to the partition start
    pub(crate) fn source_block(&self, offset: usize, len: usize) -> Result<&[T]> {
        let end = self.checked_end(Direction::Get, offset, len)?;
        Ok(&self.source[offset..end])
    }

    /// Destination block `[offset, offset + len)` relative to the partition start
    pub(crate) fn destination_block(&mut self, offset: usize, len: usize) -> Result<&mut [T]> {
        let end = self.checked_end(Direction::Put, offset, len)?;
        Ok(&mut self.destination[offset..end])
    }

    fn checked_end(&self, direction: Direction, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len() => Ok(end),
            _ => Err(ScalError::TransferFault {
                direction,
                offset,
                reason: format!(
                    "block of {len} elements outside partition of {} elements",
                    self.len()
                ),
            }),
        }
    }
}

/// Cut `source` and `destination` into one region per partition
///
/// Partitions must be in worker order and tile `[0, source.len())` exactly,
/// which is what [`Partition::all`] produces.
///
/// # Errors
///
/// - `SizeMismatch` if the two vectors differ in length
/// - `InvalidConfig` if the partitions leave a gap, overlap, or overrun
pub fn split_regions<'g, T>(
    source: &'g [T],
    destination: &'g mut [T],
    partitions: &[Partition],
) -> Result<Vec<GlobalRegion<'g, T>>> {
    if source.len() != destination.len() {
        return Err(ScalError::SizeMismatch {
            expected: source.len(),
            actual: destination.len(),
        });
    }

    let mut regions = Vec::with_capacity(partitions.len());
    let mut src_rest = source;
    let mut dst_rest = destination;
    let mut cursor = 0;

    for &partition in partitions {
        if partition.start_offset != cursor || partition.local_count > src_rest.len() {
            return Err(ScalError::InvalidConfig(format!(
                "partition of worker {} does not continue the tiling at element {cursor}",
                partition.worker_id
            )));
        }

        let (source, s_rest) = src_rest.split_at(partition.local_count);
        let (destination, d_rest) =
            std::mem::take(&mut dst_rest).split_at_mut(partition.local_count);
        src_rest = s_rest;
        dst_rest = d_rest;
        cursor = partition.end();

        regions.push(GlobalRegion {
            partition,
            source,
            destination,
        });
    }

    if !src_rest.is_empty() {
        return Err(ScalError::InvalidConfig(format!(
            "partitions cover {cursor} of {} elements",
            source.len()
        )));
    }

    Ok(regions)
}
