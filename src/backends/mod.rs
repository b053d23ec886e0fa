//! Backend implementations of the lane-wise scale for different SIMD instruction sets
//!
//! Every backend processes its input in groups of [`LANES`] elements: load a
//! group, multiply by the broadcast scalar, store it. Elements left over after
//! the last full group go through a scalar loop.
//!
//! # Safety
//!
//! All `unsafe` code is isolated within backend implementations. The public API
//! remains 100% safe.
//!
//! # Backends
//!
//! - `scalar`: Portable baseline implementation over `[T; LANES]` arrays
//! - `sse2`: x86_64 baseline SIMD (128-bit)
//! - `avx2`: x86_64 advanced SIMD (256-bit)

pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

/// Number of elements in one vector group
pub const LANES: usize = 4;

/// Backend trait defining the scale primitive for both precisions
///
/// # Safety
///
/// Implementations may use unsafe SIMD intrinsics. Callers must ensure:
/// - The CPU supports the instruction set of the backend
/// - `dst` has length >= `src.len()`
pub trait ScaleBackend {
    /// Lane-wise scale: dst[i] = src[i] * alpha
    ///
    /// # Safety
    ///
    /// - `dst` must have length >= `src.len()`
    /// - The backend's instruction set must be available
    unsafe fn scale_f32(src: &[f32], alpha: f32, dst: &mut [f32]);

    /// Lane-wise scale: dst[i] = src[i] * alpha
    ///
    /// # Safety
    ///
    /// - `dst` must have length >= `src.len()`
    /// - The backend's instruction set must be available
    unsafe fn scale_f64(src: &[f64], alpha: f64, dst: &mut [f64]);
}

/// Split a length into the part covered by full lane groups and the scalar tail
///
/// # Examples
///
/// ```
/// use trueno_scal::backends::lane_split;
///
/// assert_eq!(lane_split(10), (8, 2));
/// assert_eq!(lane_split(4096), (4096, 0));
/// assert_eq!(lane_split(3), (0, 3));
/// ```
pub fn lane_split(len: usize) -> (usize, usize) {
    let vector_len = len - len % LANES;
    (vector_len, len - vector_len)
}
