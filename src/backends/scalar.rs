//! Scalar (non-SIMD) backend implementation
//!
//! This is the portable baseline implementation that works on all platforms.
//! It keeps the same load / multiply / store structure as the SIMD backends, but
//! over `[T; LANES]` arrays, which the compiler is free to lower to whatever
//! vector unit the target has.
//!
//! # Performance
//!
//! This backend provides the correctness reference. Results are bit-identical
//! to the SIMD backends because each element sees exactly one multiply.

use std::ops::Mul;

use super::{lane_split, ScaleBackend, LANES};

/// Scalar backend (portable, no intrinsics)
pub struct ScalarBackend;

/// Shared lane loop for both precisions
fn scale_lanes<T>(src: &[T], alpha: T, dst: &mut [T])
where
    T: Copy + Default + Mul<Output = T>,
{
    let (vector_len, _) = lane_split(src.len());
    let valpha = [alpha; LANES];

    for (s, d) in src[..vector_len]
        .chunks_exact(LANES)
        .zip(dst[..vector_len].chunks_exact_mut(LANES))
    {
        let mut v = [T::default(); LANES];
        v.copy_from_slice(s);
        for (lane, a) in v.iter_mut().zip(valpha.iter()) {
            *lane = *lane * *a;
        }
        d.copy_from_slice(&v);
    }

    for i in vector_len..src.len() {
        dst[i] = src[i] * alpha;
    }
}

impl ScaleBackend for ScalarBackend {
    // SAFETY: This function is safe because:
    // 1. All slice accesses are bounds-checked by Rust slicing/indexing
    // 2. No raw pointer arithmetic is performed
    // 3. Marked unsafe only to match ScaleBackend trait interface
    unsafe fn scale_f32(src: &[f32], alpha: f32, dst: &mut [f32]) {
        scale_lanes(src, alpha, dst);
    }

    // SAFETY: This function is safe because:
    // 1. All slice accesses are bounds-checked by Rust slicing/indexing
    // 2. No raw pointer arithmetic is performed
    // 3. Marked unsafe only to match ScaleBackend trait interface
    unsafe fn scale_f64(src: &[f64], alpha: f64, dst: &mut [f64]) {
        scale_lanes(src, alpha, dst);
    }
}
