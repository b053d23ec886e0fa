//! SSE2 backend implementation (x86_64 baseline SIMD)
//!
//! This backend uses SSE2 intrinsics for 128-bit SIMD operations.
//! SSE2 is available on all x86_64 CPUs as a baseline requirement.
//!
//! One lane group is a single `__m128` for f32 and a pair of `__m128d`
//! registers for f64.
//!
//! # Safety
//!
//! All SSE2 intrinsics are marked `unsafe` by Rust. This module carefully isolates
//! all unsafe code and verifies correctness through comprehensive testing.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{ScaleBackend, LANES};

/// SSE2 backend (128-bit SIMD for x86_64)
pub struct Sse2Backend;

impl ScaleBackend for Sse2Backend {
    #[target_feature(enable = "sse2")]
    unsafe fn scale_f32(src: &[f32], alpha: f32, dst: &mut [f32]) {
        let len = src.len();
        let mut i = 0;

        // Broadcast scalar to all 4 lanes
        let valpha = _mm_set1_ps(alpha);

        while i + LANES <= len {
            let v = _mm_loadu_ps(src.as_ptr().add(i));
            let vresult = _mm_mul_ps(v, valpha);
            _mm_storeu_ps(dst.as_mut_ptr().add(i), vresult);
            i += LANES;
        }

        // Handle remaining elements
        while i < len {
            dst[i] = src[i] * alpha;
            i += 1;
        }
    }

    #[target_feature(enable = "sse2")]
    unsafe fn scale_f64(src: &[f64], alpha: f64, dst: &mut [f64]) {
        let len = src.len();
        let mut i = 0;

        let valpha = _mm_set1_pd(alpha);

        while i + LANES <= len {
            let lo = _mm_loadu_pd(src.as_ptr().add(i));
            let hi = _mm_loadu_pd(src.as_ptr().add(i + 2));
            _mm_storeu_pd(dst.as_mut_ptr().add(i), _mm_mul_pd(lo, valpha));
            _mm_storeu_pd(dst.as_mut_ptr().add(i + 2), _mm_mul_pd(hi, valpha));
            i += LANES;
        }

        while i < len {
            dst[i] = src[i] * alpha;
            i += 1;
        }
    }
}
