//! AVX2 backend implementation (x86_64 advanced SIMD)
//!
//! This backend uses 256-bit registers. For f64 a single `__m256d` is exactly
//! one lane group. For f32 the main loop covers two groups per `__m256`, then
//! one 128-bit step picks up a last odd group before the scalar tail.
//!
//! No FMA is used: the kernel is a plain multiply, so results stay bit-identical
//! to the scalar backend.
//!
//! # Safety
//!
//! All AVX2 intrinsics are marked `unsafe` by Rust. This module carefully isolates
//! all unsafe code and verifies correctness through comprehensive testing.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{ScaleBackend, LANES};

/// AVX2 backend (256-bit SIMD for x86_64)
pub struct Avx2Backend;

impl ScaleBackend for Avx2Backend {
    #[target_feature(enable = "avx2")]
    unsafe fn scale_f32(src: &[f32], alpha: f32, dst: &mut [f32]) {
        let len = src.len();
        let mut i = 0;

        // Broadcast scalar to all 8 lanes
        let valpha = _mm256_set1_ps(alpha);

        // Two lane groups per register
        while i + 2 * LANES <= len {
            let v = _mm256_loadu_ps(src.as_ptr().add(i));
            let vresult = _mm256_mul_ps(v, valpha);
            _mm256_storeu_ps(dst.as_mut_ptr().add(i), vresult);
            i += 2 * LANES;
        }

        if i + LANES <= len {
            let v = _mm_loadu_ps(src.as_ptr().add(i));
            let vresult = _mm_mul_ps(v, _mm256_castps256_ps128(valpha));
            _mm_storeu_ps(dst.as_mut_ptr().add(i), vresult);
            i += LANES;
        }

        // Handle remaining elements
        while i < len {
            dst[i] = src[i] * alpha;
            i += 1;
        }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn scale_f64(src: &[f64], alpha: f64, dst: &mut [f64]) {
        let len = src.len();
        let mut i = 0;

        let valpha = _mm256_set1_pd(alpha);

        while i + LANES <= len {
            let v = _mm256_loadu_pd(src.as_ptr().add(i));
            let vresult = _mm256_mul_pd(v, valpha);
            _mm256_storeu_pd(dst.as_mut_ptr().add(i), vresult);
            i += LANES;
        }

        while i < len {
            dst[i] = src[i] * alpha;
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::scalar::ScalarBackend;
    use super::*;

    #[test]
    fn test_avx2_scale_f32_matches_scalar() {
        if !is_x86_feature_detected!("avx2") {
            eprintln!("Skipping AVX2 test: CPU does not support AVX2");
            return;
        }

        // 13 = one 8-wide step, one 4-wide step, one scalar element
        let a: Vec<f32> = (0..13).map(|i| i as f32 * 0.7 - 3.0).collect();
        let mut avx2_result = vec![0.0; 13];
        let mut scalar_result = vec![0.0; 13];

        unsafe {
            Avx2Backend::scale_f32(&a, 2.5, &mut avx2_result);
            ScalarBackend::scale_f32(&a, 2.5, &mut scalar_result);
        }

        assert_eq!(avx2_result, scalar_result);
    }

    #[test]
    fn test_avx2_scale_f64_matches_scalar() {
        if !is_x86_feature_detected!("avx2") {
            eprintln!("Skipping AVX2 test: CPU does not support AVX2");
            return;
        }

        let a: Vec<f64> = (0..11).map(|i| (i as f64).sqrt()).collect();
        let mut avx2_result = vec![0.0; 11];
        let mut scalar_result = vec![0.0; 11];

        unsafe {
            Avx2Backend::scale_f64(&a, std::f64::consts::PI, &mut avx2_result);
            ScalarBackend::scale_f64(&a, std::f64::consts::PI, &mut scalar_result);
        }

        for (x, y) in avx2_result.iter().zip(scalar_result.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_avx2_scale_every_tail_length() {
        if !is_x86_feature_detected!("avx2") {
            eprintln!("Skipping AVX2 test: CPU does not support AVX2");
            return;
        }

        for len in 0..20 {
            let a: Vec<f32> = (0..len).map(|i| i as f32 + 1.0).collect();
            let mut result = vec![0.0; len];
            unsafe {
                Avx2Backend::scale_f32(&a, 3.0, &mut result);
            }
            let expected: Vec<f32> = a.iter().map(|x| x * 3.0).collect();
            assert_eq!(result, expected, "len={len}");
        }
    }
}
