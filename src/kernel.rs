//! Vector compute kernel
//!
//! Multiplies a staged chunk by the broadcast scale factor: full
//! [`LANES`](crate::backends::LANES)-wide groups through the selected SIMD
//! backend, then a scalar loop for the last `< LANES` elements. Each element
//! goes through exactly one multiply with the operands in the same order on
//! every backend, so results are bit-reproducible.

use crate::precision::Element;
use crate::{Backend, Result, ScalError};

/// Scale kernel bound to one backend and one resolved factor
///
/// # Examples
///
/// ```
/// use trueno_scal::{kernel::ScaleKernel, Backend};
///
/// let kernel = ScaleKernel::new(Backend::Auto, 0.5f64).unwrap();
/// let mut out = [0.0f64; 6];
/// kernel.apply(&[2.0, 4.0, 6.0, 8.0, 10.0, 12.0], &mut out).unwrap();
/// assert_eq!(out, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleKernel<T> {
    backend: Backend,
    alpha: T,
}

impl<T: Element> ScaleKernel<T> {
    /// Bind the kernel, resolving `Backend::Auto`
    ///
    /// # Errors
    ///
    /// `UnsupportedBackend` if the requested SIMD backend is not available.
    pub fn new(backend: Backend, alpha: T) -> Result<Self> {
        Ok(Self {
            backend: backend.resolve()?,
            alpha,
        })
    }

    /// Backend the kernel runs on (never `Auto`)
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Scale factor
    pub fn alpha(&self) -> T {
        self.alpha
    }

    /// Write `src[i] * alpha` into `dst[i]` for every `i < src.len()`
    ///
    /// # Errors
    ///
    /// `SizeMismatch` if `dst` is shorter than `src`.
    pub fn apply(&self, src: &[T], dst: &mut [T]) -> Result<()> {
        if dst.len() < src.len() {
            return Err(ScalError::SizeMismatch {
                expected: src.len(),
                actual: dst.len(),
            });
        }

        // SAFETY: the backend was resolved and checked for availability in
        // `new`, and `dst` was checked to be at least as long as `src`.
        unsafe { T::scale_lanes(self.backend, src, self.alpha, &mut dst[..src.len()]) };
        Ok(())
    }
}
