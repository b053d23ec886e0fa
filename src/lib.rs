//! Trueno-Scal: Partitioned, Memory-Tiled Vector Scaling
//!
//! **trueno-scal** computes `y[i] = alpha * x[i]` cooperatively across a fixed
//! population of workers. Each worker owns a small local store and reaches the
//! global vectors only through bulk transfers, so the interesting part is the
//! data-movement pipeline rather than the multiply:
//!
//! 1. **Partition** - split `[0, N)` into one contiguous range per worker
//! 2. **Stage** - acquire two fixed-size staging buffers from the local store
//! 3. **Transfer** - move chunks in and out, blocking on completion signals
//! 4. **Compute** - 4-lane SIMD multiply with a scalar tail
//!
//! # Design Principles
//!
//! - **Disjointness by construction**: workers receive `split_at_mut` windows
//!   of the destination, so overlapping writes cannot be expressed
//! - **Scoped local memory**: staging buffers release their bytes on drop
//! - **Runtime dispatch**: SIMD backend picked from CPU features, precision
//!   picked once from the operation descriptor
//! - **Bit-exact**: every element sees exactly one IEEE multiply on every backend
//!
//! # Quick Start
//!
//! ```rust
//! use trueno_scal::{scale_f32, ScalConfig};
//!
//! let config = ScalConfig::new().with_workers(4);
//! let x: Vec<f32> = (0..10).map(|i| i as f32).collect();
//! let mut y = vec![0.0f32; 10];
//!
//! let report = scale_f32(&config, 2.0, &x, &mut y).unwrap();
//!
//! assert_eq!(y, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0]);
//! assert_eq!(report.elements(), 10);
//! ```

pub mod backends;
pub mod chaos;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod global;
pub mod kernel;
pub mod launch;
pub mod local_store;
pub mod partition;
pub mod precision;
pub mod transfer;
pub mod worker;

pub use config::ScalConfig;
pub use dispatch::{dispatch, scale_f32, scale_f64, ScaleOp, VectorMut, VectorRef};
pub use error::{Result, ScalError};
pub use launch::{launch, launch_with, LaunchReport};
pub use partition::Partition;
pub use precision::{Element, Precision, Scalar};
pub use worker::WorkerReport;

/// SIMD backend used by the compute kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Scalar fallback (portable lane arrays, no intrinsics)
    Scalar,
    /// SSE2 (x86_64 baseline, 128-bit)
    SSE2,
    /// AVX2 (256-bit)
    AVX2,
    /// Auto-select best available
    Auto,
}

impl Backend {
    /// Select the best available backend for the current platform
    ///
    /// This is a convenience wrapper around `select_best_available_backend()`
    pub fn select_best() -> Self {
        select_best_available_backend()
    }

    /// Resolve `Auto` and verify the backend can run on this CPU
    ///
    /// # Examples
    ///
    /// ```
    /// use trueno_scal::Backend;
    ///
    /// assert_eq!(Backend::Scalar.resolve().unwrap(), Backend::Scalar);
    /// assert_ne!(Backend::Auto.resolve().unwrap(), Backend::Auto);
    /// ```
    pub fn resolve(self) -> Result<Self> {
        match self {
            Backend::Auto => Ok(select_best_available_backend()),
            backend if backend.is_available() => Ok(backend),
            backend => Err(ScalError::UnsupportedBackend(backend)),
        }
    }

    /// Whether this backend can run on the current CPU
    ///
    /// `Auto` is always available because it resolves to something that is.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar | Backend::Auto => true,
            #[cfg(target_arch = "x86_64")]
            Backend::SSE2 => is_x86_feature_detected!("sse2"),
            #[cfg(target_arch = "x86_64")]
            Backend::AVX2 => is_x86_feature_detected!("avx2"),
            #[cfg(not(target_arch = "x86_64"))]
            Backend::SSE2 | Backend::AVX2 => false,
        }
    }
}

/// Detect best SIMD backend for x86_64 platforms
#[cfg(target_arch = "x86_64")]
fn detect_x86_backend() -> Backend {
    if is_x86_feature_detected!("avx2") {
        return Backend::AVX2;
    }
    if is_x86_feature_detected!("sse2") {
        return Backend::SSE2;
    }
    Backend::Scalar
}

/// Select the best available backend for the current platform
///
/// **x86_64**: AVX2, then SSE2, then Scalar.
///
/// **Other platforms**: Scalar. The portable backend is written over 4-lane
/// arrays, which the compiler lowers to the native vector unit where one exists.
///
/// # Examples
///
/// ```
/// use trueno_scal::select_best_available_backend;
///
/// let backend = select_best_available_backend();
/// assert!(backend.is_available());
/// ```
pub fn select_best_available_backend() -> Backend {
    #[cfg(target_arch = "x86_64")]
    {
        detect_x86_backend()
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        Backend::Scalar
    }
}
