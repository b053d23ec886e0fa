//! Launch configuration
//!
//! # Examples
//!
//! ```
//! use trueno_scal::{Backend, ScalConfig};
//!
//! let config = ScalConfig::new()
//!     .with_workers(8)
//!     .with_local_store_bytes(32 * 1024)
//!     .with_chunk_f32(1024)
//!     .with_backend(Backend::Scalar)
//!     .build();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.workers, 8);
//! ```

use crate::backends::LANES;
use crate::chaos::ChaosConfig;
use crate::{Backend, Result, ScalError};

/// Default worker population
pub const DEFAULT_WORKERS: usize = 64;

/// Default per-worker local store capacity in bytes
pub const DEFAULT_LOCAL_STORE_BYTES: usize = 64 * 1024;

/// Default staging buffer length for single precision
pub const DEFAULT_CHUNK_F32: usize = 4 * 1024;

/// Default staging buffer length for double precision
pub const DEFAULT_CHUNK_F64: usize = 2 * 1024;

/// Configuration shared by every worker of one launch
#[derive(Debug, Clone, PartialEq)]
pub struct ScalConfig {
    /// Worker population `P`
    pub workers: usize,
    /// Capacity of each worker's local store in bytes
    pub local_store_bytes: usize,
    /// Staging buffer length (elements) for f32 operations
    pub chunk_f32: usize,
    /// Staging buffer length (elements) for f64 operations
    pub chunk_f64: usize,
    /// SIMD backend for the compute kernel
    pub backend: Backend,
    /// Fault injection settings
    pub chaos: ChaosConfig,
}

impl Default for ScalConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            local_store_bytes: DEFAULT_LOCAL_STORE_BYTES,
            chunk_f32: DEFAULT_CHUNK_F32,
            chunk_f64: DEFAULT_CHUNK_F64,
            backend: Backend::Auto,
            chaos: ChaosConfig::default(),
        }
    }
}

impl ScalConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker population
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-worker local store capacity in bytes
    pub fn with_local_store_bytes(mut self, bytes: usize) -> Self {
        self.local_store_bytes = bytes;
        self
    }

    /// Set the single precision staging buffer length
    pub fn with_chunk_f32(mut self, elements: usize) -> Self {
        self.chunk_f32 = elements;
        self
    }

    /// Set the double precision staging buffer length
    pub fn with_chunk_f64(mut self, elements: usize) -> Self {
        self.chunk_f64 = elements;
        self
    }

    /// Set both staging buffer lengths at once
    pub fn with_chunk(self, elements: usize) -> Self {
        self.with_chunk_f32(elements).with_chunk_f64(elements)
    }

    /// Select the SIMD backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Attach fault injection settings
    pub fn with_chaos(mut self, chaos: ChaosConfig) -> Self {
        self.chaos = chaos;
        self
    }

    /// Finalize configuration (no-op, for builder pattern consistency)
    pub fn build(self) -> Self {
        self
    }

    /// Check structural invariants
    ///
    /// Whether the staging buffers fit the local store is not checked here;
    /// each worker reports that at acquisition as [`ScalError::ResourceExhausted`].
    ///
    /// # Examples
    ///
    /// ```
    /// use trueno_scal::ScalConfig;
    ///
    /// assert!(ScalConfig::new().with_workers(0).validate().is_err());
    /// assert!(ScalConfig::new().with_chunk_f32(6).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScalError::InvalidConfig(
                "worker population must be > 0".to_string(),
            ));
        }
        for (name, chunk) in [("chunk_f32", self.chunk_f32), ("chunk_f64", self.chunk_f64)] {
            if chunk == 0 || chunk % LANES != 0 {
                return Err(ScalError::InvalidConfig(format!(
                    "{name} must be a non-zero multiple of {LANES}, got {chunk}"
                )));
            }
        }
        Ok(())
    }

    /// Resolve `Backend::Auto` and verify the backend is usable on this CPU
    pub fn resolved_backend(&self) -> Result<Backend> {
        self.backend.resolve()
    }

    /// Local store capacity after applying the chaos memory limit
    pub fn effective_local_store_bytes(&self) -> usize {
        match self.chaos.memory_limit {
            0 => self.local_store_bytes,
            limit => limit.min(self.local_store_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScalConfig::default();
        assert_eq!(config.workers, 64);
        assert_eq!(config.local_store_bytes, 64 * 1024);
        assert_eq!(config.chunk_f32, 4096);
        assert_eq!(config.chunk_f64, 2048);
        assert_eq!(config.backend, Backend::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_staging_pairs_fit_local_store() {
        let config = ScalConfig::default();
        assert!(2 * config.chunk_f32 * 4 <= config.local_store_bytes);
        assert!(2 * config.chunk_f64 * 8 <= config.local_store_bytes);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ScalConfig::new()
            .with_workers(3)
            .with_local_store_bytes(1024)
            .with_chunk(16)
            .with_backend(Backend::Scalar)
            .build();

        assert_eq!(config.workers, 3);
        assert_eq!(config.local_store_bytes, 1024);
        assert_eq!(config.chunk_f32, 16);
        assert_eq!(config.chunk_f64, 16);
        assert_eq!(config.backend, Backend::Scalar);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let err = ScalConfig::new().with_workers(0).validate().unwrap_err();
        assert_eq!(
            err,
            ScalError::InvalidConfig("worker population must be > 0".to_string())
        );
    }

    #[test]
    fn test_validate_rejects_non_lane_multiple_chunk() {
        let err = ScalConfig::new().with_chunk_f64(10).validate().unwrap_err();
        assert_eq!(
            err,
            ScalError::InvalidConfig(
                "chunk_f64 must be a non-zero multiple of 4, got 10".to_string()
            )
        );
        assert!(ScalConfig::new().with_chunk_f32(0).validate().is_err());
    }

    #[test]
    fn test_resolved_backend() {
        let auto = ScalConfig::new().resolved_backend().unwrap();
        assert_ne!(auto, Backend::Auto);

        let scalar = ScalConfig::new().with_backend(Backend::Scalar);
        assert_eq!(scalar.resolved_backend().unwrap(), Backend::Scalar);
    }

    #[cfg(not(target_arch = "x86_64"))]
    #[test]
    fn test_resolved_backend_rejects_missing_simd() {
        let config = ScalConfig::new().with_backend(Backend::AVX2);
        assert_eq!(
            config.resolved_backend(),
            Err(ScalError::UnsupportedBackend(Backend::AVX2))
        );
    }

    #[test]
    fn test_effective_local_store_bytes() {
        let config = ScalConfig::new().with_local_store_bytes(4096);
        assert_eq!(config.effective_local_store_bytes(), 4096);

        let limited = config
            .clone()
            .with_chaos(ChaosConfig::new().with_memory_limit(1024));
        assert_eq!(limited.effective_local_store_bytes(), 1024);

        let loose = config.with_chaos(ChaosConfig::new().with_memory_limit(1 << 20));
        assert_eq!(loose.effective_local_store_bytes(), 4096);
    }
}
