//! Precision variants and the tagged scale factor
//!
//! The pipeline is written once, generic over [`Element`]. `f32` and `f64`
//! are the two instantiations; they differ in element width, default chunk
//! length and how the caller's [`Scalar`] resolves.

use std::fmt;
use std::ops::Mul;

#[cfg(target_arch = "x86_64")]
use crate::backends::{avx2::Avx2Backend, sse2::Sse2Backend};
use crate::backends::{scalar::ScalarBackend, ScaleBackend};
use crate::config::ScalConfig;
use crate::{Backend, Result, ScalError};

/// Largest magnitude an `i32` may have and still be exact in an `f32`
const F32_EXACT_INT: u32 = 1 << f32::MANTISSA_DIGITS;

/// Element precision of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 32-bit IEEE floating point
    Single,
    /// 64-bit IEEE floating point
    Double,
}

impl Precision {
    /// Size of one element in bytes
    pub fn element_bytes(self) -> usize {
        match self {
            Precision::Single => std::mem::size_of::<f32>(),
            Precision::Double => std::mem::size_of::<f64>(),
        }
    }
}

/// Scale factor with an explicit type tag
///
/// Resolved exactly once, at dispatch, into the operation's precision.
/// Only exact conversions are accepted.
///
/// # Examples
///
/// ```
/// use trueno_scal::Scalar;
///
/// assert_eq!(Scalar::F32(1.5).to_f64().unwrap(), 1.5);
/// assert_eq!(Scalar::I32(-7).to_f32().unwrap(), -7.0);
/// assert!(Scalar::F64(0.1).to_f32().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Double precision value
    F64(f64),
    /// Single precision value
    F32(f32),
    /// Integer value
    I32(i32),
}

impl Scalar {
    /// Resolve to a single precision factor
    pub fn to_f32(self) -> Result<f32> {
        match self {
            Scalar::F32(v) => Ok(v),
            Scalar::F64(v) => {
                let narrowed = v as f32;
                if v.is_nan() || f64::from(narrowed) == v {
                    Ok(narrowed)
                } else {
                    Err(self.not_representable(Precision::Single))
                }
            }
            Scalar::I32(v) if v.unsigned_abs() <= F32_EXACT_INT => Ok(v as f32),
            Scalar::I32(_) => Err(self.not_representable(Precision::Single)),
        }
    }

    /// Resolve to a double precision factor
    ///
    /// Every tag widens exactly into `f64`, so this never fails today; it
    /// returns `Result` to keep both resolutions interchangeable.
    pub fn to_f64(self) -> Result<f64> {
        Ok(match self {
            Scalar::F64(v) => v,
            Scalar::F32(v) => f64::from(v),
            Scalar::I32(v) => f64::from(v),
        })
    }

    fn not_representable(self, precision: Precision) -> ScalError {
        ScalError::ScalarNotRepresentable {
            value: self,
            precision,
        }
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::F32(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::F64(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::I32(v)
    }
}

/// Element type the pipeline can be instantiated for
pub trait Element:
    Copy + Default + PartialEq + fmt::Debug + Send + Sync + Mul<Output = Self> + 'static
{
    /// Precision tag of this element type
    const PRECISION: Precision;

    /// Resolve the caller's tagged scalar into this precision
    fn resolve(alpha: Scalar) -> Result<Self>;

    /// Staging buffer length (`BUFFSIZE`) configured for this precision
    fn chunk_len(config: &ScalConfig) -> usize;

    /// Scale `src` into `dst[..src.len()]` with the given backend
    ///
    /// # Safety
    ///
    /// - `backend` must be available on this CPU (see [`Backend::is_available`])
    /// - `dst` must have length >= `src.len()`
    unsafe fn scale_lanes(backend: Backend, src: &[Self], alpha: Self, dst: &mut [Self]);
}

impl Element for f32 {
    const PRECISION: Precision = Precision::Single;

    fn resolve(alpha: Scalar) -> Result<Self> {
        alpha.to_f32()
    }

    fn chunk_len(config: &ScalConfig) -> usize {
        config.chunk_f32
    }

    unsafe fn scale_lanes(backend: Backend, src: &[f32], alpha: f32, dst: &mut [f32]) {
        match backend {
            #[cfg(target_arch = "x86_64")]
            Backend::AVX2 => Avx2Backend::scale_f32(src, alpha, dst),
            #[cfg(target_arch = "x86_64")]
            Backend::SSE2 => Sse2Backend::scale_f32(src, alpha, dst),
            _ => ScalarBackend::scale_f32(src, alpha, dst),
        }
    }
}

impl Element for f64 {
    const PRECISION: Precision = Precision::Double;

    fn resolve(alpha: Scalar) -> Result<Self> {
        alpha.to_f64()
    }

    fn chunk_len(config: &ScalConfig) -> usize {
        config.chunk_f64
    }

    unsafe fn scale_lanes(backend: Backend, src: &[f64], alpha: f64, dst: &mut [f64]) {
        match backend {
            #[cfg(target_arch = "x86_64")]
            Backend::AVX2 => Avx2Backend::scale_f64(src, alpha, dst),
            #[cfg(target_arch = "x86_64")]
            Backend::SSE2 => Sse2Backend::scale_f64(src, alpha, dst),
            _ => ScalarBackend::scale_f64(src, alpha, dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_bytes() {
        assert_eq!(Precision::Single.element_bytes(), 4);
        assert_eq!(Precision::Double.element_bytes(), 8);
    }

    #[test]
    fn test_f32_resolution() {
        assert_eq!(Scalar::F32(2.0).to_f32().unwrap(), 2.0);
        assert_eq!(Scalar::F64(0.5).to_f32().unwrap(), 0.5);
        assert_eq!(Scalar::F64(f64::INFINITY).to_f32().unwrap(), f32::INFINITY);
        assert!(Scalar::F64(f64::NAN).to_f32().unwrap().is_nan());
        assert_eq!(Scalar::I32(16_777_216).to_f32().unwrap(), 16_777_216.0);
        assert_eq!(Scalar::I32(-16_777_216).to_f32().unwrap(), -16_777_216.0);
    }

    #[test]
    fn test_f32_resolution_rejects_inexact() {
        assert_eq!(
            Scalar::F64(0.1).to_f32(),
            Err(ScalError::ScalarNotRepresentable {
                value: Scalar::F64(0.1),
                precision: Precision::Single,
            })
        );
        assert!(Scalar::I32(16_777_217).to_f32().is_err());
        assert!(Scalar::I32(i32::MIN).to_f32().is_err());
        assert!(Scalar::F64(1e300).to_f32().is_err());
    }

    #[test]
    fn test_f64_resolution_widens_exactly() {
        assert_eq!(Scalar::F64(0.1).to_f64().unwrap(), 0.1);
        assert_eq!(Scalar::F32(0.1).to_f64().unwrap(), f64::from(0.1f32));
        assert_eq!(Scalar::I32(i32::MIN).to_f64().unwrap(), -2_147_483_648.0);
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Scalar::from(1.0f32), Scalar::F32(1.0));
        assert_eq!(Scalar::from(1.0f64), Scalar::F64(1.0));
        assert_eq!(Scalar::from(3), Scalar::I32(3));
    }

    #[test]
    fn test_element_resolve_and_chunk() {
        let config = ScalConfig::default();
        assert_eq!(<f32 as Element>::resolve(Scalar::I32(2)).unwrap(), 2.0f32);
        assert_eq!(<f64 as Element>::resolve(Scalar::F32(0.25)).unwrap(), 0.25f64);
        assert_eq!(<f32 as Element>::chunk_len(&config), config.chunk_f32);
        assert_eq!(<f64 as Element>::chunk_len(&config), config.chunk_f64);
        assert_eq!(<f32 as Element>::PRECISION, Precision::Single);
        assert_eq!(<f64 as Element>::PRECISION, Precision::Double);
    }

    #[test]
    fn test_scale_lanes_scalar_backend() {
        let src = [1.0f64, 2.0, 3.0, 4.0, 5.0];
        let mut dst = [0.0f64; 5];
        unsafe {
            <f64 as Element>::scale_lanes(Backend::Scalar, &src, 3.0, &mut dst);
        }
        assert_eq!(dst, [3.0, 6.0, 9.0, 12.0, 15.0]);
    }
}
