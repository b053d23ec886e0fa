//! Operation descriptor and precision dispatch
//!
//! A [`ScaleOp`] carries type-erased vectors and a tagged [`Scalar`]. Dispatch
//! picks the precision variant once, from the vectors' tags, resolves the
//! scale factor into that precision, and hands the typed slices to
//! [`launch`](crate::launch()).

use crate::launch::{launch, LaunchReport};
use crate::precision::{Element, Precision, Scalar};
use crate::{Result, ScalConfig, ScalError};

/// Read-only input vector of either precision
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VectorRef<'a> {
    /// Single precision vector
    F32(&'a [f32]),
    /// Double precision vector
    F64(&'a [f64]),
}

impl VectorRef<'_> {
    /// Element precision
    pub fn precision(&self) -> Precision {
        match self {
            VectorRef::F32(_) => Precision::Single,
            VectorRef::F64(_) => Precision::Double,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            VectorRef::F32(v) => v.len(),
            VectorRef::F64(v) => v.len(),
        }
    }

    /// Whether the vector has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a [f32]> for VectorRef<'a> {
    fn from(v: &'a [f32]) -> Self {
        VectorRef::F32(v)
    }
}

impl<'a> From<&'a [f64]> for VectorRef<'a> {
    fn from(v: &'a [f64]) -> Self {
        VectorRef::F64(v)
    }
}

/// Output vector of either precision
#[derive(Debug, PartialEq)]
pub enum VectorMut<'a> {
    /// Single precision vector
    F32(&'a mut [f32]),
    /// Double precision vector
    F64(&'a mut [f64]),
}

impl VectorMut<'_> {
    /// Element precision
    pub fn precision(&self) -> Precision {
        match self {
            VectorMut::F32(_) => Precision::Single,
            VectorMut::F64(_) => Precision::Double,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            VectorMut::F32(v) => v.len(),
            VectorMut::F64(v) => v.len(),
        }
    }

    /// Whether the vector has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a mut [f32]> for VectorMut<'a> {
    fn from(v: &'a mut [f32]) -> Self {
        VectorMut::F32(v)
    }
}

impl<'a> From<&'a mut [f64]> for VectorMut<'a> {
    fn from(v: &'a mut [f64]) -> Self {
        VectorMut::F64(v)
    }
}

/// One scale invocation: `destination[i] = alpha * source[i]` for `i < count`
///
/// # Examples
///
/// ```
/// use trueno_scal::{dispatch, ScalConfig, ScaleOp, VectorMut, VectorRef};
///
/// let x = [1.0f64, 2.0, 3.0, 4.0];
/// let mut y = [0.0f64; 4];
///
/// // Integer factor, resolved exactly to f64; only the first 3 elements
/// let op = ScaleOp::new(VectorRef::F64(&x), VectorMut::F64(&mut y), 10).with_count(3);
/// dispatch(op, &ScalConfig::new().with_workers(2)).unwrap();
///
/// assert_eq!(y, [10.0, 20.0, 30.0, 0.0]);
/// ```
#[derive(Debug, PartialEq)]
pub struct ScaleOp<'a> {
    /// Input vector `x`
    pub source: VectorRef<'a>,
    /// Output vector `y`
    pub destination: VectorMut<'a>,
    /// Tagged scale factor
    pub alpha: Scalar,
    /// Number of elements to process
    pub count: usize,
}

impl<'a> ScaleOp<'a> {
    /// Describe a scale over the whole of `source`
    pub fn new(
        source: VectorRef<'a>,
        destination: VectorMut<'a>,
        alpha: impl Into<Scalar>,
    ) -> Self {
        let count = source.len();
        Self {
            source,
            destination,
            alpha: alpha.into(),
            count,
        }
    }

    /// Limit the operation to the first `count` elements
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Precision of the input vector
    pub fn precision(&self) -> Precision {
        self.source.precision()
    }
}

/// Run a scale operation at the precision its vectors carry
///
/// # Errors
///
/// - `PrecisionMismatch` if source and destination precisions differ
/// - `ScalarNotRepresentable` if `alpha` does not convert exactly
/// - `SizeMismatch` if `count` exceeds either vector
/// - anything [`launch`] returns
pub fn dispatch(op: ScaleOp<'_>, config: &ScalConfig) -> Result<LaunchReport> {
    let ScaleOp {
        source,
        destination,
        alpha,
        count,
    } = op;

    match (source, destination) {
        (VectorRef::F32(x), VectorMut::F32(y)) => run_variant(config, alpha, count, x, y),
        (VectorRef::F64(x), VectorMut::F64(y)) => run_variant(config, alpha, count, x, y),
        (x, y) => Err(ScalError::PrecisionMismatch {
            input: x.precision(),
            output: y.precision(),
        }),
    }
}

fn run_variant<T: Element>(
    config: &ScalConfig,
    alpha: Scalar,
    count: usize,
    source: &[T],
    destination: &mut [T],
) -> Result<LaunchReport> {
    let alpha = T::resolve(alpha)?;
    for len in [source.len(), destination.len()] {
        if count > len {
            return Err(ScalError::SizeMismatch {
                expected: count,
                actual: len,
            });
        }
    }
    launch(config, alpha, &source[..count], &mut destination[..count])
}

/// Single precision `y = alpha * x`
///
/// # Examples
///
/// ```
/// use trueno_scal::{scale_f32, ScalConfig};
///
/// let mut y = [0.0f32; 3];
/// scale_f32(&ScalConfig::new(), 0.5, &[2.0, 4.0, 6.0], &mut y).unwrap();
/// assert_eq!(y, [1.0, 2.0, 3.0]);
/// ```
pub fn scale_f32(
    config: &ScalConfig,
    alpha: f32,
    x: &[f32],
    y: &mut [f32],
) -> Result<LaunchReport> {
    dispatch(ScaleOp::new(VectorRef::F32(x), VectorMut::F32(y), alpha), config)
}

/// Double precision `y = alpha * x`
pub fn scale_f64(
    config: &ScalConfig,
    alpha: f64,
    x: &[f64],
    y: &mut [f64],
) -> Result<LaunchReport> {
    dispatch(ScaleOp::new(VectorRef::F64(x), VectorMut::F64(y), alpha), config)
}
