//! A dynamically typed n-dimensional array: the thing the
//! decoder produces and the encoder consumes. Each variant
//! wraps an owned [`ArrayD`] of one sample type; the enum is
//! what lets a caller hold "whatever the file contained"
//! without generics leaking into the public entry points.

use ndarray::ArrayD;

use crate::dtype::SampleType;

/// Dispatches `$body` over whichever sample type `$self_`
/// holds, binding the inner `ArrayD` to `$arr`. Every arm
/// must produce the same type.
macro_rules! with_each_array {
    ($self_ : expr, $arr : ident => $body : expr) => {
        match $self_ {
            IcsArray::UInt8($arr) => $body,
            IcsArray::Int8($arr) => $body,
            IcsArray::UInt16($arr) => $body,
            IcsArray::Int16($arr) => $body,
            IcsArray::UInt32($arr) => $body,
            IcsArray::Int32($arr) => $body,
            IcsArray::Float32($arr) => $body,
            IcsArray::Float64($arr) => $body,
            IcsArray::UInt64($arr) => $body,
            IcsArray::Int64($arr) => $body,
        }
    };
}

/// An owned n-dimensional array of one of the sample types an
/// ICS file can (or, for the 64-bit integer variants, cannot)
/// hold. Constructed by decoding a file or by converting an
/// `ArrayD` with `From`/`Into`:
///
/// ```
/// use ndarray::Array2;
/// use corroics::IcsArray;
///
/// let frame = Array2::<u16>::zeros((512, 512)).into_dyn();
/// let data = IcsArray::from(frame);
/// assert_eq!(data.shape(), &[512, 512]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum IcsArray {
    UInt8(ArrayD<u8>),
    Int8(ArrayD<i8>),
    UInt16(ArrayD<u16>),
    Int16(ArrayD<i16>),
    UInt32(ArrayD<u32>),
    Int32(ArrayD<i32>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    UInt64(ArrayD<u64>),
    Int64(ArrayD<i64>),
}

impl IcsArray {
    /// The tag of the sample type this array holds.
    pub fn sample_type(&self) -> SampleType {
        match self {
            IcsArray::UInt8(_) => SampleType::UInt8,
            IcsArray::Int8(_) => SampleType::Int8,
            IcsArray::UInt16(_) => SampleType::UInt16,
            IcsArray::Int16(_) => SampleType::Int16,
            IcsArray::UInt32(_) => SampleType::UInt32,
            IcsArray::Int32(_) => SampleType::Int32,
            IcsArray::Float32(_) => SampleType::Float32,
            IcsArray::Float64(_) => SampleType::Float64,
            IcsArray::UInt64(_) => SampleType::UInt64,
            IcsArray::Int64(_) => SampleType::Int64,
        }
    }

    /// Shape in row-major (slowest-varying axis first) order.
    pub fn shape(&self) -> &[usize] {
        with_each_array!(self, arr => arr.shape())
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        with_each_array!(self, arr => arr.ndim())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        with_each_array!(self, arr => arr.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total size of the sample data in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.sample_type().size()
    }

    /// Whether the backing memory is packed, row-major, and
    /// contiguous -- i.e. suitable for a direct raw dump with
    /// no normalizing copy.
    pub fn is_standard_layout(&self) -> bool {
        with_each_array!(self, arr => arr.is_standard_layout())
    }
}

macro_rules! impl_from_array {
    ($t : ty, $variant : ident) => {
        impl From<ArrayD<$t>> for IcsArray {
            fn from(arr : ArrayD<$t>) -> Self {
                IcsArray::$variant(arr)
            }
        }
    };
}

impl_from_array!(u8, UInt8);
impl_from_array!(i8, Int8);
impl_from_array!(u16, UInt16);
impl_from_array!(i16, Int16);
impl_from_array!(u32, UInt32);
impl_from_array!(i32, Int32);
impl_from_array!(f32, Float32);
impl_from_array!(f64, Float64);
impl_from_array!(u64, UInt64);
impl_from_array!(i64, Int64);
