//! The two sample-type vocabularies this crate translates
//! between: the tags an ICS container stores (`IcsDataType`,
//! following the libics names) and the scalar types an
//! `ndarray` array can hold (`SampleType`). The translation
//! is a static table -- no approximation, no fallback. A tag
//! outside the eight supported kinds is an error in both
//! directions.

use crate::utils::CorroicsError;

/// The largest number of dimensions an ICS layout may declare.
pub const ICS_MAX_DIM : usize = 10;

/// Data-type tags as an ICS container stores them. The names
/// follow the libics convention (`sint` for signed integers,
/// `real` for floating point). `Complex32`, `Complex64`, and
/// `Unknown` can appear in a file but have no array equivalent
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcsDataType {
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
    Real32,
    Real64,
    Complex32,
    Complex64,
    Unknown,
}

/// The `format` field of an ICS header's `representation`
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsFormat {
    Integer,
    Real,
    Complex,
}

impl IcsDataType {
    /// Bytes per sample. `Unknown` has no defined width and
    /// reports 0, which makes any data-size computation built
    /// on it collapse to an empty buffer rather than a bogus one.
    pub fn size(&self) -> usize {
        match self {
            IcsDataType::Uint8 | IcsDataType::Sint8 => 1,
            IcsDataType::Uint16 | IcsDataType::Sint16 => 2,
            IcsDataType::Uint32 | IcsDataType::Sint32 => 4,
            IcsDataType::Real32 => 4,
            IcsDataType::Real64 => 8,
            IcsDataType::Complex32 => 8,
            IcsDataType::Complex64 => 16,
            IcsDataType::Unknown => 0,
        }
    }

    /// The `(format, signed, bits)` triple the text header
    /// stores for this tag. `Unknown` stores nothing.
    pub fn props(&self) -> Option<(IcsFormat, bool, usize)> {
        match self {
            IcsDataType::Uint8 => Some((IcsFormat::Integer, false, 8)),
            IcsDataType::Sint8 => Some((IcsFormat::Integer, true, 8)),
            IcsDataType::Uint16 => Some((IcsFormat::Integer, false, 16)),
            IcsDataType::Sint16 => Some((IcsFormat::Integer, true, 16)),
            IcsDataType::Uint32 => Some((IcsFormat::Integer, false, 32)),
            IcsDataType::Sint32 => Some((IcsFormat::Integer, true, 32)),
            IcsDataType::Real32 => Some((IcsFormat::Real, true, 32)),
            IcsDataType::Real64 => Some((IcsFormat::Real, true, 64)),
            IcsDataType::Complex32 => Some((IcsFormat::Complex, true, 64)),
            IcsDataType::Complex64 => Some((IcsFormat::Complex, true, 128)),
            IcsDataType::Unknown => None,
        }
    }

    /// Rebuilds a tag from the `(format, signed, bits)` triple
    /// parsed out of a text header. Any triple outside the table
    /// is `Unknown` -- the rejection happens later, in the mapper,
    /// so that a file with an exotic type still *opens* and reports
    /// a type error rather than a parse error.
    pub fn from_props(format : IcsFormat, signed : bool, bits : usize) -> Self {
        match (format, signed, bits) {
            (IcsFormat::Integer, false, 8) => IcsDataType::Uint8,
            (IcsFormat::Integer, true, 8) => IcsDataType::Sint8,
            (IcsFormat::Integer, false, 16) => IcsDataType::Uint16,
            (IcsFormat::Integer, true, 16) => IcsDataType::Sint16,
            (IcsFormat::Integer, false, 32) => IcsDataType::Uint32,
            (IcsFormat::Integer, true, 32) => IcsDataType::Sint32,
            (IcsFormat::Real, _, 32) => IcsDataType::Real32,
            (IcsFormat::Real, _, 64) => IcsDataType::Real64,
            (IcsFormat::Complex, _, 64) => IcsDataType::Complex32,
            (IcsFormat::Complex, _, 128) => IcsDataType::Complex64,
            _ => IcsDataType::Unknown,
        }
    }
}

/// Scalar types an [`IcsArray`](crate::IcsArray) can hold.
/// The eight kinds with an ICS mapping, plus the 64-bit
/// integers, which exist on the array side (they are what a
/// lot of numeric code produces by default) but cannot be
/// stored in an ICS file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
    UInt64,
    Int64,
}

impl SampleType {
    /// Maps a container tag to the array sample type it decodes
    /// into.
    ///
    /// ## Arguments
    ///
    /// * `dt` - The tag read from the container's layout
    ///
    /// ## Returns
    ///
    /// * `Ok(SampleType)` for the eight supported kinds
    /// * `Err(CorroicsError::UnsupportedType)` for complex or
    /// unknown tags
    pub fn from_ics(dt : IcsDataType) -> Result<Self, CorroicsError> {
        match dt {
            IcsDataType::Uint8 => Ok(SampleType::UInt8),
            IcsDataType::Sint8 => Ok(SampleType::Int8),
            IcsDataType::Uint16 => Ok(SampleType::UInt16),
            IcsDataType::Sint16 => Ok(SampleType::Int16),
            IcsDataType::Uint32 => Ok(SampleType::UInt32),
            IcsDataType::Sint32 => Ok(SampleType::Int32),
            IcsDataType::Real32 => Ok(SampleType::Float32),
            IcsDataType::Real64 => Ok(SampleType::Float64),
            IcsDataType::Complex32 | IcsDataType::Complex64 => {
                Err(CorroicsError::UnsupportedType(
                    format!("ICS data type {:?} has no array equivalent", dt)
                ))
            },
            IcsDataType::Unknown => Err(CorroicsError::UnsupportedType(
                "ICS data type is unknown".to_string()
            )),
        }
    }

    /// Maps an array sample type to the container tag it encodes
    /// as. The inverse of `from_ics` over the eight supported
    /// kinds; 64-bit integers are rejected.
    pub fn to_ics(self) -> Result<IcsDataType, CorroicsError> {
        match self {
            SampleType::UInt8 => Ok(IcsDataType::Uint8),
            SampleType::Int8 => Ok(IcsDataType::Sint8),
            SampleType::UInt16 => Ok(IcsDataType::Uint16),
            SampleType::Int16 => Ok(IcsDataType::Sint16),
            SampleType::UInt32 => Ok(IcsDataType::Uint32),
            SampleType::Int32 => Ok(IcsDataType::Sint32),
            SampleType::Float32 => Ok(IcsDataType::Real32),
            SampleType::Float64 => Ok(IcsDataType::Real64),
            SampleType::UInt64 | SampleType::Int64 => {
                Err(CorroicsError::UnsupportedType(
                    format!("{:?} samples cannot be stored in an ICS file", self)
                ))
            },
        }
    }

    /// Bytes per sample.
    pub fn size(&self) -> usize {
        match self {
            SampleType::UInt8 | SampleType::Int8 => 1,
            SampleType::UInt16 | SampleType::Int16 => 2,
            SampleType::UInt32 | SampleType::Int32 => 4,
            SampleType::Float32 => 4,
            SampleType::Float64 | SampleType::UInt64 | SampleType::Int64 => 8,
        }
    }
}

/// Ties a Rust scalar type to its `SampleType` tag. The `Pod`
/// bound is what lets one generic read or write body serve every
/// sample type through a byte view of the same buffer.
pub trait IcsSample : bytemuck::Pod {
    const SAMPLE : SampleType;
}

impl IcsSample for u8 { const SAMPLE : SampleType = SampleType::UInt8; }
impl IcsSample for i8 { const SAMPLE : SampleType = SampleType::Int8; }
impl IcsSample for u16 { const SAMPLE : SampleType = SampleType::UInt16; }
impl IcsSample for i16 { const SAMPLE : SampleType = SampleType::Int16; }
impl IcsSample for u32 { const SAMPLE : SampleType = SampleType::UInt32; }
impl IcsSample for i32 { const SAMPLE : SampleType = SampleType::Int32; }
impl IcsSample for f32 { const SAMPLE : SampleType = SampleType::Float32; }
impl IcsSample for f64 { const SAMPLE : SampleType = SampleType::Float64; }
impl IcsSample for u64 { const SAMPLE : SampleType = SampleType::UInt64; }
impl IcsSample for i64 { const SAMPLE : SampleType = SampleType::Int64; }
