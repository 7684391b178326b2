//! Read and write Image Cytometry Standard (`.ics`) files as
//! `ndarray` arrays.
//!
//! Two entry points form the whole surface: [`read`] decodes a
//! file into an [`IcsArray`] (an owned n-dimensional array of
//! whatever sample type the file holds), and [`write`] encodes
//! an [`IcsArray`] into a fresh version 2.0 file. Everything
//! else -- the container handles, the sample-type tables -- is
//! re-exported for callers that need to poke at files directly.
//!
//! Dimension order: an ICS container lists its dimensions
//! fastest-varying axis first, an array shape lists them
//! slowest first. Both entry points apply the reversal, so a
//! `(2, 3)` array round-trips as a `(2, 3)` array even though
//! the file itself says `3 2`.

mod array;
mod container;
mod decode;
mod dtype;
mod encode;
mod utils;

pub use array::IcsArray;
pub use container::{IcsLayout, IcsReader, IcsWriter};
pub use container::header::{HeaderError, IcsVersion};
pub use dtype::{IcsDataType, IcsFormat, IcsSample, SampleType, ICS_MAX_DIM};
pub use utils::CorroicsError;

use std::path::Path;

/// What [`read`] hands back: the decoded array and a header
/// placeholder.
///
/// No structured header metadata is extracted here -- `header`
/// is always the literal `"<empty>"`. Callers that want layout
/// metadata without decoding the samples can open an
/// [`IcsReader`] themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct IcsRead {
    pub data : IcsArray,
    pub header : String,
}

/// `read(path, debug)` loads an ICS file and returns its sample
/// data as an owned array, together with the header placeholder.
///
/// ## Arguments
///
/// * `path` - The `.ics` file to read. Version 2.0 files are
/// self-contained; a version 1.0 header finds its samples in
/// the sibling `.ids` file.
/// * `debug` - Emit human-readable traces (dimensions, byte
/// sizes) on stderr. Never changes the result.
///
/// ## Example
///
/// ```rust, ignore
/// let loaded = corroics::read("image.ics", false)?;
/// println!("{:?}", loaded.data.shape());
/// ```
pub fn read(path : impl AsRef<Path>, debug : bool) -> Result<IcsRead, CorroicsError> {
    decode::decode(path.as_ref(), debug)
}

/// `read_data(path, debug)` loads an ICS file and returns only
/// the sample data, discarding the header placeholder.
pub fn read_data(path : impl AsRef<Path>, debug : bool) -> Result<IcsArray, CorroicsError> {
    Ok(read(path, debug)?.data)
}

/// `write(path, data, debug)` saves an array as a version 2.0
/// ICS file, overwriting whatever was at `path`.
///
/// The source array is not consumed and not modified. If its
/// memory is not packed row-major, a packed copy is made for
/// the duration of the write. Sample types with no ICS mapping
/// (the 64-bit integers) are rejected before the file is
/// created.
///
/// ## Arguments
///
/// * `path` - Destination path, conventionally ending in `.ics`
/// * `data` - The array to store
/// * `debug` - Emit human-readable traces (dimensions, byte
/// sizes, the contiguity decision) on stderr. Never changes the
/// result.
///
/// ## Example
///
/// ```rust, ignore
/// use ndarray::Array2;
/// use corroics::IcsArray;
///
/// let frame = Array2::<f64>::zeros((512, 512)).into_dyn();
/// corroics::write("image.ics", &IcsArray::from(frame), false)?;
/// ```
pub fn write(path : impl AsRef<Path>, data : &IcsArray, debug : bool) -> Result<(), CorroicsError> {
    encode::encode(path.as_ref(), data, debug)
}
