//! Encoding: an array becomes a freshly written container.
//!
//! The source array stays with the caller. When its memory is
//! already packed row-major it is dumped as-is; otherwise a
//! packed copy exists exactly for the duration of the call.

use std::path::Path;

use ndarray::ArrayD;

use crate::array::IcsArray;
use crate::container::IcsWriter;
use crate::dtype::IcsSample;
use crate::utils::CorroicsError;

/// The provenance annotation recorded in every file this crate
/// writes.
const AUTHOR : &str = concat!("corroics ", env!("CARGO_PKG_VERSION"));

pub (crate) fn encode(path : &Path, data : &IcsArray, debug : bool) -> Result<(), CorroicsError> {
    match data {
        IcsArray::UInt8(arr) => encode_samples(path, arr, debug),
        IcsArray::Int8(arr) => encode_samples(path, arr, debug),
        IcsArray::UInt16(arr) => encode_samples(path, arr, debug),
        IcsArray::Int16(arr) => encode_samples(path, arr, debug),
        IcsArray::UInt32(arr) => encode_samples(path, arr, debug),
        IcsArray::Int32(arr) => encode_samples(path, arr, debug),
        IcsArray::Float32(arr) => encode_samples(path, arr, debug),
        IcsArray::Float64(arr) => encode_samples(path, arr, debug),
        IcsArray::UInt64(arr) => encode_samples(path, arr, debug),
        IcsArray::Int64(arr) => encode_samples(path, arr, debug),
    }
}

fn encode_samples<T : IcsSample>(
    path : &Path,
    array : &ArrayD<T>,
    debug : bool,
) -> Result<(), CorroicsError> {
    // Unmappable sample types are rejected before the container
    // is created, so a failed encode never touches the disk.
    let data_type = T::SAMPLE.to_ics()?;

    if debug {
        if array.is_standard_layout() {
            eprintln!("write_ics: data is in standard layout.");
        } else {
            eprintln!("write_ics: data is not in standard layout, making a packed copy...");
        }
    }

    // Borrows a packed source unchanged, copies otherwise. The
    // copy is released when this call returns, on every path.
    let packed = array.as_standard_layout();
    let samples = packed.as_slice()
        .expect("a standard-layout array is contiguous");
    let bytes : &[u8] = bytemuck::cast_slice(samples);

    // The array's last axis is the container's fastest-varying
    // axis, so the container dimensions are the shape reversed.
    let mut dimensions = packed.shape().to_vec();
    dimensions.reverse();

    if debug {
        eprintln!("write_ics: dimensions: {:?}", dimensions);
        eprintln!("write_ics: data size: {} bytes", bytes.len());
    }

    let mut file = IcsWriter::create(path)?;
    file.set_layout(data_type, &dimensions);
    file.set_data(bytes);
    file.add_history("author", AUTHOR);
    file.close()
}
