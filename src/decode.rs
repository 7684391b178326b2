//! Decoding: an open container becomes an owned, typed array.
//!
//! The sample buffer is allocated once, filled through its byte
//! view, and handed to the array whole -- the array is the sole
//! owner from construction on, and every early return before
//! that point releases the buffer and the container by scope.

use std::path::Path;

use bytemuck::Zeroable;
use ndarray::{ArrayD, IxDyn};

use crate::array::IcsArray;
use crate::container::IcsReader;
use crate::dtype::{IcsSample, SampleType};
use crate::utils::CorroicsError;
use crate::IcsRead;

pub (crate) fn decode(path : &Path, debug : bool) -> Result<IcsRead, CorroicsError> {
    let file = IcsReader::open(path)?;
    let nbytes = file.data_size();

    if debug {
        let layout = file.layout();
        eprintln!("read_ics: {} dimensions: {:?}", layout.ndim(), layout.dimensions);
        eprintln!("read_ics: data size: {} bytes", nbytes);
    }

    // Complex and unknown tags stop here, before anything is
    // allocated or read.
    let sample = SampleType::from_ics(file.layout().data_type)?;

    // The container's fastest-varying axis is the array's last
    // axis, so the shape is the layout reversed.
    let mut shape = file.layout().dimensions.clone();
    shape.reverse();

    let data = match sample {
        SampleType::UInt8 => IcsArray::from(read_samples::<u8>(file, &shape, nbytes)?),
        SampleType::Int8 => IcsArray::from(read_samples::<i8>(file, &shape, nbytes)?),
        SampleType::UInt16 => IcsArray::from(read_samples::<u16>(file, &shape, nbytes)?),
        SampleType::Int16 => IcsArray::from(read_samples::<i16>(file, &shape, nbytes)?),
        SampleType::UInt32 => IcsArray::from(read_samples::<u32>(file, &shape, nbytes)?),
        SampleType::Int32 => IcsArray::from(read_samples::<i32>(file, &shape, nbytes)?),
        SampleType::Float32 => IcsArray::from(read_samples::<f32>(file, &shape, nbytes)?),
        SampleType::Float64 => IcsArray::from(read_samples::<f64>(file, &shape, nbytes)?),
        // `from_ics` never produces the 64-bit integer kinds.
        SampleType::UInt64 | SampleType::Int64 => {
            return Err(CorroicsError::UnsupportedType(
                format!("{:?} samples cannot come from an ICS file", sample)
            ));
        },
    };

    Ok(IcsRead {
        data,
        header : "<empty>".to_string(),
    })
}

/// Reads the container's sample bytes into a fresh typed buffer,
/// closes the container, and builds the array that takes the
/// buffer over.
///
/// The `from_shape_vec` at the end is the single ownership
/// transfer: the vector moves into the array, which frees it
/// exactly once when it is itself dropped. A shape/length
/// disagreement there means the array could not own a buffer
/// matching its shape, which is an internal invariant violation.
fn read_samples<T : IcsSample>(
    mut file : IcsReader,
    shape : &[usize],
    nbytes : usize,
) -> Result<ArrayD<T>, CorroicsError> {
    let count = nbytes / std::mem::size_of::<T>();
    let mut samples = vec![T::zeroed(); count];

    file.read_data(bytemuck::cast_slice_mut(&mut samples))?;
    file.close()?;

    ArrayD::from_shape_vec(IxDyn(shape), samples).map_err(|err| {
        CorroicsError::OwnershipFailure(format!(
            "array of shape {:?} could not adopt {} samples: {}",
            shape, count, err
        ))
    })
}
