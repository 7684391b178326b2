use crate::container::header::HeaderError;

/// Errors that can occur while moving data between an ICS
/// container and an `ndarray` array, either from the file
/// itself (the `OpenFailed`/`ReadFailed`/`CloseFailed`
/// variants) or from the shape of the data being moved
/// (an unmappable sample type, or an array that could not
/// take ownership of its buffer).
#[derive(Debug)]
pub enum CorroicsError {
    /// The container could not be opened for reading or writing --
    /// a missing file, an unreadable file, or a malformed header.
    OpenFailed(String),
    /// The sample data could not be retrieved from an opened container.
    ReadFailed(String),
    /// Finalizing the container failed. On the write path this is
    /// where the actual header and data land on disk, so it is the
    /// most common point of failure.
    CloseFailed(String),
    /// The container's data type has no array equivalent, or the
    /// array's sample type cannot be stored in an ICS file.
    UnsupportedType(String),
    /// A freshly constructed array could not take sole ownership
    /// of the buffer read from the container. Indicates an internal
    /// invariant violation, not a user error.
    OwnershipFailure(String),
}

impl From<HeaderError> for CorroicsError {
    fn from(err : HeaderError) -> Self {
        CorroicsError::OpenFailed(err.to_string())
    }
}

impl std::error::Error for CorroicsError {}

impl std::fmt::Display for CorroicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CorroicsError::OpenFailed(msg) => {
                write!(f, "Could not open ICS file: {}", msg)
            },
            CorroicsError::ReadFailed(msg) => {
                write!(f, "Could not read ICS data: {}", msg)
            },
            CorroicsError::CloseFailed(msg) => {
                write!(f, "Could not close ICS file: {}", msg)
            },
            CorroicsError::UnsupportedType(msg) => {
                write!(f, "Unsupported data type: {}", msg)
            },
            CorroicsError::OwnershipFailure(msg) => {
                write!(f, "Array could not own its data: {}", msg)
            }
        }
    }
}
