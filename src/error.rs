//! Error module for the decoding library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum DecodingError {
    /// Error for invalid parameters, e.g., a non-positive step or an empty range.
    InvalidParameter(String),
    /// Error for invalid spike times, e.g., NaN or infinite values.
    InvalidSpikeTimes(String),
    /// Error for collections whose lengths should match but don't.
    IncompatibleLengths { expected: usize, found: usize },
    /// Error for a metric which is not defined on the provided data, e.g., a ROC curve without negatives.
    UndefinedMetric(String),
    /// Error for restoring a model state which has never been stored.
    SnapshotNotFound(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodingError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            DecodingError::InvalidSpikeTimes(e) => write!(f, "Invalid spike times: {}", e),
            DecodingError::IncompatibleLengths { expected, found } => write!(
                f,
                "Incompatible lengths: expected {} elements, found {}",
                expected, found
            ),
            DecodingError::UndefinedMetric(e) => write!(f, "Undefined metric: {}", e),
            DecodingError::SnapshotNotFound(tag) => {
                write!(f, "No stored state with tag '{}'", tag)
            }
            DecodingError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for DecodingError {}
