//! Error type for clustering runs.

use std::error::Error;
use std::fmt;

/// Errors surfaced by the clustering entry points.
///
/// Every variant is detected before any phase of the pipeline runs; a failed
/// call produces no partial output.
#[derive(Debug, Clone, PartialEq)]
pub enum DbscanError {
    /// A per-dimension radius was zero, negative, or not finite.
    InvalidEps { dim: usize, value: f32 },
    /// `min_pts` must be at least 1.
    ZeroMinPts,
    /// `threads` must be at least 1.
    ZeroThreads,
    /// A flat coordinate buffer's length is not a multiple of the dimension.
    RaggedCoordinates(usize),
    /// More points than the `i32` label space can address.
    TooManyPoints(usize),
    /// The bounding box divided by `eps` yields an unallocatable cell count.
    GridTooLarge { dims: [u64; 2] },
    /// The dedicated worker pool could not be constructed.
    ThreadPool(String),
}

impl fmt::Display for DbscanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbscanError::InvalidEps { dim, value } => {
                write!(f, "eps[{}] = {} is not a positive finite radius", dim, value)
            }
            DbscanError::ZeroMinPts => write!(f, "min_pts must be at least 1"),
            DbscanError::ZeroThreads => write!(f, "threads must be at least 1"),
            DbscanError::RaggedCoordinates(len) => {
                write!(f, "flat coordinate buffer of length {} is not a whole number of points", len)
            }
            DbscanError::TooManyPoints(n) => {
                write!(f, "{} points exceed the supported maximum of {}", n, i32::MAX)
            }
            DbscanError::GridTooLarge { dims } => {
                write!(f, "grid of {} x {} cells is too large; eps is too small for the data spread", dims[0], dims[1])
            }
            DbscanError::ThreadPool(reason) => write!(f, "failed to build worker pool: {}", reason),
        }
    }
}

impl Error for DbscanError {}
