use thiserror::Error;

/// Precondition violations reported by the scale-space primitives.
///
/// All variants describe deterministic failures; retrying the same call with
/// the same inputs fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("invalid dimension: {width}x{height}x{channels}")]
    InvalidDimension {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("out of bounds")]
    OutOfBounds,
    #[error("invalid channel {channel} for {channels}-channel buffer")]
    InvalidChannel { channel: usize, channels: usize },
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("operation cancelled")]
    Cancelled,
}
