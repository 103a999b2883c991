//! Foundational primitives for scale-space image processing.
//!
//! ## Pixel Buffers
//! [`PixelBuffer`] is a dense `width x height x channels` array of `f32`
//! samples stored row-major with interleaved channels. Every transformation
//! in the workspace either produces a new owned buffer or rewrites one in
//! place; buffers are never shared between stages.
//!
//! ## Border Policy
//! Reads replicate the nearest edge pixel for any out-of-range coordinate
//! (clamp to `[0, len - 1]`). Writes are never clamped. Channel indices are
//! never clamped on either path.
//!
//! ## Sample Range
//! Samples are normalized intensities, nominally in `[0, 1]`. Conversion to
//! 8-bit happens only at the I/O boundary via [`PixelBuffer::to_byte`].

mod border;
mod buffer;
mod error;

pub use border::clamp_index;
pub use buffer::{PixelBuffer, sample_to_byte};
pub use error::Error;
