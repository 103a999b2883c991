//! Umbrella crate for the `scale-space` workspace.
//!
//! Re-exports the pixel buffer and error types from `ss-core`, the Gaussian
//! kernel and separable convolver from `ss-filter`, and the resampler and
//! pyramid builder from `ss-pyr`.
//!
//! ```
//! use scale_space::{OctaveCount, PixelBuffer, ScaleSpacePyramid};
//!
//! let img = PixelBuffer::from_fn(64, 48, 1, |x, y, _| ((x + y) % 8) as f32 / 8.0)?;
//! let pyr = ScaleSpacePyramid::build(&img, OctaveCount::Fixed(3), 1.6)?;
//! assert_eq!(pyr.octave_dimensions(2), Some((16, 12)));
//! # Ok::<(), scale_space::Error>(())
//! ```
//!
//! # Features
//!
//! - `rayon` – parallel convolution passes.
//! - `io` – image file loading and saving, exposed as [`io`].

pub use ss_core::*;
pub use ss_filter::*;
pub use ss_pyr::*;

#[cfg(feature = "io")]
pub use ss_io as io;
