//! Gaussian kernels and separable convolution for scale-space construction.
//!
//! Border handling is clamp-to-edge everywhere: a sample outside the image
//! reads the nearest edge pixel, matching [`ss_core::PixelBuffer::get`].
//!
//! # Features
//!
//! - `rayon` – splits both convolution passes across output rows. Each row is
//!   computed with the same arithmetic as the serial path, so results are
//!   bit-identical with and without the feature.

pub mod conv1d;
pub mod kernel;
pub mod separable;

pub use kernel::GaussianKernel;
pub use separable::{SeparableConvolver, convolve_separable, convolve_separable_in_place};
