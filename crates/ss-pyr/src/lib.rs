//! Difference-of-Gaussian scale-space pyramids.
//!
//! Each octave holds five progressively blurred images. Consecutive levels are
//! related by one more convolution with the *same* base kernel, so the
//! effective blur grows as `sigma * sqrt(level + 1)` without ever building a
//! wider kernel. The most blurred level of an octave is decimated by 2 (every
//! other row and column, no extra filtering) to seed the next octave, and four
//! DoG images are materialized per octave as differences of adjacent levels.
//!
//! Drop-odd policy:
//! - Octave `o + 1` has size `(w_o / 2, h_o / 2)`.
//! - If a width or height is odd, the last column/row is dropped.
//!
//! Construction is single-threaded and deterministic; identical inputs yield
//! bit-identical pyramids. Enable `ss-filter/rayon` to parallelize the
//! convolution passes.

mod pyramid;
mod resample;

pub use pyramid::{
    DEFAULT_SIGMA, DOGS_PER_OCTAVE, Octave, OctaveCount, SCALES_PER_OCTAVE, ScaleSpaceConfig,
    ScaleSpacePyramid, auto_octave_count, max_octave_count,
};
pub use resample::{resample, resample_in_place};
