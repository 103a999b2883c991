//! Separable 2D Gaussian blur.
//!
//! A 2D isotropic Gaussian equals a horizontal 1D pass followed by a vertical
//! 1D pass with the same kernel, which costs `O(radius)` per sample instead of
//! `O(radius^2)`.
//!
//! Both passes are computed row by row: the horizontal pass convolves each
//! interleaved row independently, and the vertical pass builds each output row
//! as a weighted sum of clamped source rows. Rows never depend on other output
//! rows, so with the `rayon` feature the passes are split across threads with
//! bit-identical results.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use ss_core::{Error, PixelBuffer};
use tracing::instrument;

use crate::conv1d::convolve_interleaved_f32;
use crate::kernel::GaussianKernel;

/// Reusable separable convolver.
///
/// Holds the intermediate buffer between the horizontal and vertical pass so
/// repeated blurs at the same resolution do not reallocate it.
#[derive(Debug, Default, Clone)]
pub struct SeparableConvolver {
    scratch: PixelBuffer,
}

impl SeparableConvolver {
    pub fn new() -> Self {
        Self {
            scratch: PixelBuffer::empty(),
        }
    }

    /// Blurs `image` and returns a new buffer of the same shape.
    pub fn convolve(
        &mut self,
        kernel: &GaussianKernel,
        image: &PixelBuffer,
    ) -> Result<PixelBuffer, Error> {
        let (w, h, c) = image.shape();
        let mut out = PixelBuffer::new(w, h, c)?;
        self.convolve_into(kernel, image, &mut out)?;
        Ok(out)
    }

    /// Blurs `image`, overwriting its contents with the result.
    pub fn convolve_in_place(
        &mut self,
        kernel: &GaussianKernel,
        image: &mut PixelBuffer,
    ) -> Result<(), Error> {
        if image.is_empty() {
            return Ok(());
        }
        self.horizontal(kernel, image)?;
        vertical_pass(kernel, &self.scratch, image)
    }

    /// Blurs `src` into `dst`. Both buffers must have the same shape.
    #[instrument(
        level = "trace",
        skip(self, kernel, src, dst),
        fields(width = src.width(), height = src.height(), radius = kernel.radius())
    )]
    pub fn convolve_into(
        &mut self,
        kernel: &GaussianKernel,
        src: &PixelBuffer,
        dst: &mut PixelBuffer,
    ) -> Result<(), Error> {
        check_same_shape(src, dst)?;
        if src.is_empty() {
            return Ok(());
        }
        self.horizontal(kernel, src)?;
        vertical_pass(kernel, &self.scratch, dst)
    }

    fn horizontal(&mut self, kernel: &GaussianKernel, src: &PixelBuffer) -> Result<(), Error> {
        let (w, h, c) = src.shape();
        if self.scratch.shape() != (w, h, c) {
            self.scratch.resize(w, h, c)?;
        }
        horizontal_pass(kernel, src, &mut self.scratch)
    }
}

/// Blurs `image` with `kernel` along rows, then columns.
///
/// An image without samples is returned unchanged.
pub fn convolve_separable(
    kernel: &GaussianKernel,
    image: &PixelBuffer,
) -> Result<PixelBuffer, Error> {
    SeparableConvolver::new().convolve(kernel, image)
}

/// In-place variant of [`convolve_separable`].
pub fn convolve_separable_in_place(
    kernel: &GaussianKernel,
    image: &mut PixelBuffer,
) -> Result<(), Error> {
    SeparableConvolver::new().convolve_in_place(kernel, image)
}

fn check_same_shape(expected: &PixelBuffer, actual: &PixelBuffer) -> Result<(), Error> {
    if expected.shape() != actual.shape() {
        return Err(Error::DimensionMismatch {
            expected: expected.shape(),
            actual: actual.shape(),
        });
    }
    Ok(())
}

fn horizontal_pass(
    kernel: &GaussianKernel,
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
) -> Result<(), Error> {
    check_same_shape(src, dst)?;
    let channels = src.channels();
    let row_len = src.row_len();
    let taps = kernel.taps();
    let radius = kernel.radius();

    let convolve_row = |(y, dst_row): (usize, &mut [f32])| {
        convolve_interleaved_f32(src.row(y), channels, taps, radius, dst_row);
    };

    #[cfg(feature = "rayon")]
    dst.data_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(convolve_row);

    #[cfg(not(feature = "rayon"))]
    dst.data_mut()
        .chunks_exact_mut(row_len)
        .enumerate()
        .for_each(convolve_row);

    Ok(())
}

fn vertical_pass(
    kernel: &GaussianKernel,
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
) -> Result<(), Error> {
    check_same_shape(src, dst)?;
    let height = src.height();
    let row_len = src.row_len();
    let taps = kernel.taps();
    let radius = kernel.radius() as isize;

    let accumulate_row = |(y, dst_row): (usize, &mut [f32])| {
        dst_row.fill(0.0);
        for (k, &kv) in taps.iter().enumerate() {
            let sy = clamp_row(y as isize + radius - k as isize, height);
            for (d, &s) in dst_row.iter_mut().zip(src.row(sy)) {
                *d += s * kv;
            }
        }
    };

    #[cfg(feature = "rayon")]
    dst.data_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(accumulate_row);

    #[cfg(not(feature = "rayon"))]
    dst.data_mut()
        .chunks_exact_mut(row_len)
        .enumerate()
        .for_each(accumulate_row);

    Ok(())
}

/// `height` must be non-zero.
#[inline]
fn clamp_row(i: isize, height: usize) -> usize {
    i.clamp(0, height as isize - 1) as usize
}
