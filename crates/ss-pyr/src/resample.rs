use ss_core::{Error, PixelBuffer, clamp_index};

#[inline]
fn dst_dims(src_w: usize, src_h: usize, stride_x: f32, stride_y: f32) -> (usize, usize) {
    (
        (src_w as f64 / f64::from(stride_x)).floor() as usize,
        (src_h as f64 / f64::from(stride_y)).floor() as usize,
    )
}

/// Sparse point resampling.
///
/// Output size is `(floor(w / stride_x), floor(h / stride_y))`; destination
/// pixel `(x, y)` copies source pixel `(floor(x * stride_x), floor(y *
/// stride_y))`, clamped to the source extent. No interpolation and no
/// low-pass filtering is applied, so the caller is responsible for
/// band-limiting the input first.
///
/// An empty source yields an empty output with the same channel count.
pub fn resample(src: &PixelBuffer, stride_x: f32, stride_y: f32) -> Result<PixelBuffer, Error> {
    if !(stride_x.is_finite() && stride_x > 0.0 && stride_y.is_finite() && stride_y > 0.0) {
        return Err(Error::InvalidParameter("stride must be > 0 and finite"));
    }

    let (dst_w, dst_h) = dst_dims(src.width(), src.height(), stride_x, stride_y);
    if src.is_empty() {
        return PixelBuffer::new(dst_w, dst_h, src.channels());
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(Error::InvalidParameter(
            "resampled image would have no pixels",
        ));
    }

    let mut dst = PixelBuffer::new(dst_w, dst_h, src.channels())?;
    if stride_x.fract() == 0.0 && stride_y.fract() == 0.0 {
        decimate_integer(src, stride_x as usize, stride_y as usize, &mut dst);
    } else {
        resample_fractional(src, stride_x, stride_y, &mut dst)?;
    }
    Ok(dst)
}

/// In-place variant of [`resample`]. On error `image` is left untouched.
pub fn resample_in_place(image: &mut PixelBuffer, stride_x: f32, stride_y: f32) -> Result<(), Error> {
    *image = resample(image, stride_x, stride_y)?;
    Ok(())
}

// With integer strides `x * stride_x <= (dst_w - 1) * stride_x < src_w`, so
// every source index is in range and no clamping is needed.
fn decimate_integer(src: &PixelBuffer, stride_x: usize, stride_y: usize, dst: &mut PixelBuffer) {
    let channels = src.channels();
    let dst_row_len = dst.row_len();
    for (y, dst_row) in dst.data_mut().chunks_exact_mut(dst_row_len).enumerate() {
        let src_row = src.row(y * stride_y);
        for (x, dst_px) in dst_row.chunks_exact_mut(channels).enumerate() {
            let sx = x * stride_x * channels;
            dst_px.copy_from_slice(&src_row[sx..sx + channels]);
        }
    }
}

fn resample_fractional(
    src: &PixelBuffer,
    stride_x: f32,
    stride_y: f32,
    dst: &mut PixelBuffer,
) -> Result<(), Error> {
    let channels = src.channels();
    let dst_row_len = dst.row_len();
    for (y, dst_row) in dst.data_mut().chunks_exact_mut(dst_row_len).enumerate() {
        let sy = source_index(y, stride_y, src.height())?;
        let src_row = src.row(sy);
        for (x, dst_px) in dst_row.chunks_exact_mut(channels).enumerate() {
            let sx = source_index(x, stride_x, src.width())? * channels;
            dst_px.copy_from_slice(&src_row[sx..sx + channels]);
        }
    }
    Ok(())
}

#[inline]
fn source_index(i: usize, stride: f32, len: usize) -> Result<usize, Error> {
    let pos = (i as f64 * f64::from(stride)).floor() as isize;
    clamp_index(pos, len).ok_or(Error::OutOfBounds)
}
