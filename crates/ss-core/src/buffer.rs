use crate::Error;
use crate::border::clamp_index;

/// Dense `width x height x channels` array of `f32` samples.
///
/// Storage is row-major with interleaved channels: sample `(x, y, c)` lives at
/// `c + x * channels + y * channels * width`. The backing vector always holds
/// exactly `width * height * channels` elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

impl PixelBuffer {
    /// Creates a `0x0x0` buffer.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a zero-filled buffer.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self, Error> {
        Self::new_fill(width, height, channels, 0.0)
    }

    pub fn new_fill(
        width: usize,
        height: usize,
        channels: usize,
        value: f32,
    ) -> Result<Self, Error> {
        let data = alloc_samples(width, height, channels, value)?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, Error> {
        let expected = sample_count(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Builds a buffer by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, mut f: F) -> Result<Self, Error>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let mut buf = Self::new(width, height, channels)?;
        let row_len = buf.row_len();
        if row_len == 0 {
            return Ok(buf);
        }
        for (y, row) in buf.data.chunks_exact_mut(row_len).enumerate() {
            for (x, px) in row.chunks_exact_mut(channels).enumerate() {
                for (c, v) in px.iter_mut().enumerate() {
                    *v = f(x, y, c);
                }
            }
        }
        Ok(buf)
    }

    /// Reallocates storage for the new extent. Previous samples are discarded
    /// and the buffer is zero-filled.
    pub fn resize(&mut self, width: usize, height: usize, channels: usize) -> Result<(), Error> {
        self.data = alloc_samples(width, height, channels, 0.0)?;
        self.width = width;
        self.height = height;
        self.channels = channels;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// `(width, height, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    /// Number of samples in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of samples in one row (`width * channels`).
    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn row(&self, y: usize) -> &[f32] {
        assert!(y < self.height, "row index out of bounds");
        let len = self.row_len();
        let start = y * len;
        &self.data[start..start + len]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        assert!(y < self.height, "row index out of bounds");
        let len = self.row_len();
        let start = y * len;
        &mut self.data[start..start + len]
    }

    /// Reads a sample, replicating edge pixels for out-of-range coordinates.
    ///
    /// Spatial coordinates are never an error on a non-empty buffer. The
    /// channel index is not clamped: `channel >= channels()` yields
    /// [`Error::InvalidChannel`].
    pub fn get(&self, x: isize, y: isize, channel: usize) -> Result<f32, Error> {
        if channel >= self.channels {
            return Err(Error::InvalidChannel {
                channel,
                channels: self.channels,
            });
        }
        let xi = clamp_index(x, self.width).ok_or(Error::OutOfBounds)?;
        let yi = clamp_index(y, self.height).ok_or(Error::OutOfBounds)?;
        Ok(self.data[self.index(xi, yi, channel)])
    }

    /// Writes a sample. Writes are never clamped.
    pub fn set(&mut self, value: f32, x: usize, y: usize, channel: usize) -> Result<(), Error> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return Err(Error::OutOfBounds);
        }
        let idx = self.index(x, y, channel);
        self.data[idx] = value;
        Ok(())
    }

    /// Reads a sample as an 8-bit value: `round(clamp(255 * v, 0, 255))`.
    pub fn to_byte(&self, x: isize, y: isize, channel: usize) -> Result<u8, Error> {
        let v = self.get(x, y, channel)?;
        Ok(sample_to_byte(v))
    }

    /// Pixelwise `self - other`.
    pub fn difference(&self, other: &PixelBuffer) -> Result<PixelBuffer, Error> {
        if self.shape() != other.shape() {
            return Err(Error::DimensionMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }

        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a - b)
            .collect();

        Ok(PixelBuffer {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data,
        })
    }

    #[inline]
    fn index(&self, x: usize, y: usize, channel: usize) -> usize {
        channel + x * self.channels + y * self.channels * self.width
    }
}

/// Converts a normalized sample to a byte with rounding and saturation.
#[inline]
pub fn sample_to_byte(v: f32) -> u8 {
    (255.0 * v).clamp(0.0, 255.0).round() as u8
}

fn sample_count(width: usize, height: usize, channels: usize) -> Result<usize, Error> {
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(Error::InvalidDimension {
            width,
            height,
            channels,
        })
}

fn alloc_samples(
    width: usize,
    height: usize,
    channels: usize,
    value: f32,
) -> Result<Vec<f32>, Error> {
    let len = sample_count(width, height, channels)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::InvalidDimension {
            width,
            height,
            channels,
        })?;
    data.resize(len, value);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::{PixelBuffer, sample_to_byte};
    use crate::Error;

    #[test]
    fn constructor_and_allocation() {
        let mut img = PixelBuffer::empty();
        assert_eq!(img.shape(), (0, 0, 0));
        assert_eq!(img.len(), 0);

        img.resize(10, 20, 3).expect("valid resize");
        assert_eq!(img.shape(), (10, 20, 3));
        assert_eq!(img.len(), 600);

        let img2 = PixelBuffer::new(10, 20, 3).expect("valid buffer");
        assert_eq!(img2.shape(), (10, 20, 3));
        assert_eq!(img2.len(), 600);
        assert_eq!(img, img2);
    }

    #[test]
    fn resize_discards_previous_contents() {
        let mut img = PixelBuffer::new_fill(2, 2, 1, 7.0).expect("valid buffer");
        img.resize(2, 2, 1).expect("valid resize");
        assert!(img.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn resize_rejects_overflowing_extent() {
        let mut img = PixelBuffer::new(1, 1, 1).expect("valid buffer");
        let err = img.resize(usize::MAX, 2, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { .. }));
        assert_eq!(img.shape(), (1, 1, 1));
    }

    #[test]
    fn from_vec_checks_length() {
        let err = PixelBuffer::from_vec(2, 2, 1, vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn interleaved_layout() {
        let img = PixelBuffer::from_fn(3, 2, 2, |x, y, c| (100 * y + 10 * x + c) as f32)
            .expect("valid buffer");
        assert_eq!(img.row(1), &[100.0, 101.0, 110.0, 111.0, 120.0, 121.0]);
        assert_eq!(img.get(2, 0, 1), Ok(21.0));
    }

    #[test]
    fn get_clamps_to_last_valid_pixel() {
        let img = PixelBuffer::from_fn(3, 3, 1, |x, y, _| (10 * y + x) as f32)
            .expect("valid buffer");
        assert_eq!(img.get(-5, 1, 0), Ok(10.0));
        assert_eq!(img.get(3, 1, 0), Ok(12.0));
        assert_eq!(img.get(99, 99, 0), Ok(22.0));
        assert_eq!(img.get(-1, -1, 0), Ok(0.0));
    }

    #[test]
    fn get_rejects_invalid_channel() {
        let img = PixelBuffer::new(2, 2, 3).expect("valid buffer");
        assert_eq!(
            img.get(0, 0, 3),
            Err(Error::InvalidChannel {
                channel: 3,
                channels: 3
            })
        );
    }

    #[test]
    fn get_on_pixelless_buffer_is_out_of_bounds() {
        let img = PixelBuffer::new(0, 4, 1).expect("valid buffer");
        assert_eq!(img.get(0, 0, 0), Err(Error::OutOfBounds));
    }

    #[test]
    fn set_is_not_clamped() {
        let mut img = PixelBuffer::new(2, 2, 1).expect("valid buffer");
        img.set(0.5, 1, 1, 0).expect("in bounds");
        assert_eq!(img.get(1, 1, 0), Ok(0.5));
        assert_eq!(img.set(1.0, 2, 0, 0), Err(Error::OutOfBounds));
        assert_eq!(img.set(1.0, 0, 2, 0), Err(Error::OutOfBounds));
        assert_eq!(img.set(1.0, 0, 0, 1), Err(Error::OutOfBounds));
    }

    #[test]
    fn byte_conversion_rounds_and_saturates() {
        assert_eq!(sample_to_byte(-0.2), 0);
        assert_eq!(sample_to_byte(0.5), 128);
        assert_eq!(sample_to_byte(1.0), 255);
        assert_eq!(sample_to_byte(3.0), 255);

        let img = PixelBuffer::new_fill(1, 1, 1, 0.1).expect("valid buffer");
        assert_eq!(img.to_byte(4, -4, 0), Ok(26));
    }

    #[test]
    fn equality_compares_shape_and_samples() {
        let a = PixelBuffer::new(2, 3, 1).expect("valid buffer");
        let b = PixelBuffer::new(3, 2, 1).expect("valid buffer");
        assert_ne!(a, b);

        let mut c = a.clone();
        assert_eq!(a, c);
        c.set(1.0, 0, 0, 0).expect("in bounds");
        assert_ne!(a, c);
    }

    #[test]
    fn difference_is_pixelwise() {
        let a = PixelBuffer::from_vec(2, 1, 1, vec![3.0, 1.0]).expect("valid buffer");
        let b = PixelBuffer::from_vec(2, 1, 1, vec![1.0, 4.0]).expect("valid buffer");
        let d = a.difference(&b).expect("same shape");
        assert_eq!(d.data(), &[2.0, -3.0]);

        let c = PixelBuffer::new(1, 2, 1).expect("valid buffer");
        assert!(matches!(
            a.difference(&c),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
