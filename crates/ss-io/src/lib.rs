//! File I/O for [`PixelBuffer`]s.
//!
//! Decoding and encoding is delegated to the `image` crate. Loaded samples are
//! normalized to `[0, 1]` (8-bit by 255, 16-bit by 65535, float formats as
//! stored); the channel count follows the file: 1 = luma, 2 = luma + alpha,
//! 3 = RGB, 4 = RGBA. Saving writes 8-bit samples produced by
//! [`PixelBuffer::to_byte`] semantics.

use std::path::Path;

use image::{ColorType, DynamicImage, ExtendedColorType, ImageFormat};
use ss_core::{PixelBuffer, sample_to_byte};
use thiserror::Error;
use tracing::{debug, instrument};

/// Failures at the file boundary, distinct from core precondition errors.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(usize),
    #[error("image too large to encode: {width}x{height}")]
    TooLarge { width: usize, height: usize },
    #[error(transparent)]
    Buffer(#[from] ss_core::Error),
}

/// Decodes an image file into a normalized pixel buffer.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_image(path: impl AsRef<Path>) -> Result<PixelBuffer, IoError> {
    let img = image::open(path.as_ref())?;
    let buf = from_dynamic(img)?;
    debug!(
        width = buf.width(),
        height = buf.height(),
        channels = buf.channels(),
        "decoded image"
    );
    Ok(buf)
}

/// Decodes an image file and reduces it to a single intensity channel.
pub fn load_luma(path: impl AsRef<Path>) -> Result<PixelBuffer, IoError> {
    let img = load_image(path)?;
    Ok(to_luma(&img)?)
}

/// Encodes `buf` with the format inferred from the path extension.
#[instrument(level = "debug", skip(path, buf), fields(path = %path.as_ref().display()))]
pub fn save_image(path: impl AsRef<Path>, buf: &PixelBuffer) -> Result<(), IoError> {
    let (raw, w, h, color) = encode_parts(buf)?;
    image::save_buffer(path.as_ref(), &raw, w, h, color)?;
    Ok(())
}

/// Encodes `buf` with an explicit container format.
#[instrument(level = "debug", skip(path, buf), fields(path = %path.as_ref().display()))]
pub fn save_image_with_format(
    path: impl AsRef<Path>,
    buf: &PixelBuffer,
    format: ImageFormat,
) -> Result<(), IoError> {
    let (raw, w, h, color) = encode_parts(buf)?;
    image::save_buffer_with_format(path.as_ref(), &raw, w, h, color, format)?;
    Ok(())
}

/// Converts a decoded image, keeping its channel layout.
pub fn from_dynamic(img: DynamicImage) -> Result<PixelBuffer, IoError> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let buf = match img.color() {
        ColorType::L8 => from_u8(w, h, 1, img.into_luma8().into_raw())?,
        ColorType::La8 => from_u8(w, h, 2, img.into_luma_alpha8().into_raw())?,
        ColorType::Rgb8 => from_u8(w, h, 3, img.into_rgb8().into_raw())?,
        ColorType::Rgba8 => from_u8(w, h, 4, img.into_rgba8().into_raw())?,
        ColorType::L16 => from_u16(w, h, 1, img.into_luma16().into_raw())?,
        ColorType::La16 => from_u16(w, h, 2, img.into_luma_alpha16().into_raw())?,
        ColorType::Rgb16 => from_u16(w, h, 3, img.into_rgb16().into_raw())?,
        ColorType::Rgba16 => from_u16(w, h, 4, img.into_rgba16().into_raw())?,
        ColorType::Rgb32F => PixelBuffer::from_vec(w, h, 3, img.into_rgb32f().into_raw())?,
        _ => PixelBuffer::from_vec(w, h, 4, img.into_rgba32f().into_raw())?,
    };
    Ok(buf)
}

/// Reduces a buffer to one intensity channel.
///
/// 1 channel is copied, 2 channels keep the luma plane, 3 or 4 channels are
/// combined with Rec. 601 weights (alpha is ignored).
pub fn to_luma(buf: &PixelBuffer) -> Result<PixelBuffer, ss_core::Error> {
    let channels = buf.channels();
    let weights: &[f32] = match channels {
        1 => return Ok(buf.clone()),
        2 => &[1.0],
        3 | 4 => &[0.299, 0.587, 0.114],
        _ => {
            return Err(ss_core::Error::InvalidParameter(
                "luma conversion needs 1 to 4 channels",
            ));
        }
    };

    let data = buf
        .data()
        .chunks_exact(channels)
        .map(|px| px.iter().zip(weights).map(|(&v, &k)| v * k).sum())
        .collect();
    PixelBuffer::from_vec(buf.width(), buf.height(), 1, data)
}

fn from_u8(w: usize, h: usize, channels: usize, raw: Vec<u8>) -> Result<PixelBuffer, ss_core::Error> {
    let data = raw.into_iter().map(|v| f32::from(v) / 255.0).collect();
    PixelBuffer::from_vec(w, h, channels, data)
}

fn from_u16(
    w: usize,
    h: usize,
    channels: usize,
    raw: Vec<u16>,
) -> Result<PixelBuffer, ss_core::Error> {
    let data = raw.into_iter().map(|v| f32::from(v) / 65535.0).collect();
    PixelBuffer::from_vec(w, h, channels, data)
}

fn encode_parts(buf: &PixelBuffer) -> Result<(Vec<u8>, u32, u32, ExtendedColorType), IoError> {
    let color = match buf.channels() {
        1 => ExtendedColorType::L8,
        2 => ExtendedColorType::La8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        n => return Err(IoError::UnsupportedChannels(n)),
    };
    let too_large = || IoError::TooLarge {
        width: buf.width(),
        height: buf.height(),
    };
    let w = u32::try_from(buf.width()).map_err(|_| too_large())?;
    let h = u32::try_from(buf.height()).map_err(|_| too_large())?;
    let raw = buf.data().iter().map(|&v| sample_to_byte(v)).collect();
    Ok((raw, w, h, color))
}
