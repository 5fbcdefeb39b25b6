//! PNG bytes → [`PixelBuffer`] via the `image` crate.
//!
//! Only PNG is accepted, whatever the URL's extension says. Bytes in any
//! other format, an HTML error page included, are a [`DecodeError`].
//! Everything is converted to RGBA8 so the comparator can treat both sides
//! uniformly.

use super::buffer::PixelBuffer;
use image::ImageFormat;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Decoded image has an invalid buffer: {0}")]
    Buffer(#[from] super::buffer::BufferSizeError),
}

pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let rgba = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelBuffer::new(width, height, rgba.into_raw())?)
}

/// Encode a buffer as PNG at `path`. Used for diff visualisations.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<(), image::ImageError> {
    image::save_buffer_with_format(
        path,
        buffer.data(),
        buffer.width(),
        buffer.height(),
        image::ExtendedColorType::Rgba8,
        ImageFormat::Png,
    )
}
