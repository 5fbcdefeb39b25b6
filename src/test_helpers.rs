//! Shared test utilities: manifest entries and synthetic images.
//!
//! Images are generated in memory rather than loaded from fixture files so
//! each test states exactly which pixels differ.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let base = solid_png(8, 8, [255, 255, 255, 255]);
//! let target = png_with_square(8, 8, [255, 255, 255, 255], [255, 0, 0, 255], (3, 3, 2));
//! ```

use crate::imaging::PixelBuffer;
use crate::types::ImageEntry;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Build a manifest entry with a title and url.
pub fn entry(title: &str, url: &str) -> ImageEntry {
    ImageEntry::new(title, url)
}

// =========================================================================
// Raw pixel buffers
// =========================================================================

/// Build a buffer by evaluating `f(x, y)` for every pixel.
pub fn buffer_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> PixelBuffer {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&f(x, y));
        }
    }
    PixelBuffer::new(width, height, data).unwrap()
}

pub fn solid_buffer(width: u32, height: u32, color: [u8; 4]) -> PixelBuffer {
    buffer_from_fn(width, height, |_, _| color)
}

/// `background` everywhere except a `size`x`size` square of `square` whose
/// top-left corner is at `(x, y)`.
pub fn buffer_with_square(
    width: u32,
    height: u32,
    background: [u8; 4],
    square: [u8; 4],
    (sx, sy, size): (u32, u32, u32),
) -> PixelBuffer {
    buffer_from_fn(width, height, |x, y| {
        if (sx..sx + size).contains(&x) && (sy..sy + size).contains(&y) {
            square
        } else {
            background
        }
    })
}

// =========================================================================
// Encoded PNG bytes
// =========================================================================

/// Encode `f(x, y)` as an RGBA PNG.
pub fn encode_png(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| image::Rgba(f(x, y)));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    encode_png(width, height, |_, _| color)
}

pub fn png_with_square(
    width: u32,
    height: u32,
    background: [u8; 4],
    square: [u8; 4],
    placement: (u32, u32, u32),
) -> Vec<u8> {
    let buf = buffer_with_square(width, height, background, square, placement);
    let img = RgbaImage::from_raw(width, height, buf.into_raw()).unwrap();
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}
