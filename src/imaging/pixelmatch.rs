//! Per-pixel visual comparison with a perceptual tolerance.
//!
//! Port of the pixelmatch algorithm: a pixel differs when its YIQ distance
//! exceeds `MAX_YIQ_DELTA * threshold^2`, so `threshold = 0.0` demands an
//! exact match and `threshold = 1.0` tolerates everything. Pixels that look
//! like anti-aliasing can optionally be left out of the count.
//!
//! The comparison is deterministic and never reads past either buffer: unequal
//! dimensions are rejected up front with [`CompareError::DimensionMismatch`].

use super::antialias::is_antialiased;
use super::buffer::PixelBuffer;
use super::color::{MAX_YIQ_DELTA, color_delta, faded_gray};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompareError {
    #[error("Image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },
}

/// Tolerance and rendering options for a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Matching threshold in `0.0..=1.0`. Smaller is more sensitive.
    pub threshold: f64,
    /// Count anti-aliased pixels as differences.
    pub include_anti_aliased: bool,
    /// Opacity of unchanged pixels in the diff output.
    pub alpha: f64,
    /// Colour of skipped anti-aliased pixels in the diff output.
    pub aa_color: [u8; 3],
    /// Colour of differing pixels in the diff output.
    pub diff_color: [u8; 3],
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_anti_aliased: true,
            alpha: 0.1,
            aa_color: [255, 255, 0],
            diff_color: [255, 0, 0],
        }
    }
}

/// Count pixels that differ between `a` and `b`.
pub fn compare(
    a: &PixelBuffer,
    b: &PixelBuffer,
    options: &CompareOptions,
) -> Result<u64, CompareError> {
    check_dimensions(a, b)?;
    Ok(count_diff(a, b, options, None))
}

/// Like [`compare`], and also paint a diff visualisation into `output`.
pub fn compare_into(
    a: &PixelBuffer,
    b: &PixelBuffer,
    options: &CompareOptions,
    output: &mut PixelBuffer,
) -> Result<u64, CompareError> {
    check_dimensions(a, b)?;
    check_dimensions(a, output)?;
    Ok(count_diff(a, b, options, Some(output.data_mut())))
}

fn check_dimensions(a: &PixelBuffer, b: &PixelBuffer) -> Result<(), CompareError> {
    if a.dimensions() != b.dimensions() {
        return Err(CompareError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }
    Ok(())
}

fn draw(output: &mut [u8], pos: usize, [r, g, b]: [u8; 3]) {
    output[pos..pos + 4].copy_from_slice(&[r, g, b, 255]);
}

fn draw_gray(output: &mut [u8], pos: usize, source: &[u8], alpha: f64) {
    let v = faded_gray(source, alpha);
    draw(output, pos, [v, v, v]);
}

fn count_diff(
    a: &PixelBuffer,
    b: &PixelBuffer,
    options: &CompareOptions,
    mut output: Option<&mut [u8]>,
) -> u64 {
    let (width, height) = a.dimensions();
    let (img1, img2) = (a.data(), b.data());

    // Fast path: identical buffers.
    if img1 == img2 {
        if let Some(out) = output.as_deref_mut() {
            for pos in (0..img1.len()).step_by(4) {
                draw_gray(out, pos, &img1[pos..pos + 4], options.alpha);
            }
        }
        return 0;
    }

    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let mut diff = 0;

    for y in 0..height {
        for x in 0..width {
            let pos = (y as usize * width as usize + x as usize) * 4;
            let px1 = &img1[pos..pos + 4];
            let delta = color_delta(px1, &img2[pos..pos + 4], false);

            if delta.abs() > max_delta {
                let skip_aa = !options.include_anti_aliased
                    && (is_antialiased(a, x, y, b) || is_antialiased(b, x, y, a));
                if skip_aa {
                    if let Some(out) = output.as_deref_mut() {
                        draw(out, pos, options.aa_color);
                    }
                } else {
                    if let Some(out) = output.as_deref_mut() {
                        draw(out, pos, options.diff_color);
                    }
                    diff += 1;
                }
            } else if let Some(out) = output.as_deref_mut() {
                draw_gray(out, pos, px1, options.alpha);
            }
        }
    }

    diff
}
