//! Anti-aliasing detection for the pixel comparator.
//!
//! Based on "Anti-aliased Pixel and Intensity Slope Detector" by V. Vysniauskas
//! (2009). A pixel is treated as anti-aliasing when its 3x3 neighbourhood has
//! both a darker and a brighter neighbour, and at least one of those extremes
//! sits inside a flat region (three or more identical siblings) in both
//! images. Edge pixels count one missing neighbour as "identical".

use super::buffer::PixelBuffer;
use super::color::color_delta;

fn offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

fn pixel(buf: &PixelBuffer, x: u32, y: u32) -> &[u8] {
    let pos = offset(buf.width(), x, y);
    &buf.data()[pos..pos + 4]
}

/// Clamped 3x3 window around `(x, y)`: `(x0, y0, x2, y2)`.
fn window(buf: &PixelBuffer, x: u32, y: u32) -> (u32, u32, u32, u32) {
    (
        x.saturating_sub(1),
        y.saturating_sub(1),
        (x + 1).min(buf.width() - 1),
        (y + 1).min(buf.height() - 1),
    )
}

/// Whether the pixel at `(x, y)` in `img` looks like anti-aliasing, using
/// `other` (the image it is being compared against) to confirm.
pub fn is_antialiased(img: &PixelBuffer, x: u32, y: u32, other: &PixelBuffer) -> bool {
    let (x0, y0, x2, y2) = window(img, x, y);
    let center = pixel(img, x, y);

    let mut zeroes = usize::from(x == x0 || x == x2 || y == y0 || y == y2);
    let mut min = 0.0;
    let mut max = 0.0;
    let mut min_at = (0, 0);
    let mut max_at = (0, 0);

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }

            let delta = color_delta(center, pixel(img, nx, ny), true);

            if delta == 0.0 {
                zeroes += 1;
                // More than two equal siblings: not an edge.
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_at = (nx, ny);
            } else if delta > max {
                max = delta;
                max_at = (nx, ny);
            }
        }
    }

    // Needs both a darker and a brighter neighbour.
    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_at.0, min_at.1) && has_many_siblings(other, min_at.0, min_at.1))
        || (has_many_siblings(img, max_at.0, max_at.1)
            && has_many_siblings(other, max_at.0, max_at.1))
}

/// Whether the pixel at `(x, y)` has three or more exactly equal neighbours.
fn has_many_siblings(img: &PixelBuffer, x: u32, y: u32) -> bool {
    let (x0, y0, x2, y2) = window(img, x, y);
    let center = pixel(img, x, y);

    let mut zeroes = usize::from(x == x0 || x == x2 || y == y0 || y == y2);

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            if pixel(img, nx, ny) == center {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }

    false
}
