//! YIQ colour math for the pixel comparator.
//!
//! Pure functions over RGBA8 slices, no allocation. Distances follow
//! "Measuring perceived color difference using YIQ NTSC transmission color
//! space in mobile applications" (Kotsarenko & Ramos, 2010), which is also
//! what pixelmatch uses.

/// Upper bound on the magnitude of [`color_delta`] over all RGB pairs.
pub const MAX_YIQ_DELTA: f64 = 35215.0;

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}

/// Blend a channel value with white using `alpha` in `0.0..=1.0`.
pub fn blend(c: f64, alpha: f64) -> f64 {
    255.0 + (c - 255.0) * alpha
}

/// Composite an RGBA pixel over white and return its RGB channels.
fn flatten(px: &[u8]) -> (f64, f64, f64) {
    let (r, g, b, a) = (px[0] as f64, px[1] as f64, px[2] as f64, px[3]);
    if a < 255 {
        let alpha = a as f64 / 255.0;
        (blend(r, alpha), blend(g, alpha), blend(b, alpha))
    } else {
        (r, g, b)
    }
}

/// Perceptual distance between two RGBA pixels.
///
/// The sign tells which side is brighter: negative when `a` is lighter than
/// `b`. With `y_only` only the brightness difference is returned, which is
/// what the anti-aliasing detector needs.
pub fn color_delta(a: &[u8], b: &[u8], y_only: bool) -> f64 {
    if a[..4] == b[..4] {
        return 0.0;
    }

    let (r1, g1, b1) = flatten(a);
    let (r2, g2, b2) = flatten(b);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);

    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;
    if y1 > y2 { -delta } else { delta }
}

/// Grayscale value used to paint an unchanged pixel in diff output: the
/// pixel's brightness, faded toward white by `alpha`.
///
/// Rounds half to even and clamps, the way a clamped byte array stores it.
pub fn faded_gray(px: &[u8], alpha: f64) -> u8 {
    let (r, g, b) = (px[0] as f64, px[1] as f64, px[2] as f64);
    let value = blend(rgb2y(r, g, b), alpha * px[3] as f64 / 255.0);
    value.clamp(0.0, 255.0).round_ties_even() as u8
}
