//! Decoding and pixel comparison.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` → RGBA8 |
//! | **Compare** | pixelmatch port (YIQ distance + anti-aliasing detector) |
//! | **Diff PNG** | `image::save_buffer_with_format` |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`], the RGBA8 container both sides agree on
//! - **Color**: pure YIQ distance functions (unit testable)
//! - **Antialias**: neighbourhood heuristics over a buffer
//! - **Pixelmatch**: the counting loop and its options

mod antialias;
pub mod buffer;
mod color;
pub mod decode;
pub mod pixelmatch;

pub use buffer::{BufferSizeError, PixelBuffer};
pub use decode::{DecodeError, decode, save_png};
pub use pixelmatch::{CompareError, CompareOptions, compare, compare_into};
