//! PNG writing module
//!
//! Quantizes floating-point frames to 8 bits and encodes them as PNG.

mod standard_png_writer;
mod writer;

pub use standard_png_writer::{StandardPngWriter, quantize_u8};
pub use writer::PngWriter;
