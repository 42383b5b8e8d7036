//! Image processing pipeline module
//!
//! Reads PDS4 products, demosaics raw Bayer frames, stretches contrast and
//! writes 8-bit PNG images. Each stage lives in its own module; the
//! `conversions` module wires them together.

pub mod common;
pub mod conversions;
pub mod debayer;
pub mod pds4;
pub mod png;
pub mod stretch;

pub use common::{
    ConversionConfig, ConversionConfigBuilder, ConversionError, DemosaicAlgorithm, RawFrame, Result,
};

pub use pds4::{FrameReader, Pds4Reader};

pub use debayer::{CpuDebayer, DebayerDecision};

pub use stretch::PercentileStretch;

pub use png::{PngWriter, StandardPngWriter};

pub use conversions::PdsToPngPipeline;
