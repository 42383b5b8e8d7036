//! Debayering module for converting RGGB mosaic frames to RGB

pub mod cpu_debayer;
pub mod decision;
pub mod transfer;

pub use cpu_debayer::CpuDebayer;
pub use decision::{
    DebayerDecision, MIN_MOSAIC_DIMENSION, PROCESSED_SHAPE, RAW_MOSAIC_SHAPE, decide,
};
pub use transfer::srgb_encode;
