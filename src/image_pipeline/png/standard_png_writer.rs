use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::common::frame::RawFrame;
use crate::image_pipeline::png::writer::PngWriter;

/// Clips to [0, 1], scales by 255 and truncates.
pub fn quantize_u8(samples: &[f32]) -> Vec<u8> {
    // NaN casts to 0
    samples
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
        .collect()
}

pub struct StandardPngWriter;

impl PngWriter for StandardPngWriter {
    fn write_png(&self, frame: &RawFrame, output: &mut dyn Write) -> Result<()> {
        debug!(
            "Encoding PNG image: {}x{}x{}",
            frame.cols, frame.rows, frame.channels
        );

        let width = u32::try_from(frame.cols)
            .map_err(|_| ConversionError::InvalidDimensions(frame.rows, frame.cols))?;
        let height = u32::try_from(frame.rows)
            .map_err(|_| ConversionError::InvalidDimensions(frame.rows, frame.cols))?;
        let bytes = quantize_u8(&frame.data);
        let encoder = PngEncoder::new(output);

        let encoded = match frame.channels {
            1 => GrayImage::from_raw(width, height, bytes)
                .ok_or_else(|| buffer_mismatch(frame))?
                .write_with_encoder(encoder),
            3 => RgbImage::from_raw(width, height, bytes)
                .ok_or_else(|| buffer_mismatch(frame))?
                .write_with_encoder(encoder),
            n => {
                return Err(ConversionError::UnsupportedFormat(format!(
                    "{n}-channel frames cannot be written as PNG"
                )));
            }
        };
        encoded.map_err(|e| ConversionError::EncodeError(e.to_string()))?;

        debug!("PNG encoding complete");
        Ok(())
    }
}

fn buffer_mismatch(frame: &RawFrame) -> ConversionError {
    ConversionError::EncodeError(format!(
        "sample buffer of {} does not fit {}x{}x{}",
        frame.len(),
        frame.rows,
        frame.cols,
        frame.channels
    ))
}
