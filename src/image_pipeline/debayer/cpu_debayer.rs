use std::io::Cursor;

use bayer::{BayerDepth, CFA, RasterDepth, RasterMut};
use tracing::debug;

use crate::image_pipeline::common::config::DemosaicAlgorithm;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::common::frame::RawFrame;
use crate::image_pipeline::debayer::transfer::srgb_encode_in_place;

const U16_SCALE: f32 = u16::MAX as f32;

pub struct CpuDebayer {
    algorithm: DemosaicAlgorithm,
}

impl CpuDebayer {
    pub fn new(algorithm: DemosaicAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Demosaics an RGGB frame into a 3-channel frame and applies the sRGB
    /// transfer curve.
    ///
    /// The `bayer` crate works on integer rasters, so the frame's finite
    /// sample range is mapped onto the full 16-bit range for the
    /// interpolation and mapped back afterwards.
    pub fn process(&self, frame: &RawFrame) -> Result<RawFrame> {
        if frame.channels != 1 {
            return Err(ConversionError::UnsupportedFormat(format!(
                "cannot debayer a {}-channel frame",
                frame.channels
            )));
        }

        let (rows, cols) = (frame.rows, frame.cols);
        debug!(
            "Starting CPU debayering for frame {}x{}, CFA=RGGB, algo={:?}",
            cols, rows, self.algorithm
        );

        let (low, high) = frame.finite_range().unwrap_or((0.0, 1.0));
        let span = if high > low { high - low } else { 1.0 };

        let bayer_bytes: Vec<u8> = frame
            .data
            .iter()
            .map(|&v| {
                let scaled = ((v - low) / span * U16_SCALE).round();
                // NaN saturates to 0
                scaled.clamp(0.0, U16_SCALE) as u16
            })
            .flat_map(|v| v.to_le_bytes())
            .collect();

        let mut output_buf = vec![0u8; rows * cols * 3 * 2];
        {
            let mut cursor = Cursor::new(&bayer_bytes[..]);
            let mut output_raster = RasterMut::new(cols, rows, RasterDepth::Depth16, &mut output_buf);

            bayer::run_demosaic(
                &mut cursor,
                BayerDepth::Depth16LE,
                CFA::RGGB,
                self.algorithm.to_bayer(),
                &mut output_raster,
            )
            .map_err(|e| ConversionError::DebayerError(format!("{:?}", e)))?;
        }

        // 16-bit rasters are filled in native byte order
        let mut rgb: Vec<f32> = output_buf
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]) as f32 / U16_SCALE * span + low)
            .collect();

        srgb_encode_in_place(&mut rgb);

        RawFrame::new(rows, cols, 3, rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_frame(rows: usize, cols: usize, value: f32) -> RawFrame {
        RawFrame::gray(rows, cols, vec![value; rows * cols]).unwrap()
    }

    #[test]
    fn test_output_has_three_channels() {
        let frame = flat_frame(8, 12, 0.5);
        let rgb = CpuDebayer::new(DemosaicAlgorithm::Linear).process(&frame).unwrap();
        assert_eq!(rgb.shape(), vec![8, 12, 3]);
        assert_eq!(rgb.len(), 8 * 12 * 3);
    }

    #[test]
    fn test_rggb_sites_map_to_channels() {
        // Red photosites bright, everything else dark
        let (rows, cols) = (8, 8);
        let data: Vec<f32> = (0..rows * cols)
            .map(|i| if (i / cols) % 2 == 0 && (i % cols) % 2 == 0 { 1.0 } else { 0.0 })
            .collect();
        let frame = RawFrame::gray(rows, cols, data).unwrap();

        let rgb = CpuDebayer::new(DemosaicAlgorithm::Nearest).process(&frame).unwrap();
        let centre = (4 * cols + 4) * 3;
        assert!(rgb.data[centre] > 0.9, "red {}", rgb.data[centre]);
        assert!(rgb.data[centre + 1] < 0.1, "green {}", rgb.data[centre + 1]);
        assert!(rgb.data[centre + 2] < 0.1, "blue {}", rgb.data[centre + 2]);
    }

    #[test]
    fn test_uniform_frame_keeps_level_through_transfer_curve() {
        let frame = flat_frame(8, 8, 0.25);
        let rgb = CpuDebayer::new(DemosaicAlgorithm::Cubic).process(&frame).unwrap();
        let expected = crate::image_pipeline::debayer::transfer::srgb_encode(0.25);
        assert!(rgb.data.iter().all(|v| (v - expected).abs() < 1e-3));
    }

    #[test]
    fn test_rejects_color_frames() {
        let frame = RawFrame::new(4, 4, 3, vec![0.0; 48]).unwrap();
        let result = CpuDebayer::new(DemosaicAlgorithm::Linear).process(&frame);
        assert!(matches!(result, Err(ConversionError::UnsupportedFormat(_))));
    }
}
