//! In-memory image frame shared by the pipeline stages

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Floating-point image decoded from a PDS4 array.
///
/// Samples are stored row-major with channels interleaved
/// `[r0c0ch0, r0c0ch1, ..., r0c1ch0, ...]`. A single-channel frame is
/// two-dimensional, anything else is three-dimensional.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Number of rows (image height)
    pub rows: usize,
    /// Number of columns (image width)
    pub cols: usize,
    /// Samples per pixel (1 for mosaics and grayscale, 3 for RGB)
    pub channels: usize,
    /// Interleaved sample data, conventionally in [0, 1]
    pub data: Vec<f32>,
}

impl RawFrame {
    pub fn new(rows: usize, cols: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ConversionError::InvalidDimensions(rows, cols));
        }
        if channels == 0 || data.len() != rows * cols * channels {
            return Err(ConversionError::DecodeError(format!(
                "sample count {} does not match shape {}x{}x{}",
                data.len(),
                rows,
                cols,
                channels
            )));
        }
        Ok(Self {
            rows,
            cols,
            channels,
            data,
        })
    }

    pub fn gray(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        Self::new(rows, cols, 1, data)
    }

    /// Array shape as `(rows, cols)` or `(rows, cols, channels)`.
    pub fn shape(&self) -> Vec<usize> {
        if self.channels == 1 {
            vec![self.rows, self.cols]
        } else {
            vec![self.rows, self.cols, self.channels]
        }
    }

    pub fn ndim(&self) -> usize {
        if self.channels == 1 { 2 } else { 3 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Smallest and largest finite sample, `None` when there is none.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
