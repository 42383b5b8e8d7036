//! PDS4 frame reader.
//!
//! Chang'E mission products (`.2BL`, `.2CL`, ...) carry their XML label at
//! the head of the data file, with the array offset counted from the start
//! of that file. Other archives ship a detached `.xml` label next to the
//! `.img`/`.dat` payload. Both layouts are accepted here.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::common::frame::RawFrame;
use crate::image_pipeline::pds4::label::parse_label;
use crate::image_pipeline::pds4::reader::FrameReader;
use crate::image_pipeline::pds4::types::ArrayDescriptor;

/// Largest axis still treated as a band axis when the label does not name one.
const MAX_UNNAMED_BANDS: usize = 4;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Reader for PDS4 products whose first array object is an image.
pub struct Pds4Reader;

impl FrameReader for Pds4Reader {
    /// Reads the first array object of a PDS4 product.
    ///
    /// This method:
    /// 1. Loads the attached label, or the sibling `.xml` label
    /// 2. Selects the array describing this file
    /// 3. Decodes the elements and normalizes them to floating point
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the data file (not the detached label)
    ///
    /// # Returns
    ///
    /// * `Ok(RawFrame)` - 2-D frame, or 3-D interleaved frame for band cubes
    /// * `Err(ConversionError)` - Unreadable file, bad label or unsupported layout
    fn read_frame(&self, path: &Path) -> Result<RawFrame> {
        let data = std::fs::read(path)
            .map_err(|e| ConversionError::InputReadError(format!("{}: {}", path.display(), e)))?;

        let label = if has_attached_label(&data) {
            debug!("Reading attached label from {}", path.display());
            parse_label(&data)?
        } else {
            let label_path = detached_label_path(path).ok_or_else(|| {
                ConversionError::DecodeError(format!("no PDS4 label found for {}", path.display()))
            })?;
            debug!("Reading detached label {}", label_path.display());
            let xml = std::fs::read(&label_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", label_path.display(), e))
            })?;
            parse_label(&xml)?
        };

        let file_name = path.file_name().and_then(|name| name.to_str());
        let array = label.array_for(file_name)?;

        debug!(
            "Decoding {} at offset {}: shape {:?}, {:?}",
            array.object_name,
            array.offset,
            array.shape(),
            array.element_type
        );

        decode_array(&data, array)
    }
}

fn has_attached_label(data: &[u8]) -> bool {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let head = &data[start..];
    head.starts_with(b"<?xml") || head.starts_with(b"<Product")
}

fn detached_label_path(path: &Path) -> Option<PathBuf> {
    ["xml", "XML"]
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate != path && candidate.is_file())
}

/// Decodes `array` out of `data` into a frame.
pub(crate) fn decode_array(data: &[u8], array: &ArrayDescriptor) -> Result<RawFrame> {
    let shape = array.shape();
    if shape.iter().any(|&n| n == 0) {
        let rows = shape.first().copied().unwrap_or(0);
        let cols = shape.get(1).copied().unwrap_or(0);
        return Err(ConversionError::InvalidDimensions(rows, cols));
    }

    let start = usize::try_from(array.offset)
        .map_err(|_| ConversionError::DecodeError(format!("offset {} out of range", array.offset)))?;
    let byte_len = array
        .byte_len()
        .ok_or_else(|| ConversionError::DecodeError(format!("array size overflows: shape {:?}", shape)))?;
    let end = start
        .checked_add(byte_len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            ConversionError::DecodeError(format!(
                "truncated data: need {} bytes at offset {}, file has {}",
                byte_len,
                start,
                data.len()
            ))
        })?;

    let width = array.element_type.width;
    let samples: Vec<f32> = data[start..end]
        .chunks_exact(width)
        .map(|chunk| array.physical_value(array.element_type.decode(chunk)))
        .collect();

    match shape.as_slice() {
        &[rows, cols] => RawFrame::gray(rows, cols, samples),
        &[_, _, _] => interleave_bands(array, samples),
        other => Err(ConversionError::UnsupportedFormat(format!(
            "{}-dimensional array {}",
            other.len(),
            array.object_name
        ))),
    }
}

/// Finds the band axis of a 3-D array: the axis named `Band`, otherwise a
/// small leading or trailing axis.
fn band_axis(array: &ArrayDescriptor) -> Option<usize> {
    if let Some(named) = array
        .axes
        .iter()
        .position(|axis| axis.name.eq_ignore_ascii_case("band"))
    {
        return Some(named);
    }
    if array.axes[0].elements <= MAX_UNNAMED_BANDS {
        Some(0)
    } else if array.axes[2].elements <= MAX_UNNAMED_BANDS {
        Some(2)
    } else {
        None
    }
}

fn interleave_bands(array: &ArrayDescriptor, samples: Vec<f32>) -> Result<RawFrame> {
    let band = band_axis(array).ok_or_else(|| {
        ConversionError::UnsupportedFormat(format!("cannot identify band axis in shape {:?}", array.shape()))
    })?;
    let spatial: Vec<usize> = (0..3).filter(|&i| i != band).collect();
    let (row_axis, col_axis) = (spatial[0], spatial[1]);

    let shape = array.shape();
    let (rows, cols, bands) = (shape[row_axis], shape[col_axis], shape[band]);

    // Last index fastest
    let strides = [shape[1] * shape[2], shape[2], 1];

    if bands == 1 {
        return RawFrame::gray(rows, cols, samples);
    }
    if bands != 3 {
        return Err(ConversionError::UnsupportedFormat(format!(
            "{bands}-band arrays (expected 1 or 3)"
        )));
    }
    if band == 2 {
        return RawFrame::new(rows, cols, bands, samples);
    }

    let mut data = Vec::with_capacity(samples.len());
    for r in 0..rows {
        for c in 0..cols {
            for b in 0..bands {
                let index = r * strides[row_axis] + c * strides[col_axis] + b * strides[band];
                data.push(samples[index]);
            }
        }
    }
    RawFrame::new(rows, cols, bands, data)
}
