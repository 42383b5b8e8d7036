//! PDS4 array descriptor types

use crate::image_pipeline::common::error::{ConversionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Signed,
    Unsigned,
    Float,
}

/// Binary encoding of one array element, parsed from `<data_type>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementType {
    pub kind: SampleKind,
    /// Size of one element in bytes
    pub width: usize,
    pub order: ByteOrder,
}

impl ElementType {
    /// Parses a PDS4 `data_type` value such as `UnsignedMSB2` or `IEEE754LSBSingle`.
    pub fn parse(name: &str) -> Result<Self> {
        let unsupported = || ConversionError::UnsupportedFormat(format!("data type {name}"));

        match name {
            "SignedByte" => return Ok(Self::new(SampleKind::Signed, 1, ByteOrder::Big)),
            "UnsignedByte" => return Ok(Self::new(SampleKind::Unsigned, 1, ByteOrder::Big)),
            _ => {}
        }

        if let Some(rest) = name.strip_prefix("IEEE754") {
            let (order, size) = split_order(rest).ok_or_else(unsupported)?;
            let width = match size {
                "Single" => 4,
                "Double" => 8,
                _ => return Err(unsupported()),
            };
            return Ok(Self::new(SampleKind::Float, width, order));
        }

        let (kind, rest) = if let Some(rest) = name.strip_prefix("Unsigned") {
            (SampleKind::Unsigned, rest)
        } else if let Some(rest) = name.strip_prefix("Signed") {
            (SampleKind::Signed, rest)
        } else {
            return Err(unsupported());
        };
        let (order, size) = split_order(rest).ok_or_else(unsupported)?;
        let width = match size {
            "2" => 2,
            "4" => 4,
            "8" => 8,
            _ => return Err(unsupported()),
        };
        Ok(Self::new(kind, width, order))
    }

    pub fn new(kind: SampleKind, width: usize, order: ByteOrder) -> Self {
        Self { kind, width, order }
    }

    /// Decodes one element. `bytes` must hold exactly `self.width` bytes.
    pub fn decode(&self, bytes: &[u8]) -> f64 {
        let mut bits = 0u64;
        match self.order {
            ByteOrder::Big => bytes.iter().for_each(|&b| bits = (bits << 8) | b as u64),
            ByteOrder::Little => bytes.iter().rev().for_each(|&b| bits = (bits << 8) | b as u64),
        }

        match (self.kind, self.width) {
            (SampleKind::Unsigned, _) => bits as f64,
            (SampleKind::Signed, w) => {
                let shift = 64 - 8 * w as u32;
                ((bits << shift) as i64 >> shift) as f64
            }
            (SampleKind::Float, 4) => f32::from_bits(bits as u32) as f64,
            (SampleKind::Float, _) => f64::from_bits(bits),
        }
    }

    /// Maps a decoded value onto the floating-point image range: unsigned
    /// integers to [0, 1], signed integers to [-1, 1], floats unchanged.
    pub fn normalize(&self, value: f64) -> f32 {
        let bits = 8 * self.width as i32;
        match self.kind {
            SampleKind::Unsigned => (value / (2f64.powi(bits) - 1.0)) as f32,
            SampleKind::Signed => (value / (2f64.powi(bits - 1) - 1.0)).max(-1.0) as f32,
            SampleKind::Float => value as f32,
        }
    }
}

fn split_order(rest: &str) -> Option<(ByteOrder, &str)> {
    if let Some(size) = rest.strip_prefix("LSB") {
        Some((ByteOrder::Little, size))
    } else {
        rest.strip_prefix("MSB").map(|size| (ByteOrder::Big, size))
    }
}

/// One `<Axis_Array>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub elements: usize,
    pub sequence_number: usize,
}

/// Location and layout of an `Array*` object inside a data file
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    /// Label element name, e.g. `Array_2D_Image`
    pub object_name: String,
    /// Byte offset of the first element from the start of the data file
    pub offset: u64,
    /// Axes ordered by sequence number, slowest varying first
    pub axes: Vec<Axis>,
    pub element_type: ElementType,
    pub scaling_factor: Option<f64>,
    pub value_offset: Option<f64>,
}

impl ArrayDescriptor {
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|axis| axis.elements).collect()
    }

    /// Number of elements, `None` when the axis sizes overflow `usize`.
    pub fn element_count(&self) -> Option<usize> {
        self.axes
            .iter()
            .try_fold(1usize, |count, axis| count.checked_mul(axis.elements))
    }

    pub fn byte_len(&self) -> Option<usize> {
        self.element_count()?.checked_mul(self.element_type.width)
    }

    /// True when the label declares a scaling other than `v * 1 + 0`.
    pub fn is_scaled(&self) -> bool {
        self.scaling_factor.is_some_and(|s| s != 1.0) || self.value_offset.is_some_and(|o| o != 0.0)
    }

    pub fn physical_value(&self, raw: f64) -> f32 {
        if self.is_scaled() {
            (raw * self.scaling_factor.unwrap_or(1.0) + self.value_offset.unwrap_or(0.0)) as f32
        } else {
            self.element_type.normalize(raw)
        }
    }
}
