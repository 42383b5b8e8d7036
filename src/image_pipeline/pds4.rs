//! PDS4 product reading module
//!
//! Decodes the first array object of a PDS4 product into a floating-point
//! frame. Labels may be attached to the data file or stored beside it.

mod label;
mod pds4_reader;
mod reader;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use label::{FileArea, Pds4Label, parse_label};
pub use pds4_reader::Pds4Reader;
pub use reader::FrameReader;
pub use types::{ArrayDescriptor, Axis, ByteOrder, ElementType, SampleKind};
