//! Common utilities module
//!
//! Shared error type, the in-memory frame and the conversion configuration
//! used by every stage of the pipeline.

pub mod config;
pub mod error;
pub mod frame;

pub use config::{ConversionConfig, ConversionConfigBuilder, DemosaicAlgorithm};
pub use error::{ConversionError, Result};
pub use frame::RawFrame;
