//! Pipeline conversions module
//!
//! Orchestrates read, debayer, stretch and PNG encoding for one product.

mod pds_to_png;


pub use pds_to_png::PdsToPngPipeline;
