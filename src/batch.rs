//! Batch conversion of a directory tree
//!
//! Discovers PDS4 data files, plans one output path per file and drives the
//! conversion pipeline over them, tolerating per-file failures.

mod console;
mod discovery;
mod driver;
pub mod types;

#[cfg(test)]
mod tests;

pub use console::{Console, StdConsole};
pub use discovery::{discover, is_pds_data_file};
pub use driver::run_batch;
pub use types::{BatchConfig, BatchError, BatchOutcome, BatchSummary, ConversionResult, FileTask};
