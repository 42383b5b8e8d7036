//! Batch conversion types

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::image_pipeline::ConversionError;

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Root of the tree scanned for PDS4 products
    pub input_dir: PathBuf,
    /// Destination for PNG images, created when missing
    pub output_dir: PathBuf,
    /// Write every PNG directly into `output_dir` as `<stem>.png`
    pub flat: bool,
    /// List discovered files without converting anything
    pub dry_run: bool,
    /// Number of files converted concurrently
    pub jobs: usize,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            flat: false,
            dry_run: false,
            jobs: 1,
        }
    }
}

/// One input file and the PNG it converts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl FileTask {
    /// Output path for `input`: `<output_dir>/<stem>.png` in flat mode,
    /// otherwise the path relative to `input_dir` mirrored under
    /// `output_dir` with a `png` extension.
    pub fn plan(input: &Path, config: &BatchConfig) -> Self {
        let output = if config.flat {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            let mut name = stem.to_os_string();
            name.push(".png");
            config.output_dir.join(name)
        } else {
            let relative = input
                .strip_prefix(&config.input_dir)
                .ok()
                .filter(|rel| !rel.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new(input.file_name().unwrap_or(input.as_os_str())));
            config.output_dir.join(relative).with_extension("png")
        };

        Self {
            input: input.to_path_buf(),
            output,
        }
    }
}

/// Outcome of converting one file
#[derive(Debug)]
pub struct ConversionResult {
    pub task: FileTask,
    pub error: Option<ConversionError>,
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counts of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
    /// Inputs that failed, in the order their results were collected
    pub failures: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn from_results(results: &[ConversionResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            if result.is_success() {
                summary.converted += 1;
            } else {
                summary.failed += 1;
                summary.failures.push(result.task.input.clone());
            }
            summary
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Discovery found nothing; no output directory was created
    NoFiles,
    /// Sorted list of what would have been converted
    DryRun(Vec<PathBuf>),
    Completed(BatchSummary),
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input directory does not exist: {}", .0.display())]
    MissingInputDir(PathBuf),

    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}
