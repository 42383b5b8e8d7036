use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::batch::console::Console;
use crate::batch::discovery::discover;
use crate::batch::types::{
    BatchConfig, BatchError, BatchOutcome, BatchSummary, ConversionResult, FileTask,
};
use crate::image_pipeline::{ConversionError, FrameReader, PdsToPngPipeline, PngWriter};

/// Runs one batch conversion.
///
/// Fails only on setup problems (missing input directory, output directory
/// that cannot be created). Per-file failures are reported on `console`,
/// counted, and do not stop the run.
pub fn run_batch<R, W>(
    config: &BatchConfig,
    pipeline: &PdsToPngPipeline<R, W>,
    console: &dyn Console,
) -> Result<BatchOutcome, BatchError>
where
    R: FrameReader + Sync,
    W: PngWriter + Sync,
{
    if !config.input_dir.exists() {
        return Err(BatchError::MissingInputDir(config.input_dir.clone()));
    }

    let files = discover(&config.input_dir);

    if files.is_empty() {
        console.out(&format!("No PDS files found in {}", config.input_dir.display()));
        return Ok(BatchOutcome::NoFiles);
    }

    console.out(&format!("Found {} PDS files", files.len()));

    if config.dry_run {
        for file in &files {
            console.out(&format!("  {}", file.display()));
        }
        return Ok(BatchOutcome::DryRun(files));
    }

    std::fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::CreateOutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let tasks: Vec<FileTask> = files.iter().map(|file| FileTask::plan(file, config)).collect();

    let results = if config.jobs > 1 {
        convert_parallel(tasks, config.jobs, pipeline, console)?
    } else {
        tasks
            .into_iter()
            .map(|task| convert_one(task, pipeline, console))
            .collect()
    };

    let summary = BatchSummary::from_results(&results);
    if !summary.failures.is_empty() {
        debug!("Failed inputs: {:?}", summary.failures);
    }
    info!(
        converted = summary.converted,
        failed = summary.failed,
        "Batch complete"
    );
    console.out(&format!(
        "\nDone: {} converted, {} failed",
        summary.converted, summary.failed
    ));

    Ok(BatchOutcome::Completed(summary))
}

fn convert_one<R: FrameReader, W: PngWriter>(
    task: FileTask,
    pipeline: &PdsToPngPipeline<R, W>,
    console: &dyn Console,
) -> ConversionResult {
    let display_name = |path: &PathBuf| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    };
    console.out(&format!(
        "Converting: {} -> {}",
        display_name(&task.input),
        display_name(&task.output)
    ));

    match write_task(&task, pipeline) {
        Ok(()) => ConversionResult { task, error: None },
        Err(error) => {
            warn!(input = %task.input.display(), "Conversion failed: {}", error);
            console.err(&format!("Error converting {}: {}", task.input.display(), error));
            ConversionResult {
                task,
                error: Some(error),
            }
        }
    }
}

fn write_task<R: FrameReader, W: PngWriter>(
    task: &FileTask,
    pipeline: &PdsToPngPipeline<R, W>,
) -> Result<(), ConversionError> {
    if let Some(parent) = task.output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConversionError::OutputWriteError(format!("{}: {}", parent.display(), e))
        })?;
    }
    pipeline.convert_file(&task.input, &task.output)
}

/// Converts on a dedicated pool of `jobs` threads. Tasks that write the same
/// output (flat-mode stem collisions) stay in one group and run in discovery
/// order, so the last one still wins.
fn convert_parallel<R, W>(
    tasks: Vec<FileTask>,
    jobs: usize,
    pipeline: &PdsToPngPipeline<R, W>,
    console: &dyn Console,
) -> Result<Vec<ConversionResult>, BatchError>
where
    R: FrameReader + Sync,
    W: PngWriter + Sync,
{
    let mut groups: Vec<Vec<FileTask>> = Vec::new();
    let mut group_of: HashMap<PathBuf, usize> = HashMap::new();
    for task in tasks {
        match group_of.get(&task.output) {
            Some(&index) => groups[index].push(task),
            None => {
                group_of.insert(task.output.clone(), groups.len());
                groups.push(vec![task]);
            }
        }
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| BatchError::WorkerPool(e.to_string()))?;

    debug!("Converting {} output group(s) on {} threads", groups.len(), jobs);

    Ok(pool.install(|| {
        groups
            .into_par_iter()
            .flat_map_iter(|group| {
                group
                    .into_iter()
                    .map(|task| convert_one(task, pipeline, console))
                    .collect::<Vec<_>>()
            })
            .collect()
    }))
}
