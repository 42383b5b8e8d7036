use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use pds4_png::batch::{BatchConfig, BatchOutcome, StdConsole, run_batch};
use pds4_png::image_pipeline::{ConversionConfig, DemosaicAlgorithm, PdsToPngPipeline};
use pds4_png::logger;

use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "convert_pds",
    version,
    about = "Convert Chang'E-4 PDS4 files to PNG images",
    after_help = "Examples:\n    convert_pds data/raw data/images\n    convert_pds ./PCAM ./output --flat"
)]
struct Cli {
    /// Directory containing PDS4 files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory for output PNG images
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Output all files to single directory (ignore subdirectory structure)
    #[arg(long)]
    flat: bool,

    /// List files that would be converted without converting
    #[arg(long)]
    dry_run: bool,

    /// Low clipping percentile of the contrast stretch (high is 100 - P)
    #[arg(long, value_name = "P", default_value_t = 2.0, value_parser = parse_percentile)]
    percentile: f32,

    /// Demosaicing interpolation for raw Bayer frames
    #[arg(long, value_enum, default_value_t = DemosaicAlgorithm::Cubic)]
    demosaic: DemosaicAlgorithm,

    /// Number of files converted in parallel
    #[arg(long, short = 'j', default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    jobs: u16,

    /// Increase diagnostic output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_percentile(value: &str) -> Result<f32, String> {
    let percentile: f32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if (0.0..50.0).contains(&percentile) {
        Ok(percentile)
    } else {
        Err(format!("percentile must be in [0, 50), got {percentile}"))
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    debug!("Arguments: {:?}", cli);

    let conversion = ConversionConfig::builder()
        .percentile(cli.percentile)
        .demosaic(cli.demosaic)
        .build();
    let pipeline = PdsToPngPipeline::new(conversion);

    info!(
        "Stretch: p{}/p{}, demosaic: {:?}",
        pipeline.config().percentile,
        100.0 - pipeline.config().percentile,
        pipeline.config().demosaic
    );

    let config = BatchConfig {
        input_dir: cli.input_dir,
        output_dir: cli.output_dir,
        flat: cli.flat,
        dry_run: cli.dry_run,
        jobs: cli.jobs as usize,
    };

    match run_batch(&config, &pipeline, &StdConsole)? {
        BatchOutcome::NoFiles => info!("Nothing to convert"),
        BatchOutcome::DryRun(files) => info!("Dry run listed {} file(s)", files.len()),
        BatchOutcome::Completed(summary) => info!(
            converted = summary.converted,
            failed = summary.failed,
            "Finished"
        ),
    }

    Ok(())
}
