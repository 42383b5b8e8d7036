use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::tempdir;

use crate::batch::{BatchConfig, BatchError, BatchOutcome, Console, run_batch};
use crate::image_pipeline::pds4::fixtures::{gradient, write_attached_u16, write_detached};
use crate::image_pipeline::{ConversionConfig, PdsToPngPipeline};

#[derive(Default)]
struct RecordingConsole {
    out: Mutex<Vec<String>>,
    err: Mutex<Vec<String>>,
}

impl Console for RecordingConsole {
    fn out(&self, line: &str) {
        self.out.lock().unwrap().push(line.to_string());
    }

    fn err(&self, line: &str) {
        self.err.lock().unwrap().push(line.to_string());
    }
}

impl RecordingConsole {
    fn out_lines(&self) -> Vec<String> {
        self.out.lock().unwrap().clone()
    }

    fn err_lines(&self) -> Vec<String> {
        self.err.lock().unwrap().clone()
    }
}

fn write_product(path: &Path, rows: usize, cols: usize) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    write_attached_u16(path, rows, cols, &gradient(rows, cols));
}

fn run(config: &BatchConfig) -> (Result<BatchOutcome, BatchError>, RecordingConsole) {
    let console = RecordingConsole::default();
    let pipeline = PdsToPngPipeline::new(ConversionConfig::default());
    let outcome = run_batch(config, &pipeline, &console);
    (outcome, console)
}

fn png_dimensions(path: &Path) -> (u32, u32) {
    let image = image::open(path).unwrap();
    (image.width(), image.height())
}

#[test]
fn test_missing_input_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let config = BatchConfig::new(dir.path().join("absent"), dir.path().join("out"));

    let (outcome, console) = run(&config);

    assert!(matches!(outcome, Err(BatchError::MissingInputDir(_))));
    assert!(console.out_lines().is_empty());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_no_files_found_creates_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("label.xml"), b"<x/>").unwrap();
    let output = dir.path().join("images");

    let (outcome, console) = run(&BatchConfig::new(&input, &output));

    assert_eq!(outcome.unwrap(), BatchOutcome::NoFiles);
    assert_eq!(
        console.out_lines(),
        vec![format!("No PDS files found in {}", input.display())]
    );
    assert!(!output.exists());
}

#[test]
fn test_file_given_as_input_dir_finds_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("single.2BL");
    write_product(&input, 4, 4);
    let output = dir.path().join("images");

    let (outcome, console) = run(&BatchConfig::new(&input, &output));

    assert_eq!(outcome.unwrap(), BatchOutcome::NoFiles);
    assert_eq!(
        console.out_lines(),
        vec![format!("No PDS files found in {}", input.display())]
    );
    assert!(!output.exists());
}

#[test]
fn test_dry_run_lists_files_without_writing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    write_product(&input.join("b/second.2BL"), 4, 4);
    write_product(&input.join("a/first.2CL"), 4, 4);
    let output = dir.path().join("images");

    let mut config = BatchConfig::new(&input, &output);
    config.dry_run = true;
    let (outcome, console) = run(&config);

    let expected = vec![input.join("a/first.2CL"), input.join("b/second.2BL")];
    assert_eq!(outcome.unwrap(), BatchOutcome::DryRun(expected.clone()));
    assert_eq!(
        console.out_lines(),
        vec![
            "Found 2 PDS files".to_string(),
            format!("  {}", expected[0].display()),
            format!("  {}", expected[1].display()),
        ]
    );
    assert!(!output.exists());
}

#[test]
fn test_mirrored_layout_converts_every_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    write_product(&input.join("day1/frame.2BL"), 4, 6);
    write_product(&input.join("day2/frame.2BL"), 8, 10);
    let output = dir.path().join("images");

    let (outcome, console) = run(&BatchConfig::new(&input, &output));

    let BatchOutcome::Completed(summary) = outcome.unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!((summary.converted, summary.failed), (2, 0));
    assert_eq!(png_dimensions(&output.join("day1/frame.png")), (6, 4));
    assert_eq!(png_dimensions(&output.join("day2/frame.png")), (10, 8));

    let out = console.out_lines();
    assert_eq!(out[0], "Found 2 PDS files");
    assert_eq!(out[1], "Converting: frame.2BL -> frame.png");
    assert_eq!(out.last().unwrap(), "\nDone: 2 converted, 0 failed");
    assert!(console.err_lines().is_empty());
}

#[test]
fn test_flat_layout_keeps_last_same_stem_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    write_product(&input.join("day1/frame.2BL"), 4, 6);
    write_product(&input.join("day2/frame.2BL"), 8, 10);
    let output = dir.path().join("images");

    let mut config = BatchConfig::new(&input, &output);
    config.flat = true;
    let (outcome, _) = run(&config);

    let BatchOutcome::Completed(summary) = outcome.unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!(summary.converted, 2);

    let written: Vec<PathBuf> = std::fs::read_dir(&output)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(written, vec![output.join("frame.png")]);
    assert_eq!(png_dimensions(&output.join("frame.png")), (10, 8));
}

#[test]
fn test_corrupt_file_is_counted_and_batch_continues() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    write_product(&input.join("a_good.2BL"), 4, 4);
    std::fs::write(input.join("b_corrupt.2BL"), b"\x00\x01 not a product").unwrap();
    write_product(&input.join("c_good.2BL"), 4, 4);
    let output = dir.path().join("images");

    let (outcome, console) = run(&BatchConfig::new(&input, &output));

    let BatchOutcome::Completed(summary) = outcome.unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!((summary.converted, summary.failed), (2, 1));
    assert_eq!(summary.failures, vec![input.join("b_corrupt.2BL")]);

    assert!(output.join("a_good.png").exists());
    assert!(!output.join("b_corrupt.png").exists());
    assert!(output.join("c_good.png").exists());

    let err = console.err_lines();
    assert_eq!(err.len(), 1);
    assert!(err[0].starts_with(&format!("Error converting {}: ", input.join("b_corrupt.2BL").display())));
    assert_eq!(console.out_lines().last().unwrap(), "\nDone: 2 converted, 1 failed");
}

#[test]
fn test_oversized_label_is_one_failure() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    std::fs::create_dir_all(&input).unwrap();
    let axes = [("Band", 3), ("Line", 1usize << 31), ("Sample", 1usize << 31)];
    write_detached(&input.join("a_bad.img"), "UnsignedByte", &axes, &[0u8; 64]);
    write_product(&input.join("b_good.2BL"), 4, 4);
    let output = dir.path().join("images");

    let (outcome, console) = run(&BatchConfig::new(&input, &output));

    let BatchOutcome::Completed(summary) = outcome.unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!((summary.converted, summary.failed), (1, 1));
    assert_eq!(summary.failures, vec![input.join("a_bad.img")]);
    assert!(output.join("b_good.png").exists());
    assert_eq!(console.out_lines().last().unwrap(), "\nDone: 1 converted, 1 failed");
}

#[test]
fn test_detached_label_products_convert() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    std::fs::create_dir_all(&input).unwrap();
    let payload: Vec<u8> = (0..=255u8).collect();
    write_detached(&input.join("frame.img"), "UnsignedByte", &[("Line", 16), ("Sample", 16)], &payload);
    let output = dir.path().join("images");

    let (outcome, _) = run(&BatchConfig::new(&input, &output));

    let BatchOutcome::Completed(summary) = outcome.unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!((summary.converted, summary.failed), (1, 0));
    assert_eq!(png_dimensions(&output.join("frame.png")), (16, 16));
}

#[test]
fn test_parallel_run_matches_sequential_counts() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw");
    for i in 0..6 {
        write_product(&input.join(format!("set{i}/frame_{i}.2CL")), 4, 4);
    }
    write_product(&input.join("set9/frame_0.2CL"), 6, 8);
    std::fs::write(input.join("broken.img"), b"garbage").unwrap();
    let output = dir.path().join("images");

    let mut config = BatchConfig::new(&input, &output);
    config.flat = true;
    config.jobs = 4;
    let (outcome, console) = run(&config);

    let BatchOutcome::Completed(summary) = outcome.unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!((summary.converted, summary.failed), (7, 1));
    assert_eq!(console.err_lines().len(), 1);
    // set9 sorts after set0, so its frame_0 wins the flat collision
    assert_eq!(png_dimensions(&output.join("frame_0.png")), (8, 6));
}
