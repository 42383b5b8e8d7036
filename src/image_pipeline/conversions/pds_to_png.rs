use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::image_pipeline::{
    common::{
        config::ConversionConfig,
        error::{ConversionError, Result},
        frame::RawFrame,
    },
    debayer::{CpuDebayer, decide},
    pds4::{FrameReader, Pds4Reader},
    png::{PngWriter, StandardPngWriter},
    stretch::PercentileStretch,
};

pub struct PdsToPngPipeline<R: FrameReader, W: PngWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
}

impl PdsToPngPipeline<Pds4Reader, StandardPngWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            reader: Pds4Reader,
            writer: StandardPngWriter,
            config,
        }
    }
}

impl<R: FrameReader, W: PngWriter> PdsToPngPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, frame: &RawFrame) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        // RawFrame's fields are public, so readers can hand back frames
        // that never went through RawFrame::new
        let expected = frame
            .rows
            .checked_mul(frame.cols)
            .and_then(|n| n.checked_mul(frame.channels));
        if frame.is_empty() || expected != Some(frame.len()) {
            return Err(ConversionError::InvalidDimensions(frame.rows, frame.cols));
        }

        if frame.channels != 1 && frame.channels != 3 {
            return Err(ConversionError::UnsupportedFormat(format!(
                "{}-channel frame",
                frame.channels
            )));
        }

        Ok(())
    }

    /// Reads a product and runs the debayer decision and contrast stretch,
    /// returning the display-ready frame.
    pub fn render(&self, input_path: &Path) -> Result<RawFrame> {
        let mut frame = {
            let _span = tracing::info_span!("read_pds4").entered();
            self.reader.read_frame(input_path)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                rows = frame.rows,
                cols = frame.cols,
                channels = frame.channels
            )
            .entered();
            self.validate_dimensions(&frame)?;
        }

        let decision = decide(&frame.shape());
        debug!("Debayer decision for shape {:?}: {:?}", frame.shape(), decision);
        if decision.should_debayer() {
            let _span = tracing::info_span!("debayer").entered();
            frame = CpuDebayer::new(self.config.demosaic).process(&frame)?;
        }

        {
            let _span = tracing::info_span!("stretch").entered();
            PercentileStretch::new(self.config.percentile).apply(&mut frame);
        }

        Ok(frame)
    }

    pub fn convert(&self, input_path: &Path, output: &mut dyn Write) -> Result<()> {
        let frame = self.render(input_path)?;

        {
            let _span = tracing::info_span!("encode_png").entered();
            self.writer.write_png(&frame, output)?;
        }

        info!(
            rows = frame.rows,
            cols = frame.cols,
            channels = frame.channels,
            "Conversion complete"
        );
        Ok(())
    }

    /// Converts `input_path` into a PNG at `output_path`.
    ///
    /// The PNG is written to a temporary file beside the destination and
    /// renamed into place, so `output_path` is never left half-written.
    /// The destination directory must already exist.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let frame = self.render(input_path)?;

        let output_error =
            |e: std::io::Error| ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e));

        let parent = output_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = {
            let _span = tracing::info_span!("create_output_file").entered();
            let mut builder = tempfile::Builder::new();
            builder.prefix(".convert_pds").suffix(".png.part");
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                builder.permissions(std::fs::Permissions::from_mode(0o644));
            }
            builder.tempfile_in(parent).map_err(output_error)?
        };

        {
            let _span = tracing::info_span!("encode_png").entered();
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.writer.write_png(&frame, &mut writer)?;
            writer.flush().map_err(output_error)?;
        }

        temp.persist(output_path).map_err(|e| output_error(e.error))?;

        info!(
            rows = frame.rows,
            cols = frame.cols,
            channels = frame.channels,
            "Conversion complete"
        );
        Ok(())
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }
}
