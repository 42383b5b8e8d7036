use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::frame::RawFrame;

pub trait PngWriter {
    fn write_png(&self, frame: &RawFrame, output: &mut dyn Write) -> Result<()>;
}
