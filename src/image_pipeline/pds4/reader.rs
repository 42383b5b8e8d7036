use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::frame::RawFrame;

pub trait FrameReader {
    fn read_frame(&self, path: &Path) -> Result<RawFrame>;
}
