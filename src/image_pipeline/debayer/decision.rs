//! Shape-based decision whether a frame is an undemosaiced Bayer mosaic

/// Full-resolution PCAM sensor readout, always an RGGB mosaic
pub const RAW_MOSAIC_SHAPE: (usize, usize) = (1728, 2352);

/// PCAM products that were already demosaiced and downsampled on board
pub const PROCESSED_SHAPE: (usize, usize) = (864, 1176);

/// Both dimensions of an unknown 2-D frame must exceed this to be treated as a mosaic
pub const MIN_MOSAIC_DIMENSION: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebayerDecision {
    /// Exact match with the raw sensor resolution
    KnownMosaic,
    /// Large single-channel frame of unknown provenance
    UnrecognizedMosaic,
    /// Leave the frame as it is
    PassThrough,
}

impl DebayerDecision {
    pub fn should_debayer(self) -> bool {
        !matches!(self, DebayerDecision::PassThrough)
    }
}

/// Decides from an array shape (`(rows, cols)` or `(rows, cols, channels)`)
/// whether the frame needs demosaicing.
pub fn decide(shape: &[usize]) -> DebayerDecision {
    match *shape {
        [rows, cols] if (rows, cols) == RAW_MOSAIC_SHAPE => DebayerDecision::KnownMosaic,
        [rows, cols]
            if (rows, cols) != PROCESSED_SHAPE
                && rows > MIN_MOSAIC_DIMENSION
                && cols > MIN_MOSAIC_DIMENSION =>
        {
            DebayerDecision::UnrecognizedMosaic
        }
        _ => DebayerDecision::PassThrough,
    }
}
