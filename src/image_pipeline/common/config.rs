//! PDS4 to PNG conversion configuration types

use clap::ValueEnum;

/// Interpolation used to reconstruct RGB from an RGGB mosaic
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemosaicAlgorithm {
    /// Nearest neighbour (fastest, blocky edges)
    Nearest,
    /// Bilinear interpolation
    Linear,
    /// Bicubic interpolation (default)
    Cubic,
}

impl DemosaicAlgorithm {
    pub(crate) fn to_bayer(self) -> bayer::Demosaic {
        match self {
            DemosaicAlgorithm::Nearest => bayer::Demosaic::NearestNeighbour,
            DemosaicAlgorithm::Linear => bayer::Demosaic::Linear,
            DemosaicAlgorithm::Cubic => bayer::Demosaic::Cubic,
        }
    }
}

/// Default low percentile of the contrast stretch (the high one is `100 - p`)
pub const DEFAULT_PERCENTILE: f32 = 2.0;

/// Configuration for PDS4 to PNG conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Low clipping percentile of the contrast stretch
    pub percentile: f32,
    /// Interpolation used when a frame is debayered
    pub demosaic: DemosaicAlgorithm,
    /// Whether to reject frames with a zero dimension before processing
    pub validate_dimensions: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
            demosaic: DemosaicAlgorithm::Cubic,
            validate_dimensions: true,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    percentile: Option<f32>,
    demosaic: Option<DemosaicAlgorithm>,
    validate_dimensions: Option<bool>,
}

impl ConversionConfigBuilder {
    pub fn percentile(mut self, percentile: f32) -> Self {
        self.percentile = Some(percentile);
        self
    }

    pub fn demosaic(mut self, algorithm: DemosaicAlgorithm) -> Self {
        self.demosaic = Some(algorithm);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            percentile: self.percentile.unwrap_or(default.percentile),
            demosaic: self.demosaic.unwrap_or(default.demosaic),
            validate_dimensions: self
                .validate_dimensions
                .unwrap_or(default.validate_dimensions),
        }
    }
}
