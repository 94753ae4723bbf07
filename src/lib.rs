//! foot_measure - calibrated foot measurement from a single photo
//!
//! A foot is photographed standing on a sheet of paper of known size (A4 or
//! US Letter). The sheet is located, its top edge fixes the pixels per
//! millimetre, and the foot outline inside the sheet is found, scored and
//! converted to length and width.
//!
//! Stages run strictly in order and each one either produces its output or
//! ends the run with a typed [`MeasurementFailure`].
//!
//! ```no_run
//! use foot_measure::{FootMeasurer, MeasureConfig, PaperSize};
//! use foot_measure::tools::load_image;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = load_image("foot.jpg")?;
//! let measurer = FootMeasurer::new(MeasureConfig::default())?;
//! match measurer.measure(&image, PaperSize::A4) {
//!     Ok(m) => println!("{m}"),
//!     Err(failure) => println!("{failure}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Tunable thresholds, bands and weights
pub mod config;
/// Detection stages (edges, contours, reference, subject)
pub mod detector;
/// Error and failure types
pub mod error;
/// Scale calibration and measurement validation
pub mod measure;
/// Core data structures (images, edge maps, contours, frames, results)
pub mod models;
/// Stage orchestration
pub mod pipeline;
/// Image loading, dataset helpers and synthetic scenes
pub mod tools;
/// Utility functions (grayscale, blur, colour, geometry)
pub mod utils;

pub use config::{ConfigError, MeasureConfig};
pub use error::{MeasureError, MeasurementFailure};
pub use models::{ConfidenceLabel, ImageRgb, Measurement, PaperSize};
pub use pipeline::{Pipeline, PipelineResult, PipelineTelemetry};

/// Measure the subject in an image with the strict default configuration
pub fn measure(image: &ImageRgb, paper: PaperSize) -> PipelineResult {
    let config = MeasureConfig::default();
    Pipeline::new(&config).run(image, paper)
}

/// Measure the subject in a raw RGB buffer (3 bytes per pixel)
pub fn measure_rgb(
    rgb: &[u8],
    width: usize,
    height: usize,
    paper: PaperSize,
) -> Result<PipelineResult, MeasureError> {
    let image = ImageRgb::from_raw(width, height, rgb.to_vec())?;
    Ok(measure(&image, paper))
}

/// Measurer holding a validated configuration
#[derive(Debug, Clone)]
pub struct FootMeasurer {
    config: MeasureConfig,
}

impl FootMeasurer {
    /// Validate `config` and build a measurer around it
    pub fn new(config: MeasureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Measurer with the permissive preset
    pub fn permissive() -> Self {
        Self {
            config: MeasureConfig::permissive(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// Run the pipeline on one image
    pub fn measure(&self, image: &ImageRgb, paper: PaperSize) -> PipelineResult {
        Pipeline::new(&self.config).run(image, paper)
    }

    /// Run the pipeline and collect stage counters
    pub fn measure_with_telemetry(
        &self,
        image: &ImageRgb,
        paper: PaperSize,
    ) -> (PipelineResult, PipelineTelemetry) {
        Pipeline::new(&self.config).run_with_telemetry(image, paper)
    }
}

impl Default for FootMeasurer {
    fn default() -> Self {
        Self {
            config: MeasureConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty() {
        // Uniform image has no edges and therefore no reference
        let image = vec![0u8; 300]; // 10x10 RGB
        let result = measure_rgb(&image, 10, 10, PaperSize::A4).unwrap();
        assert!(matches!(
            result,
            Err(MeasurementFailure::ReferenceNotFound { .. })
        ));
    }

    #[test]
    fn test_measure_rgb_rejects_short_buffer() {
        let err = measure_rgb(&[0u8; 10], 10, 10, PaperSize::A4).unwrap_err();
        assert!(matches!(err, MeasureError::BufferSize { .. }));
    }

    #[test]
    fn test_invalid_config_refused() {
        let mut config = MeasureConfig::default();
        config.subject.weights.position = 0.9;
        assert!(FootMeasurer::new(config).is_err());
        assert_eq!(
            FootMeasurer::default().config(),
            &MeasureConfig::default()
        );
    }
}
