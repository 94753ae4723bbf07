//! Pixel-to-millimetre conversion and plausibility checks

/// Scale derivation from the reference frame
pub mod calibration;
/// Extent computation and range validation
pub mod validation;

pub use calibration::ScaleCalibrator;
pub use validation::{Dimensions, MeasurementValidator, SubjectExtent};
