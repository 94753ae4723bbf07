use crate::config::{ExtentMode, ValidationConfig};
use crate::error::{Dimension, MeasurementFailure, RangeViolation};
use crate::models::{CalibrationScale, Contour};
use crate::utils::geometry::{convex_hull, hull_diameter, min_area_rect};
use serde::Serialize;

/// Subject size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubjectExtent {
    /// Heel-to-toe extent
    pub length_px: f32,
    /// Across-foot extent
    pub width_px: f32,
    /// Largest distance between two outline points
    pub max_span_px: f32,
}

impl SubjectExtent {
    /// Measure a contour. Axis-aligned mode uses the bounding box height as
    /// length; rotated mode uses the long side of the minimum-area rectangle.
    pub fn measure(contour: &Contour, mode: ExtentMode) -> Self {
        let hull = convex_hull(contour.points());
        let max_span_px = hull_diameter(&hull);
        match mode {
            ExtentMode::AxisAligned => {
                let bbox = contour.bbox();
                Self {
                    length_px: bbox.height() as f32,
                    width_px: bbox.width() as f32,
                    max_span_px,
                }
            }
            ExtentMode::MinAreaRect => {
                let rect = min_area_rect(&hull);
                Self {
                    length_px: rect.long,
                    width_px: rect.short,
                    max_span_px,
                }
            }
        }
    }
}

/// Subject size in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    /// Length in millimetres
    pub length_mm: f32,
    /// Width in millimetres
    pub width_mm: f32,
    /// Largest span in millimetres
    pub max_span_mm: f32,
}

/// Converts the subject extent and rejects implausible sizes
pub struct MeasurementValidator<'a> {
    config: &'a ValidationConfig,
}

impl<'a> MeasurementValidator<'a> {
    /// Create a validator over `config`
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    /// Convert `contour` to millimetres and check both dimensions against
    /// their inclusive bounds. Every failing dimension is reported.
    pub fn validate(
        &self,
        contour: &Contour,
        scale: CalibrationScale,
    ) -> Result<Dimensions, MeasurementFailure> {
        let extent = SubjectExtent::measure(contour, self.config.extent_mode);
        let dims = Dimensions {
            length_mm: scale.to_mm(extent.length_px),
            width_mm: scale.to_mm(extent.width_px),
            max_span_mm: scale.to_mm(extent.max_span_px),
        };
        log::debug!(
            "subject extent {:.0}x{:.0}px -> {:.1}x{:.1}mm",
            extent.width_px,
            extent.length_px,
            dims.width_mm,
            dims.length_mm
        );

        let checks = [
            (Dimension::Length, dims.length_mm, self.config.length_mm),
            (Dimension::Width, dims.width_mm, self.config.width_mm),
        ];
        let violations: Vec<RangeViolation> = checks
            .into_iter()
            .filter(|(_, value, band)| !band.contains(*value))
            .map(|(dimension, value_mm, band)| RangeViolation {
                dimension,
                value_mm,
                min_mm: band.min,
                max_mm: band.max,
            })
            .collect();

        if violations.is_empty() {
            Ok(dims)
        } else {
            Err(MeasurementFailure::MeasurementOutOfRange {
                length_mm: dims.length_mm,
                width_mm: dims.width_mm,
                violations,
            })
        }
    }
}
