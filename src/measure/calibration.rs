use crate::error::MeasurementFailure;
use crate::models::{CalibrationScale, PaperSize, ReferenceFrame};

/// Shortest top edge, in pixels, accepted for calibration
pub const MIN_EDGE_PX: f32 = 1.0;

/// Derives pixels per millimetre from the reference frame's top edge
pub struct ScaleCalibrator;

impl ScaleCalibrator {
    /// Top edge length divided by the paper's short side
    pub fn calibrate(
        frame: &ReferenceFrame,
        paper: PaperSize,
    ) -> Result<CalibrationScale, MeasurementFailure> {
        let edge_px = frame.width_px();
        let physical_width_mm = paper.width_mm();
        let failure = MeasurementFailure::CalibrationFailure {
            edge_px,
            physical_width_mm,
        };
        if edge_px.is_nan() || edge_px < MIN_EDGE_PX {
            return Err(failure);
        }
        let scale = CalibrationScale::new(edge_px / physical_width_mm).ok_or(failure)?;
        log::debug!(
            "calibrated {:.2} px/mm from {edge_px:.1}px over {physical_width_mm}mm ({paper})",
            scale.px_per_mm()
        );
        Ok(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Point, PointI};

    fn frame(x0: i32, y0: i32, w: i32, h: i32) -> ReferenceFrame {
        ReferenceFrame::from_polygon(&[
            PointI::new(x0, y0),
            PointI::new(x0 + w, y0),
            PointI::new(x0 + w, y0 + h),
            PointI::new(x0, y0 + h),
        ])
        .unwrap()
    }

    #[test]
    fn test_a4_scale() {
        let scale = ScaleCalibrator::calibrate(&frame(10, 10, 600, 849), PaperSize::A4).unwrap();
        assert!((scale.px_per_mm() - 600.0 / 210.0).abs() < 1e-4);
        let letter = ScaleCalibrator::calibrate(&frame(10, 10, 600, 849), PaperSize::Letter).unwrap();
        assert!((letter.px_per_mm() - 600.0 / 216.0).abs() < 1e-4);
    }

    #[test]
    fn test_idempotent_and_linear() {
        let f = frame(0, 0, 420, 594);
        let a = ScaleCalibrator::calibrate(&f, PaperSize::A4).unwrap();
        let b = ScaleCalibrator::calibrate(&f, PaperSize::A4).unwrap();
        assert_eq!(a, b);

        let doubled = frame(0, 0, 840, 1188);
        let c = ScaleCalibrator::calibrate(&doubled, PaperSize::A4).unwrap();
        assert!((c.px_per_mm() - 2.0 * a.px_per_mm()).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_edge_fails() {
        let collapsed = ReferenceFrame {
            top_left: Point::new(5.0, 5.0),
            top_right: Point::new(5.0, 5.0),
            bottom_right: Point::new(5.0, 40.0),
            bottom_left: Point::new(5.0, 40.0),
        };
        let err = ScaleCalibrator::calibrate(&collapsed, PaperSize::A4).unwrap_err();
        assert_eq!(
            err,
            MeasurementFailure::CalibrationFailure {
                edge_px: 0.0,
                physical_width_mm: 210.0
            }
        );
    }
}
