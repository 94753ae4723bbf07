use crate::config::ReferenceConfig;
use crate::error::{CandidateReport, MeasurementFailure};
use crate::models::{Contour, ReferenceFrame};
use serde::Serialize;
use std::fmt;

/// Why a contour cannot be the reference sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceRejection {
    /// Enclosed area below the noise floor
    TooSmall,
    /// Simplified polygon is not roughly a quadrilateral
    VertexCount,
    /// Bounding box too narrow or too wide
    AspectRatio,
    /// Contour fills too little of its bounding box
    LowExtent,
}

impl fmt::Display for ReferenceRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferenceRejection::TooSmall => "area too small",
            ReferenceRejection::VertexCount => "not a quadrilateral",
            ReferenceRejection::AspectRatio => "aspect ratio out of range",
            ReferenceRejection::LowExtent => "extent too low",
        })
    }
}

/// Metrics of one contour considered as the reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceCandidate {
    /// Discovery index among all traced contours
    pub index: usize,
    /// Enclosed area in square pixels
    pub area_px: f32,
    /// Simplified polygon vertex count
    pub vertices: usize,
    /// Bounding box width / height
    pub aspect_ratio: f32,
    /// Area / bounding box area
    pub extent: f32,
    /// Weighted score; only meaningful when not rejected
    pub score: f32,
    /// First disqualifying rule, if any
    pub rejection: Option<ReferenceRejection>,
}

/// Winning reference contour
#[derive(Debug, Clone)]
pub struct ReferenceMatch {
    /// Canonical corner frame
    pub frame: ReferenceFrame,
    /// Winning score
    pub score: f32,
    /// Every candidate, ranked
    pub report: CandidateReport<ReferenceCandidate>,
}

/// Finds the paper sheet among traced contours
pub struct ReferenceDetector<'a> {
    config: &'a ReferenceConfig,
}

impl<'a> ReferenceDetector<'a> {
    /// Create a detector over `config`
    pub fn new(config: &'a ReferenceConfig) -> Self {
        Self { config }
    }

    /// Measure and score one contour. Rules are applied in a fixed order and
    /// the first failing one is recorded.
    pub fn evaluate(&self, index: usize, contour: &Contour, image_area: f32) -> ReferenceCandidate {
        let cfg = self.config;
        let area_px = contour.area();
        let vertices = contour.polygon().len();
        let bbox = contour.bbox();
        let aspect_ratio = bbox.aspect_ratio();
        let extent = contour.extent();

        let rejection = if area_px < cfg.min_area_px {
            Some(ReferenceRejection::TooSmall)
        } else if vertices < cfg.min_vertices || vertices > cfg.max_vertices {
            Some(ReferenceRejection::VertexCount)
        } else if !cfg.aspect_ratio.contains(aspect_ratio) {
            Some(ReferenceRejection::AspectRatio)
        } else if extent < cfg.min_extent {
            Some(ReferenceRejection::LowExtent)
        } else {
            None
        };

        let area_ratio = if image_area > 0.0 {
            area_px / image_area
        } else {
            0.0
        };
        let score = (cfg.weights.extent * extent
            + cfg.weights.area * area_ratio
            + cfg.weights.aspect * (1.0 - (aspect_ratio - cfg.target_aspect).abs()))
        .max(0.0);

        ReferenceCandidate {
            index,
            area_px,
            vertices,
            aspect_ratio,
            extent,
            score,
            rejection,
        }
    }

    /// Pick the highest-scoring qualifying contour. Ties keep the contour
    /// discovered first.
    pub fn detect<I>(
        &self,
        contours: I,
        image_area: f32,
    ) -> Result<ReferenceMatch, MeasurementFailure>
    where
        I: IntoIterator<Item = Contour>,
    {
        let mut candidates = Vec::new();
        let mut best: Option<(ReferenceFrame, f32)> = None;

        for (index, contour) in contours.into_iter().enumerate() {
            let mut candidate = self.evaluate(index, &contour, image_area);
            if candidate.rejection.is_none() {
                match ReferenceFrame::from_polygon(contour.polygon().vertices()) {
                    Some(frame) => {
                        let beats = best
                            .as_ref()
                            .is_none_or(|(_, score)| candidate.score > *score);
                        if beats {
                            best = Some((frame, candidate.score));
                        }
                    }
                    None => candidate.rejection = Some(ReferenceRejection::VertexCount),
                }
            }
            if let Some(reason) = candidate.rejection {
                log::trace!("reference candidate {index} rejected: {reason}");
            }
            candidates.push(candidate);
        }

        let report = rank(candidates);
        match best {
            Some((frame, score)) => {
                log::debug!(
                    "reference found: score {score:.3}, {:.0}x{:.0}px ({})",
                    frame.width_px(),
                    frame.height_px(),
                    report
                );
                Ok(ReferenceMatch {
                    frame,
                    score,
                    report,
                })
            }
            None => {
                log::debug!("no reference: {report}");
                Err(MeasurementFailure::ReferenceNotFound { report })
            }
        }
    }
}

/// Qualifying candidates first, then by descending score
fn rank(mut candidates: Vec<ReferenceCandidate>) -> CandidateReport<ReferenceCandidate> {
    candidates.sort_by(|a, b| {
        a.rejection
            .is_some()
            .cmp(&b.rejection.is_some())
            .then(b.score.total_cmp(&a.score))
    });
    CandidateReport::summarize(candidates, |c| c.rejection.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointI;

    fn rect(x0: i32, y0: i32, w: i32, h: i32) -> Contour {
        let pts = vec![
            PointI::new(x0, y0),
            PointI::new(x0 + w, y0),
            PointI::new(x0 + w, y0 + h),
            PointI::new(x0, y0 + h),
        ];
        Contour::from_boundary(pts, 0.02).unwrap()
    }

    fn triangle() -> Contour {
        let pts = vec![
            PointI::new(0, 0),
            PointI::new(200, 0),
            PointI::new(100, 280),
        ];
        Contour::from_boundary(pts, 0.02).unwrap()
    }

    #[test]
    fn test_rules_in_order() {
        let config = ReferenceConfig::default();
        let detector = ReferenceDetector::new(&config);
        let image_area = 1000.0 * 1000.0;

        let tiny = detector.evaluate(0, &rect(0, 0, 20, 28), image_area);
        assert_eq!(tiny.rejection, Some(ReferenceRejection::TooSmall));

        let tri = detector.evaluate(1, &triangle(), image_area);
        assert_eq!(tri.rejection, Some(ReferenceRejection::VertexCount));

        let wide = detector.evaluate(2, &rect(0, 0, 400, 100), image_area);
        assert_eq!(wide.rejection, Some(ReferenceRejection::AspectRatio));

        let diamond = Contour::from_boundary(
            vec![
                PointI::new(100, 0),
                PointI::new(200, 100),
                PointI::new(100, 200),
                PointI::new(0, 100),
            ],
            0.02,
        )
        .unwrap();
        let diamond = detector.evaluate(3, &diamond, image_area);
        assert_eq!(diamond.vertices, 4);
        assert_eq!(diamond.rejection, Some(ReferenceRejection::LowExtent));

        let sheet = detector.evaluate(4, &rect(0, 0, 210, 297), image_area);
        assert_eq!(sheet.rejection, None);
        assert!(sheet.score > 0.6);
    }

    #[test]
    fn test_notched_sheet_is_not_a_quadrilateral() {
        // Sheet-sized outline with five 60px notches in its top edge. Its
        // proportions and extent pass, so only the vertex count stops it.
        let mut pts = vec![PointI::new(0, 0)];
        for i in 0..5 {
            let x0 = 30 + i * 75;
            pts.push(PointI::new(x0, 0));
            pts.push(PointI::new(x0, 60));
            pts.push(PointI::new(x0 + 40, 60));
            pts.push(PointI::new(x0 + 40, 0));
        }
        pts.push(PointI::new(400, 0));
        pts.push(PointI::new(400, 560));
        pts.push(PointI::new(0, 560));
        let notched = Contour::from_boundary(pts, 0.02).unwrap();

        let config = ReferenceConfig::default();
        let detector = ReferenceDetector::new(&config);
        let candidate = detector.evaluate(0, &notched, 1.0e6);
        assert!(candidate.vertices > config.max_vertices);
        assert!(candidate.extent > config.min_extent);
        assert_eq!(candidate.rejection, Some(ReferenceRejection::VertexCount));
        assert!(detector.detect(vec![notched], 1.0e6).is_err());
    }

    #[test]
    fn test_best_score_wins() {
        let config = ReferenceConfig::default();
        let detector = ReferenceDetector::new(&config);
        let contours = vec![
            rect(500, 500, 100, 100),
            rect(10, 10, 420, 594),
            rect(700, 10, 60, 20),
        ];
        let found = detector.detect(contours, 1000.0 * 1000.0).unwrap();
        assert_eq!(found.frame.top_left.x, 10.0);
        assert_eq!(found.frame.bottom_right.y, 604.0);
        assert_eq!(found.report.total, 3);
        assert_eq!(found.report.rejected, 1);
        assert_eq!(found.report.candidates[0].index, 1);
    }

    #[test]
    fn test_tie_keeps_first() {
        let config = ReferenceConfig::default();
        let detector = ReferenceDetector::new(&config);
        let contours = vec![rect(10, 10, 210, 297), rect(400, 10, 210, 297)];
        let found = detector.detect(contours, 1.0e6).unwrap();
        assert_eq!(found.frame.top_left.x, 10.0);
    }

    #[test]
    fn test_no_candidates() {
        let config = ReferenceConfig::default();
        let detector = ReferenceDetector::new(&config);
        let err = detector
            .detect(vec![triangle()], 1.0e6)
            .unwrap_err();
        match err {
            MeasurementFailure::ReferenceNotFound { report } => {
                assert_eq!(report.total, 1);
                assert_eq!(report.rejected, 1);
            }
            other => panic!("unexpected failure: {other:?}"),
        }

        let err = detector.detect(Vec::new(), 1.0e6).unwrap_err();
        assert!(matches!(err, MeasurementFailure::ReferenceNotFound { .. }));
    }
}
