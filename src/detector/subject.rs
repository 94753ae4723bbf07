use crate::config::{ContourConfig, SubjectConfig};
use crate::detector::contour::ContourTracer;
use crate::detector::scoring::{
    SignalScores, color_signal, edge_texture_signal, position_signal, shape_signal,
};
use crate::error::{CandidateReport, MeasurementFailure};
use crate::models::{Contour, EdgeMap, ImageRgb, Point, ReferenceFrame};
use serde::Serialize;
use std::fmt;

/// Why a contour cannot be the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectRejection {
    /// Bounding box reaches outside the reference frame
    OutsideReference,
    /// Contour is (nearly) the reference sheet itself
    SelfMatch,
    /// Area fraction of the reference out of range
    AreaFraction,
    /// Bounding box aspect ratio out of range
    AspectRatio,
    /// Bounding box height out of range
    Height,
    /// Combined confidence below the minimum
    LowConfidence,
}

impl fmt::Display for SubjectRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubjectRejection::OutsideReference => "outside reference",
            SubjectRejection::SelfMatch => "matches reference",
            SubjectRejection::AreaFraction => "area fraction out of range",
            SubjectRejection::AspectRatio => "aspect ratio out of range",
            SubjectRejection::Height => "height out of range",
            SubjectRejection::LowConfidence => "confidence too low",
        })
    }
}

/// Metrics and signals of one contour considered as the subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectCandidate {
    /// Discovery index among the interior contours
    pub index: usize,
    /// Enclosed area in square pixels
    pub area_px: f32,
    /// Area / reference area
    pub area_fraction: f32,
    /// Bounding box width / height
    pub aspect_ratio: f32,
    /// Bounding box height in pixels
    pub height_px: f32,
    /// Individual signals; zero when rejected before scoring
    pub signals: SignalScores,
    /// Combined confidence
    pub confidence: f32,
    /// First disqualifying rule, if any
    pub rejection: Option<SubjectRejection>,
}

/// Winning subject contour
#[derive(Debug, Clone)]
pub struct SubjectMatch {
    /// Subject outline
    pub contour: Contour,
    /// Combined confidence
    pub confidence: f32,
    /// Individual signals
    pub signals: SignalScores,
    /// Every candidate, ranked
    pub report: CandidateReport<SubjectCandidate>,
}

/// Finds and scores the measured object inside the reference frame
pub struct SubjectDetector<'a> {
    config: &'a SubjectConfig,
    contours: &'a ContourConfig,
}

impl<'a> SubjectDetector<'a> {
    /// Create a detector; `contours` controls the interior re-trace
    pub fn new(config: &'a SubjectConfig, contours: &'a ContourConfig) -> Self {
        Self { config, contours }
    }

    /// Edge map restricted to the frame interior, away from its border
    pub fn interior_edges(&self, edges: &EdgeMap, frame: &ReferenceFrame) -> EdgeMap {
        let margin = self.config.interior_margin_px;
        edges.retain(|x, y| frame.contains_with_margin(Point::new(x as f32, y as f32), margin))
    }

    /// Apply the gates to one contour and, if it passes, score it
    pub fn evaluate(
        &self,
        index: usize,
        contour: &Contour,
        image: &ImageRgb,
        interior: &EdgeMap,
        frame: &ReferenceFrame,
    ) -> SubjectCandidate {
        let cfg = self.config;
        let bbox = contour.bbox();
        let reference_area = frame.area_px();
        let area_px = contour.area();
        let area_fraction = if reference_area > 0.0 {
            area_px / reference_area
        } else {
            0.0
        };
        let aspect_ratio = bbox.aspect_ratio();
        let height_px = bbox.height() as f32;

        let gate = if bbox.corners().iter().any(|c| !frame.contains(*c)) {
            Some(SubjectRejection::OutsideReference)
        } else if area_fraction > cfg.self_match_fraction {
            Some(SubjectRejection::SelfMatch)
        } else if !cfg.area_fraction.contains(area_fraction) {
            Some(SubjectRejection::AreaFraction)
        } else if !cfg.aspect_ratio.contains(aspect_ratio) {
            Some(SubjectRejection::AspectRatio)
        } else if !cfg.height_px.contains(height_px) {
            Some(SubjectRejection::Height)
        } else {
            None
        };

        let mut candidate = SubjectCandidate {
            index,
            area_px,
            area_fraction,
            aspect_ratio,
            height_px,
            signals: SignalScores::default(),
            confidence: 0.0,
            rejection: gate,
        };
        if gate.is_some() {
            return candidate;
        }

        let signals = SignalScores {
            color: color_signal(
                image,
                contour,
                &cfg.skin,
                cfg.color_sample_stride,
                cfg.color_gain,
            ),
            edge: edge_texture_signal(interior, &bbox, cfg.edge_min_run, cfg.edge_gain),
            shape: shape_signal(contour.compactness(), &cfg.shape_band),
            position: position_signal(contour.centroid(), image.width(), image.height()),
        };
        candidate.signals = signals;
        candidate.confidence = signals.combine(&cfg.weights);
        if candidate.confidence < cfg.min_confidence {
            candidate.rejection = Some(SubjectRejection::LowConfidence);
        }
        candidate
    }

    /// Re-trace the frame interior and return the most confident
    /// qualifying contour. Ties keep the contour discovered first.
    pub fn detect(
        &self,
        image: &ImageRgb,
        edges: &EdgeMap,
        frame: &ReferenceFrame,
    ) -> Result<SubjectMatch, MeasurementFailure> {
        let interior = self.interior_edges(edges, frame);
        let mut candidates = Vec::new();
        let mut best: Option<(Contour, f32, SignalScores)> = None;

        for (index, contour) in ContourTracer::new(&interior, self.contours).enumerate() {
            let candidate = self.evaluate(index, &contour, image, &interior, frame);
            match candidate.rejection {
                Some(reason) => log::trace!("subject candidate {index} rejected: {reason}"),
                None => {
                    let beats = best
                        .as_ref()
                        .is_none_or(|(_, confidence, _)| candidate.confidence > *confidence);
                    if beats {
                        best = Some((contour, candidate.confidence, candidate.signals));
                    }
                }
            }
            candidates.push(candidate);
        }

        let report = rank(candidates);
        match best {
            Some((contour, confidence, signals)) => {
                log::debug!(
                    "subject found: confidence {confidence:.3} (color {:.2}, edge {:.2}, shape {:.2}, position {:.2}; {})",
                    signals.color,
                    signals.edge,
                    signals.shape,
                    signals.position,
                    report
                );
                Ok(SubjectMatch {
                    contour,
                    confidence,
                    signals,
                    report,
                })
            }
            None => {
                log::debug!("no subject: {report}");
                Err(MeasurementFailure::SubjectNotFound { report })
            }
        }
    }
}

/// Qualifying candidates first, then by descending confidence
fn rank(mut candidates: Vec<SubjectCandidate>) -> CandidateReport<SubjectCandidate> {
    candidates.sort_by(|a, b| {
        a.rejection
            .is_some()
            .cmp(&b.rejection.is_some())
            .then(b.confidence.total_cmp(&a.confidence))
    });
    CandidateReport::summarize(candidates, |c| c.rejection.is_some())
}
