//! Error types
//!
//! [`MeasureError`] covers everything that happens around the pipeline
//! (decoding, buffer checks, configuration). [`MeasurementFailure`] is the
//! typed outcome of a pipeline run that did not produce a measurement; it is
//! an expected result for a bad photo, never a crash.

use crate::config::ConfigError;
use crate::detector::reference::ReferenceCandidate;
use crate::detector::subject::SubjectCandidate;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised outside the measurement stages
#[derive(Error, Debug)]
pub enum MeasureError {
    /// The input could not be interpreted as an image
    #[error("could not read image {path}: {source}")]
    DecodeFailure {
        /// Offending file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// Raw buffer length does not match the declared dimensions
    #[error("image buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// width * height * 3
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Image without pixels
    #[error("image has zero area ({width}x{height})")]
    EmptyImage {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },

    /// Paper label outside the preset table
    #[error("unknown paper type '{label}'")]
    UnknownPaper {
        /// Label as given
        label: String,
    },

    /// Invalid or unreadable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Summary of the candidates a detector looked at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateReport<T> {
    /// Candidates evaluated
    pub total: usize,
    /// Candidates disqualified
    pub rejected: usize,
    /// Every candidate with its metrics, most promising first
    pub candidates: Vec<T>,
}

impl<T> CandidateReport<T> {
    /// Build a report from an already ranked candidate list
    pub fn summarize<F>(ranked: Vec<T>, is_rejected: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        let rejected = ranked.iter().filter(|c| is_rejected(c)).count();
        Self {
            total: ranked.len(),
            rejected,
            candidates: ranked,
        }
    }

    /// The `n` best-ranked candidates
    pub fn top(&self, n: usize) -> &[T] {
        &self.candidates[..n.min(self.candidates.len())]
    }
}

impl<T> fmt::Display for CandidateReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} candidates rejected",
            self.rejected, self.total
        )
    }
}

/// Measured dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Heel-to-toe axis
    Length,
    /// Across the foot
    Width,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dimension::Length => "length",
            Dimension::Width => "width",
        })
    }
}

/// One dimension outside its plausible band
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeViolation {
    /// Which dimension
    pub dimension: Dimension,
    /// Measured value
    pub value_mm: f32,
    /// Lower bound (inclusive)
    pub min_mm: f32,
    /// Upper bound (inclusive)
    pub max_mm: f32,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Detected foot {} ({:.1}mm) seems unrealistic (expected {:.0}-{:.0}mm)",
            self.dimension, self.value_mm, self.min_mm, self.max_mm
        )
    }
}

fn describe_violations(violations: &[RangeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Typed reason a pipeline run produced no measurement
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasurementFailure {
    /// No contour qualified as the reference sheet
    #[error(
        "Could not detect paper ({report}). Please ensure the paper is clearly visible and well-lit."
    )]
    ReferenceNotFound {
        /// Reference candidates
        report: CandidateReport<ReferenceCandidate>,
    },

    /// Reference frame edge too short to calibrate against
    #[error("Reference edge is degenerate ({edge_px:.3}px for {physical_width_mm}mm)")]
    CalibrationFailure {
        /// Measured top edge in pixels
        edge_px: f32,
        /// Known sheet width
        physical_width_mm: f32,
    },

    /// No contour inside the reference qualified as the subject
    #[error(
        "Could not detect foot on the paper ({report}). Please ensure your foot is clearly visible on the paper."
    )]
    SubjectNotFound {
        /// Subject candidates
        report: CandidateReport<SubjectCandidate>,
    },

    /// Converted dimensions outside the plausible bounds
    #[error("{}", describe_violations(.violations))]
    MeasurementOutOfRange {
        /// Measured length
        length_mm: f32,
        /// Measured width
        width_mm: f32,
        /// Every dimension that failed, length first
        violations: Vec<RangeViolation>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_keeps_every_candidate() {
        let report = CandidateReport::summarize(vec![1, 2, 3, 4, 5], |v| v % 2 == 0);
        assert_eq!(report.total, 5);
        assert_eq!(report.rejected, 2);
        assert_eq!(report.candidates, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.top(2), &[1, 2]);
        assert_eq!(report.top(9).len(), 5);
        assert_eq!(report.to_string(), "2 of 5 candidates rejected");
    }

    #[test]
    fn test_out_of_range_message_lists_each_dimension() {
        let failure = MeasurementFailure::MeasurementOutOfRange {
            length_mm: 120.0,
            width_mm: 20.0,
            violations: vec![
                RangeViolation {
                    dimension: Dimension::Length,
                    value_mm: 120.0,
                    min_mm: 150.0,
                    max_mm: 350.0,
                },
                RangeViolation {
                    dimension: Dimension::Width,
                    value_mm: 20.0,
                    min_mm: 50.0,
                    max_mm: 150.0,
                },
            ],
        };
        let msg = failure.to_string();
        assert!(msg.contains("foot length (120.0mm)"));
        assert!(msg.contains("foot width (20.0mm)"));
    }

    #[test]
    fn test_failure_serializes_with_kind_tag() {
        let failure = MeasurementFailure::CalibrationFailure {
            edge_px: 0.0,
            physical_width_mm: 210.0,
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "calibration_failure");
        assert_eq!(json["physical_width_mm"], 210.0);
    }
}
