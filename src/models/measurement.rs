use crate::error::MeasureError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference sheet presets with known physical size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaperSize {
    /// ISO A4, 210 x 297 mm
    #[default]
    A4,
    /// US Letter, 216 x 279 mm
    Letter,
}

impl PaperSize {
    /// All presets
    pub const ALL: [PaperSize; 2] = [PaperSize::A4, PaperSize::Letter];

    /// Short side in millimetres
    pub fn width_mm(&self) -> f32 {
        match self {
            PaperSize::A4 => 210.0,
            PaperSize::Letter => 216.0,
        }
    }

    /// Long side in millimetres
    pub fn height_mm(&self) -> f32 {
        match self {
            PaperSize::A4 => 297.0,
            PaperSize::Letter => 279.0,
        }
    }

    /// Preset label
    pub fn label(&self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::Letter => "Letter",
        }
    }

    /// Parse a label, falling back to A4 for unknown input
    pub fn from_label_or_default(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaperSize {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaperSize::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MeasureError::UnknownPaper {
                label: s.to_string(),
            })
    }
}

/// Pixels per millimetre, valid only for the image it was derived from
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct CalibrationScale(f32);

impl CalibrationScale {
    /// Wrap a ratio; `None` unless strictly positive and finite
    pub fn new(px_per_mm: f32) -> Option<Self> {
        (px_per_mm.is_finite() && px_per_mm > 0.0).then_some(Self(px_per_mm))
    }

    /// Pixels per millimetre
    pub fn px_per_mm(&self) -> f32 {
        self.0
    }

    /// Convert a pixel length to millimetres
    pub fn to_mm(&self, px: f32) -> f32 {
        px / self.0
    }
}

/// Discretized confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    /// At or above the high cut point
    High,
    /// At or above the medium cut point
    Medium,
    /// Below the medium cut point
    Low,
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfidenceLabel::High => "high",
            ConfidenceLabel::Medium => "medium",
            ConfidenceLabel::Low => "low",
        })
    }
}

/// Validated foot measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// Heel-to-toe length in millimetres
    pub length_mm: f32,
    /// Widest extent in millimetres
    pub width_mm: f32,
    /// Subject confidence in [0, 1]
    pub confidence: f32,
    /// Discretized confidence
    pub confidence_label: ConfidenceLabel,
    /// Reference sheet used for calibration
    pub paper: PaperSize,
    /// Calibration ratio used for the conversion
    pub px_per_mm: f32,
    /// Largest distance between two outline points in millimetres
    pub max_span_mm: f32,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully measured: {:.1}mm length, {:.1}mm width ({} confidence, {})",
            self.length_mm, self.width_mm, self.confidence_label, self.paper
        )
    }
}
