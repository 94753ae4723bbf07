//! Measurement configuration.
//!
//! Every tunable named by the stages lives here: edge sensitivities,
//! disqualification bands, scoring weights, plausibility bounds and the
//! confidence cut points. A [`MeasureConfig`] is built once, validated, and
//! then only read; stages receive it by reference.
//!
//! `Default` is the strict profile. [`MeasureConfig::permissive`] widens the
//! bands and switches the subject signals to equal weights.
//!
//! Configurations load from JSON; missing fields take the strict defaults:
//! ```no_run
//! use foot_measure::config::load_config;
//!
//! # fn example() -> Result<(), foot_measure::config::ConfigError> {
//! let config = load_config(std::path::Path::new("measure.json"))?;
//! assert!(config.subject.min_confidence >= 0.0);
//! # Ok(())
//! # }
//! ```

use crate::models::ConfidenceLabel;
use crate::utils::color::SkinTone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

/// Configuration validation and loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Band with min above max or non-finite bounds
    #[error("band '{name}' is invalid: min {min} must not exceed max {max}")]
    InvalidBand {
        /// Field name
        name: &'static str,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// Weights that do not sum to one
    #[error("weights '{name}' must be non-negative and sum to 1.0 (got {sum})")]
    InvalidWeights {
        /// Field name
        name: &'static str,
        /// Actual sum
        sum: f32,
    },

    /// Edge threshold pair with low above high
    #[error("edge threshold pair ({low}, {high}) is invalid")]
    InvalidThreshold {
        /// Weak threshold
        low: f32,
        /// Strong threshold
        high: f32,
    },

    /// Any other out-of-domain value
    #[error("invalid value for '{name}': {message}")]
    InvalidValue {
        /// Field name
        name: &'static str,
        /// What is wrong
        message: String,
    },

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },
}

/// Inclusive `[min, max]` interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl Band {
    /// Create a band
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Inclusive membership test
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidBand {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }
}

fn check_weights(name: &'static str, weights: &[f32]) -> Result<(), ConfigError> {
    let sum: f32 = weights.iter().sum();
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE
    {
        return Err(ConfigError::InvalidWeights { name, sum });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            message: format!("{value} must be positive"),
        })
    }
}

fn check_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            message: format!("{value} must lie in [0, 1]"),
        })
    }
}

/// One (low, high) hysteresis threshold pair on L1 gradient magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeThreshold {
    /// Weak edge threshold
    pub low: f32,
    /// Strong edge threshold
    pub high: f32,
}

impl EdgeThreshold {
    /// Create a threshold pair
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }
}

/// Edge extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Sensitivities; one detection pass per pair, results are OR-ed
    pub thresholds: Vec<EdgeThreshold>,
    /// Apply the 5x5 Gaussian before differentiation
    pub blur: bool,
    /// 3x3 dilation passes applied to the union to close small gaps
    pub dilate_iterations: usize,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                EdgeThreshold::new(30.0, 90.0),
                EdgeThreshold::new(50.0, 150.0),
                EdgeThreshold::new(75.0, 225.0),
            ],
            blur: true,
            dilate_iterations: 1,
        }
    }
}

/// Contour tracing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Simplification tolerance as a fraction of the contour perimeter
    pub simplify_fraction: f32,
    /// Components with fewer edge pixels are skipped without tracing
    pub min_component_pixels: usize,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            simplify_fraction: 0.02,
            min_component_pixels: 8,
        }
    }
}

/// Reference score weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceWeights {
    /// Weight on extent
    pub extent: f32,
    /// Weight on area / image area
    pub area: f32,
    /// Weight on closeness to the target aspect ratio
    pub aspect: f32,
}

impl Default for ReferenceWeights {
    fn default() -> Self {
        Self {
            extent: 0.4,
            area: 0.3,
            aspect: 0.3,
        }
    }
}

/// Reference sheet detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Contours with a smaller enclosed area are noise
    pub min_area_px: f32,
    /// Fewest simplified vertices accepted
    pub min_vertices: usize,
    /// Most simplified vertices accepted
    pub max_vertices: usize,
    /// Accepted bounding-box width / height
    pub aspect_ratio: Band,
    /// Minimum contour area / bounding-box area
    pub min_extent: f32,
    /// Preferred width / height (A4 short over long side)
    pub target_aspect: f32,
    /// Score weights
    pub weights: ReferenceWeights,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            min_area_px: 1000.0,
            min_vertices: 4,
            max_vertices: 6,
            aspect_ratio: Band::new(0.5, 1.2),
            min_extent: 0.7,
            target_aspect: 0.71,
            weights: ReferenceWeights::default(),
        }
    }
}

/// Subject confidence signal weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    /// Skin colour coverage
    pub color: f32,
    /// Horizontal edge texture
    pub edge: f32,
    /// Shape complexity
    pub shape: f32,
    /// Centred placement
    pub position: f32,
}

impl SignalWeights {
    /// Colour and position overweighted
    pub const fn strict() -> Self {
        Self {
            color: 0.3,
            edge: 0.2,
            shape: 0.2,
            position: 0.3,
        }
    }

    /// All four signals weighted 0.25
    pub const fn equal() -> Self {
        Self {
            color: 0.25,
            edge: 0.25,
            shape: 0.25,
            position: 0.25,
        }
    }

    fn as_array(&self) -> [f32; 4] {
        [self.color, self.edge, self.shape, self.position]
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self::strict()
    }
}

/// Subject detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectConfig {
    /// Edge pixels closer than this to the reference border are ignored
    pub interior_margin_px: f32,
    /// Contours covering at least this fraction of the reference are the
    /// reference itself
    pub self_match_fraction: f32,
    /// Accepted contour area / reference area
    pub area_fraction: Band,
    /// Accepted bounding-box width / height
    pub aspect_ratio: Band,
    /// Accepted bounding-box height in pixels
    pub height_px: Band,
    /// Candidates below this confidence are dropped
    pub min_confidence: f32,
    /// Signal weights
    pub weights: SignalWeights,
    /// Skin tone box
    pub skin: SkinTone,
    /// Multiplier on the skin pixel fraction before clamping
    pub color_gain: f32,
    /// Sample every n-th pixel when measuring skin coverage
    pub color_sample_stride: usize,
    /// Multiplier on the horizontal edge density before clamping
    pub edge_gain: f32,
    /// Shortest horizontal edge run counted as a segment
    pub edge_min_run: usize,
    /// Perimeter / sqrt(area) band scoring 1.0
    pub shape_band: Band,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            interior_margin_px: 8.0,
            self_match_fraction: 0.9,
            area_fraction: Band::new(0.02, 0.85),
            aspect_ratio: Band::new(0.2, 0.8),
            height_px: Band::new(50.0, 10_000.0),
            min_confidence: 0.3,
            weights: SignalWeights::strict(),
            skin: SkinTone::default(),
            color_gain: 1.5,
            color_sample_stride: 2,
            edge_gain: 8.0,
            edge_min_run: 5,
            shape_band: Band::new(4.2, 8.0),
        }
    }
}

/// How the subject outline is turned into length and width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentMode {
    /// Axis-aligned bounding box: height is length, width is width
    #[default]
    AxisAligned,
    /// Minimum-area rotated rectangle: long side is length
    MinAreaRect,
}

/// Plausibility bounds for the final measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accepted length in millimetres
    pub length_mm: Band,
    /// Accepted width in millimetres
    pub width_mm: Band,
    /// Extent computation
    pub extent_mode: ExtentMode,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            length_mm: Band::new(150.0, 350.0),
            width_mm: Band::new(50.0, 150.0),
            extent_mode: ExtentMode::AxisAligned,
        }
    }
}

/// Cut points for the confidence label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceCutoffs {
    /// Lowest confidence labelled high
    pub high: f32,
    /// Lowest confidence labelled medium
    pub medium: f32,
}

impl ConfidenceCutoffs {
    /// Discretize a confidence value
    pub fn label(&self, confidence: f32) -> ConfidenceLabel {
        if confidence >= self.high {
            ConfidenceLabel::High
        } else if confidence >= self.medium {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }
}

impl Default for ConfidenceCutoffs {
    fn default() -> Self {
        Self {
            high: 0.75,
            medium: 0.5,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Edge extraction
    pub edges: EdgeConfig,
    /// Contour tracing
    pub contours: ContourConfig,
    /// Reference detection
    pub reference: ReferenceConfig,
    /// Subject detection
    pub subject: SubjectConfig,
    /// Measurement validation
    pub validation: ValidationConfig,
    /// Confidence label cut points
    pub confidence: ConfidenceCutoffs,
    /// Candidates listed per report by diagnostic printouts; reports
    /// themselves always hold every candidate
    pub diagnostics_top_n: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            edges: EdgeConfig::default(),
            contours: ContourConfig::default(),
            reference: ReferenceConfig::default(),
            subject: SubjectConfig::default(),
            validation: ValidationConfig::default(),
            confidence: ConfidenceCutoffs::default(),
            diagnostics_top_n: 5,
        }
    }
}

impl MeasureConfig {
    /// Strict profile (same as `Default`)
    pub fn strict() -> Self {
        Self::default()
    }

    /// Looser bands and equal signal weights
    pub fn permissive() -> Self {
        let mut config = Self::default();
        config
            .edges
            .thresholds
            .insert(0, EdgeThreshold::new(20.0, 60.0));
        config.subject.area_fraction = Band::new(0.01, 0.9);
        config.subject.aspect_ratio = Band::new(0.15, 1.0);
        config.subject.height_px = Band::new(30.0, 10_000.0);
        config.subject.min_confidence = 0.2;
        config.subject.weights = SignalWeights::equal();
        config.subject.shape_band = Band::new(3.8, 10.0);
        config.validation.length_mm = Band::new(100.0, 400.0);
        config.validation.width_mm = Band::new(30.0, 180.0);
        config
    }

    /// Check every field for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.edges.thresholds.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "edges.thresholds",
                message: "at least one threshold pair is required".to_string(),
            });
        }
        for t in &self.edges.thresholds {
            if !(t.low.is_finite() && t.high.is_finite() && 0.0 <= t.low && t.low <= t.high) {
                return Err(ConfigError::InvalidThreshold {
                    low: t.low,
                    high: t.high,
                });
            }
        }

        check_positive("contours.simplify_fraction", self.contours.simplify_fraction)?;

        let reference = &self.reference;
        if reference.min_vertices > reference.max_vertices {
            return Err(ConfigError::InvalidBand {
                name: "reference.vertices",
                min: reference.min_vertices as f32,
                max: reference.max_vertices as f32,
            });
        }
        reference.aspect_ratio.check("reference.aspect_ratio")?;
        check_unit("reference.min_extent", reference.min_extent)?;
        check_positive("reference.target_aspect", reference.target_aspect)?;
        check_weights(
            "reference.weights",
            &[
                reference.weights.extent,
                reference.weights.area,
                reference.weights.aspect,
            ],
        )?;

        let subject = &self.subject;
        subject.area_fraction.check("subject.area_fraction")?;
        subject.aspect_ratio.check("subject.aspect_ratio")?;
        subject.height_px.check("subject.height_px")?;
        subject.shape_band.check("subject.shape_band")?;
        check_unit("subject.min_confidence", subject.min_confidence)?;
        check_unit("subject.self_match_fraction", subject.self_match_fraction)?;
        check_weights("subject.weights", &subject.weights.as_array())?;
        check_positive("subject.color_gain", subject.color_gain)?;
        check_positive("subject.edge_gain", subject.edge_gain)?;
        if subject.color_sample_stride == 0 || subject.edge_min_run == 0 {
            return Err(ConfigError::InvalidValue {
                name: "subject.color_sample_stride",
                message: "strides and run lengths must be at least 1".to_string(),
            });
        }
        if !(subject.interior_margin_px.is_finite() && subject.interior_margin_px >= 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "subject.interior_margin_px",
                message: format!("{} must be non-negative", subject.interior_margin_px),
            });
        }

        self.validation.length_mm.check("validation.length_mm")?;
        self.validation.width_mm.check("validation.width_mm")?;

        let cut = &self.confidence;
        check_unit("confidence.high", cut.high)?;
        check_unit("confidence.medium", cut.medium)?;
        if cut.medium > cut.high {
            return Err(ConfigError::InvalidBand {
                name: "confidence",
                min: cut.medium,
                max: cut.high,
            });
        }
        Ok(())
    }
}

/// Load and validate a JSON configuration file
pub fn load_config(path: &Path) -> Result<MeasureConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: MeasureConfig =
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
