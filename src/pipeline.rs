use crate::config::MeasureConfig;
use crate::detector::{ContourTracer, EdgeExtractor, ReferenceDetector, SubjectDetector};
use crate::error::MeasurementFailure;
use crate::measure::{MeasurementValidator, ScaleCalibrator};
use crate::models::{ImageRgb, Measurement, PaperSize};
use serde::Serialize;

/// Outcome of one pipeline run
pub type PipelineResult = Result<Measurement, MeasurementFailure>;

/// Last stage a run got through
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing ran yet
    #[default]
    Start,
    /// Edge map built
    Edges,
    /// Reference frame located
    Reference,
    /// Scale derived
    Calibrated,
    /// Subject located
    Subject,
    /// Measurement validated
    Validated,
}

/// Stage-level counters collected alongside a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineTelemetry {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Edge pixels after union and dilation
    pub edge_pixels: usize,
    /// Contours traced on the full edge map
    pub contours: usize,
    /// Reference score of the winner
    pub reference_score: Option<f32>,
    /// Calibration ratio
    pub px_per_mm: Option<f32>,
    /// Interior contours considered as subject
    pub subject_candidates: usize,
    /// Confidence of the winner
    pub subject_confidence: Option<f32>,
    /// Furthest stage completed
    pub stage: Stage,
}

/// Sequences the measurement stages over one image
pub struct Pipeline<'a> {
    config: &'a MeasureConfig,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over a validated configuration
    pub fn new(config: &'a MeasureConfig) -> Self {
        Self { config }
    }

    /// Measure the subject in `image`; the first failing stage ends the run
    pub fn run(&self, image: &ImageRgb, paper: PaperSize) -> PipelineResult {
        self.run_with_telemetry(image, paper).0
    }

    /// Like [`Pipeline::run`] but also returns stage counters
    pub fn run_with_telemetry(
        &self,
        image: &ImageRgb,
        paper: PaperSize,
    ) -> (PipelineResult, PipelineTelemetry) {
        let mut tel = PipelineTelemetry {
            width: image.width(),
            height: image.height(),
            ..PipelineTelemetry::default()
        };
        let result = self.execute(image, paper, &mut tel);
        match &result {
            Ok(measurement) => log::info!("{measurement}"),
            Err(failure) => log::debug!("measurement failed at {:?}: {failure}", tel.stage),
        }
        (result, tel)
    }

    fn execute(
        &self,
        image: &ImageRgb,
        paper: PaperSize,
        tel: &mut PipelineTelemetry,
    ) -> PipelineResult {
        let config = self.config;

        let edges = EdgeExtractor::extract(image, &config.edges);
        tel.edge_pixels = edges.count_ones();
        tel.stage = Stage::Edges;
        log::debug!(
            "edges: {} pixels over {}x{}",
            tel.edge_pixels,
            image.width(),
            image.height()
        );

        let contours: Vec<_> = ContourTracer::new(&edges, &config.contours).collect();
        tel.contours = contours.len();
        log::debug!("contours: {}", tel.contours);

        let reference =
            ReferenceDetector::new(&config.reference).detect(contours, image.area() as f32)?;
        tel.reference_score = Some(reference.score);
        tel.stage = Stage::Reference;

        let scale = ScaleCalibrator::calibrate(&reference.frame, paper)?;
        tel.px_per_mm = Some(scale.px_per_mm());
        tel.stage = Stage::Calibrated;

        let subject = SubjectDetector::new(&config.subject, &config.contours).detect(
            image,
            &edges,
            &reference.frame,
        );
        let subject = match subject {
            Ok(found) => found,
            Err(failure) => {
                if let MeasurementFailure::SubjectNotFound { report } = &failure {
                    tel.subject_candidates = report.total;
                }
                return Err(failure);
            }
        };
        tel.subject_candidates = subject.report.total;
        tel.subject_confidence = Some(subject.confidence);
        tel.stage = Stage::Subject;

        let dims = MeasurementValidator::new(&config.validation).validate(&subject.contour, scale)?;
        tel.stage = Stage::Validated;

        Ok(Measurement {
            length_mm: dims.length_mm,
            width_mm: dims.width_mm,
            confidence: subject.confidence,
            confidence_label: config.confidence.label(subject.confidence),
            paper,
            px_per_mm: scale.px_per_mm(),
            max_span_mm: dims.max_span_mm,
        })
    }
}
