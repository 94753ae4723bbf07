//! End-to-end scenarios on rendered scenes
//!
//! The scenes are flat-colour renders of a sheet of paper on a dark floor
//! with an optional subject. Expected values follow the pipeline arithmetic:
//! the traced outline sits on the outer side of the dilated edges, so
//! extents come out a few pixels larger than the drawn rectangles.

use foot_measure::config::{Band, ExtentMode, MeasureConfig};
use foot_measure::tools::{Rect, SyntheticScene};
use foot_measure::{
    ConfidenceLabel, FootMeasurer, ImageRgb, MeasurementFailure, PaperSize, Pipeline,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Strict profile with bounds that admit the small rendered subject
fn relaxed_bounds() -> MeasureConfig {
    let mut config = MeasureConfig::default();
    config.validation.length_mm = Band::new(50.0, 350.0);
    config.validation.width_mm = Band::new(20.0, 150.0);
    config
}

fn downsample(image: &ImageRgb, factor: u32) -> ImageRgb {
    let rgb = image::RgbImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.as_bytes().to_vec(),
    )
    .expect("buffer matches dimensions");
    let resized = image::imageops::resize(
        &rgb,
        rgb.width() / factor,
        rgb.height() / factor,
        image::imageops::FilterType::Triangle,
    );
    ImageRgb::from(resized)
}

#[test]
fn measures_rendered_subject() {
    init_logging();
    let image = SyntheticScene::a4_on_floor().render();
    let measurer = FootMeasurer::new(relaxed_bounds()).unwrap();

    let m = measurer.measure(&image, PaperSize::A4).unwrap();
    assert!((m.px_per_mm - 600.0 / 210.0).abs() < 0.03, "scale {}", m.px_per_mm);
    assert!((m.length_mm - 105.0).abs() < 2.0, "length {}", m.length_mm);
    assert!((m.width_mm - 42.0).abs() < 2.0, "width {}", m.width_mm);
    assert!(m.max_span_mm > m.length_mm);
    assert!(m.confidence >= measurer.config().subject.min_confidence);
    assert_eq!(
        m.confidence_label,
        measurer.config().confidence.label(m.confidence)
    );
    assert_eq!(m.paper, PaperSize::A4);
}

#[test]
fn measures_600_by_849_sheet_with_centred_block() {
    init_logging();
    let mut scene = SyntheticScene::a4_on_floor();
    scene.paper = Rect::new(100, 100, 600, 849);
    let subject = scene.paper.centered(120, 300);
    let image = scene.with_subject(subject, [40, 40, 40]).render();
    let measurer = FootMeasurer::new(relaxed_bounds()).unwrap();

    let m = measurer.measure(&image, PaperSize::A4).unwrap();
    assert!((m.px_per_mm - 600.0 / 210.0).abs() < 0.03, "scale {}", m.px_per_mm);
    assert!((m.length_mm - 105.0).abs() < 2.0, "length {}", m.length_mm);
    assert!((m.width_mm - 42.0).abs() < 2.0, "width {}", m.width_mm);
}

#[test]
fn default_bounds_reject_small_subject() {
    init_logging();
    let image = SyntheticScene::a4_on_floor().render();
    let err = foot_measure::measure(&image, PaperSize::A4).unwrap_err();
    match err {
        MeasurementFailure::MeasurementOutOfRange {
            length_mm,
            width_mm,
            violations,
        } => {
            assert!((length_mm - 105.0).abs() < 2.0);
            assert!((width_mm - 42.0).abs() < 2.0);
            assert_eq!(violations.len(), 2);
            assert!(err_text(&violations[0]).contains("foot length"));
        }
        other => panic!("expected out of range, got {other:?}"),
    }
}

fn err_text(v: &foot_measure::error::RangeViolation) -> String {
    v.to_string()
}

#[test]
fn blank_image_has_no_reference() {
    init_logging();
    let image = ImageRgb::from_raw(320, 240, vec![255; 320 * 240 * 3]).unwrap();
    let err = foot_measure::measure(&image, PaperSize::A4).unwrap_err();
    match err {
        MeasurementFailure::ReferenceNotFound { report } => {
            assert_eq!(report.total, 0);
            assert!(report.candidates.is_empty());
        }
        other => panic!("expected missing reference, got {other:?}"),
    }
}

#[test]
fn empty_paper_has_no_subject() {
    init_logging();
    let image = SyntheticScene::a4_on_floor().without_subject().render();
    let config = relaxed_bounds();
    let (result, tel) = Pipeline::new(&config).run_with_telemetry(&image, PaperSize::A4);
    assert!(matches!(
        result,
        Err(MeasurementFailure::SubjectNotFound { .. })
    ));
    assert!(tel.px_per_mm.is_some());
    assert_eq!(tel.subject_candidates, 0);
}

#[test]
fn downsampled_image_measures_the_same() {
    init_logging();
    let full = SyntheticScene::a4_on_floor().render();
    let half = downsample(&full, 2);
    let measurer = FootMeasurer::new(relaxed_bounds()).unwrap();

    let a = measurer.measure(&full, PaperSize::A4).unwrap();
    let b = measurer.measure(&half, PaperSize::A4).unwrap();
    assert!((a.length_mm - b.length_mm).abs() < 3.0, "{} vs {}", a.length_mm, b.length_mm);
    assert!((a.width_mm - b.width_mm).abs() < 3.0, "{} vs {}", a.width_mm, b.width_mm);
    assert!((b.px_per_mm * 2.0 - a.px_per_mm).abs() < 0.1);
}

#[test]
fn letter_preset_rescales_result() {
    init_logging();
    let image = SyntheticScene::a4_on_floor().render();
    let measurer = FootMeasurer::new(relaxed_bounds()).unwrap();
    let a4 = measurer.measure(&image, PaperSize::A4).unwrap();
    let letter = measurer.measure(&image, PaperSize::Letter).unwrap();
    let ratio = PaperSize::Letter.width_mm() / PaperSize::A4.width_mm();
    assert!((letter.length_mm - a4.length_mm * ratio).abs() < 1e-2);
    assert_eq!(letter.paper, PaperSize::Letter);
}

#[test]
fn skin_toned_subject_scores_high() {
    init_logging();
    let scene = SyntheticScene::a4_on_floor();
    let rect: Rect = scene.paper.centered(120, 300);
    let image = scene.with_subject(rect, [224, 172, 140]).render();
    let measurer = FootMeasurer::new(relaxed_bounds()).unwrap();
    let m = measurer.measure(&image, PaperSize::A4).unwrap();
    assert!(m.confidence >= 0.75, "confidence {}", m.confidence);
    assert_eq!(m.confidence_label, ConfidenceLabel::High);
}

#[test]
fn rotated_extent_matches_axis_aligned_for_upright_subject() {
    init_logging();
    let image = SyntheticScene::a4_on_floor().render();
    let axis = FootMeasurer::new(relaxed_bounds()).unwrap();
    let mut config = relaxed_bounds();
    config.validation.extent_mode = ExtentMode::MinAreaRect;
    let rotated = FootMeasurer::new(config).unwrap();

    let a = axis.measure(&image, PaperSize::A4).unwrap();
    let b = rotated.measure(&image, PaperSize::A4).unwrap();
    assert!((a.length_mm - b.length_mm).abs() < 1.0);
    assert!((a.width_mm - b.width_mm).abs() < 1.0);
}

#[test]
fn permissive_config_survives_json() {
    let config = MeasureConfig::permissive();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: MeasureConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
    assert!(FootMeasurer::new(parsed).is_ok());
}

#[test]
fn failure_serializes_for_clients() {
    let image = ImageRgb::from_raw(64, 64, vec![0; 64 * 64 * 3]).unwrap();
    let err = foot_measure::measure(&image, PaperSize::A4).unwrap_err();
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["kind"], "reference_not_found");
    assert!(err.to_string().starts_with("Could not detect paper"));
}
