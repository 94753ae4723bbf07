//! Subject confidence signals.
//!
//! Each signal is an independent function returning a value in `[0, 1]`;
//! [`SignalScores::combine`] folds them with a [`SignalWeights`] set.

use crate::config::{Band, SignalWeights};
use crate::models::{BoundingBox, Contour, EdgeMap, ImageRgb, Point};
use crate::utils::color::SkinTone;
use crate::utils::geometry::row_crossings;
use serde::Serialize;

/// The four per-candidate signals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SignalScores {
    /// Skin tone coverage of the enclosed pixels
    pub color: f32,
    /// Horizontal edge segment density inside the bounding box
    pub edge: f32,
    /// Shape complexity (perimeter / sqrt(area)) fit
    pub shape: f32,
    /// Closeness of the centroid to the image centre
    pub position: f32,
}

impl SignalScores {
    /// Weighted sum, clamped to `[0, 1]`
    pub fn combine(&self, weights: &SignalWeights) -> f32 {
        let sum = weights.color * self.color
            + weights.edge * self.edge
            + weights.shape * self.shape
            + weights.position * self.position;
        sum.clamp(0.0, 1.0)
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Fraction of skin-coloured pixels inside the contour, multiplied by
/// `gain`. Rows and columns are sampled every `stride` pixels; interior
/// spans come from scanline crossings of the traced boundary.
pub fn color_signal(
    image: &ImageRgb,
    contour: &Contour,
    skin: &SkinTone,
    stride: usize,
    gain: f32,
) -> f32 {
    let stride = stride.max(1);
    let bbox = contour.bbox();
    let max_x = image.width() as i32 - 1;
    let max_y = image.height() as i32 - 1;

    let mut total = 0usize;
    let mut skin_pixels = 0usize;
    let mut y = bbox.min_y.max(0);
    while y <= bbox.max_y.min(max_y) {
        let xs = row_crossings(contour.points(), y as f32);
        for span in xs.chunks_exact(2) {
            let start = (span[0].ceil() as i32).max(0);
            let end = (span[1].floor() as i32).min(max_x);
            let mut x = start;
            while x <= end {
                total += 1;
                if skin.contains_rgb(image.pixel(x as usize, y as usize)) {
                    skin_pixels += 1;
                }
                x += stride as i32;
            }
        }
        y += stride as i32;
    }

    if total == 0 {
        return 0.0;
    }
    unit(skin_pixels as f32 / total as f32 * gain)
}

/// Density of edge pixels lying on horizontal runs of at least `min_run`
/// pixels inside `bbox`, multiplied by `gain`
pub fn edge_texture_signal(edges: &EdgeMap, bbox: &BoundingBox, min_run: usize, gain: f32) -> f32 {
    let x0 = bbox.min_x.max(0) as usize;
    let y0 = bbox.min_y.max(0) as usize;
    let x1 = (bbox.max_x.max(0) as usize).min(edges.width().saturating_sub(1));
    let y1 = (bbox.max_y.max(0) as usize).min(edges.height().saturating_sub(1));
    if edges.width() == 0 || edges.height() == 0 || x0 > x1 || y0 > y1 {
        return 0.0;
    }

    let mut counted = 0usize;
    for y in y0..=y1 {
        let mut run = 0usize;
        for x in x0..=x1 {
            if edges.get(x, y) {
                run += 1;
            } else {
                if run >= min_run {
                    counted += run;
                }
                run = 0;
            }
        }
        if run >= min_run {
            counted += run;
        }
    }

    unit(counted as f32 / bbox.area() * gain)
}

/// 1.0 inside `band`, decaying linearly to 0 towards zero below it and
/// towards twice the upper bound above it
pub fn shape_signal(compactness: f32, band: &Band) -> f32 {
    if !compactness.is_finite() || compactness <= 0.0 {
        return 0.0;
    }
    if band.contains(compactness) {
        1.0
    } else if compactness < band.min {
        unit(compactness / band.min)
    } else {
        unit(1.0 - (compactness - band.max) / band.max)
    }
}

/// 1.0 at the image centre, 0.0 at a corner
pub fn position_signal(centroid: Point, image_width: usize, image_height: usize) -> f32 {
    let center = Point::new(image_width as f32 / 2.0, image_height as f32 / 2.0);
    let half_diagonal = center.x.hypot(center.y);
    if half_diagonal <= 0.0 {
        return 0.0;
    }
    unit(1.0 - centroid.distance(&center) / half_diagonal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointI;

    fn rect_contour(x0: i32, y0: i32, x1: i32, y1: i32) -> Contour {
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push(PointI::new(x, y0));
        }
        for y in y0..y1 {
            pts.push(PointI::new(x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(PointI::new(x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(PointI::new(x0, y));
        }
        Contour::from_boundary(pts, 0.02).unwrap()
    }

    fn filled(width: usize, height: usize, rgb: [u8; 3]) -> ImageRgb {
        let data = rgb.iter().copied().cycle().take(width * height * 3).collect();
        ImageRgb::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_combine_is_weighted_sum() {
        let s = SignalScores {
            color: 1.0,
            edge: 0.5,
            shape: 0.0,
            position: 1.0,
        };
        let strict = SignalWeights::strict();
        assert!((s.combine(&strict) - (0.3 + 0.1 + 0.3)).abs() < 1e-6);
        let equal = SignalWeights::equal();
        assert!((s.combine(&equal) - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_color_signal_skin_versus_gray() {
        let contour = rect_contour(10, 10, 40, 50);
        let skin = SkinTone::default();
        let peach = filled(60, 60, [224, 172, 140]);
        assert_eq!(color_signal(&peach, &contour, &skin, 2, 1.5), 1.0);
        let gray = filled(60, 60, [90, 90, 90]);
        assert_eq!(color_signal(&gray, &contour, &skin, 2, 1.5), 0.0);
    }

    #[test]
    fn test_edge_texture_counts_long_runs_only() {
        let mut edges = EdgeMap::new(20, 20);
        for x in 0..10 {
            edges.set(x, 3, true);
        }
        // Vertical stroke contributes nothing
        for y in 0..10 {
            edges.set(15, y, true);
        }
        let bbox = BoundingBox {
            min_x: 0,
            min_y: 0,
            max_x: 19,
            max_y: 19,
        };
        let expected = 10.0 / 400.0 * 8.0;
        assert!((edge_texture_signal(&edges, &bbox, 5, 8.0) - expected).abs() < 1e-6);
        assert_eq!(edge_texture_signal(&edges, &bbox, 11, 8.0), 0.0);
    }

    #[test]
    fn test_shape_signal_band() {
        let band = Band::new(4.2, 8.0);
        assert_eq!(shape_signal(5.0, &band), 1.0);
        assert!((shape_signal(2.1, &band) - 0.5).abs() < 1e-6);
        assert!((shape_signal(12.0, &band) - 0.5).abs() < 1e-6);
        assert_eq!(shape_signal(f32::INFINITY, &band), 0.0);
    }

    #[test]
    fn test_position_signal() {
        assert_eq!(position_signal(Point::new(50.0, 40.0), 100, 80), 1.0);
        assert!(position_signal(Point::new(0.0, 0.0), 100, 80) < 1e-6);
        let mid = position_signal(Point::new(25.0, 20.0), 100, 80);
        assert!((mid - 0.5).abs() < 1e-5);
    }
}
