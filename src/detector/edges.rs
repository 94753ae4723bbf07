use crate::config::{EdgeConfig, EdgeThreshold};
use crate::models::{EdgeMap, ImageRgb};
use crate::utils::blur::gaussian_blur_5x5;
use crate::utils::grayscale::rgb_to_grayscale;
use std::collections::VecDeque;

/// tan(22.5 deg)
const TAN_22_5: f32 = 0.414_213_57;
/// tan(67.5 deg)
const TAN_67_5: f32 = 2.414_213_6;

/// Multi-sensitivity edge extraction.
///
/// The image is converted to grayscale and smoothed once. Gradient and
/// non-maximum suppression are shared between passes; each threshold pair
/// only runs its own hysteresis. The per-pair maps are OR-ed and optionally
/// dilated to close single-pixel gaps.
pub struct EdgeExtractor;

impl EdgeExtractor {
    /// Extract the union edge map of `image`
    pub fn extract(image: &ImageRgb, config: &EdgeConfig) -> EdgeMap {
        let width = image.width();
        let height = image.height();
        let gray = rgb_to_grayscale(image.as_bytes(), width, height);
        Self::extract_gray(&gray, width, height, config)
    }

    /// Same as [`EdgeExtractor::extract`] on a grayscale buffer
    pub fn extract_gray(gray: &[u8], width: usize, height: usize, config: &EdgeConfig) -> EdgeMap {
        if width == 0 || height == 0 {
            return EdgeMap::new(width, height);
        }

        let smoothed;
        let source = if config.blur {
            smoothed = gaussian_blur_5x5(gray, width, height);
            &smoothed[..]
        } else {
            gray
        };

        let gradient = Gradient::sobel(source, width, height);
        let thin = gradient.suppress_non_maxima();

        let mut union = EdgeMap::new(width, height);
        for threshold in &config.thresholds {
            let pass = hysteresis(&thin, width, height, *threshold);
            log::trace!(
                "edge pass low={} high={}: {} pixels",
                threshold.low,
                threshold.high,
                pass.count_ones()
            );
            union = union.union(&pass);
        }

        for _ in 0..config.dilate_iterations {
            union = union.dilate();
        }
        union
    }
}

/// Sobel responses with L1 magnitude
struct Gradient {
    width: usize,
    height: usize,
    gx: Vec<i32>,
    gy: Vec<i32>,
    magnitude: Vec<f32>,
}

impl Gradient {
    fn sobel(gray: &[u8], width: usize, height: usize) -> Self {
        let len = width * height;
        let mut gx = vec![0i32; len];
        let mut gy = vec![0i32; len];
        let mut magnitude = vec![0f32; len];

        let at = |x: isize, y: isize| -> i32 {
            let cx = x.clamp(0, width as isize - 1) as usize;
            let cy = y.clamp(0, height as isize - 1) as usize;
            gray[cy * width + cx] as i32
        };

        for y in 0..height as isize {
            for x in 0..width as isize {
                let tl = at(x - 1, y - 1);
                let t = at(x, y - 1);
                let tr = at(x + 1, y - 1);
                let l = at(x - 1, y);
                let r = at(x + 1, y);
                let bl = at(x - 1, y + 1);
                let b = at(x, y + 1);
                let br = at(x + 1, y + 1);

                let dx = (tr + 2 * r + br) - (tl + 2 * l + bl);
                let dy = (bl + 2 * b + br) - (tl + 2 * t + tr);
                let idx = y as usize * width + x as usize;
                gx[idx] = dx;
                gy[idx] = dy;
                magnitude[idx] = (dx.abs() + dy.abs()) as f32;
            }
        }

        Self {
            width,
            height,
            gx,
            gy,
            magnitude,
        }
    }

    fn mag(&self, x: isize, y: isize) -> f32 {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return 0.0;
        }
        self.magnitude[y as usize * self.width + x as usize]
    }

    /// Keep magnitudes that are local maxima across the gradient direction;
    /// everything else becomes zero. Ties keep the pixel on the negative
    /// side so a symmetric ridge stays one pixel wide.
    fn suppress_non_maxima(&self) -> Vec<f32> {
        let mut out = vec![0f32; self.magnitude.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let m = self.magnitude[idx];
                if m == 0.0 {
                    continue;
                }
                let ax = self.gx[idx].abs() as f32;
                let ay = self.gy[idx].abs() as f32;
                let (xi, yi) = (x as isize, y as isize);

                let (neg, pos) = if ay <= ax * TAN_22_5 {
                    (self.mag(xi - 1, yi), self.mag(xi + 1, yi))
                } else if ay > ax * TAN_67_5 {
                    (self.mag(xi, yi - 1), self.mag(xi, yi + 1))
                } else if (self.gx[idx] > 0) == (self.gy[idx] > 0) {
                    (self.mag(xi - 1, yi - 1), self.mag(xi + 1, yi + 1))
                } else {
                    (self.mag(xi + 1, yi - 1), self.mag(xi - 1, yi + 1))
                };

                if m > neg && m >= pos {
                    out[idx] = m;
                }
            }
        }
        out
    }
}

/// Strong pixels (above `high`) seed an 8-connected flood through weak
/// pixels (above `low`).
fn hysteresis(thin: &[f32], width: usize, height: usize, threshold: EdgeThreshold) -> EdgeMap {
    let mut map = EdgeMap::new(width, height);
    let mut queue = VecDeque::new();

    for (idx, &m) in thin.iter().enumerate() {
        if m > threshold.high {
            let (x, y) = (idx % width, idx / width);
            if !map.get(x, y) {
                map.set(x, y, true);
                queue.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                if map.get(nx, ny) {
                    continue;
                }
                if thin[ny * width + nx] > threshold.low {
                    map.set(nx, ny, true);
                    queue.push_back((nx, ny));
                }
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_rect(width: usize, height: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> Vec<u8> {
        let mut gray = vec![20u8; width * height];
        for y in y0..y1 {
            for x in x0..x1 {
                gray[y * width + x] = 230;
            }
        }
        gray
    }

    fn no_dilate() -> EdgeConfig {
        EdgeConfig {
            dilate_iterations: 0,
            ..EdgeConfig::default()
        }
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let gray = vec![128u8; 64 * 64];
        let map = EdgeExtractor::extract_gray(&gray, 64, 64, &EdgeConfig::default());
        assert!(map.is_empty());
        assert_eq!(map.width(), 64);
    }

    #[test]
    fn test_vertical_step_is_one_pixel_wide() {
        let gray = solid_rect(40, 20, 20, 0, 40, 20);
        let map = EdgeExtractor::extract_gray(&gray, 40, 20, &no_dilate());
        for y in 4..16 {
            let row: Vec<usize> = (0..40).filter(|&x| map.get(x, y)).collect();
            assert_eq!(row, vec![19], "row {y}");
        }
    }

    #[test]
    fn test_rectangle_sides() {
        let gray = solid_rect(60, 60, 15, 15, 45, 45);
        let map = EdgeExtractor::extract_gray(&gray, 60, 60, &no_dilate());
        // Left and top edges sit just outside the bright block, right and
        // bottom edges on its last row and column
        for i in 20..40 {
            assert!(map.get(14, i), "left edge at y={i}");
            assert!(map.get(44, i), "right edge at y={i}");
            assert!(map.get(i, 14), "top edge at x={i}");
            assert!(map.get(i, 44), "bottom edge at x={i}");
        }
        assert!(!map.get(30, 30));
    }

    #[test]
    fn test_low_contrast_needs_low_threshold() {
        let mut gray = vec![100u8; 40 * 40];
        for y in 0..40 {
            for x in 20..40 {
                gray[y * 40 + x] = 112;
            }
        }
        let strict = EdgeConfig {
            thresholds: vec![EdgeThreshold::new(75.0, 225.0)],
            ..no_dilate()
        };
        assert!(EdgeExtractor::extract_gray(&gray, 40, 40, &strict).is_empty());

        let multi = EdgeConfig {
            thresholds: vec![
                EdgeThreshold::new(75.0, 225.0),
                EdgeThreshold::new(10.0, 20.0),
            ],
            ..no_dilate()
        };
        assert!(!EdgeExtractor::extract_gray(&gray, 40, 40, &multi).is_empty());
    }

    #[test]
    fn test_dilation_thickens() {
        let gray = solid_rect(40, 20, 20, 0, 40, 20);
        let thin = EdgeExtractor::extract_gray(&gray, 40, 20, &no_dilate());
        let thick = EdgeExtractor::extract_gray(&gray, 40, 20, &EdgeConfig::default());
        assert!(thick.count_ones() > thin.count_ones());
        assert!(thick.get(18, 10) && thick.get(19, 10) && thick.get(20, 10));
        assert!(!thick.get(17, 10) && !thick.get(21, 10));
    }
}
