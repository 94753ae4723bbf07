/// Hue/saturation/value colour helpers
use serde::{Deserialize, Serialize};

/// HSV triple: hue in degrees [0, 360), saturation and value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue in degrees
    pub h: f32,
    /// Saturation
    pub s: f32,
    /// Value (brightness)
    pub v: f32,
}

/// Convert an 8-bit RGB triple to HSV
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

/// HSV box classified as skin tone.
///
/// Hue accepts the band `[0, hue_max]` plus the red wrap-around band
/// `[hue_wrap_min, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinTone {
    /// Upper hue bound in degrees
    pub hue_max: f32,
    /// Lower hue bound of the wrap-around band in degrees
    pub hue_wrap_min: f32,
    /// Minimum saturation
    pub sat_min: f32,
    /// Maximum saturation
    pub sat_max: f32,
    /// Minimum value
    pub val_min: f32,
}

impl Default for SkinTone {
    fn default() -> Self {
        Self {
            hue_max: 50.0,
            hue_wrap_min: 340.0,
            sat_min: 0.15,
            sat_max: 0.75,
            val_min: 0.30,
        }
    }
}

impl SkinTone {
    /// Whether the colour falls inside the skin box
    pub fn contains(&self, hsv: Hsv) -> bool {
        let hue_ok = hsv.h <= self.hue_max || hsv.h >= self.hue_wrap_min;
        hue_ok && (self.sat_min..=self.sat_max).contains(&hsv.s) && hsv.v >= self.val_min
    }

    /// Classify an RGB triple
    pub fn contains_rgb(&self, rgb: [u8; 3]) -> bool {
        self.contains(rgb_to_hsv(rgb[0], rgb[1], rgb[2]))
    }
}
