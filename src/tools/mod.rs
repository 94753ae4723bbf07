use crate::error::MeasureError;
use crate::models::{EdgeMap, ImageRgb};
use image::GenericImageView;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("FOOT_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Decode an image file into RGB.
///
/// When `FOOT_MAX_DIM` is set, images whose longer side exceeds it are
/// downscaled (aspect preserved) before measuring.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageRgb, MeasureError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| MeasureError::DecodeFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let (orig_w, orig_h) = img.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(MeasureError::EmptyImage {
            width: orig_w as usize,
            height: orig_h as usize,
        });
    }
    let rgb = match max_dim_from_env() {
        Some(max_dim) if orig_w.max(orig_h) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_rgb8(),
        _ => img.to_rgb8(),
    };
    Ok(ImageRgb::from(rgb))
}

/// Convert an RGB image back into an `image` buffer for saving
pub fn to_rgb_image(image: &ImageRgb) -> Option<image::RgbImage> {
    image::RgbImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.as_bytes().to_vec(),
    )
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for an edge map.
#[derive(Debug, Clone, Copy)]
pub struct EdgeStats {
    /// Count of edge pixels.
    pub edge_pixels: usize,
    /// Total pixels in the map.
    pub total_pixels: usize,
    /// Ratio of edge pixels to total pixels.
    pub edge_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Compute edge density for an edge map.
pub fn edge_stats(edges: &EdgeMap) -> EdgeStats {
    let edge_pixels = edges.count_ones();
    let total = edges.width() * edges.height();
    let ratio = if total == 0 {
        0.0
    } else {
        edge_pixels as f64 / total as f64
    };
    EdgeStats {
        edge_pixels,
        total_pixels: total,
        edge_ratio: ratio,
    }
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("FOOT_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/feet"))
}

/// Default batch limit from environment variables.
///
/// Returns `None` (whole dataset) when `FOOT_BATCH_LIMIT` is unset or `0`.
pub fn batch_limit_from_env() -> Option<usize> {
    match env::var("FOOT_BATCH_LIMIT") {
        Ok(value) => value
            .parse::<usize>()
            .ok()
            .and_then(|v| if v == 0 { None } else { Some(v) }),
        Err(_) => None,
    }
}

/// Iterate dataset image paths in sorted order with an optional limit.
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "webp") {
                    images.push(path);
                }
            }
        }
    }

    images
}

/// Axis-aligned filled rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left column
    pub x: usize,
    /// Top row
    pub y: usize,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centred inside `self`
    pub fn centered(&self, width: usize, height: usize) -> Self {
        Self {
            x: self.x + self.width.saturating_sub(width) / 2,
            y: self.y + self.height.saturating_sub(height) / 2,
            width,
            height,
        }
    }
}

/// Flat-colour test scene: a background, a paper sheet and an optional
/// subject drawn on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticScene {
    /// Image width
    pub width: usize,
    /// Image height
    pub height: usize,
    /// Floor colour
    pub background: [u8; 3],
    /// Sheet placement
    pub paper: Rect,
    /// Sheet colour
    pub paper_color: [u8; 3],
    /// Subject placement and colour
    pub subject: Option<(Rect, [u8; 3])>,
}

impl SyntheticScene {
    /// 600x848 white sheet on a dark 800x1050 floor with a centred
    /// 120x300 dark subject
    pub fn a4_on_floor() -> Self {
        let paper = Rect::new(100, 101, 600, 848);
        Self {
            width: 800,
            height: 1050,
            background: [60, 60, 60],
            paper,
            paper_color: [255, 255, 255],
            subject: Some((paper.centered(120, 300), [40, 40, 40])),
        }
    }

    /// Same scene without the subject
    pub fn without_subject(mut self) -> Self {
        self.subject = None;
        self
    }

    /// Replace the subject rectangle and colour
    pub fn with_subject(mut self, rect: Rect, color: [u8; 3]) -> Self {
        self.subject = Some((rect, color));
        self
    }

    /// Rasterize the scene
    pub fn render(&self) -> ImageRgb {
        let mut img = image::RgbImage::from_pixel(
            self.width as u32,
            self.height as u32,
            image::Rgb(self.background),
        );
        let mut fill = |rect: &Rect, color: [u8; 3]| {
            let x_end = (rect.x + rect.width).min(self.width);
            let y_end = (rect.y + rect.height).min(self.height);
            for y in rect.y..y_end {
                for x in rect.x..x_end {
                    img.put_pixel(x as u32, y as u32, image::Rgb(color));
                }
            }
        };
        fill(&self.paper, self.paper_color);
        if let Some((rect, color)) = &self.subject {
            fill(rect, *color);
        }
        ImageRgb::from(img)
    }
}
