use crate::error::MeasureError;

/// Decoded, tightly packed RGB image (3 bytes per pixel)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRgb {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl ImageRgb {
    /// Wrap raw RGB bytes, checking the buffer matches the dimensions
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, MeasureError> {
        if width == 0 || height == 0 {
            return Err(MeasureError::EmptyImage { width, height });
        }
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(MeasureError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// RGB triple at (x, y). Callers stay in bounds.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Raw RGB bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<image::RgbImage> for ImageRgb {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            data: img.into_raw(),
        }
    }
}
