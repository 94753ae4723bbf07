/// Compact bit grid marking edge pixels (`true` = edge)
///
/// Every transforming operation returns a fresh map; a map handed to the
/// contour stage is never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl EdgeMap {
    /// Create an empty edge map with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Get map width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get map height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y); out-of-bounds reads are non-edge
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Signed lookup used by neighbourhood walks
    pub fn get_i(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.get(x as usize, y as usize)
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        if value {
            self.data[index / 8] |= 1 << (index % 8);
        } else {
            self.data[index / 8] &= !(1 << (index % 8));
        }
    }

    /// Logical OR of two maps of identical size
    pub fn union(&self, other: &EdgeMap) -> EdgeMap {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a | b)
            .collect();
        EdgeMap {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// 3x3 binary dilation
    pub fn dilate(&self) -> EdgeMap {
        let mut out = EdgeMap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(x, y) {
                    continue;
                }
                for ny in y.saturating_sub(1)..=(y + 1).min(self.height - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(self.width - 1) {
                        out.set(nx, ny, true);
                    }
                }
            }
        }
        out
    }

    /// Keep only the edge pixels for which `keep(x, y)` holds
    pub fn retain<F>(&self, mut keep: F) -> EdgeMap
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut out = EdgeMap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) && keep(x, y) {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    /// Number of edge pixels
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// True when no pixel is marked
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

impl Default for EdgeMap {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
