use super::{Point, PointI};
use crate::utils::geometry::{closed_perimeter, polygon_area, polygon_centroid, simplify_closed};
use serde::{Deserialize, Serialize};

/// Inclusive, axis-aligned pixel bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left-most column
    pub min_x: i32,
    /// Top-most row
    pub min_y: i32,
    /// Right-most column
    pub max_x: i32,
    /// Bottom-most row
    pub max_y: i32,
}

impl BoundingBox {
    /// Tight box around a point set, `None` when empty
    pub fn from_points(points: &[PointI]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Width in pixels (counts both end columns)
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x + 1) as u32
    }

    /// Height in pixels (counts both end rows)
    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y + 1) as u32
    }

    /// Box area in pixels
    pub fn area(&self) -> f32 {
        self.width() as f32 * self.height() as f32
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    /// Corner pixels, clockwise from top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x as f32, self.min_y as f32),
            Point::new(self.max_x as f32, self.min_y as f32),
            Point::new(self.max_x as f32, self.max_y as f32),
            Point::new(self.min_x as f32, self.max_y as f32),
        ]
    }
}

/// Simplified outline of a contour
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polygon {
    vertices: Vec<PointI>,
}

impl Polygon {
    /// Wrap an ordered vertex list
    pub fn new(vertices: Vec<PointI>) -> Self {
        Self { vertices }
    }

    /// Ordered vertices
    pub fn vertices(&self) -> &[PointI] {
        &self.vertices
    }

    /// Vertex count
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True for a polygon without vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Closed traced boundary with its derived shape metrics.
///
/// All metrics are computed once when the contour is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<PointI>,
    polygon: Polygon,
    area: f32,
    perimeter: f32,
    bbox: BoundingBox,
    centroid: Point,
}

impl Contour {
    /// Build a contour from boundary points, simplifying it once with a
    /// tolerance of `epsilon_fraction` times the perimeter. The polygon keeps
    /// every vertex that reduction leaves, so irregular outlines stay
    /// visibly irregular.
    pub fn from_boundary(points: Vec<PointI>, epsilon_fraction: f32) -> Option<Self> {
        let bbox = BoundingBox::from_points(&points)?;
        let area = polygon_area(&points);
        let perimeter = closed_perimeter(&points);
        let centroid = polygon_centroid(&points);

        let vertices = simplify_closed(&points, epsilon_fraction * perimeter);

        Some(Self {
            points,
            polygon: Polygon::new(vertices),
            area,
            perimeter,
            bbox,
            centroid,
        })
    }

    /// Boundary points in trace order
    pub fn points(&self) -> &[PointI] {
        &self.points
    }

    /// Simplified polygon
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Enclosed area in square pixels
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Closed boundary length in pixels
    pub fn perimeter(&self) -> f32 {
        self.perimeter
    }

    /// Axis-aligned bounding box
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Area centroid
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Enclosed area divided by bounding-box area
    pub fn extent(&self) -> f32 {
        self.area / self.bbox.area()
    }

    /// Perimeter divided by the square root of the area; infinite for
    /// zero-area contours
    pub fn compactness(&self) -> f32 {
        if self.area <= 0.0 {
            return f32::INFINITY;
        }
        self.perimeter / self.area.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: i32) -> Vec<PointI> {
        vec![
            PointI::new(0, 0),
            PointI::new(size, 0),
            PointI::new(size, size),
            PointI::new(0, size),
        ]
    }

    #[test]
    fn test_bbox_convention() {
        let bbox = BoundingBox::from_points(&square(9)).unwrap();
        assert_eq!(bbox.width(), 10);
        assert_eq!(bbox.height(), 10);
        assert!((bbox.aspect_ratio() - 1.0).abs() < 1e-6);
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_contour_metrics() {
        let contour = Contour::from_boundary(square(10), 0.02).unwrap();
        assert!((contour.area() - 100.0).abs() < 1e-3);
        assert!((contour.perimeter() - 40.0).abs() < 1e-3);
        assert!((contour.compactness() - 4.0).abs() < 1e-3);
        assert!((contour.extent() - 100.0 / 121.0).abs() < 1e-3);
        assert_eq!(contour.polygon().len(), 4);
        assert!((contour.centroid().x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_polygon_keeps_deep_notches() {
        // 400x560 sheet with five 60px deep notches cut into its top edge;
        // at 2% of the perimeter every notch floor survives reduction
        let pts = notched_sheet();
        let contour = Contour::from_boundary(pts, 0.02).unwrap();
        assert!(contour.polygon().len() >= 9, "{} vertices", contour.polygon().len());
    }

    fn notched_sheet() -> Vec<PointI> {
        let mut pts = vec![PointI::new(0, 0)];
        for i in 0..5 {
            let x0 = 30 + i * 75;
            pts.push(PointI::new(x0, 0));
            pts.push(PointI::new(x0, 60));
            pts.push(PointI::new(x0 + 40, 60));
            pts.push(PointI::new(x0 + 40, 0));
        }
        pts.push(PointI::new(400, 0));
        pts.push(PointI::new(400, 560));
        pts.push(PointI::new(0, 560));
        pts
    }

    #[test]
    fn test_degenerate_contour() {
        let contour = Contour::from_boundary(vec![PointI::new(3, 4)], 0.02).unwrap();
        assert_eq!(contour.area(), 0.0);
        assert!(contour.compactness().is_infinite());
        assert_eq!(contour.bbox().width(), 1);
    }
}
