use super::{Point, PointI};
use serde::{Deserialize, Serialize};

/// Reference sheet corners in canonical order.
///
/// Corners are always stored as top-left, top-right, bottom-right,
/// bottom-left regardless of how the source polygon was traversed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    /// Top-left corner
    pub top_left: Point,
    /// Top-right corner
    pub top_right: Point,
    /// Bottom-right corner
    pub bottom_right: Point,
    /// Bottom-left corner
    pub bottom_left: Point,
}

impl ReferenceFrame {
    /// Pick the four extreme vertices of a polygon: minimum / maximum of
    /// `x + y` give top-left / bottom-right, minimum / maximum of `y - x`
    /// give top-right / bottom-left. Ties resolve on the coordinates
    /// themselves so the result does not depend on vertex order.
    pub fn from_polygon(vertices: &[PointI]) -> Option<Self> {
        if vertices.is_empty() {
            return None;
        }
        let tl = vertices.iter().min_by_key(|p| (p.x + p.y, p.y, p.x))?;
        let br = vertices.iter().max_by_key(|p| (p.x + p.y, p.y, p.x))?;
        let tr = vertices.iter().min_by_key(|p| (p.y - p.x, p.y, p.x))?;
        let bl = vertices.iter().max_by_key(|p| (p.y - p.x, p.y, p.x))?;
        Some(Self {
            top_left: tl.to_f32(),
            top_right: tr.to_f32(),
            bottom_right: br.to_f32(),
            bottom_left: bl.to_f32(),
        })
    }

    /// Corners in canonical order
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Length of the top edge in pixels
    pub fn width_px(&self) -> f32 {
        self.top_left.distance(&self.top_right)
    }

    /// Length of the left edge in pixels
    pub fn height_px(&self) -> f32 {
        self.top_left.distance(&self.bottom_left)
    }

    fn signed_area(&self) -> f32 {
        let c = self.corners();
        let mut acc = 0.0;
        for i in 0..4 {
            let p = c[i];
            let q = c[(i + 1) % 4];
            acc += p.x * q.y - q.x * p.y;
        }
        acc * 0.5
    }

    /// Enclosed quadrilateral area in square pixels
    pub fn area_px(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Mean of the four corners
    pub fn center(&self) -> Point {
        let c = self.corners();
        Point::new(
            c.iter().map(|p| p.x).sum::<f32>() / 4.0,
            c.iter().map(|p| p.y).sum::<f32>() / 4.0,
        )
    }

    /// Whether `p` lies inside the quadrilateral
    pub fn contains(&self, p: Point) -> bool {
        self.contains_with_margin(p, 0.0)
    }

    /// Whether `p` lies inside the quadrilateral and at least `margin`
    /// pixels away from every edge
    pub fn contains_with_margin(&self, p: Point, margin: f32) -> bool {
        let orientation = self.signed_area().signum();
        if orientation == 0.0 {
            return false;
        }
        let c = self.corners();
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            let len = a.distance(&b);
            if len < 1e-6 {
                return false;
            }
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            if orientation * cross / len < margin {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Vec<PointI> {
        vec![
            PointI::new(10, 20),
            PointI::new(110, 20),
            PointI::new(110, 160),
            PointI::new(10, 160),
        ]
    }

    #[test]
    fn test_canonical_order_invariant() {
        let expected = ReferenceFrame::from_polygon(&rect()).unwrap();
        assert_eq!(expected.top_left, Point::new(10.0, 20.0));
        assert_eq!(expected.top_right, Point::new(110.0, 20.0));
        assert_eq!(expected.bottom_right, Point::new(110.0, 160.0));
        assert_eq!(expected.bottom_left, Point::new(10.0, 160.0));

        for shift in 0..4 {
            let mut rotated = rect();
            rotated.rotate_left(shift);
            assert_eq!(ReferenceFrame::from_polygon(&rotated).unwrap(), expected);
            rotated.reverse();
            assert_eq!(ReferenceFrame::from_polygon(&rotated).unwrap(), expected);
        }
    }

    #[test]
    fn test_measures() {
        let frame = ReferenceFrame::from_polygon(&rect()).unwrap();
        assert!((frame.width_px() - 100.0).abs() < 1e-4);
        assert!((frame.height_px() - 140.0).abs() < 1e-4);
        assert!((frame.area_px() - 14000.0).abs() < 1e-2);
        assert_eq!(frame.center(), Point::new(60.0, 90.0));
    }

    #[test]
    fn test_contains_with_margin() {
        let frame = ReferenceFrame::from_polygon(&rect()).unwrap();
        assert!(frame.contains(Point::new(50.0, 50.0)));
        assert!(!frame.contains(Point::new(5.0, 50.0)));
        assert!(frame.contains(Point::new(12.0, 50.0)));
        assert!(!frame.contains_with_margin(Point::new(12.0, 50.0), 5.0));
        assert!(frame.contains_with_margin(Point::new(20.0, 50.0), 5.0));
    }
}
