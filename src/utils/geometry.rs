/// Geometry helpers for traced contours: areas, simplification, hulls
use crate::models::{Point, PointI};

/// Signed shoelace area of a closed polygon (positive = clockwise in image coordinates)
pub fn signed_area(points: &[PointI]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    acc as f64 * 0.5
}

/// Unsigned enclosed area of a closed polygon
pub fn polygon_area(points: &[PointI]) -> f32 {
    signed_area(points).abs() as f32
}

/// Length of the closed polyline through `points`
pub fn closed_perimeter(points: &[PointI]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let q = points[(i + 1) % points.len()];
            p.to_f32().distance(&q.to_f32())
        })
        .sum()
}

/// Area centroid of a closed polygon, falling back to the vertex mean for
/// degenerate (zero-area) input
pub fn polygon_centroid(points: &[PointI]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let area = signed_area(points);
    if area.abs() < 1e-9 {
        let n = points.len() as f32;
        let sx: f32 = points.iter().map(|p| p.x as f32).sum();
        let sy: f32 = points.iter().map(|p| p.y as f32).sum();
        return Point::new(sx / n, sy / n);
    }
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let cross = p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        cx += (p.x as f64 + q.x as f64) * cross;
        cy += (p.y as f64 + q.y as f64) * cross;
    }
    let k = 1.0 / (6.0 * area);
    Point::new((cx * k) as f32, (cy * k) as f32)
}

fn perpendicular_distance(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-6 {
        return p.distance(&a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// Douglas-Peucker reduction of a closed contour.
///
/// The curve is split at its first point and the point farthest from it, and
/// each half is reduced independently, so the result keeps both anchors.
pub fn simplify_closed(points: &[PointI], epsilon: f32) -> Vec<PointI> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let p0 = points[0];
    let far = (1..n)
        .max_by_key(|&i| {
            let dx = (points[i].x - p0.x) as i64;
            let dy = (points[i].y - p0.y) as i64;
            dx * dx + dy * dy
        })
        .unwrap_or(n / 2);

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;

    let first: Vec<usize> = (0..=far).collect();
    let second: Vec<usize> = (far..n).chain(std::iter::once(0)).collect();
    mark_chain(points, &first, epsilon, &mut keep);
    mark_chain(points, &second, epsilon, &mut keep);

    points
        .iter()
        .zip(keep.iter())
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

fn mark_chain(points: &[PointI], chain: &[usize], epsilon: f32, keep: &mut [bool]) {
    if chain.len() < 3 {
        return;
    }
    let mut stack = vec![(0usize, chain.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let a = points[chain[start]].to_f32();
        let b = points[chain[end]].to_f32();
        let mut best = start;
        let mut best_dist = -1.0f32;
        for i in (start + 1)..end {
            let d = perpendicular_distance(points[chain[i]].to_f32(), a, b);
            if d > best_dist {
                best_dist = d;
                best = i;
            }
        }
        if best_dist > epsilon {
            keep[chain[best]] = true;
            stack.push((start, best));
            stack.push((best, end));
        }
    }
}

fn cross(o: PointI, a: PointI, b: PointI) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Convex hull (Andrew's monotone chain); collinear points are dropped
pub fn convex_hull(points: &[PointI]) -> Vec<PointI> {
    let mut pts = points.to_vec();
    pts.sort_by_key(|p| (p.x, p.y));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<PointI> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<PointI> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Largest distance between two points of a hull
pub fn hull_diameter(hull: &[PointI]) -> f32 {
    let mut best = 0.0f32;
    for (i, a) in hull.iter().enumerate() {
        for b in &hull[i + 1..] {
            best = best.max(a.to_f32().distance(&b.to_f32()));
        }
    }
    best
}

/// Side lengths of a rotated rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedExtent {
    /// Longer side in pixels
    pub long: f32,
    /// Shorter side in pixels
    pub short: f32,
}

/// Minimum-area enclosing rectangle of a convex hull.
///
/// Sides follow the bounding-box convention of counting pixels, so an
/// axis-aligned `w x h` block of pixels yields sides `w` and `h`.
pub fn min_area_rect(hull: &[PointI]) -> OrientedExtent {
    match hull.len() {
        0 => {
            return OrientedExtent {
                long: 0.0,
                short: 0.0,
            };
        }
        1 => {
            return OrientedExtent {
                long: 1.0,
                short: 1.0,
            };
        }
        2 => {
            let a = hull[0].to_f32();
            let b = hull[1].to_f32();
            return OrientedExtent {
                long: a.distance(&b) + 1.0,
                short: 1.0,
            };
        }
        _ => {}
    }

    let mut best_area = f32::INFINITY;
    let mut best = OrientedExtent {
        long: 0.0,
        short: 0.0,
    };
    for i in 0..hull.len() {
        let a = hull[i].to_f32();
        let b = hull[(i + 1) % hull.len()].to_f32();
        let len = a.distance(&b);
        if len < 1e-6 {
            continue;
        }
        let ux = (b.x - a.x) / len;
        let uy = (b.y - a.y) / len;

        let mut min_u = f32::INFINITY;
        let mut max_u = f32::NEG_INFINITY;
        let mut min_v = f32::INFINITY;
        let mut max_v = f32::NEG_INFINITY;
        for p in hull {
            let px = p.x as f32 - a.x;
            let py = p.y as f32 - a.y;
            let u = px * ux + py * uy;
            let v = -px * uy + py * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        let side_u = max_u - min_u + 1.0;
        let side_v = max_v - min_v + 1.0;
        let area = side_u * side_v;
        if area < best_area {
            best_area = area;
            best = OrientedExtent {
                long: side_u.max(side_v),
                short: side_u.min(side_v),
            };
        }
    }
    best
}

/// X coordinates where the horizontal line at `y` crosses the closed
/// polygon, sorted ascending. Pairs of crossings bound interior spans.
pub fn row_crossings(points: &[PointI], y: f32) -> Vec<f32> {
    let mut xs = Vec::new();
    if points.len() < 3 {
        return xs;
    }
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let (py, qy) = (p.y as f32, q.y as f32);
        if (py > y) != (qy > y) {
            let t = (y - py) / (qy - py);
            xs.push(p.x as f32 + t * (q.x - p.x) as f32);
        }
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    xs
}
