use crate::config::ContourConfig;
use crate::detector::components::ComponentLabels;
use crate::models::{Contour, EdgeMap, PointI};

/// Moore neighbourhood, clockwise in image coordinates starting east
const DIRS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const WEST: usize = 4;

fn dir_index(dx: i32, dy: i32) -> usize {
    DIRS.iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(WEST)
}

/// Lazy outer-boundary tracer over the connected components of an edge map.
///
/// Components are visited in raster order of their first pixel, which is
/// always on the outer boundary. Each call to `next` traces one component,
/// so dropping the iterator early skips the remaining work. The tracer is
/// consumed as it runs and cannot be restarted.
pub struct ContourTracer<'a> {
    map: &'a EdgeMap,
    labels: ComponentLabels,
    seen: Vec<bool>,
    cursor: usize,
    config: &'a ContourConfig,
}

impl<'a> ContourTracer<'a> {
    /// Label the map and prepare to trace
    pub fn new(map: &'a EdgeMap, config: &'a ContourConfig) -> Self {
        let labels = ComponentLabels::label(map);
        let seen = vec![false; labels.count() + 1];
        Self {
            map,
            labels,
            seen,
            cursor: 0,
            config,
        }
    }

    /// Components in the map, including ones too small to trace
    pub fn component_count(&self) -> usize {
        self.labels.count()
    }

    /// Moore-neighbour trace starting from the top-left pixel of a
    /// component. The pixel west of `start` is background by construction.
    fn trace(&self, start: PointI, component_pixels: usize) -> Vec<PointI> {
        let mut points = vec![start];
        let mut second: Option<PointI> = None;
        let mut cur = start;
        let mut back = WEST;
        let max_steps = 4 * component_pixels + 8;

        for _ in 0..max_steps {
            let Some((next, next_back)) = self.step(cur, back) else {
                // Isolated pixel
                break;
            };

            if cur == start {
                match second {
                    None => second = Some(next),
                    Some(s) if s == next => {
                        // Closed; drop the repeated start
                        points.pop();
                        break;
                    }
                    Some(_) => {}
                }
            }

            points.push(next);
            cur = next;
            back = next_back;
        }
        points
    }

    /// Find the first edge neighbour of `cur` clockwise after the
    /// backtrack direction. Returns the neighbour and the direction from it
    /// to the last background pixel examined.
    fn step(&self, cur: PointI, back: usize) -> Option<(PointI, usize)> {
        for k in 1..=8 {
            let d = (back + k) % 8;
            let (dx, dy) = DIRS[d];
            let n = PointI::new(cur.x + dx, cur.y + dy);
            if self.map.get_i(n.x, n.y) {
                let (bx, by) = DIRS[(d + 7) % 8];
                let b = PointI::new(cur.x + bx, cur.y + by);
                return Some((n, dir_index(b.x - n.x, b.y - n.y)));
            }
        }
        None
    }
}

impl Iterator for ContourTracer<'_> {
    type Item = Contour;

    fn next(&mut self) -> Option<Contour> {
        let width = self.map.width();
        while self.cursor < self.labels.cell_count() {
            let index = self.cursor;
            self.cursor += 1;

            let label = self.labels.at(index);
            if label == 0 || self.seen[label as usize] {
                continue;
            }
            self.seen[label as usize] = true;

            let size = self.labels.size(label);
            if size < self.config.min_component_pixels {
                continue;
            }

            let start = PointI::new((index % width) as i32, (index / width) as i32);
            let points = self.trace(start, size);
            if let Some(contour) = Contour::from_boundary(points, self.config.simplify_fraction) {
                return Some(contour);
            }
        }
        None
    }
}
