/// Connected components of an edge map.
/// Two-pass union-find labeling with 8-connectivity; labels are compacted so
/// that component ids run from 1 in raster order of first appearance.
use crate::models::EdgeMap;

/// Union-Find data structure
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root of the set containing `x`
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression
        let mut cur = x;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets containing `x` and `y`
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            // Keep the smaller provisional label as root
            let (lo, hi) = if root_x < root_y {
                (root_x, root_y)
            } else {
                (root_y, root_x)
            };
            self.parent[hi as usize] = lo;
        }
    }
}

/// Per-pixel component ids with component sizes
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    labels: Vec<u32>,
    sizes: Vec<usize>,
}

impl ComponentLabels {
    /// Label every edge pixel of `map`
    pub fn label(map: &EdgeMap) -> Self {
        let width = map.width();
        let height = map.height();

        let mut labels = vec![0u32; width * height];
        let mut next_label = 1u32;
        // Provisional labels past the initial guess are added on demand
        let mut uf = UnionFind::new(width * height / 2 + 2);

        // First pass: provisional labels
        for y in 0..height {
            for x in 0..width {
                if !map.get(x, y) {
                    continue;
                }

                let idx = y * width + x;
                let mut neighbors = [0u32; 4];
                let mut count = 0;

                // left, upper-left, up, upper-right
                if x > 0 && map.get(x - 1, y) {
                    neighbors[count] = labels[idx - 1];
                    count += 1;
                }
                if x > 0 && y > 0 && map.get(x - 1, y - 1) {
                    neighbors[count] = labels[idx - width - 1];
                    count += 1;
                }
                if y > 0 && map.get(x, y - 1) {
                    neighbors[count] = labels[idx - width];
                    count += 1;
                }
                if x + 1 < width && y > 0 && map.get(x + 1, y - 1) {
                    neighbors[count] = labels[idx - width + 1];
                    count += 1;
                }

                let neighbors = &neighbors[..count];
                match neighbors.iter().min() {
                    None => {
                        if next_label as usize >= uf.parent.len() {
                            uf.parent.push(next_label);
                        }
                        labels[idx] = next_label;
                        next_label += 1;
                    }
                    Some(&min_label) => {
                        labels[idx] = min_label;
                        for &l in neighbors {
                            if l != min_label {
                                uf.union(min_label, l);
                            }
                        }
                    }
                }
            }
        }

        // Second pass: resolve roots and compact ids
        let mut compact = vec![0u32; next_label as usize];
        let mut sizes = vec![0usize];
        for label in labels.iter_mut() {
            if *label == 0 {
                continue;
            }
            let root = uf.find(*label) as usize;
            if compact[root] == 0 {
                compact[root] = sizes.len() as u32;
                sizes.push(0);
            }
            *label = compact[root];
            sizes[*label as usize] += 1;
        }

        Self { labels, sizes }
    }

    /// Component id at a raster index; 0 for background
    pub fn at(&self, index: usize) -> u32 {
        self.labels[index]
    }

    /// Pixel count of a component
    pub fn size(&self, label: u32) -> usize {
        self.sizes.get(label as usize).copied().unwrap_or(0)
    }

    /// Number of components
    pub fn count(&self) -> usize {
        self.sizes.len() - 1
    }

    /// Number of labelled cells (edge and background)
    pub fn cell_count(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_at(labels: &ComponentLabels, x: usize, y: usize) -> u32 {
        labels.at(y * 10 + x)
    }

    #[test]
    fn test_two_separate_squares() {
        let mut map = EdgeMap::new(10, 10);
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3), (7, 7)] {
            map.set(x, y, true);
        }
        let labels = ComponentLabels::label(&map);
        assert_eq!(labels.count(), 2);
        assert_eq!(label_at(&labels, 2, 2), 1);
        assert_eq!(label_at(&labels, 3, 3), 1);
        assert_eq!(label_at(&labels, 7, 7), 2);
        assert_eq!(labels.size(1), 4);
        assert_eq!(labels.size(2), 1);
        assert_eq!(label_at(&labels, 0, 0), 0);
    }

    #[test]
    fn test_diagonal_and_u_shape_merge() {
        // U shape whose arms only meet at the bottom row
        let mut map = EdgeMap::new(8, 6);
        for y in 0..5 {
            map.set(1, y, true);
            map.set(5, y, true);
        }
        for x in 1..=5 {
            map.set(x, 5, true);
        }
        // Diagonal tail
        map.set(6, 0, true);
        let labels = ComponentLabels::label(&map);
        assert_eq!(labels.count(), 1);
        assert_eq!(labels.size(1), 16);
    }
}
