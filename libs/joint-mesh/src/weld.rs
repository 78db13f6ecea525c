//! # Vertex Welding
//!
//! Spatial-hash lookup that merges positions closer than a tolerance.

use std::collections::HashMap;

use glam::DVec3;

/// Merges nearly coincident positions into shared vertex indices.
///
/// Positions are bucketed on a grid with cell size equal to the tolerance.
/// Lookups search the 27 neighbouring cells, so two points within the
/// tolerance always meet regardless of where the cell boundaries fall.
#[derive(Debug)]
pub struct VertexWelder {
    tolerance: f64,
    cells: HashMap<[i64; 3], Vec<u32>>,
    positions: Vec<DVec3>,
}

impl VertexWelder {
    /// Creates a welder. `tolerance` must be positive.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cells: HashMap::new(),
            positions: Vec::new(),
        }
    }

    fn cell(&self, p: DVec3) -> [i64; 3] {
        let q = (p / self.tolerance).floor();
        [q.x as i64, q.y as i64, q.z as i64]
    }

    /// Returns the index of an existing position within tolerance of `p`,
    /// or registers `p` as a new position.
    pub fn insert(&mut self, p: DVec3) -> u32 {
        if let Some(existing) = self.find(p) {
            return existing;
        }

        let index = self.positions.len() as u32;
        self.positions.push(p);
        let key = self.cell(p);
        self.cells.entry(key).or_default().push(index);
        index
    }

    /// Looks up the closest registered position within tolerance.
    pub fn find(&self, p: DVec3) -> Option<u32> {
        let [cx, cy, cz] = self.cell(p);
        let limit = self.tolerance * self.tolerance;

        let mut best: Option<(u32, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&[cx + dx, cy + dy, cz + dz]) else {
                        continue;
                    };
                    for &index in bucket {
                        let d = self.positions[index as usize].distance_squared(p);
                        if d <= limit && best.map_or(true, |(_, bd)| d < bd) {
                            best = Some((index, d));
                        }
                    }
                }
            }
        }
        best.map(|(index, _)| index)
    }

    /// Number of distinct positions registered.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing has been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Consumes the welder and returns the registered positions.
    pub fn into_positions(self) -> Vec<DVec3> {
        self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welds_across_cell_boundary() {
        let mut welder = VertexWelder::new(1e-3);
        let a = welder.insert(DVec3::new(0.9999e-3, 0.0, 0.0));
        let b = welder.insert(DVec3::new(1.0001e-3, 0.0, 0.0));
        assert_eq!(a, b);
        assert_eq!(welder.len(), 1);
    }

    #[test]
    fn test_keeps_distinct_points() {
        let mut welder = VertexWelder::new(1e-3);
        let a = welder.insert(DVec3::ZERO);
        let b = welder.insert(DVec3::new(2e-3, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(welder.into_positions().len(), 2);
    }

    #[test]
    fn test_first_position_wins() {
        let mut welder = VertexWelder::new(0.1);
        welder.insert(DVec3::new(1.0, 1.0, 1.0));
        welder.insert(DVec3::new(1.05, 1.0, 1.0));
        assert_eq!(welder.into_positions(), vec![DVec3::new(1.0, 1.0, 1.0)]);
    }
}
