use fnv::FnvHashMap;

/// Default grid cell edge length (canvas units)
pub const DEFAULT_CELL_SIZE: f32 = 50.0;

/// Pack two signed cell coordinates into one hash key
#[inline]
fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u32 as u64) << 32) | (cy as u32 as u64)
}

/// Inverse of [`cell_key`]
#[inline]
fn split_key(key: u64) -> (i32, i32) {
    ((key >> 32) as u32 as i32, key as u32 as i32)
}

/// Uniform grid over canvas space holding pool slot indices.
///
/// Rebuilt from scratch every frame. Buckets are emptied rather than
/// dropped on `clear` so steady-state frames do not reallocate.
pub struct SpatialIndex {
    cell_size: f32,
    cells: FnvHashMap<u64, Vec<usize>>,
    len: usize,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: FnvHashMap::default(),
            len: 0,
        }
    }

    /// Cell coordinates containing (x, y)
    pub fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    pub fn insert(&mut self, slot: usize, x: f32, y: f32) {
        let (cx, cy) = self.cell_of(x, y);
        self.cells.entry(cell_key(cx, cy)).or_default().push(slot);
        self.len += 1;
    }

    /// Cells reached out from the query cell; saturates for huge radii
    fn reach(&self, radius: f32) -> i64 {
        (radius.max(0.0) / self.cell_size).ceil() as i64
    }

    /// Whether (px, py) falls in the block of cells a query at (x, y)
    /// with `radius` visits
    pub fn within_reach(&self, x: f32, y: f32, radius: f32, px: f32, py: f32) -> bool {
        let (cell_x, cell_y) = self.cell_of(x, y);
        let (cx, cy) = self.cell_of(px, py);
        let reach = self.reach(radius);
        (cx as i64 - cell_x as i64).abs() <= reach && (cy as i64 - cell_y as i64).abs() <= reach
    }

    /// Broad-phase neighbor query.
    ///
    /// Returns every slot in the square block of cells reaching
    /// `ceil(radius / cell_size)` cells out from the cell holding (x, y).
    /// This is a superset of the slots within `radius`; callers needing an
    /// exact disc filter by distance themselves.
    pub fn query_radius(&self, x: f32, y: f32, radius: f32) -> Vec<usize> {
        let mut found = Vec::new();
        let (cell_x, cell_y) = self.cell_of(x, y);
        let (cell_x, cell_y) = (cell_x as i64, cell_y as i64);
        let reach = self.reach(radius);

        // Block wider than the occupied map: walk the map instead
        let side = 2.0 * reach as f64 + 1.0;
        if side * side > self.cells.len() as f64 {
            for (&key, bucket) in &self.cells {
                let (cx, cy) = split_key(key);
                if (cx as i64 - cell_x).abs() <= reach && (cy as i64 - cell_y).abs() <= reach {
                    found.extend_from_slice(bucket);
                }
            }
            return found;
        }

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                // Cells past the i32 range hold nothing
                let (Ok(cx), Ok(cy)) = (i32::try_from(cell_x + dx), i32::try_from(cell_y + dy)) else {
                    continue;
                };
                if let Some(bucket) = self.cells.get(&cell_key(cx, cy)) {
                    found.extend_from_slice(bucket);
                }
            }
        }
        found
    }

    /// Number of slots inserted since the last clear
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of cells currently holding at least one slot
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|b| !b.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_keys_distinguish_negative_coordinates() {
        assert_ne!(cell_key(-1, 0), cell_key(0, -1));
        assert_ne!(cell_key(-1, -1), cell_key(1, 1));
        assert_ne!(cell_key(0, 1), cell_key(1, 0));
    }

    #[test]
    fn test_cell_of_floors() {
        let index = SpatialIndex::new(50.0);
        assert_eq!(index.cell_of(0.0, 0.0), (0, 0));
        assert_eq!(index.cell_of(49.9, 50.0), (0, 1));
        assert_eq!(index.cell_of(-0.1, -50.1), (-1, -2));
    }

    #[test]
    fn test_query_returns_superset_of_disc() {
        let mut index = SpatialIndex::new(50.0);
        let points = [(10.0, 10.0), (60.0, 10.0), (95.0, 95.0), (400.0, 400.0), (-30.0, 20.0)];
        for (slot, &(x, y)) in points.iter().enumerate() {
            index.insert(slot, x, y);
        }

        let (qx, qy, r) = (20.0, 20.0, 45.0);
        let found = index.query_radius(qx, qy, r);

        for (slot, &(x, y)) in points.iter().enumerate() {
            let d = ((x - qx) * (x - qx) + (y - qy) * (y - qy)).sqrt();
            if d <= r {
                assert!(found.contains(&slot), "slot {} within radius missing", slot);
            }
        }
        // Far cell is never visited
        assert!(!found.contains(&3));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut index = SpatialIndex::default();
        index.insert(0, 1.0, 1.0);
        index.insert(1, 200.0, 1.0);
        assert_eq!(index.len(), 2);
        assert_eq!(index.occupied_cells(), 2);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.occupied_cells(), 0);
        assert!(index.query_radius(1.0, 1.0, 500.0).is_empty());
    }

    #[test]
    fn test_zero_radius_searches_own_cell() {
        let mut index = SpatialIndex::new(10.0);
        index.insert(7, 5.0, 5.0);
        index.insert(8, 15.0, 5.0);
        assert_eq!(index.query_radius(1.0, 1.0, 0.0), vec![7]);
    }

    #[test]
    fn test_far_query_point_finds_nothing() {
        let mut index = SpatialIndex::default();
        index.insert(0, 10.0, 10.0);
        assert!(index.query_radius(1.0e12, 0.0, 60.0).is_empty());
        assert!(index.query_radius(-1.0e12, 1.0e12, 0.0).is_empty());
        assert!(index.query_radius(f32::MAX, f32::MIN, 1.0).is_empty());
    }

    #[test]
    fn test_far_point_indexed_at_grid_edge() {
        let mut index = SpatialIndex::new(10.0);
        index.insert(3, 1.0e12, 1.0e12);
        assert_eq!(index.query_radius(1.0e12, 1.0e12, 5.0), vec![3]);
    }

    #[test]
    fn test_huge_radius_returns_everything() {
        let mut index = SpatialIndex::default();
        index.insert(0, 10.0, 10.0);
        index.insert(1, -900.0, 4000.0);
        let mut found = index.query_radius(0.0, 0.0, 1.0e7);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);

        let mut found = index.query_radius(0.0, 0.0, f32::INFINITY);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn test_within_reach_matches_query_block() {
        let index = SpatialIndex::new(50.0);
        assert!(index.within_reach(20.0, 20.0, 45.0, 95.0, 95.0));
        assert!(!index.within_reach(20.0, 20.0, 45.0, 400.0, 400.0));
        assert!(!index.within_reach(1.0e12, 0.0, 60.0, 10.0, 10.0));
    }
}
