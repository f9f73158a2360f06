use crate::world::Rect;

/// Spatial hash grid for collider broadphase.
///
/// Each collider index is inserted into every cell its rect covers. Queries
/// return candidates sorted ascending, so callers see colliders in the same
/// order they were inserted.
pub struct SpatialGrid {
    inv_cell_size: f32,
    table_size: usize,
    /// Each bucket holds collider indices.
    buckets: Vec<Vec<u32>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, table_size: usize) -> Self {
        let mut buckets = Vec::with_capacity(table_size);
        for _ in 0..table_size {
            buckets.push(Vec::with_capacity(4));
        }
        Self {
            inv_cell_size: 1.0 / cell_size,
            table_size,
            buckets,
        }
    }

    /// Clear all buckets. Keeps allocations.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Insert an index into every cell touched by `rect`.
    pub fn insert(&mut self, rect: &Rect, index: u32) {
        let (x0, y0, x1, y1) = self.cell_span(rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let hash = self.hash_cell(cx, cy);
                let bucket = &mut self.buckets[hash];
                // Large rects revisit the same bucket through hash collisions.
                if bucket.last() != Some(&index) {
                    bucket.push(index);
                }
            }
        }
    }

    /// Candidate indices for `rect`, deduplicated and in insertion order.
    ///
    /// Candidates may include false positives from hash collisions; callers
    /// still run the exact overlap test.
    pub fn query_rect(&self, rect: &Rect, out: &mut Vec<u32>) {
        out.clear();
        let (x0, y0, x1, y1) = self.cell_span(rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                out.extend_from_slice(&self.buckets[self.hash_cell(cx, cy)]);
            }
        }
        out.sort_unstable();
        out.dedup();
    }

    fn cell_span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let (x0, y0) = self.cell_coords(rect.left(), rect.top());
        let (x1, y1) = self.cell_coords(rect.right(), rect.bottom());
        (x0, y0, x1, y1)
    }

    fn cell_coords(&self, x: f32, y: f32) -> (i32, i32) {
        let cx = (x * self.inv_cell_size).floor() as i32;
        let cy = (y * self.inv_cell_size).floor() as i32;
        (cx, cy)
    }

    fn hash_cell(&self, cx: i32, cy: i32) -> usize {
        // Multiplicative spatial hash
        let h = (cx as u32).wrapping_mul(73856093) ^ (cy as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_query() {
        let mut grid = SpatialGrid::new(64.0, 256);
        grid.insert(&Rect::new(100.0, 100.0, 32.0, 32.0), 0);
        grid.insert(&Rect::new(110.0, 105.0, 32.0, 32.0), 1);
        grid.insert(&Rect::new(900.0, 900.0, 32.0, 32.0), 2);

        let mut found = Vec::new();
        grid.query_rect(&Rect::new(105.0, 102.0, 8.0, 8.0), &mut found);

        assert!(found.contains(&0));
        assert!(found.contains(&1));
    }

    #[test]
    fn wide_rect_is_found_from_any_cell() {
        let mut grid = SpatialGrid::new(64.0, 256);
        grid.insert(&Rect::new(0.0, 600.0, 640.0, 40.0), 7);

        let mut found = Vec::new();
        grid.query_rect(&Rect::new(500.0, 590.0, 32.0, 32.0), &mut found);
        assert_eq!(found, vec![7]);
    }

    #[test]
    fn results_are_sorted_and_unique() {
        let mut grid = SpatialGrid::new(32.0, 64);
        grid.insert(&Rect::new(0.0, 0.0, 200.0, 200.0), 3);
        grid.insert(&Rect::new(10.0, 10.0, 200.0, 200.0), 1);
        grid.insert(&Rect::new(20.0, 20.0, 5.0, 5.0), 2);

        let mut found = Vec::new();
        grid.query_rect(&Rect::new(0.0, 0.0, 100.0, 100.0), &mut found);
        assert_eq!(found, vec![1, 2, 3]);
    }

    #[test]
    fn clear_and_reuse() {
        let mut grid = SpatialGrid::new(64.0, 256);
        grid.insert(&Rect::new(50.0, 50.0, 10.0, 10.0), 42);
        grid.clear();

        let mut found = Vec::new();
        grid.query_rect(&Rect::new(50.0, 50.0, 10.0, 10.0), &mut found);
        assert!(found.is_empty());
    }
}
