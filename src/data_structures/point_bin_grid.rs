use glam::Vec2;

/// Uniform bin grid over the normalized unit square.
///
/// Cells are stored in boustrophedon order (bottom row left to right, the
/// row above right to left, and so on), so iterating `cells()` in storage
/// order visits neighboring buckets consecutively and keeps the
/// point-location walk between insertions short.
#[derive(Debug)]
pub struct PointBinGrid {
    cells: Vec<Vec<Vec2>>,
    cells_per_side: usize,
}

impl PointBinGrid {
    pub fn new(cells_per_side: usize) -> Self {
        PointBinGrid {
            cells: vec![Vec::new(); cells_per_side * cells_per_side],
            cells_per_side,
        }
    }

    /// Buckets a normalized point. Cell indices are clamped, so points on
    /// the top and right borders of the unit square land in the last cell.
    pub fn add_point(&mut self, point: Vec2) {
        let last_cell = self.cells_per_side - 1;
        let column = ((point.x * self.cells_per_side as f32) as usize).min(last_cell);
        let row = ((point.y * self.cells_per_side as f32) as usize).min(last_cell);

        // Storage order:
        // 6 7 8
        // 5 4 3
        // 0 1 2
        let cell_index = if row % 2 == 0 {
            row * self.cells_per_side + column
        } else {
            (row + 1) * self.cells_per_side - column - 1
        };

        self.cells[cell_index].push(point);
    }

    pub fn cells(&self) -> &[Vec<Vec2>] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_alternate_direction() {
        let mut grid = PointBinGrid::new(3);
        // One point in the middle of every cell, inserted row by row.
        for row in 0..3 {
            for column in 0..3 {
                grid.add_point(Vec2::new(
                    (column as f32 + 0.5) / 3.0,
                    (row as f32 + 0.5) / 3.0,
                ));
            }
        }

        let first_of_each_cell: Vec<Vec2> =
            grid.cells().iter().map(|cell| cell[0]).collect();
        // Bottom row runs left to right, the middle row right to left.
        assert_eq!(first_of_each_cell[0].x, 0.5 / 3.0);
        assert_eq!(first_of_each_cell[2].x, 2.5 / 3.0);
        assert_eq!(first_of_each_cell[3].x, 2.5 / 3.0);
        assert_eq!(first_of_each_cell[5].x, 0.5 / 3.0);
        assert_eq!(first_of_each_cell[6].x, 0.5 / 3.0);
    }

    #[test]
    fn border_points_are_clamped_into_the_grid() {
        let mut grid = PointBinGrid::new(2);
        grid.add_point(Vec2::new(1.0, 1.0));
        grid.add_point(Vec2::new(0.0, 0.0));
        let total: usize = grid.cells().iter().map(Vec::len).sum();
        assert_eq!(total, 2);
        // (1, 1) belongs to the top-right cell, which row reversal stores
        // first in the top row.
        assert_eq!(grid.cells()[2].len(), 1);
    }
}
