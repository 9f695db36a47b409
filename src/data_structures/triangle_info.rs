/// Topology record for one triangle: point indices in counter-clockwise
/// order plus the adjacent triangle across each edge.
///
/// `adjacent_triangle_indices[k]` is the neighbor across the edge
/// `(vertex_indices[k], vertex_indices[(k + 1) % 3])`; `None` marks the
/// outside of the triangulation.
#[derive(Debug, Clone, Copy)]
pub struct TriangleInfo {
    pub vertex_indices: [usize; 3],
    pub adjacent_triangle_indices: [Option<usize>; 3],
}

impl TriangleInfo {
    pub fn new(vertex_indices: [usize; 3]) -> Self {
        TriangleInfo {
            vertex_indices,
            adjacent_triangle_indices: [None, None, None],
        }
    }

    pub fn with_adjacent(
        mut self,
        adjacent0: Option<usize>,
        adjacent1: Option<usize>,
        adjacent2: Option<usize>,
    ) -> TriangleInfo {
        self.adjacent_triangle_indices = [adjacent0, adjacent1, adjacent2];
        self
    }

    /// Slot holding `vertex`, if this triangle references it.
    pub fn vertex_slot(&self, vertex: usize) -> Option<usize> {
        self.vertex_indices.iter().position(|&v| v == vertex)
    }

    /// Slot whose adjacency points at `triangle_index`.
    pub fn adjacent_slot(&self, triangle_index: usize) -> Option<usize> {
        self.adjacent_triangle_indices
            .iter()
            .position(|&adjacent| adjacent == Some(triangle_index))
    }
}
