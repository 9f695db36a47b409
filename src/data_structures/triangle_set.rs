use std::collections::{HashSet, VecDeque};

use glam::Vec2;

use crate::math_utils::{self, is_point_to_the_right_of_edge};

use super::{
    edge::Edge, edge_info::EdgeInfo, error::TriangulationError, found_or_added::FoundOrAdded,
    triangle_info::TriangleInfo,
};

/// Indexed storage for the whole triangulation: the growing point list and
/// the triangle topology records.
///
/// Both arrays only grow; triangles are mutated in place by the insertion
/// and swap routines and filtered at output time, never deleted. All
/// coordinates handed to this type are normalized.
#[derive(Debug)]
pub struct TriangleSet {
    points: Vec<Vec2>,
    triangle_infos: Vec<TriangleInfo>,
}

impl TriangleSet {
    /// `expected_points` pre-sizes the storage; a triangulation of N points
    /// ends up with close to 2N triangles while the supertriangle is still
    /// in place.
    pub fn new(expected_points: usize) -> Self {
        TriangleSet {
            points: Vec::with_capacity(expected_points + 3),
            triangle_infos: Vec::with_capacity(2 * expected_points + 1),
        }
    }

    /// Appends a point, unless a coincident point is already stored; then
    /// the existing index is returned instead.
    pub fn add_point(&mut self, point_to_add: Vec2) -> FoundOrAdded {
        match self.index_of_point(point_to_add) {
            Some(index) => FoundOrAdded::Found(index),
            None => {
                self.points.push(point_to_add);
                FoundOrAdded::Added(self.points.len() - 1)
            }
        }
    }

    pub fn index_of_point(&self, point: Vec2) -> Option<usize> {
        self.points.iter().position(|&stored| stored == point)
    }

    pub fn point(&self, index: usize) -> Vec2 {
        self.points[index]
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn add_triangle_info(&mut self, triangle_info: TriangleInfo) -> usize {
        self.triangle_infos.push(triangle_info);
        self.triangle_infos.len() - 1
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_infos.len()
    }

    pub fn triangle_info(&self, index: usize) -> TriangleInfo {
        self.triangle_infos[index]
    }

    pub fn triangle_points(&self, index: usize) -> [Vec2; 3] {
        self.triangle_infos[index]
            .vertex_indices
            .map(|vertex| self.points[vertex])
    }

    /// The position of one vertex of a triangle, by slot.
    pub fn vertex_point(&self, triangle_index: usize, slot: usize) -> Vec2 {
        self.points[self.triangle_infos[triangle_index].vertex_indices[slot]]
    }

    pub fn adjacent(&self, triangle_index: usize, slot: usize) -> Option<usize> {
        self.triangle_infos[triangle_index].adjacent_triangle_indices[slot]
    }

    pub fn replace_triangle(&mut self, triangle_index: usize, new_triangle: &TriangleInfo) {
        self.triangle_infos[triangle_index] = *new_triangle;
    }

    /// Rewires every adjacency slot of a triangle that pointed at
    /// `old_adjacent` to point at `new_adjacent`.
    pub fn replace_adjacent(
        &mut self,
        triangle_index: usize,
        old_adjacent: Option<usize>,
        new_adjacent: Option<usize>,
    ) {
        for slot in 0..3 {
            if self.triangle_infos[triangle_index].adjacent_triangle_indices[slot] == old_adjacent
            {
                self.triangle_infos[triangle_index].adjacent_triangle_indices[slot] =
                    new_adjacent;
            }
        }
    }

    /// Walks from `start_triangle` to the triangle containing `point`.
    ///
    /// At each step the walk crosses the first edge whose right half-plane
    /// holds the point; vertices are CCW, so the right side of an edge is
    /// always the exterior. Crossing an edge without a neighbor means the
    /// point is outside the triangulation, which cannot happen while the
    /// supertriangle encloses every normalized input. A walk longer than the
    /// triangle count has cycled, which only degenerate input produces.
    pub fn find_triangle_that_contains_point(
        &self,
        point: Vec2,
        start_triangle: usize,
    ) -> Result<usize, TriangulationError> {
        let mut triangle_index = start_triangle;

        for _ in 0..=self.triangle_count() {
            let mut crossed_an_edge = false;

            for edge_index in 0..3 {
                if is_point_to_the_right_of_edge(
                    self.vertex_point(triangle_index, edge_index),
                    self.vertex_point(triangle_index, (edge_index + 1) % 3),
                    point,
                ) {
                    match self.adjacent(triangle_index, edge_index) {
                        Some(neighbor) => {
                            triangle_index = neighbor;
                            crossed_an_edge = true;
                            break;
                        }
                        None => {
                            return Err(TriangulationError::WalkedOutOfTriangulation(
                                point.x, point.y,
                            ))
                        }
                    }
                }
            }

            if !crossed_an_edge {
                return Ok(triangle_index);
            }
        }

        Err(TriangulationError::ContainingTriangleNotFound(
            point.x, point.y,
        ))
    }

    /// Finds the triangle traversing the edge from point `a` to point `b` in
    /// exactly that order. Edges are directional: the twin triangle stores
    /// the same pair reversed.
    pub fn find_triangle_that_contains_edge(&self, a: usize, b: usize) -> Option<EdgeInfo> {
        for (triangle_index, info) in self.triangle_infos.iter().enumerate() {
            for edge_index in 0..3 {
                if info.vertex_indices[edge_index] == a
                    && info.vertex_indices[(edge_index + 1) % 3] == b
                {
                    return Some(EdgeInfo::new(triangle_index, edge_index, a, b));
                }
            }
        }
        None
    }

    /// Among the triangles incident to point `endpoint`, finds the one whose
    /// interior angle at `endpoint` contains the ray toward point `toward`,
    /// by orienting the ray against the two edges meeting at `endpoint`.
    pub fn find_triangle_that_contains_line_endpoint(
        &self,
        endpoint: usize,
        toward: usize,
    ) -> Result<usize, TriangulationError> {
        let origin = self.point(endpoint);
        let direction = self.point(toward) - origin;

        for triangle_index in self.get_triangles_with_vertex(endpoint) {
            let info = &self.triangle_infos[triangle_index];
            let Some(slot) = info.vertex_slot(endpoint) else {
                continue;
            };
            let to_next = self.points[info.vertex_indices[(slot + 1) % 3]] - origin;
            let to_previous = self.points[info.vertex_indices[(slot + 2) % 3]] - origin;

            // Inside the CCW sector swept from the outgoing edge to the
            // incoming one
            if to_next.perp_dot(direction) >= 0.0 && direction.perp_dot(to_previous) >= 0.0 {
                return Ok(triangle_index);
            }
        }

        Err(TriangulationError::NoTriangleFacesPoint(endpoint, toward))
    }

    /// Collects, in crossing order, every triangle edge strictly crossed by
    /// the segment from point `endpoint_a` to point `endpoint_b`.
    ///
    /// `start_triangle` must contain `endpoint_a` and face `endpoint_b`. The
    /// walk crosses one edge per step, never back across the edge it came
    /// through, and stops at the first triangle referencing `endpoint_b`.
    /// Edges incident to either endpoint are never strictly crossed, so
    /// passing along an already-shared vertex reports no intersection.
    pub fn get_intersecting_edges(
        &self,
        endpoint_a: usize,
        endpoint_b: usize,
        start_triangle: usize,
    ) -> Result<VecDeque<Edge>, TriangulationError> {
        let segment_start = self.point(endpoint_a);
        let segment_end = self.point(endpoint_b);
        let mut intersected_edges = VecDeque::new();
        let mut triangle_index = start_triangle;
        let mut previous_triangle: Option<usize> = None;

        for _ in 0..=self.triangle_count() {
            let info = &self.triangle_infos[triangle_index];
            if info.vertex_slot(endpoint_b).is_some() {
                return Ok(intersected_edges);
            }

            let mut crossed_edge = None;
            for edge_index in 0..3 {
                if previous_triangle.is_some()
                    && info.adjacent_triangle_indices[edge_index] == previous_triangle
                {
                    continue;
                }
                let edge_start = self.points[info.vertex_indices[edge_index]];
                let edge_end = self.points[info.vertex_indices[(edge_index + 1) % 3]];
                if math_utils::segments_intersect(segment_start, segment_end, edge_start, edge_end)
                    .is_some()
                {
                    crossed_edge = Some(edge_index);
                    break;
                }
            }

            let Some(edge_index) = crossed_edge else {
                return Err(TriangulationError::EdgeWalkStalled(endpoint_a, endpoint_b));
            };

            intersected_edges.push_back(Edge::new(
                info.vertex_indices[edge_index],
                info.vertex_indices[(edge_index + 1) % 3],
            ));

            let Some(next_triangle) = info.adjacent_triangle_indices[edge_index] else {
                return Err(TriangulationError::EdgeWalkStalled(endpoint_a, endpoint_b));
            };
            previous_triangle = Some(triangle_index);
            triangle_index = next_triangle;
        }

        Err(TriangulationError::EdgeWalkStalled(endpoint_a, endpoint_b))
    }

    /// Collects every triangle strictly inside the counter-clockwise polygon
    /// described by `polygon_indices`, appending to `output_triangles`.
    ///
    /// Every polygon edge must already exist in the triangulation. The fill
    /// starts at the triangle traversing the first polygon edge in polygon
    /// order (the interior side of a CCW loop) and floods across adjacencies
    /// without ever crossing a polygon edge.
    pub fn get_triangles_in_polygon(
        &self,
        polygon_indices: &[usize],
        output_triangles: &mut Vec<usize>,
    ) -> Result<(), TriangulationError> {
        let mut boundary = HashSet::new();
        for position in 0..polygon_indices.len() {
            let a = polygon_indices[position];
            let b = polygon_indices[(position + 1) % polygon_indices.len()];
            boundary.insert((a.min(b), a.max(b)));
        }

        let seed = self
            .find_triangle_that_contains_edge(polygon_indices[0], polygon_indices[1])
            .ok_or(TriangulationError::PolygonNotClosed)?;

        let mut seen = HashSet::new();
        let mut pending = vec![seed.triangle_index];

        while let Some(triangle_index) = pending.pop() {
            if !seen.insert(triangle_index) {
                continue;
            }
            output_triangles.push(triangle_index);

            let info = &self.triangle_infos[triangle_index];
            for edge_index in 0..3 {
                let a = info.vertex_indices[edge_index];
                let b = info.vertex_indices[(edge_index + 1) % 3];
                if boundary.contains(&(a.min(b), a.max(b))) {
                    continue;
                }
                match info.adjacent_triangle_indices[edge_index] {
                    Some(neighbor) => {
                        if !seen.contains(&neighbor) {
                            pending.push(neighbor);
                        }
                    }
                    // Inside a hole every triangle is interior; hitting the
                    // outside means the boundary leaked.
                    None => return Err(TriangulationError::PolygonNotClosed),
                }
            }
        }

        Ok(())
    }

    pub fn get_triangles_with_vertex(&self, vertex: usize) -> Vec<usize> {
        let mut output_triangles = Vec::new();
        for (triangle_index, info) in self.triangle_infos.iter().enumerate() {
            if info.vertex_slot(vertex).is_some() {
                output_triangles.push(triangle_index);
            }
        }
        output_triangles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two CCW triangles sharing the diagonal (1, 3) of the unit square:
    /// 0 = (v0, v1, v3), 1 = (v1, v2, v3).
    fn square_pair() -> TriangleSet {
        let mut set = TriangleSet::new(4);
        set.add_point(Vec2::new(0.0, 0.0));
        set.add_point(Vec2::new(1.0, 0.0));
        set.add_point(Vec2::new(1.0, 1.0));
        set.add_point(Vec2::new(0.0, 1.0));
        set.add_triangle_info(
            TriangleInfo::new([0, 1, 3]).with_adjacent(None, Some(1), None),
        );
        set.add_triangle_info(
            TriangleInfo::new([1, 2, 3]).with_adjacent(None, None, Some(0)),
        );
        set
    }

    #[test]
    fn add_point_deduplicates() {
        let mut set = TriangleSet::new(4);
        assert_eq!(set.add_point(Vec2::new(0.5, 0.5)), FoundOrAdded::Added(0));
        assert_eq!(set.add_point(Vec2::new(0.25, 0.5)), FoundOrAdded::Added(1));
        assert_eq!(set.add_point(Vec2::new(0.5, 0.5)), FoundOrAdded::Found(0));
        assert_eq!(set.point_count(), 2);
    }

    #[test]
    fn edge_lookup_is_directional() {
        let set = square_pair();
        let found = set.find_triangle_that_contains_edge(1, 3).unwrap();
        assert_eq!(found.triangle_index, 0);
        assert_eq!(found.edge_index, 1);
        assert!(found.edge().connects_same_points(&Edge::new(3, 1)));
        let twin = set.find_triangle_that_contains_edge(3, 1).unwrap();
        assert_eq!(twin.triangle_index, 1);
        assert_eq!(twin.edge_index, 2);
        assert!(set.find_triangle_that_contains_edge(0, 2).is_none());
    }

    #[test]
    fn point_location_walks_across_the_shared_edge() {
        let set = square_pair();
        // Start in triangle 0, search for a point in triangle 1
        let found = set
            .find_triangle_that_contains_point(Vec2::new(0.9, 0.5), 0)
            .unwrap();
        assert_eq!(found, 1);
        let stayed = set
            .find_triangle_that_contains_point(Vec2::new(0.1, 0.5), 0)
            .unwrap();
        assert_eq!(stayed, 0);
    }

    #[test]
    fn walking_outside_the_triangulation_fails() {
        let set = square_pair();
        let result = set.find_triangle_that_contains_point(Vec2::new(-1.0, -1.0), 1);
        assert_eq!(
            result,
            Err(TriangulationError::WalkedOutOfTriangulation(-1.0, -1.0))
        );
    }

    #[test]
    fn sector_lookup_picks_the_facing_triangle() {
        let set = square_pair();
        // From corner 0, the ray toward corner 2 runs between the edges of
        // triangle 0 (the only triangle at corner 0).
        assert_eq!(
            set.find_triangle_that_contains_line_endpoint(0, 2).unwrap(),
            0
        );
        // From corner 2 back toward corner 0, triangle 1 faces the ray.
        assert_eq!(
            set.find_triangle_that_contains_line_endpoint(2, 0).unwrap(),
            1
        );
    }

    #[test]
    fn intersecting_edge_walk_reports_the_crossed_diagonal() {
        let set = square_pair();
        let start = set.find_triangle_that_contains_line_endpoint(0, 2).unwrap();
        let edges = set.get_intersecting_edges(0, 2, start).unwrap();
        assert_eq!(edges.len(), 1);
        assert!(edges[0].connects_same_points(&Edge::new(1, 3)));
    }

    #[test]
    fn triangles_with_vertex_scans_every_triangle() {
        let set = square_pair();
        assert_eq!(set.get_triangles_with_vertex(1), vec![0, 1]);
        assert_eq!(set.get_triangles_with_vertex(2), vec![1]);
    }
}
