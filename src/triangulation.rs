//! The triangulation pipeline and the incremental insertion engine.

use std::collections::HashSet;

use glam::Vec2;
use log::debug;

use crate::{
    data_structures::{
        error::TriangulationError, found_or_added::FoundOrAdded, point_bin_grid::PointBinGrid,
        triangle::Triangle, triangle_info::TriangleInfo, triangle_set::TriangleSet,
    },
    hole_creation,
    math_utils,
    normalize::Bounds,
};

/// A triangle whose shared edge with a neighbor is pending a Delaunay check.
struct TriangleIndexPair {
    current: usize,
    adjacent: usize,
}

/// Triangulates a point cloud, optionally carving out hole polygons and
/// refining oversized triangles. See the crate-level documentation for the
/// input contract.
pub fn triangulate(
    input_points: &[Vec2],
    holes: Option<&[Vec<Vec2>]>,
    max_triangle_area: Option<f32>,
) -> Result<Vec<Triangle>, TriangulationError> {
    if input_points.len() < 3 {
        return Err(TriangulationError::TooFewPoints(input_points.len()));
    }

    let bounds = Bounds::of_points(input_points);
    if bounds.max_dimension() <= 0.0 {
        return Err(TriangulationError::DegenerateInput);
    }
    if let Some(holes) = holes {
        validate_holes(holes, &bounds)?;
    }

    let normalized_points = bounds.normalize(input_points);
    debug!(
        "triangulating {} points, {} holes",
        input_points.len(),
        holes.map_or(0, |hole_list| hole_list.len())
    );

    // Sorting the insertions through the grid keeps consecutive points
    // spatially close, so the location walk from the last added triangle
    // stays short.
    let cells_per_side = (input_points.len() as f32).powf(0.25).ceil() as usize;
    let mut grid = PointBinGrid::new(cells_per_side);
    for point in &normalized_points {
        grid.add_point(*point);
    }

    let mut triangle_set = TriangleSet::new(input_points.len());

    // The supertriangle encloses the unit square by a wide margin; its
    // vertices take point indices 0, 1 and 2.
    let v0 = triangle_set.add_point(Vec2::new(-100.0, -100.0)).index();
    let v1 = triangle_set.add_point(Vec2::new(100.0, -100.0)).index();
    let v2 = triangle_set.add_point(Vec2::new(0.0, 100.0)).index();
    triangle_set.add_triangle_info(TriangleInfo::new([v0, v1, v2]));

    for cell in grid.cells() {
        for point in cell {
            triangulate_point(&mut triangle_set, *point)?;
        }
    }

    if let Some(max_triangle_area) = max_triangle_area {
        // The caller's threshold is in input units; the set stores
        // normalized coordinates.
        let scale = bounds.max_dimension();
        tesselate(&mut triangle_set, max_triangle_area / (scale * scale))?;
    }

    let mut triangles_to_remove = match holes {
        Some(holes) => hole_creation::create_holes(&mut triangle_set, holes, &bounds)?,
        None => Vec::new(),
    };
    hole_creation::collect_supertriangle_triangles(&triangle_set, &mut triangles_to_remove);

    let removed: HashSet<usize> = triangles_to_remove.into_iter().collect();
    let mut output_triangles =
        Vec::with_capacity(triangle_set.triangle_count().saturating_sub(removed.len()));
    for triangle_index in 0..triangle_set.triangle_count() {
        if removed.contains(&triangle_index) {
            continue;
        }
        let [p0, p1, p2] = triangle_set.triangle_points(triangle_index);
        output_triangles.push(Triangle::new(
            bounds.denormalize(p0),
            bounds.denormalize(p1),
            bounds.denormalize(p2),
        ));
    }

    debug!("emitting {} triangles", output_triangles.len());
    Ok(output_triangles)
}

/// Rejects hole polygons the engine cannot carve: clockwise winding,
/// self-intersection, and vertices outside the input bounding box.
fn validate_holes(holes: &[Vec<Vec2>], bounds: &Bounds) -> Result<(), TriangulationError> {
    for (hole_number, hole) in holes.iter().enumerate() {
        for vertex in hole {
            if !bounds.contains(*vertex) {
                return Err(TriangulationError::HoleOutsideBounds(hole_number));
            }
        }

        let mut doubled_signed_area = 0.0;
        for position in 0..hole.len() {
            let a = hole[position];
            let b = hole[(position + 1) % hole.len()];
            doubled_signed_area += a.x * b.y - b.x * a.y;
        }
        if doubled_signed_area < 0.0 {
            return Err(TriangulationError::ClockwiseHole(hole_number));
        }

        // Non-neighboring edge pairs must not cross. Neighbors share a
        // vertex, which the strict intersection test already ignores.
        for first in 0..hole.len() {
            for second in first + 1..hole.len() {
                let a1 = hole[first];
                let b1 = hole[(first + 1) % hole.len()];
                let a2 = hole[second];
                let b2 = hole[(second + 1) % hole.len()];
                if math_utils::segments_intersect(a1, b1, a2, b2).is_some() {
                    return Err(TriangulationError::SelfIntersectingHole(hole_number));
                }
            }
        }
    }
    Ok(())
}

/// Inserts one normalized point: locates the containing triangle, splits it
/// in three around the point, then restores the Delaunay property by edge
/// flipping. Inserting a coincident point is a no-op returning the existing
/// index.
///
/// Every child of the split stores the inserted point at vertex 0, so right
/// after the split the edge opposite the new point is always edge 1.
pub(crate) fn triangulate_point(
    triangle_set: &mut TriangleSet,
    point_to_insert: Vec2,
) -> Result<FoundOrAdded, TriangulationError> {
    let inserted_point_index = match triangle_set.add_point(point_to_insert) {
        FoundOrAdded::Found(index) => return Ok(FoundOrAdded::Found(index)),
        FoundOrAdded::Added(index) => index,
    };

    let containing_triangle_index = triangle_set
        .find_triangle_that_contains_point(point_to_insert, triangle_set.triangle_count() - 1)?;
    let containing_triangle = triangle_set.triangle_info(containing_triangle_index);
    {
        let [a, b, c] = triangle_set.triangle_points(containing_triangle_index);
        debug_assert!(math_utils::is_point_inside_triangle(a, b, c, point_to_insert));
    }

    let first_triangle_index = triangle_set.triangle_count();
    let second_triangle_index = first_triangle_index + 1;

    let first_triangle = TriangleInfo::new([
        inserted_point_index,
        containing_triangle.vertex_indices[0],
        containing_triangle.vertex_indices[1],
    ])
    .with_adjacent(
        Some(second_triangle_index),
        containing_triangle.adjacent_triangle_indices[0],
        Some(containing_triangle_index),
    );

    let second_triangle = TriangleInfo::new([
        inserted_point_index,
        containing_triangle.vertex_indices[2],
        containing_triangle.vertex_indices[0],
    ])
    .with_adjacent(
        Some(containing_triangle_index),
        containing_triangle.adjacent_triangle_indices[2],
        Some(first_triangle_index),
    );

    triangle_set.add_triangle_info(first_triangle);
    triangle_set.add_triangle_info(second_triangle);

    // The two outer neighbors that now border the new children
    if let Some(neighbor) = containing_triangle.adjacent_triangle_indices[0] {
        triangle_set.replace_adjacent(
            neighbor,
            Some(containing_triangle_index),
            Some(first_triangle_index),
        );
    }
    if let Some(neighbor) = containing_triangle.adjacent_triangle_indices[2] {
        triangle_set.replace_adjacent(
            neighbor,
            Some(containing_triangle_index),
            Some(second_triangle_index),
        );
    }

    // The containing triangle is transformed in place into the third child,
    // so nothing is ever deleted.
    let third_triangle = TriangleInfo::new([
        inserted_point_index,
        containing_triangle.vertex_indices[1],
        containing_triangle.vertex_indices[2],
    ])
    .with_adjacent(
        Some(first_triangle_index),
        containing_triangle.adjacent_triangle_indices[1],
        Some(second_triangle_index),
    );
    triangle_set.replace_triangle(containing_triangle_index, &third_triangle);

    let mut pending_pairs = Vec::new();
    for (current, opposite) in [
        (
            containing_triangle_index,
            containing_triangle.adjacent_triangle_indices[1],
        ),
        (
            first_triangle_index,
            containing_triangle.adjacent_triangle_indices[0],
        ),
        (
            second_triangle_index,
            containing_triangle.adjacent_triangle_indices[2],
        ),
    ] {
        if let Some(adjacent) = opposite {
            pending_pairs.push(TriangleIndexPair { current, adjacent });
        }
    }

    fulfill_delaunay_constraint(triangle_set, pending_pairs)?;

    Ok(FoundOrAdded::Added(inserted_point_index))
}

/// Drains the pair stack, flipping every shared edge whose opposing vertex
/// violates the empty-circumcircle property and re-queuing the edges exposed
/// by each flip.
fn fulfill_delaunay_constraint(
    triangle_set: &mut TriangleSet,
    mut pending_pairs: Vec<TriangleIndexPair>,
) -> Result<(), TriangulationError> {
    // The flip sequence terminates because every swap increases the minimum
    // angle of the quadrilateral; the budget only catches float-noise cycles.
    let mut remaining_flips = 16 * triangle_set.triangle_count() + 64;

    while let Some(pair) = pending_pairs.pop() {
        let current = triangle_set.triangle_info(pair.current);
        let Some(shared_edge) = current.adjacent_slot(pair.adjacent) else {
            // A later flip already rewired this pair away
            continue;
        };

        let not_in_edge = (shared_edge + 2) % 3;
        let vertex_point = triangle_set.point(current.vertex_indices[not_in_edge]);
        let [a, b, c] = triangle_set.triangle_points(pair.adjacent);
        if !math_utils::is_point_inside_circumcircle(a, b, c, vertex_point) {
            continue;
        }

        if remaining_flips == 0 {
            return Err(TriangulationError::FlipLoopDetected);
        }
        remaining_flips -= 1;

        let opposite = triangle_set.triangle_info(pair.adjacent);
        let Some(opposite_start) = opposite.adjacent_slot(pair.current) else {
            return Err(TriangulationError::AdjacencyBroken(
                pair.current,
                pair.adjacent,
            ));
        };

        // The neighbors across the far edges of the opposite triangle end up
        // opposite the troubling vertex after the swap; recheck them.
        let kept_by_opposite = opposite.adjacent_triangle_indices[(opposite_start + 1) % 3];
        let taken_by_current = opposite.adjacent_triangle_indices[(opposite_start + 2) % 3];

        swap_edges(
            triangle_set,
            pair.current,
            not_in_edge,
            pair.adjacent,
            opposite_start,
        );

        if let Some(adjacent) = taken_by_current {
            pending_pairs.push(TriangleIndexPair {
                current: pair.current,
                adjacent,
            });
        }
        if let Some(adjacent) = kept_by_opposite {
            pending_pairs.push(TriangleIndexPair {
                current: pair.adjacent,
                adjacent,
            });
        }
    }

    Ok(())
}

/// Replaces the diagonal shared by two triangles with the other diagonal of
/// their combined quadrilateral, which must be convex.
///
/// `main_vertex` is the slot in `main_index` of the vertex not on the shared
/// edge; `opposite_start` is the slot in `opposite_index` where the shared
/// edge begins as the opposite triangle traverses it. Both triangles stay
/// counter-clockwise, and the two edges that change owner get their outside
/// neighbors re-pointed.
pub(crate) fn swap_edges(
    triangle_set: &mut TriangleSet,
    main_index: usize,
    main_vertex: usize,
    opposite_index: usize,
    opposite_start: usize,
) {
    let main = triangle_set.triangle_info(main_index);
    let opposite = triangle_set.triangle_info(opposite_index);
    let opposite_vertex = (opposite_start + 2) % 3;

    let mut new_main = main;
    new_main.vertex_indices[(main_vertex + 1) % 3] =
        opposite.vertex_indices[opposite_vertex];
    new_main.adjacent_triangle_indices[main_vertex] = Some(opposite_index);
    new_main.adjacent_triangle_indices[(main_vertex + 1) % 3] =
        opposite.adjacent_triangle_indices[opposite_vertex];

    let mut new_opposite = opposite;
    new_opposite.vertex_indices[opposite_start] = main.vertex_indices[main_vertex];
    new_opposite.adjacent_triangle_indices[opposite_start] =
        main.adjacent_triangle_indices[main_vertex];
    new_opposite.adjacent_triangle_indices[opposite_vertex] = Some(main_index);

    triangle_set.replace_triangle(main_index, &new_main);
    triangle_set.replace_triangle(opposite_index, &new_opposite);

    // Two edges changed owner; their outside neighbors follow.
    if let Some(neighbor) = main.adjacent_triangle_indices[main_vertex] {
        triangle_set.replace_adjacent(neighbor, Some(main_index), Some(opposite_index));
    }
    if let Some(neighbor) = opposite.adjacent_triangle_indices[opposite_vertex] {
        triangle_set.replace_adjacent(neighbor, Some(opposite_index), Some(main_index));
    }
}

/// Splits every triangle whose area exceeds `max_area` (in normalized
/// units) by inserting its three edge midpoints, repeating until all
/// triangles fit. Triangles sharing a supertriangle vertex are left alone.
fn tesselate(
    triangle_set: &mut TriangleSet,
    max_area: f32,
) -> Result<(), TriangulationError> {
    // Each split quarters the offending triangle, so the pass count stays
    // small for any sane threshold.
    const MAX_PASSES: usize = 64;

    for _ in 0..MAX_PASSES {
        let mut any_split = false;
        let mut triangle_index = 0;

        while triangle_index < triangle_set.triangle_count() {
            let info = triangle_set.triangle_info(triangle_index);
            // 0, 1 and 2 are the supertriangle vertices
            if info.vertex_indices.iter().any(|&vertex| vertex < 3) {
                triangle_index += 1;
                continue;
            }

            let [p0, p1, p2] = triangle_set.triangle_points(triangle_index);
            if math_utils::calculate_triangle_area(p0, p1, p2) > max_area {
                triangulate_point(triangle_set, (p0 + p1) * 0.5)?;
                triangulate_point(triangle_set, (p1 + p2) * 0.5)?;
                triangulate_point(triangle_set, (p2 + p0) * 0.5)?;
                any_split = true;
            }
            triangle_index += 1;
        }

        if !any_split {
            return Ok(());
        }
    }

    Err(TriangulationError::RefinementFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::cross;

    /// Checks the structural invariants: CCW vertices, distinct vertex
    /// indices, and symmetric adjacency with the shared edge reversed.
    fn assert_topology(triangle_set: &TriangleSet) {
        for triangle_index in 0..triangle_set.triangle_count() {
            let info = triangle_set.triangle_info(triangle_index);
            let [p0, p1, p2] = triangle_set.triangle_points(triangle_index);
            assert!(
                cross(p0, p1, p2) > 0.0,
                "triangle {triangle_index} is not CCW"
            );
            assert_ne!(info.vertex_indices[0], info.vertex_indices[1]);
            assert_ne!(info.vertex_indices[1], info.vertex_indices[2]);
            assert_ne!(info.vertex_indices[2], info.vertex_indices[0]);

            for edge_index in 0..3 {
                let Some(neighbor) = info.adjacent_triangle_indices[edge_index] else {
                    continue;
                };
                let neighbor_info = triangle_set.triangle_info(neighbor);
                let back = neighbor_info
                    .adjacent_slot(triangle_index)
                    .unwrap_or_else(|| {
                        panic!("triangle {neighbor} does not point back at {triangle_index}")
                    });
                // The twin traverses the shared edge in reverse
                assert_eq!(
                    info.vertex_indices[edge_index],
                    neighbor_info.vertex_indices[(back + 1) % 3]
                );
                assert_eq!(
                    info.vertex_indices[(edge_index + 1) % 3],
                    neighbor_info.vertex_indices[back]
                );
            }
        }
    }

    fn seeded_set() -> TriangleSet {
        let mut triangle_set = TriangleSet::new(16);
        let v0 = triangle_set.add_point(Vec2::new(-100.0, -100.0)).index();
        let v1 = triangle_set.add_point(Vec2::new(100.0, -100.0)).index();
        let v2 = triangle_set.add_point(Vec2::new(0.0, 100.0)).index();
        triangle_set.add_triangle_info(TriangleInfo::new([v0, v1, v2]));
        triangle_set
    }

    #[test]
    fn splitting_keeps_the_topology_consistent() {
        let mut triangle_set = seeded_set();
        triangulate_point(&mut triangle_set, Vec2::new(0.5, 0.5)).unwrap();
        assert_eq!(triangle_set.triangle_count(), 3);
        assert_topology(&triangle_set);

        triangulate_point(&mut triangle_set, Vec2::new(0.25, 0.25)).unwrap();
        assert_eq!(triangle_set.triangle_count(), 5);
        assert_topology(&triangle_set);
    }

    #[test]
    fn inserting_many_points_keeps_the_topology_consistent() {
        let mut triangle_set = seeded_set();
        for x in 0..5 {
            for y in 0..5 {
                triangulate_point(
                    &mut triangle_set,
                    Vec2::new(x as f32 / 4.0, y as f32 / 4.0),
                )
                .unwrap();
            }
        }
        assert_topology(&triangle_set);
        // 25 points inside one enclosing triangle produce 2 * 25 + 1 pieces
        assert_eq!(triangle_set.triangle_count(), 51);
    }

    #[test]
    fn reinserting_a_point_is_idempotent() {
        let mut triangle_set = seeded_set();
        let first = triangulate_point(&mut triangle_set, Vec2::new(0.5, 0.5)).unwrap();
        let count = triangle_set.triangle_count();
        let second = triangulate_point(&mut triangle_set, Vec2::new(0.5, 0.5)).unwrap();
        assert_eq!(second, FoundOrAdded::Found(first.index()));
        assert_eq!(triangle_set.triangle_count(), count);
    }

    #[test]
    fn flipping_restores_the_delaunay_property() {
        let mut triangle_set = seeded_set();
        // A flat pair that forces a flip when the far point arrives
        triangulate_point(&mut triangle_set, Vec2::new(0.0, 0.0)).unwrap();
        triangulate_point(&mut triangle_set, Vec2::new(1.0, 0.0)).unwrap();
        triangulate_point(&mut triangle_set, Vec2::new(0.5, 0.1)).unwrap();
        triangulate_point(&mut triangle_set, Vec2::new(0.5, -0.1)).unwrap();
        assert_topology(&triangle_set);

        // No interior vertex may sit strictly inside a neighbor's
        // circumcircle.
        for triangle_index in 0..triangle_set.triangle_count() {
            let info = triangle_set.triangle_info(triangle_index);
            let [a, b, c] = triangle_set.triangle_points(triangle_index);
            for edge_index in 0..3 {
                let Some(neighbor) = info.adjacent_triangle_indices[edge_index] else {
                    continue;
                };
                let neighbor_info = triangle_set.triangle_info(neighbor);
                let Some(back) = neighbor_info.adjacent_slot(triangle_index) else {
                    panic!("asymmetric adjacency");
                };
                let far_vertex =
                    triangle_set.point(neighbor_info.vertex_indices[(back + 2) % 3]);
                assert!(
                    !math_utils::is_point_inside_circumcircle(a, b, c, far_vertex),
                    "edge between {triangle_index} and {neighbor} is not Delaunay"
                );
            }
        }
    }
}
