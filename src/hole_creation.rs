//! Hole carving: forcing polygon edges into the triangulation and
//! collecting the triangles that must not reach the output.

use glam::Vec2;
use log::warn;

use crate::{
    data_structures::{
        edge::Edge, error::TriangulationError, triangle_set::TriangleSet,
    },
    math_utils,
    normalize::Bounds,
    triangulation::{swap_edges, triangulate_point},
};

/// Carves every hole polygon into the triangulation: inserts the polygon
/// vertices, forces the polygon edges, then flood-fills each interior.
/// Returns the indices of the triangles inside the holes.
///
/// Hole vertices are normalized against the bounds of the input cloud so
/// they land in the same space as the already-inserted points.
pub(crate) fn create_holes(
    triangle_set: &mut TriangleSet,
    holes: &[Vec<Vec2>],
    bounds: &Bounds,
) -> Result<Vec<usize>, TriangulationError> {
    let mut hole_indices = Vec::with_capacity(holes.len());

    for (hole_number, hole) in holes.iter().enumerate() {
        let normalized_hole = bounds.normalize(hole);

        let mut polygon_indices: Vec<usize> = Vec::with_capacity(hole.len());
        for point_to_insert in normalized_hole {
            let point_index = triangulate_point(triangle_set, point_to_insert)?.index();
            // Consecutive coincident vertices collapse onto one index
            if polygon_indices.last() == Some(&point_index) {
                warn!("hole {hole_number}: skipping zero-length edge at point {point_index}");
                continue;
            }
            polygon_indices.push(point_index);
        }
        // The closing edge may be zero-length too when the caller repeats
        // the first vertex at the end of the loop.
        if polygon_indices.len() > 1 && polygon_indices.first() == polygon_indices.last() {
            warn!("hole {hole_number}: dropping repeated closing vertex");
            polygon_indices.pop();
        }

        if polygon_indices.len() < 3 {
            warn!("hole {hole_number}: fewer than 3 distinct vertices, ignoring it");
            continue;
        }
        hole_indices.push(polygon_indices);
    }

    let mut boundary_loops = Vec::with_capacity(hole_indices.len());
    for polygon_indices in &hole_indices {
        let boundary_loop = split_edges_at_collinear_points(triangle_set, polygon_indices);
        for position in 0..boundary_loop.len() {
            add_constrained_edge_to_triangulation(
                triangle_set,
                boundary_loop[position],
                boundary_loop[(position + 1) % boundary_loop.len()],
            )?;
        }
        boundary_loops.push(boundary_loop);
    }

    let mut triangles_to_remove = Vec::new();
    for boundary_loop in &boundary_loops {
        triangle_set.get_triangles_in_polygon(boundary_loop, &mut triangles_to_remove)?;
    }

    Ok(triangles_to_remove)
}

/// Triangulation vertices that lie exactly on a polygon edge (a dense
/// sampling of the hole boundary, say) subdivide that edge: the constraint
/// is forced through them piece by piece, since an edge spanning across
/// another vertex cannot exist in a planar triangulation.
fn split_edges_at_collinear_points(
    triangle_set: &TriangleSet,
    polygon_indices: &[usize],
) -> Vec<usize> {
    let mut expanded_loop = Vec::with_capacity(polygon_indices.len());

    for position in 0..polygon_indices.len() {
        let a = polygon_indices[position];
        let b = polygon_indices[(position + 1) % polygon_indices.len()];
        let start = triangle_set.point(a);
        let direction = triangle_set.point(b) - start;
        let length_squared = direction.length_squared();

        expanded_loop.push(a);

        let mut on_edge: Vec<(f32, usize)> = Vec::new();
        for point_index in 0..triangle_set.point_count() {
            if point_index == a || point_index == b {
                continue;
            }
            let offset = triangle_set.point(point_index) - start;
            if direction.perp_dot(offset).abs() > math_utils::EDGE_TOLERANCE {
                continue;
            }
            let along = offset.dot(direction) / length_squared;
            if along > 0.0 && along < 1.0 {
                on_edge.push((along, point_index));
            }
        }
        on_edge.sort_by(|left, right| left.0.total_cmp(&right.0));
        expanded_loop.extend(on_edge.into_iter().map(|(_, point_index)| point_index));
    }

    expanded_loop
}

/// Forces the edge between two existing points into the triangulation.
///
/// Every triangle edge strictly crossed by the segment is swapped to the
/// other diagonal of its quadrilateral; non-convex quadrilaterals wait at
/// the far end of the queue until a neighboring swap unblocks them. The
/// edges created by the swaps, except the constrained edge itself, get a
/// final Delaunay pass.
fn add_constrained_edge_to_triangulation(
    triangle_set: &mut TriangleSet,
    endpoint_a: usize,
    endpoint_b: usize,
) -> Result<(), TriangulationError> {
    // Already an edge of some triangle, nothing to force
    if triangle_set
        .find_triangle_that_contains_edge(endpoint_a, endpoint_b)
        .is_some()
    {
        return Ok(());
    }

    let start_triangle =
        triangle_set.find_triangle_that_contains_line_endpoint(endpoint_a, endpoint_b)?;
    let mut intersected_edges =
        triangle_set.get_intersecting_edges(endpoint_a, endpoint_b, start_triangle)?;

    let segment_start = triangle_set.point(endpoint_a);
    let segment_end = triangle_set.point(endpoint_b);
    let mut new_edges: Vec<Edge> = Vec::new();

    // Every pop either swaps or waits for another swap to unblock it; on a
    // simple polygon that converges. The budget turns contract-violating
    // input into an error instead of a hang.
    let queue_budget = 16 * (intersected_edges.len() + 8) * (intersected_edges.len() + 8);
    let mut steps = 0;

    while let Some(intersected_edge) = intersected_edges.pop_back() {
        steps += 1;
        if steps > queue_budget {
            return Err(TriangulationError::ConstrainedEdgeLoop(
                endpoint_a, endpoint_b,
            ));
        }

        let Some(edge_info) = triangle_set
            .find_triangle_that_contains_edge(intersected_edge.a, intersected_edge.b)
        else {
            // A previous swap removed this edge entirely
            continue;
        };

        let triangle_index = edge_info.triangle_index;
        let edge_index = edge_info.edge_index;
        let info = triangle_set.triangle_info(triangle_index);

        let Some(opposite_index) = info.adjacent_triangle_indices[edge_index] else {
            return Err(TriangulationError::MissingNeighbor(triangle_index));
        };
        let opposite = triangle_set.triangle_info(opposite_index);
        let Some(opposite_start) = opposite.adjacent_slot(triangle_index) else {
            return Err(TriangulationError::AdjacencyBroken(
                triangle_index,
                opposite_index,
            ));
        };
        let opposite_vertex = opposite.vertex_indices[(opposite_start + 2) % 3];

        let not_in_edge = (edge_index + 2) % 3;
        // The quadrilateral around the crossed edge, in CCW perimeter order
        let quad_a = triangle_set.point(info.vertex_indices[not_in_edge]);
        let quad_b = triangle_set.point(info.vertex_indices[edge_index]);
        let quad_c = triangle_set.point(opposite_vertex);
        let quad_d = triangle_set.point(info.vertex_indices[(edge_index + 1) % 3]);

        if !math_utils::is_quadrilateral_convex(quad_a, quad_b, quad_c, quad_d) {
            // Swapping now would create overlapping triangles; another swap
            // frees it first.
            intersected_edges.push_front(edge_info.edge());
            continue;
        }

        swap_edges(
            triangle_set,
            triangle_index,
            not_in_edge,
            opposite_index,
            opposite_start,
        );

        // The new diagonal sits at the not-in-edge slot of the main triangle
        let swapped = triangle_set.triangle_info(triangle_index);
        let new_edge = Edge::new(
            swapped.vertex_indices[not_in_edge],
            swapped.vertex_indices[(not_in_edge + 1) % 3],
        );

        let diagonal_start = triangle_set.point(new_edge.a);
        let diagonal_end = triangle_set.point(new_edge.b);
        if math_utils::segments_intersect(segment_start, segment_end, diagonal_start, diagonal_end)
            .is_some()
        {
            // Still in the way of the constrained edge
            intersected_edges.push_front(new_edge);
        } else {
            new_edges.push(new_edge);
        }
    }

    // Restore the Delaunay property around the edges the swaps created; the
    // constrained edge itself is exempt from flipping.
    let constrained_edge = Edge::new(endpoint_a, endpoint_b);
    for new_edge in new_edges {
        if new_edge.connects_same_points(&constrained_edge) {
            continue;
        }
        let Some(edge_info) =
            triangle_set.find_triangle_that_contains_edge(new_edge.a, new_edge.b)
        else {
            // Flipped away while restoring an earlier edge
            continue;
        };

        let info = triangle_set.triangle_info(edge_info.triangle_index);
        let Some(opposite_index) = info.adjacent_triangle_indices[edge_info.edge_index] else {
            return Err(TriangulationError::MissingNeighbor(edge_info.triangle_index));
        };

        let not_in_edge = (edge_info.edge_index + 2) % 3;
        let vertex_point = triangle_set.point(info.vertex_indices[not_in_edge]);
        let [a, b, c] = triangle_set.triangle_points(opposite_index);

        if math_utils::is_point_inside_circumcircle(a, b, c, vertex_point) {
            let opposite = triangle_set.triangle_info(opposite_index);
            let Some(opposite_start) = opposite.adjacent_slot(edge_info.triangle_index) else {
                return Err(TriangulationError::AdjacencyBroken(
                    edge_info.triangle_index,
                    opposite_index,
                ));
            };
            swap_edges(
                triangle_set,
                edge_info.triangle_index,
                not_in_edge,
                opposite_index,
                opposite_start,
            );
        }
    }

    Ok(())
}

/// Adds every triangle referencing a supertriangle vertex to
/// `triangles_to_remove`. The supertriangle was seeded first, so its
/// vertices are the point indices 0, 1 and 2.
pub(crate) fn collect_supertriangle_triangles(
    triangle_set: &TriangleSet,
    triangles_to_remove: &mut Vec<usize>,
) {
    for supertriangle_vertex in 0..3 {
        for triangle_index in triangle_set.get_triangles_with_vertex(supertriangle_vertex) {
            if !triangles_to_remove.contains(&triangle_index) {
                triangles_to_remove.push(triangle_index);
            }
        }
    }
}
