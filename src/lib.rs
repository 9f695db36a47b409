//! Constrained Delaunay triangulation of 2D point clouds.
//!
//! Points are inserted incrementally into a supertriangle, with the Delaunay
//! property restored by edge flipping after every insertion. Hole polygons
//! are carved out afterwards by forcing their edges into the mesh and
//! removing the triangles inside; the supertriangle and everything attached
//! to it is stripped before the result is returned.

pub use data_structures::{error::TriangulationError, triangle::Triangle};
pub use glam::Vec2;

mod data_structures;
mod hole_creation;
mod math_utils;
mod normalize;
mod triangulation;

/// Triangulates a point cloud, optionally subtracting hole polygons.
///
/// `input_points` needs at least 3 points that are not all collinear for a
/// meaningful result. Each hole is a simple, counter-clockwise polygon whose
/// closing edge is implicit and whose vertices must lie inside the bounding
/// box of the input points; hole vertices become triangulation vertices and
/// the triangles inside each hole are dropped from the output. With
/// `max_triangle_area` set (in input units), triangles larger than the
/// threshold are refined by edge-midpoint insertion before the holes are
/// carved.
///
/// The returned triangles have their vertices in counter-clockwise order,
/// in the same coordinate space as the input.
///
/// # Examples
///
/// ```
/// use cdt2d::{triangulate, Vec2};
///
/// let points = vec![
///     Vec2::new(0.0, 7.0),
///     Vec2::new(-5.0, 5.0),
///     Vec2::new(5.0, 5.0),
///     Vec2::new(-1.0, 3.0),
///     Vec2::new(3.0, 1.0),
///     Vec2::new(-4.0, -1.0),
///     Vec2::new(1.0, -2.0),
///     Vec2::new(-6.0, -4.0),
///     Vec2::new(5.0, -4.0),
/// ];
/// let holes = vec![vec![
///     Vec2::new(-1.5, 3.5),
///     Vec2::new(-1.0, 2.5),
///     Vec2::new(-0.5, 3.5),
/// ]];
///
/// let triangles = triangulate(&points, Some(holes.as_slice()), None)?;
/// assert!(!triangles.is_empty());
/// # Ok::<(), cdt2d::TriangulationError>(())
/// ```
///
/// # Errors
///
/// Fails on fewer than 3 points, coincident input, clockwise or
/// self-intersecting holes, hole vertices outside the input bounding box,
/// and on degenerate input that breaks the point-location walk.
pub fn triangulate(
    input_points: &[Vec2],
    holes: Option<&[Vec<Vec2>]>,
    max_triangle_area: Option<f32>,
) -> Result<Vec<Triangle>, TriangulationError> {
    triangulation::triangulate(input_points, holes, max_triangle_area)
}
