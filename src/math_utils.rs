use glam::Vec2;

/// Tolerance for the orientation tests. Coordinates are normalized to the
/// unit square before any predicate runs, so an absolute value is enough.
pub const EDGE_TOLERANCE: f32 = 1e-4;

/// Counter-clockwise sign of the triple `(a, b, c)`: positive when `c` lies
/// to the left of the directed line `a -> b`, zero when the three points are
/// collinear.
#[inline]
pub fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Checks whether a point lies strictly to the right of the directed edge
/// `a -> b`. Points on the edge count as not-right, so the left side and the
/// edge itself stay together.
pub fn is_point_to_the_right_of_edge(a: Vec2, b: Vec2, point: Vec2) -> bool {
    cross(a, b, point) < -EDGE_TOLERANCE
}

pub fn is_point_to_the_left_of_edge(a: Vec2, b: Vec2, point: Vec2) -> bool {
    !is_point_to_the_right_of_edge(a, b, point)
}

/// Checks whether a point is contained in the triangle `(p0, p1, p2)`, whose
/// vertices must be sorted counter-clockwise. Points on an edge count as
/// inside.
pub fn is_point_inside_triangle(p0: Vec2, p1: Vec2, p2: Vec2, point: Vec2) -> bool {
    is_point_to_the_left_of_edge(p0, p1, point)
        && is_point_to_the_left_of_edge(p1, p2, point)
        && is_point_to_the_left_of_edge(p2, p0, point)
}

/// Checks whether `point` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `(p0, p1, p2)`.
///
/// Evaluates the sign of the 3x3 determinant of the coordinate differences
/// lifted onto the paraboloid. Strictly positive means inside; a cocircular
/// point is on the perimeter and does not count, so ties never flip.
pub fn is_point_inside_circumcircle(p0: Vec2, p1: Vec2, p2: Vec2, point: Vec2) -> bool {
    let a = p0.x - point.x;
    let b = p0.y - point.y;
    let d = p1.x - point.x;
    let e = p1.y - point.y;
    let g = p2.x - point.x;
    let h = p2.y - point.y;

    let c = a * a + b * b;
    let f = d * d + e * e;
    let i = g * g + h * h;

    let determinant = a * e * i + b * f * g + c * d * h - g * e * c - h * f * a - i * d * b;

    determinant > 0.0
}

/// Checks whether the quadrilateral `(a, b, c, d)`, given in
/// counter-clockwise perimeter order, is strictly convex; equivalently,
/// whether its diagonals cross in their interiors.
pub fn is_quadrilateral_convex(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    cross(a, b, c) > 0.0 && cross(b, c, d) > 0.0 && cross(c, d, a) > 0.0 && cross(d, a, b) > 0.0
}

/// Intersects the segments `a1 -> b1` and `a2 -> b2`, returning the crossing
/// point only when both segments are cut strictly in their interiors.
///
/// Segments that merely share an endpoint, touch at an endpoint, or overlap
/// while parallel do not intersect under this rule. That keeps walks along
/// the triangulation from reporting a crossing at a vertex both segments
/// already pass through.
pub fn segments_intersect(a1: Vec2, b1: Vec2, a2: Vec2, b2: Vec2) -> Option<Vec2> {
    let direction1 = b1 - a1;
    let direction2 = b2 - a2;

    let denominator = direction1.perp_dot(direction2);
    if denominator == 0.0 {
        // Parallel or collinear
        return None;
    }

    let offset = a2 - a1;
    let t = offset.perp_dot(direction2) / denominator;
    let u = offset.perp_dot(direction1) / denominator;

    if t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0 {
        Some(a1 + direction1 * t)
    } else {
        None
    }
}

/// Area of the triangle `(p0, p1, p2)`, regardless of winding.
pub fn calculate_triangle_area(p0: Vec2, p1: Vec2, p2: Vec2) -> f32 {
    ((p1 - p0).perp_dot(p2 - p0) * 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_sign_matches_orientation() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert!(cross(a, b, Vec2::new(0.5, 1.0)) > 0.0);
        assert!(cross(a, b, Vec2::new(0.5, -1.0)) < 0.0);
        assert_eq!(cross(a, b, Vec2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn points_on_an_edge_are_not_to_its_right() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert!(is_point_to_the_right_of_edge(a, b, Vec2::new(0.5, -0.5)));
        assert!(!is_point_to_the_right_of_edge(a, b, Vec2::new(0.5, 0.0)));
        assert!(!is_point_to_the_right_of_edge(a, b, Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn triangle_containment_includes_edges() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(1.0, 0.0);
        let p2 = Vec2::new(0.0, 1.0);
        assert!(is_point_inside_triangle(p0, p1, p2, Vec2::new(0.25, 0.25)));
        assert!(is_point_inside_triangle(p0, p1, p2, Vec2::new(0.5, 0.0)));
        assert!(is_point_inside_triangle(p0, p1, p2, p0));
        assert!(!is_point_inside_triangle(p0, p1, p2, Vec2::new(0.75, 0.75)));
        assert!(!is_point_inside_triangle(p0, p1, p2, Vec2::new(-0.1, 0.5)));
    }

    #[test]
    fn circumcircle_test_is_strict() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(1.0, 0.0);
        let p2 = Vec2::new(1.0, 1.0);
        // Inside the circle through the three corners
        assert!(is_point_inside_circumcircle(p0, p1, p2, Vec2::new(0.6, 0.5)));
        // The fourth corner of the unit square is cocircular, not inside
        assert!(!is_point_inside_circumcircle(p0, p1, p2, Vec2::new(0.0, 1.0)));
        // Far outside
        assert!(!is_point_inside_circumcircle(p0, p1, p2, Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn quadrilateral_convexity() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        let c = Vec2::new(1.0, 1.0);
        let d = Vec2::new(0.0, 1.0);
        assert!(is_quadrilateral_convex(a, b, c, d));
        // Pull one corner inside the triangle of the other three
        assert!(!is_quadrilateral_convex(a, b, Vec2::new(0.25, 0.25), d));
    }

    #[test]
    fn segments_cross_in_their_interiors() {
        let hit = segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(hit.x, 0.5);
        assert_relative_eq!(hit.y, 0.5);
    }

    #[test]
    fn shared_endpoints_do_not_intersect() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        // Shares endpoint `b`
        assert!(segments_intersect(a, b, b, Vec2::new(2.0, 1.0)).is_none());
        // Endpoint on the other segment's interior
        assert!(segments_intersect(a, b, Vec2::new(0.5, 0.0), Vec2::new(0.5, 1.0)).is_none());
        // Parallel
        assert!(segments_intersect(a, b, Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn area_ignores_winding() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(1.0, 0.0);
        let p2 = Vec2::new(0.0, 1.0);
        assert_relative_eq!(calculate_triangle_area(p0, p1, p2), 0.5);
        assert_relative_eq!(calculate_triangle_area(p0, p2, p1), 0.5);
    }
}
