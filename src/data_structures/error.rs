use thiserror::Error;

/// Everything that can make a triangulation fail.
///
/// The first group are contract violations in the input; the rest indicate
/// that an internal invariant broke mid-run, which on valid input should
/// never happen.
#[derive(Debug, Error, PartialEq)]
pub enum TriangulationError {
    #[error("at least 3 input points are required, got {0}")]
    TooFewPoints(usize),

    #[error("input points are coincident, nothing to triangulate")]
    DegenerateInput,

    #[error("hole polygon {0} is wound clockwise, holes must be counter-clockwise")]
    ClockwiseHole(usize),

    #[error("hole polygon {0} self-intersects")]
    SelfIntersectingHole(usize),

    #[error("hole polygon {0} has a vertex outside the bounding box of the input points")]
    HoleOutsideBounds(usize),

    #[error("no triangle contains the point ({0}, {1}); the walk cycled, input may be degenerate")]
    ContainingTriangleNotFound(f32, f32),

    #[error("point location left the triangulation at ({0}, {1})")]
    WalkedOutOfTriangulation(f32, f32),

    #[error("no triangle at point {0} faces point {1}")]
    NoTriangleFacesPoint(usize, usize),

    #[error("collecting the edges crossed by the segment from point {0} to point {1} stalled")]
    EdgeWalkStalled(usize, usize),

    #[error("triangles {0} and {1} disagree about their shared edge")]
    AdjacencyBroken(usize, usize),

    #[error("interior edge of triangle {0} has no adjacent triangle")]
    MissingNeighbor(usize),

    #[error("forcing the edge from point {0} to point {1} did not converge")]
    ConstrainedEdgeLoop(usize, usize),

    #[error("hole boundary is not closed in the triangulation")]
    PolygonNotClosed,

    #[error("Delaunay restoration did not converge")]
    FlipLoopDetected,

    #[error("maximum-area refinement did not converge")]
    RefinementFailed,
}
