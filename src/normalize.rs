use glam::Vec2;

/// Axis-aligned bounding box of the input cloud, kept around to map points
/// between input space and the normalized unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Vec2,
    max: Vec2,
}

impl Bounds {
    pub fn of_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);

        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        Bounds { min, max }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// The larger side of the box. Normalization divides both axes by this
    /// single value, so the aspect ratio of the cloud is preserved.
    pub fn max_dimension(&self) -> f32 {
        let extent = self.max - self.min;
        extent.x.max(extent.y)
    }

    /// Maps points into the unit square: the bottom-left corner of the box
    /// goes to the origin, the longer side to length 1.
    pub fn normalize(&self, points: &[Vec2]) -> Vec<Vec2> {
        let scale = 1.0 / self.max_dimension();
        points.iter().map(|point| (*point - self.min) * scale).collect()
    }

    /// Maps a normalized point back into input space.
    pub fn denormalize(&self, point: Vec2) -> Vec2 {
        point * self.max_dimension() + self.min
    }
}
