mod tessellate_tube;
mod tube_style;

pub use tessellate_tube::TessellateTube;
pub use tube_style::{TubeStyle, MAX_RADIAL_SEGMENTS, MAX_TUBULAR_SEGMENTS};

use crate::math::{Aabb, Point2, Point3, Vector3};

/// Straight segments joining points in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point3>,
}

impl Polyline {
    /// Returns the number of line segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Indexed triangles with per-vertex normals and texture coordinates.
///
/// `vertices`, `normals` and `uvs` are parallel arrays that `indices`
/// refers into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3>,
    pub normals: Vec<Vector3>,
    /// `u` runs along the path, `v` around the cross-section.
    pub uvs: Vec<Point2>,
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Returns the bounding box of the vertices, if any.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Returns the number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}
