use crate::config::CameraConfig;
use crate::math::{Matrix4, Point3, Vector3};

/// A perspective camera looking at a point.
///
/// The projection matrix is cached and only recomputed by
/// [`PerspectiveCamera::set_aspect`], so per-frame reads are free.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Point3,
    pub up: Vector3,
    look_at: Point3,
    fov_deg: f64,
    aspect: f64,
    near: f64,
    far: f64,
    projection: Matrix4,
}

impl PerspectiveCamera {
    /// Creates a camera from its configuration, looking at the origin.
    #[must_use]
    pub fn new(config: &CameraConfig, aspect: f64) -> Self {
        let mut camera = Self {
            position: config.position,
            up: Vector3::y(),
            look_at: Point3::origin(),
            fov_deg: config.fov_deg,
            aspect,
            near: config.near,
            far: config.far,
            projection: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Points the camera at `target` without moving it.
    pub fn look_at(&mut self, target: Point3) {
        self.look_at = target;
    }

    /// Returns the point the camera looks at.
    #[must_use]
    pub fn target(&self) -> Point3 {
        self.look_at
    }

    /// Vertical field of view in degrees.
    #[must_use]
    pub fn fov_deg(&self) -> f64 {
        self.fov_deg
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Changes the aspect ratio and recomputes the projection.
    pub fn set_aspect(&mut self, aspect: f64) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Recomputes the cached projection matrix.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Matrix4::new_perspective(self.aspect, self.fov_deg.to_radians(), self.near, self.far);
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Matrix4 {
        self.projection
    }

    /// World-to-camera transform.
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at_rh(&self.position, &self.look_at, &self.up)
    }

    /// Unit vector from the camera towards its target.
    ///
    /// Falls back to `-Z` when the camera sits on its target.
    #[must_use]
    pub fn forward(&self) -> Vector3 {
        (self.look_at - self.position)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| -Vector3::z())
    }
}

/// Aspect ratio for a pixel size; zero heights are treated as one pixel.
#[must_use]
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    f64::from(width) / f64::from(height.max(1))
}
