//! Turns sampled curves into renderable geometry.

use crate::eval::SampledCurve;
use crate::geometry::CatmullRom;
use crate::math::{Aabb, Point3, TOLERANCE};
use crate::tessellation::{Polyline, TessellateTube, TriangleMesh, TubeStyle};
use crate::theme::{DisplayTheme, Material};

/// How a curve is meshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Straight segments through the samples.
    Line,
    /// Smoothed closed spline swept with a circular cross-section.
    #[default]
    Tube,
}

/// The mesh part of a [`CurveGeometry`].
#[derive(Debug, Clone, PartialEq)]
pub enum CurveMesh {
    Line(Polyline),
    Tube(TriangleMesh),
}

impl CurveMesh {
    /// Returns the vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        match self {
            Self::Line(line) => &line.points,
            Self::Tube(mesh) => &mesh.vertices,
        }
    }

    /// Returns the mode this mesh was built with.
    #[must_use]
    pub fn mode(&self) -> BuildMode {
        match self {
            Self::Line(_) => BuildMode::Line,
            Self::Tube(_) => BuildMode::Tube,
        }
    }
}

/// Renderable curve: mesh, material and bounds.
///
/// Built fresh for every new sample set or theme; the scene swaps whole
/// geometries and only ever recolors an attached one.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveGeometry {
    mesh: CurveMesh,
    material: Material,
    bounds: Aabb,
    theme: DisplayTheme,
}

impl CurveGeometry {
    /// Returns the mesh.
    #[must_use]
    pub fn mesh(&self) -> &CurveMesh {
        &self.mesh
    }

    /// Returns the vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        self.mesh.positions()
    }

    /// Returns the mode the mesh was actually built with.
    #[must_use]
    pub fn mode(&self) -> BuildMode {
        self.mesh.mode()
    }

    /// Returns the material.
    #[must_use]
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Returns the bounds of the vertex positions.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Returns the theme the material was derived from.
    #[must_use]
    pub fn theme(&self) -> DisplayTheme {
        self.theme
    }
}

/// Builds [`CurveGeometry`] from sampled curves.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryBuilder {
    tube: TubeStyle,
}

impl GeometryBuilder {
    /// Tube meshes need this many distinct samples; fewer fall back to a line.
    pub const MIN_TUBE_POINTS: usize = 3;

    /// Creates a builder using `tube` for tube-mode meshes.
    #[must_use]
    pub fn new(tube: TubeStyle) -> Self {
        Self { tube }
    }

    /// Returns the tube style.
    #[must_use]
    pub fn tube_style(&self) -> TubeStyle {
        self.tube
    }

    /// Builds geometry for `curve` in the requested mode.
    ///
    /// Tube mode silently falls back to line mode when the samples cannot
    /// carry a tube (too few distinct points or a vanishing tangent).
    #[must_use]
    pub fn build(&self, curve: &SampledCurve, theme: DisplayTheme, mode: BuildMode) -> CurveGeometry {
        let palette = theme.palette();
        let mesh = match mode {
            BuildMode::Line => None,
            BuildMode::Tube => self.tube_mesh(curve),
        };

        let (mesh, material) = match mesh {
            Some(mesh) => (
                CurveMesh::Tube(mesh),
                Material::surface(palette.curve, palette.curve_opacity),
            ),
            None => (
                CurveMesh::Line(Polyline {
                    points: curve.points().to_vec(),
                }),
                Material::line(palette.curve, palette.curve_opacity),
            ),
        };

        let bounds = Aabb::from_points(mesh.positions()).unwrap_or_else(|| curve.bounds());
        tracing::debug!(
            mode = ?mesh.mode(),
            vertices = mesh.positions().len(),
            "curve geometry built"
        );

        CurveGeometry {
            mesh,
            material,
            bounds,
            theme,
        }
    }

    fn tube_mesh(&self, curve: &SampledCurve) -> Option<TriangleMesh> {
        if curve.distinct_count(TOLERANCE) < Self::MIN_TUBE_POINTS {
            tracing::debug!(points = curve.len(), "too few distinct samples for a tube");
            return None;
        }
        let path = CatmullRom::closed(curve.points().to_vec()).ok()?;
        TessellateTube::new(&path, self.tube)
            .execute()
            .inspect_err(|err| tracing::debug!(%err, "tube tessellation failed"))
            .ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::theme::Shading;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn ring(n: usize, center: Point3) -> SampledCurve {
        #[allow(clippy::cast_precision_loss)]
        let points = (0..n)
            .map(|i| {
                let a = TAU * i as f64 / n as f64;
                center + crate::math::Vector3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        SampledCurve::new(points).unwrap()
    }

    fn builder() -> GeometryBuilder {
        GeometryBuilder::new(TubeStyle::new(0.1, 8, 120).unwrap())
    }

    #[test]
    fn line_mode_keeps_samples_in_order() {
        let curve = ring(20, Point3::origin());
        let geometry = builder().build(&curve, DisplayTheme::LIGHT, BuildMode::Line);
        assert_eq!(geometry.mode(), BuildMode::Line);
        assert_eq!(geometry.positions(), curve.points());
        assert_eq!(geometry.material().shading, Shading::Unlit);
    }

    #[test]
    fn tube_mode_builds_lit_mesh() {
        let curve = ring(40, Point3::origin());
        let geometry = builder().build(&curve, DisplayTheme::DARK, BuildMode::Tube);
        assert_eq!(geometry.mode(), BuildMode::Tube);
        assert_eq!(geometry.positions().len(), 121 * 9);
        assert!(matches!(geometry.material().shading, Shading::Lit { .. }));
    }

    #[test]
    fn two_points_fall_back_to_line() {
        let curve =
            SampledCurve::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]).unwrap();
        let geometry = builder().build(&curve, DisplayTheme::LIGHT, BuildMode::Tube);
        assert_eq!(geometry.mode(), BuildMode::Line);
        assert_eq!(geometry.positions().len(), 2);
    }

    #[test]
    fn repeated_points_fall_back_to_line() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let curve = SampledCurve::new(vec![p; 10]).unwrap();
        let geometry = builder().build(&curve, DisplayTheme::LIGHT, BuildMode::Tube);
        assert_eq!(geometry.mode(), BuildMode::Line);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let curve = ring(60, Point3::new(0.0, 1.0, -2.0));
        let a = builder().build(&curve, DisplayTheme::DARK, BuildMode::Tube);
        let b = builder().build(&curve, DisplayTheme::DARK, BuildMode::Tube);
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a, b);
    }

    #[test]
    fn theme_only_changes_material() {
        let curve = ring(60, Point3::origin());
        let dark = builder().build(&curve, DisplayTheme::DARK, BuildMode::Tube);
        let light = builder().build(&curve, DisplayTheme::LIGHT, BuildMode::Tube);
        assert_eq!(dark.positions(), light.positions());
        assert_ne!(dark.material().color, light.material().color);
        assert_eq!(dark.material().color, DisplayTheme::DARK.palette().curve);
    }

    #[test]
    fn bounds_center_follows_curve() {
        let curve = ring(60, Point3::new(5.0, 0.0, 0.0));
        let geometry = builder().build(&curve, DisplayTheme::LIGHT, BuildMode::Tube);
        assert_relative_eq!(geometry.bounds().center(), Point3::new(5.0, 0.0, 0.0), epsilon = 1e-3);
    }
}
