use std::f64::consts::TAU;

use crate::error::Result;
use crate::geometry::{parallel_transport, SweepPath};
use crate::math::Point2;

use super::{TriangleMesh, TubeStyle};

/// Sweeps a circular cross-section along a curve, producing a tube mesh.
///
/// The path is sampled at `tubular_segments + 1` evenly spaced parameters
/// (the last ring repeats the first on looping paths) and each ring carries
/// `radial_segments + 1` vertices so the UV seam can be split. Ring
/// orientation follows rotation-minimizing frames, which keeps the tube
/// from twisting around tight turns.
#[derive(Debug)]
pub struct TessellateTube<'a, P> {
    path: &'a P,
    style: TubeStyle,
}

impl<'a, P: SweepPath> TessellateTube<'a, P> {
    /// Creates a new tube tessellation operation.
    #[must_use]
    pub fn new(path: &'a P, style: TubeStyle) -> Self {
        Self { path, style }
    }

    /// Executes the tessellation, producing a tube mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the path stalls somewhere along it.
    pub fn execute(&self) -> Result<TriangleMesh> {
        let segments = self.style.tubular_segments();
        let radial = self.style.radial_segments();
        let radius = self.style.radius();

        let ring_count = segments as usize + 1;
        let mut centers = Vec::with_capacity(ring_count);
        let mut tangents = Vec::with_capacity(ring_count);
        for i in 0..=segments {
            let u = f64::from(i) / f64::from(segments);
            centers.push(self.path.point_at(u));
            tangents.push(self.path.direction_at(u)?);
        }
        let frames = parallel_transport(&tangents, self.path.is_loop())?;

        let ring = radial + 1;
        let vertex_count = ring_count * ring as usize;
        let mut mesh = TriangleMesh {
            vertices: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(segments as usize * radial as usize * 2),
        };

        for i in 0..=segments {
            let center = centers[i as usize];
            let frame = frames[i as usize];
            let u = f64::from(i) / f64::from(segments);
            for j in 0..=radial {
                let v = f64::from(j) / f64::from(radial);
                let angle = v * TAU;
                let normal = (frame.normal * -angle.cos() + frame.binormal * angle.sin()).normalize();
                mesh.vertices.push(center + normal * radius);
                mesh.normals.push(normal);
                mesh.uvs.push(Point2::new(u, v));
            }
        }

        for i in 1..=segments {
            for j in 1..=radial {
                let a = ring * (i - 1) + (j - 1);
                let b = ring * i + (j - 1);
                let c = ring * i + j;
                let d = ring * (i - 1) + j;
                mesh.indices.push([a, b, d]);
                mesh.indices.push([b, c, d]);
            }
        }

        Ok(mesh)
    }
}
