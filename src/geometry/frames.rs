use nalgebra::{Rotation3, Unit};

use crate::error::{GeometryError, Result};
use crate::math::{Vector3, TOLERANCE};

/// An orthonormal frame attached to a point on a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vector3,
    pub normal: Vector3,
    pub binormal: Vector3,
}

/// Computes rotation-minimizing frames along a sequence of unit tangents.
///
/// The first normal is chosen perpendicular to the tangent's smallest
/// component; each following normal is the previous one rotated by the turn
/// between consecutive tangents. For closed curves the accumulated twist
/// between the last and first frame is spread evenly along the curve so the
/// seam lines up.
///
/// # Errors
///
/// Returns an error if `tangents` is empty or contains a zero vector.
pub fn parallel_transport(tangents: &[Vector3], closed: bool) -> Result<Vec<Frame>> {
    let Some(first) = tangents.first() else {
        return Err(GeometryError::Degenerate("no tangents to frame".to_owned()).into());
    };
    if tangents.iter().any(|t| t.norm() < TOLERANCE) {
        return Err(GeometryError::Degenerate("zero-length tangent".to_owned()).into());
    }

    let mut normals = Vec::with_capacity(tangents.len());
    normals.push(initial_normal(first));

    for pair in tangents.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let mut normal = normals[normals.len() - 1];
        let axis = prev.cross(&next);
        if axis.norm() > TOLERANCE {
            let angle = prev.dot(&next).clamp(-1.0, 1.0).acos();
            normal = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle) * normal;
        }
        normals.push(normal);
    }

    let n = tangents.len();
    if closed && n > 1 {
        let last = normals[n - 1];
        #[allow(clippy::cast_precision_loss)]
        let mut step = normals[0].dot(&last).clamp(-1.0, 1.0).acos() / (n - 1) as f64;
        if first.dot(&normals[0].cross(&last)) > 0.0 {
            step = -step;
        }
        for (i, (normal, tangent)) in normals.iter_mut().zip(tangents).enumerate().skip(1) {
            #[allow(clippy::cast_precision_loss)]
            let angle = step * i as f64;
            *normal = Rotation3::from_axis_angle(&Unit::new_normalize(*tangent), angle) * *normal;
        }
    }

    Ok(tangents
        .iter()
        .zip(normals)
        .map(|(tangent, normal)| {
            let normal = normal.normalize();
            Frame {
                tangent: *tangent,
                normal,
                binormal: tangent.cross(&normal),
            }
        })
        .collect())
}

/// Picks a normal perpendicular to `tangent`, using the axis along which the
/// tangent is smallest.
fn initial_normal(tangent: &Vector3) -> Vector3 {
    let abs = tangent.abs();
    let axis = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let side = tangent.cross(&axis).normalize();
    tangent.cross(&side)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn circle_tangents(n: usize) -> Vec<Vector3> {
        #[allow(clippy::cast_precision_loss)]
        (0..=n)
            .map(|i| {
                let a = TAU * i as f64 / n as f64;
                Vector3::new(-a.sin(), a.cos(), 0.0)
            })
            .collect()
    }

    #[test]
    fn frames_are_orthonormal() {
        let frames = parallel_transport(&circle_tangents(32), true).unwrap();
        for f in &frames {
            assert!(f.tangent.dot(&f.normal).abs() < 1e-9);
            assert!(f.tangent.dot(&f.binormal).abs() < 1e-9);
            assert!((f.normal.norm() - 1.0).abs() < 1e-9);
            assert!((f.binormal.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn closed_loop_seam_matches() {
        let frames = parallel_transport(&circle_tangents(32), true).unwrap();
        let first = frames[0].normal;
        let last = frames[frames.len() - 1].normal;
        assert!((first - last).norm() < 1e-6);
    }

    #[test]
    fn straight_line_keeps_normal() {
        let tangents = vec![Vector3::x(); 5];
        let frames = parallel_transport(&tangents, false).unwrap();
        for f in &frames {
            assert!((f.normal - frames[0].normal).norm() < 1e-12);
        }
    }

    #[test]
    fn zero_tangent_fails() {
        let tangents = vec![Vector3::x(), Vector3::zeros()];
        assert!(parallel_transport(&tangents, false).is_err());
        assert!(parallel_transport(&[], false).is_err());
    }
}
