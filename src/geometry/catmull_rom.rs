use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::SweepPath;

/// Knot spacings below this are treated as coincident control points.
const MIN_KNOT_SPACING: f64 = 1e-4;

/// A closed centripetal Catmull-Rom spline through a loop of control points.
///
/// The spline interpolates every control point and wraps from the last one
/// back to the first. Control point `i` of `n` sits at `u = i / n`.
/// Centripetal knot spacing (`alpha = 0.5`) avoids the cusps and
/// self-intersections of the uniform variant on unevenly spaced samples.
#[derive(Debug, Clone)]
pub struct CatmullRom {
    points: Vec<Point3>,
}

/// Cubic `c0 + c1 w + c2 w^2 + c3 w^3` for one spline segment.
struct Cubic {
    c0: Vector3,
    c1: Vector3,
    c2: Vector3,
    c3: Vector3,
}

impl Cubic {
    /// Hermite form for a segment from `x1` to `x2` with end tangents `t1`, `t2`.
    fn hermite(x1: Vector3, x2: Vector3, t1: Vector3, t2: Vector3) -> Self {
        Self {
            c0: x1,
            c1: t1,
            c2: -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2,
            c3: 2.0 * x1 - 2.0 * x2 + t1 + t2,
        }
    }

    fn value(&self, w: f64) -> Vector3 {
        self.c0 + (self.c1 + (self.c2 + self.c3 * w) * w) * w
    }

    fn derivative(&self, w: f64) -> Vector3 {
        self.c1 + (self.c2 * 2.0 + self.c3 * (3.0 * w)) * w
    }
}

impl CatmullRom {
    /// Creates a closed spline through `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 points are given.
    pub fn closed(points: Vec<Point3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::Degenerate(
                "a spline needs at least 2 control points".to_owned(),
            )
            .into());
        }
        Ok(Self { points })
    }

    /// Returns the control points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Locates the segment containing `u` and the local weight within it.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn segment(&self, u: f64) -> (Cubic, f64) {
        let n = self.points.len();
        let p = n as f64 * u.rem_euclid(1.0);
        let index = p.floor();
        let weight = p - index;
        let i = (index as usize) % n;

        let x0 = self.points[(i + n - 1) % n].coords;
        let x1 = self.points[i].coords;
        let x2 = self.points[(i + 1) % n].coords;
        let x3 = self.points[(i + 2) % n].coords;

        let mut dt0 = (x1 - x0).norm_squared().powf(0.25);
        let mut dt1 = (x2 - x1).norm_squared().powf(0.25);
        let mut dt2 = (x3 - x2).norm_squared().powf(0.25);
        if dt1 < MIN_KNOT_SPACING {
            dt1 = 1.0;
        }
        if dt0 < MIN_KNOT_SPACING {
            dt0 = dt1;
        }
        if dt2 < MIN_KNOT_SPACING {
            dt2 = dt1;
        }

        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;

        (Cubic::hermite(x1, x2, t1, t2), weight)
    }
}

impl SweepPath for CatmullRom {
    fn point_at(&self, u: f64) -> Point3 {
        let (cubic, w) = self.segment(u);
        Point3::from(cubic.value(w))
    }

    fn direction_at(&self, u: f64) -> Result<Vector3> {
        let (cubic, w) = self.segment(u);
        cubic
            .derivative(w)
            .try_normalize(TOLERANCE)
            .ok_or_else(|| {
                GeometryError::Degenerate(format!("spline stalls at u = {u}")).into()
            })
    }

    fn is_loop(&self) -> bool {
        true
    }
}
