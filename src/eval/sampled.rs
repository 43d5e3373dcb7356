use crate::error::EvalError;
use crate::math::{Aabb, Point3};

/// An ordered, closed-loop sequence of curve samples.
///
/// Always holds at least [`SampledCurve::MIN_POINTS`] points; the last point
/// is implicitly connected back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
    points: Vec<Point3>,
}

impl SampledCurve {
    /// Minimum number of valid samples for a usable curve.
    pub const MIN_POINTS: usize = 2;

    /// Wraps a point sequence.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InsufficientPoints`] if fewer than
    /// [`Self::MIN_POINTS`] points are given.
    pub fn new(points: Vec<Point3>) -> Result<Self, EvalError> {
        if points.len() < Self::MIN_POINTS {
            return Err(EvalError::InsufficientPoints {
                valid: points.len(),
                required: Self::MIN_POINTS,
            });
        }
        Ok(Self { points })
    }

    /// Returns the samples in parameter order.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the axis-aligned bounds of the samples.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let first = self.points[0];
        self.points[1..]
            .iter()
            .fold(Aabb::new(first, first), |mut aabb, p| {
                aabb.extend(p);
                aabb
            })
    }

    /// Returns a copy with every coordinate multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p * factor).collect(),
        }
    }

    /// Distance from the last sample back to the first.
    #[must_use]
    pub fn closing_gap(&self) -> f64 {
        (self.points[0] - self.points[self.points.len() - 1]).norm()
    }

    /// Mean distance between consecutive samples, excluding the closing segment.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_step(&self) -> f64 {
        let total: f64 = self
            .points
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum();
        total / (self.points.len() - 1) as f64
    }

    /// Counts samples that are not within `tolerance` of their predecessor.
    #[must_use]
    pub fn distinct_count(&self, tolerance: f64) -> usize {
        1 + self
            .points
            .windows(2)
            .filter(|w| (w[1] - w[0]).norm() > tolerance)
            .count()
    }
}
