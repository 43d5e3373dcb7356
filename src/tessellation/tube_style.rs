use crate::error::{GeometryError, Result};

/// Upper bound on vertices around the cross-section.
pub const MAX_RADIAL_SEGMENTS: u32 = 1_024;

/// Upper bound on rings along the path.
///
/// Together with [`MAX_RADIAL_SEGMENTS`] this keeps every vertex index of
/// the finished mesh within `u32`.
pub const MAX_TUBULAR_SEGMENTS: u32 = 1 << 20;

/// Cross-section and resolution parameters for tube tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeStyle {
    radius: f64,
    radial_segments: u32,
    tubular_segments: u32,
}

impl Default for TubeStyle {
    fn default() -> Self {
        Self {
            radius: 0.1,
            radial_segments: 8,
            tubular_segments: 600,
        }
    }
}

impl TubeStyle {
    /// Creates a new tube style.
    ///
    /// # Errors
    ///
    /// Returns an error if `radius` is not positive, or if either segment
    /// count is below 3 or above its maximum.
    pub fn new(radius: f64, radial_segments: u32, tubular_segments: u32) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(GeometryError::InvalidParameters(
                "tube radius must be positive".to_owned(),
            )
            .into());
        }
        if radial_segments < 3 {
            return Err(GeometryError::InvalidParameters(
                "tube needs at least 3 radial segments".to_owned(),
            )
            .into());
        }
        if tubular_segments < 3 {
            return Err(GeometryError::InvalidParameters(
                "tube needs at least 3 tubular segments".to_owned(),
            )
            .into());
        }
        if radial_segments > MAX_RADIAL_SEGMENTS || tubular_segments > MAX_TUBULAR_SEGMENTS {
            return Err(GeometryError::InvalidParameters(format!(
                "tube segments exceed {MAX_RADIAL_SEGMENTS} radial or {MAX_TUBULAR_SEGMENTS} tubular"
            ))
            .into());
        }
        Ok(Self {
            radius,
            radial_segments,
            tubular_segments,
        })
    }

    /// Returns the cross-section radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the number of vertices around the cross-section.
    #[must_use]
    pub fn radial_segments(&self) -> u32 {
        self.radial_segments
    }

    /// Returns the number of rings along the path.
    #[must_use]
    pub fn tubular_segments(&self) -> u32 {
        self.tubular_segments
    }
}
