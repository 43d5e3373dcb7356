//! Smooth paths through sampled points and the frames that ride along them.

mod catmull_rom;
mod frames;

pub use catmull_rom::CatmullRom;
pub use frames::{parallel_transport, Frame};

use crate::error::Result;
use crate::math::{Point3, Vector3};

/// A path that a cross-section can be swept along, parameterized over
/// `u` in `[0, 1]`.
pub trait SweepPath {
    /// Returns the point at `u`.
    fn point_at(&self, u: f64) -> Point3;

    /// Returns the unit direction of travel at `u`.
    ///
    /// # Errors
    ///
    /// Returns an error where the path stalls and has no direction.
    fn direction_at(&self, u: f64) -> Result<Vector3>;

    /// Returns `true` if `u = 1` comes back to `u = 0`.
    fn is_loop(&self) -> bool;
}
