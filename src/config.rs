//! View configuration.

use std::time::Duration;

use crate::builder::BuildMode;
use crate::controls::ControlsConfig;
use crate::error::ConfigError;
use crate::eval::{EvalLimits, DEFAULT_SAMPLES};
use crate::math::Point3;
use crate::tessellation::TubeStyle;

/// Perspective camera setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Initial eye position.
    pub position: Point3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Point3::new(0.0, 0.0, 10.0),
        }
    }
}

impl CameraConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(ConfigError::invalid("fov_deg", "must be in (0, 180)"));
        }
        if !(self.near > 0.0 && self.near < self.far && self.far.is_finite()) {
            return Err(ConfigError::invalid("near", "must satisfy 0 < near < far"));
        }
        if !self.position.coords.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::invalid("position", "must be finite"));
        }
        Ok(())
    }
}

/// Everything a [`CurveView`](crate::CurveView) needs to know up front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    /// Samples taken over one period of the curve.
    pub samples: usize,
    /// Uniform scale applied to sampled points before meshing.
    pub scale: f64,
    pub mode: BuildMode,
    pub tube: TubeStyle,
    pub controls: ControlsConfig,
    pub camera: CameraConfig,
    pub eval_limits: EvalLimits,
    /// Minimum time between two rendered frames.
    pub frame_interval: Duration,
    /// Quiet period before a resize is applied.
    pub resize_debounce: Duration,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            scale: 6.0,
            mode: BuildMode::Tube,
            tube: TubeStyle::default(),
            controls: ControlsConfig::default(),
            camera: CameraConfig::default(),
            eval_limits: EvalLimits::default(),
            frame_interval: Duration::from_millis(16),
            resize_debounce: Duration::from_millis(100),
        }
    }
}

impl ViewConfig {
    /// Checks every field, including nested configs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples < 2 {
            return Err(ConfigError::invalid("samples", "at least 2 samples are required"));
        }
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(ConfigError::invalid("scale", "must be positive and finite"));
        }
        if self.eval_limits.max_operations == 0 {
            return Err(ConfigError::invalid("eval_limits", "max_operations must be non-zero"));
        }
        if self.eval_limits.max_call_levels == 0 {
            return Err(ConfigError::invalid("eval_limits", "max_call_levels must be non-zero"));
        }
        self.controls.validate()?;
        self.camera.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ViewConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples, 300);
        assert_eq!(config.mode, BuildMode::Tube);
        assert_eq!(config.resize_debounce, Duration::from_millis(100));
    }

    #[test]
    fn rejects_bad_fields() {
        let config = ViewConfig {
            samples: 1,
            ..ViewConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "samples", .. })
        ));

        let config = ViewConfig {
            camera: CameraConfig {
                near: 5.0,
                far: 1.0,
                ..CameraConfig::default()
            },
            ..ViewConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "near", .. })
        ));
    }
}
