//! Interactive orbit, dolly and pan with exponential damping.
//!
//! Input never moves the camera directly. It accumulates deltas that
//! [`ViewportController::update`] bleeds into the camera a fraction at a
//! time, once per rendered frame, so motion eases out after the pointer
//! stops.

use std::f64::consts::{PI, TAU};

use crate::error::ConfigError;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::scene::PerspectiveCamera;

/// Deltas smaller than this count as settled.
const SETTLED: f64 = 1e-6;

/// Keeps the polar angle away from the poles so `up` stays valid.
const POLE_MARGIN: f64 = 1e-6;

/// Wheel notches scale the distance by this factor per unit of zoom speed.
const DOLLY_STEP: f64 = 0.95;

/// Tuning for [`ViewportController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsConfig {
    /// Fraction of the pending motion applied per frame, in `(0, 1]`.
    pub damping_factor: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    pub pan_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.5,
            max_distance: 500.0,
        }
    }
}

impl ControlsConfig {
    /// Checks that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(ConfigError::invalid("damping_factor", "must be in (0, 1]"));
        }
        for (field, value) in [
            ("rotate_speed", self.rotate_speed),
            ("zoom_speed", self.zoom_speed),
            ("pan_speed", self.pan_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, "must be finite and non-negative"));
            }
        }
        if !(self.min_distance > 0.0 && self.min_distance < self.max_distance) {
            return Err(ConfigError::invalid(
                "min_distance",
                "must be positive and below max_distance",
            ));
        }
        Ok(())
    }
}

/// Pointer button held during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Orbits around the target.
    Primary,
    /// Pans the target in the view plane.
    Secondary,
}

/// A pointer event forwarded by the host, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Drag {
        button: PointerButton,
        dx: f64,
        dy: f64,
    },
    /// Positive `delta_y` scrolls away from the scene.
    Wheel { delta_y: f64 },
}

/// Orbit controls around a target point.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ControlsConfig,
    target: Point3,
    viewport_height: f64,
    theta_delta: f64,
    phi_delta: f64,
    log_zoom_delta: f64,
    pan_delta: Vector3,
}

impl ViewportController {
    #[must_use]
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            target: Point3::origin(),
            viewport_height: 1.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
            log_zoom_delta: 0.0,
            pan_delta: Vector3::zeros(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    /// The point the camera orbits around.
    #[must_use]
    pub fn target(&self) -> Point3 {
        self.target
    }

    /// Sets the pixel height that drag distances are measured against.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = f64::from(height.max(1));
    }

    /// Moves the orbit target to `center` immediately.
    ///
    /// The camera keeps its position; only its aim changes, and any pending
    /// pan is dropped so it cannot drag the target off the new center.
    pub fn recenter_on(&mut self, center: Point3, camera: &mut PerspectiveCamera) {
        tracing::debug!(x = center.x, y = center.y, z = center.z, "recentering controls");
        self.target = center;
        self.pan_delta = Vector3::zeros();
        camera.look_at(center);
    }

    /// Queues motion for a pointer event.
    pub fn handle(&mut self, input: PointerInput, camera: &PerspectiveCamera) {
        match input {
            PointerInput::Drag {
                button: PointerButton::Primary,
                dx,
                dy,
            } => self.rotate(dx, dy),
            PointerInput::Drag {
                button: PointerButton::Secondary,
                dx,
                dy,
            } => self.pan(dx, dy, camera),
            PointerInput::Wheel { delta_y } => self.dolly(delta_y),
        }
    }

    /// Queues an orbit. A drag across the full viewport height is one turn.
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        let scale = TAU * self.config.rotate_speed / self.viewport_height;
        self.theta_delta -= dx * scale;
        self.phi_delta -= dy * scale;
    }

    /// Queues a dolly; only the sign of `delta_y` matters.
    pub fn dolly(&mut self, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let step = -DOLLY_STEP.ln() * self.config.zoom_speed;
        self.log_zoom_delta += step * delta_y.signum();
    }

    /// Queues a pan so that the scene tracks the pointer at the target depth.
    pub fn pan(&mut self, dx: f64, dy: f64, camera: &PerspectiveCamera) {
        let distance = (camera.position - self.target).norm();
        let half_fov = camera.fov_deg().to_radians() / 2.0;
        let world_per_pixel = 2.0 * distance * half_fov.tan() / self.viewport_height;

        let forward = camera.forward();
        let right = forward.cross(&camera.up).try_normalize(f64::EPSILON);
        let Some(right) = right else {
            return;
        };
        let up = right.cross(&forward);

        let scale = world_per_pixel * self.config.pan_speed;
        self.pan_delta += -right * dx * scale + up * dy * scale;
    }

    /// Returns `true` while queued motion is still being applied.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.theta_delta.abs() > SETTLED
            || self.phi_delta.abs() > SETTLED
            || self.log_zoom_delta.abs() > SETTLED
            || self.pan_delta.norm() > SETTLED
    }

    /// Applies one frame of damped motion to `camera`.
    ///
    /// Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if !self.is_moving() {
            camera.look_at(self.target);
            return false;
        }
        let k = self.config.damping_factor;

        let offset = camera.position - self.target;
        let radius = offset.norm().max(TOLERANCE);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.theta_delta * k;
        phi = (phi + self.phi_delta * k).clamp(POLE_MARGIN, PI - POLE_MARGIN);
        let radius = self.dollied(radius);
        self.target += self.pan_delta * k;

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        let decay = 1.0 - k;
        self.theta_delta *= decay;
        self.phi_delta *= decay;
        self.log_zoom_delta *= decay;
        self.pan_delta *= decay;
        if !self.is_moving() {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.log_zoom_delta = 0.0;
            self.pan_delta = Vector3::zeros();
        }

        tracing::trace!(radius, "controls updated");
        true
    }

    /// Applies this frame's share of the pending dolly to `radius`.
    ///
    /// Only the dolly is limited by the distance bounds. A radius already
    /// outside them, as left by recentering, is kept until the user zooms
    /// back toward the allowed range.
    fn dollied(&self, radius: f64) -> f64 {
        let zoomed = radius * (self.log_zoom_delta * self.config.damping_factor).exp();
        if self.log_zoom_delta < 0.0 {
            zoomed.max(self.config.min_distance.min(radius))
        } else if self.log_zoom_delta > 0.0 {
            zoomed.min(self.config.max_distance.max(radius))
        } else {
            radius
        }
    }
}
