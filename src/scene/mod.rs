//! The persistent 3D scene behind a mounted view.
//!
//! [`SceneManager`] exclusively owns the backend, camera, controls, helper
//! meshes and the attached curve. It knows nothing about source text: it
//! takes finished [`CurveGeometry`] and swaps it in.

mod camera;
mod debounce;
mod helpers;

pub use camera::{aspect_ratio, PerspectiveCamera};
pub use debounce::Debouncer;
pub use helpers::{
    helper_lines, scene_lights, AxesHelper, GridHelper, HelperPart, Light, LightKind,
};

use std::time::{Duration, Instant};

use crate::backend::{
    Container, Frame, GpuMeshId, LineTopology, ListenerId, ListenerKind, MeshData, RenderBackend,
    SurfaceId,
};
use crate::builder::{CurveGeometry, CurveMesh};
use crate::config::CameraConfig;
use crate::controls::{ControlsConfig, PointerInput, ViewportController};
use crate::error::{Result, SceneError};
use crate::theme::{Color, DisplayTheme};

/// Lifecycle of a [`SceneManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStatus {
    Uninitialized,
    Active,
    Destroyed,
}

#[derive(Debug)]
struct AttachedCurve {
    mesh: GpuMeshId,
    geometry: CurveGeometry,
}

/// Resources that exist only while the scene is mounted.
#[derive(Debug)]
struct ActiveScene {
    surface: SurfaceId,
    listeners: Vec<ListenerId>,
    helpers: Vec<(HelperPart, GpuMeshId)>,
    curve: Option<AttachedCurve>,
    lights: [Light; 2],
    background: Color,
    theme: DisplayTheme,
    size: (u32, u32),
}

#[derive(Debug)]
enum SceneState {
    Uninitialized,
    Active(ActiveScene),
    Destroyed,
}

/// Owns one scene instance from mount to teardown.
#[derive(Debug)]
pub struct SceneManager<B> {
    backend: B,
    camera: PerspectiveCamera,
    controls: ViewportController,
    grid: GridHelper,
    axes: AxesHelper,
    resize: Debouncer<(u32, u32)>,
    state: SceneState,
}

impl<B: RenderBackend> SceneManager<B> {
    /// Creates an unmounted scene.
    #[must_use]
    pub fn new(
        backend: B,
        camera: &CameraConfig,
        controls: ControlsConfig,
        resize_debounce: Duration,
    ) -> Self {
        Self {
            backend,
            camera: PerspectiveCamera::new(camera, 1.0),
            controls: ViewportController::new(controls),
            grid: GridHelper::default(),
            axes: AxesHelper::default(),
            resize: Debouncer::new(resize_debounce),
            state: SceneState::Uninitialized,
        }
    }

    #[must_use]
    pub fn status(&self) -> SceneStatus {
        match self.state {
            SceneState::Uninitialized => SceneStatus::Uninitialized,
            SceneState::Active(_) => SceneStatus::Active,
            SceneState::Destroyed => SceneStatus::Destroyed,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gives the backend back, typically after [`SceneManager::destroy`].
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    #[must_use]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    #[must_use]
    pub fn controls(&self) -> &ViewportController {
        &self.controls
    }

    /// Returns the attached curve geometry, if any.
    #[must_use]
    pub fn curve(&self) -> Option<&CurveGeometry> {
        match &self.state {
            SceneState::Active(active) => active.curve.as_ref().map(|c| &c.geometry),
            _ => None,
        }
    }

    /// Returns the size the surface was last resized to.
    #[must_use]
    pub fn size(&self) -> Option<(u32, u32)> {
        match &self.state {
            SceneState::Active(active) => Some(active.size),
            _ => None,
        }
    }

    /// Mounts the scene into `container`.
    ///
    /// Allocates the render surface, helper meshes and lights, and registers
    /// resize and pointer listeners. On failure everything allocated so far
    /// is released again and the scene stays unmounted.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::AlreadyMounted`] or [`SceneError::Destroyed`]
    /// when not in the unmounted state, or the backend's error.
    pub fn mount<C: Container>(&mut self, container: &mut C, theme: DisplayTheme) -> Result<()> {
        match self.state {
            SceneState::Uninitialized => {}
            SceneState::Active(_) => return Err(SceneError::AlreadyMounted.into()),
            SceneState::Destroyed => return Err(SceneError::Destroyed.into()),
        }

        let (width, height) = container.size();
        let surface = self.backend.create_surface(width, height)?;

        let palette = theme.palette();
        let mut helpers = Vec::with_capacity(5);
        for (part, positions) in helper_lines(&self.grid, &self.axes) {
            let data = MeshData::Lines {
                positions: &positions,
                topology: LineTopology::Segments,
            };
            match self.backend.upload(data, &part.material(&palette)) {
                Ok(mesh) => helpers.push((part, mesh)),
                Err(err) => {
                    for (_, mesh) in helpers {
                        self.backend.release(mesh);
                    }
                    self.backend.destroy_surface(surface);
                    return Err(err.into());
                }
            }
        }

        container.attach_surface(surface);
        let listeners = vec![
            container.add_listener(ListenerKind::Resize),
            container.add_listener(ListenerKind::Pointer),
        ];

        self.camera.set_aspect(aspect_ratio(width, height));
        self.controls.set_viewport_height(height);
        self.camera.look_at(self.controls.target());

        self.state = SceneState::Active(ActiveScene {
            surface,
            listeners,
            helpers,
            curve: None,
            lights: scene_lights(&palette),
            background: palette.background,
            theme,
            size: (width, height),
        });
        tracing::info!(width, height, dark = theme.is_dark, "scene mounted");
        Ok(())
    }

    /// Replaces the attached curve with `geometry`.
    ///
    /// The new mesh is uploaded before the old one is released, so a failed
    /// upload leaves the previous curve on screen. On success the controls
    /// recenter on the new bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] when not mounted, or the backend's upload
    /// error.
    pub fn set_curve(&mut self, geometry: CurveGeometry) -> Result<()> {
        let active = Self::active_mut(&mut self.state, "set_curve")?;

        let data = match geometry.mesh() {
            CurveMesh::Line(line) => MeshData::Lines {
                positions: &line.points,
                topology: LineTopology::Strip,
            },
            CurveMesh::Tube(mesh) => MeshData::Triangles(mesh),
        };
        let mesh = self.backend.upload(data, geometry.material())?;

        let center = geometry.bounds().center();
        if let Some(old) = active.curve.replace(AttachedCurve { mesh, geometry }) {
            self.backend.release(old.mesh);
        }
        self.controls.recenter_on(center, &mut self.camera);
        tracing::debug!(?mesh, "curve swapped");
        Ok(())
    }

    /// Queues a viewport resize; it takes effect after the debounce window.
    ///
    /// Zero-sized requests are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] when not mounted.
    pub fn resize(&mut self, width: u32, height: u32, now: Instant) -> Result<()> {
        Self::active_mut(&mut self.state, "resize")?;
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring zero-sized resize");
            return Ok(());
        }
        self.resize.push((width, height), now);
        Ok(())
    }

    /// Applies a pending resize whose quiet period has elapsed.
    ///
    /// Returns `true` if the camera and surface were resized.
    pub fn flush_resize(&mut self, now: Instant) -> bool {
        let SceneState::Active(active) = &mut self.state else {
            return false;
        };
        let Some((width, height)) = self.resize.poll(now) else {
            return false;
        };
        if active.size == (width, height) {
            return false;
        }
        active.size = (width, height);
        self.camera.set_aspect(aspect_ratio(width, height));
        self.controls.set_viewport_height(height);
        self.backend.resize_surface(active.surface, width, height);
        tracing::debug!(width, height, "viewport resized");
        true
    }

    /// Recolors background, helpers, lights and the attached curve in place.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] when not mounted.
    pub fn set_theme(&mut self, theme: DisplayTheme) -> Result<()> {
        let active = Self::active_mut(&mut self.state, "set_theme")?;
        if active.theme == theme {
            return Ok(());
        }

        let palette = theme.palette();
        for (part, mesh) in &active.helpers {
            self.backend.set_material(*mesh, &part.material(&palette));
        }
        if let Some(curve) = &active.curve {
            let material = curve
                .geometry
                .material()
                .recolored(palette.curve, palette.curve_opacity);
            self.backend.set_material(curve.mesh, &material);
        }
        active.lights = scene_lights(&palette);
        active.background = palette.background;
        active.theme = theme;
        tracing::info!(dark = theme.is_dark, "scene theme changed");
        Ok(())
    }

    /// Forwards pointer input to the controls.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] when not mounted.
    pub fn pointer(&mut self, input: PointerInput) -> Result<()> {
        Self::active_mut(&mut self.state, "pointer")?;
        self.controls.handle(input, &self.camera);
        Ok(())
    }

    /// Applies one frame of damped camera motion.
    ///
    /// Returns `true` if the camera moved.
    pub fn update_controls(&mut self) -> bool {
        match self.state {
            SceneState::Active(_) => self.controls.update(&mut self.camera),
            _ => false,
        }
    }

    /// Draws the scene through the camera.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] when not mounted.
    pub fn render(&mut self) -> Result<()> {
        let active = Self::active_mut(&mut self.state, "render")?;

        let mut draw_list: Vec<GpuMeshId> = active.helpers.iter().map(|(_, mesh)| *mesh).collect();
        draw_list.extend(active.curve.as_ref().map(|c| c.mesh));

        let frame = Frame {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            eye: self.camera.position,
            clear_color: active.background,
            lights: &active.lights,
            draw_list: &draw_list,
        };
        self.backend.render(active.surface, &frame);
        tracing::trace!(meshes = draw_list.len(), "frame rendered");
        Ok(())
    }

    /// Tears the scene down: releases every backend resource, detaches the
    /// surface and removes the listeners. Calling it again is a no-op.
    pub fn destroy<C: Container>(&mut self, container: &mut C) {
        match std::mem::replace(&mut self.state, SceneState::Destroyed) {
            SceneState::Active(active) => {
                if let Some(curve) = active.curve {
                    self.backend.release(curve.mesh);
                }
                for (_, mesh) in active.helpers {
                    self.backend.release(mesh);
                }
                for listener in active.listeners {
                    container.remove_listener(listener);
                }
                container.detach_surface(active.surface);
                self.backend.destroy_surface(active.surface);
                self.resize.clear();
                tracing::info!("scene destroyed");
            }
            SceneState::Uninitialized => tracing::debug!("destroying a scene that was never mounted"),
            SceneState::Destroyed => tracing::warn!("scene destroyed twice"),
        }
    }

    fn active_mut<'s>(state: &'s mut SceneState, op: &'static str) -> Result<&'s mut ActiveScene> {
        match state {
            SceneState::Active(active) => Ok(active),
            SceneState::Uninitialized => {
                tracing::warn!(op, "scene operation before mount");
                Err(SceneError::NotMounted.into())
            }
            SceneState::Destroyed => {
                tracing::warn!(op, "scene operation after teardown");
                Err(SceneError::Destroyed.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, HeadlessContainer};
    use crate::builder::{BuildMode, GeometryBuilder};
    use crate::error::KnotviewError;
    use crate::eval::SampledCurve;
    use crate::math::{Point3, Vector3};
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn scene() -> SceneManager<HeadlessBackend> {
        SceneManager::new(
            HeadlessBackend::new(),
            &CameraConfig::default(),
            ControlsConfig::default(),
            Duration::from_millis(100),
        )
    }

    fn ring_geometry(center: Point3, theme: DisplayTheme) -> CurveGeometry {
        #[allow(clippy::cast_precision_loss)]
        let points = (0..48)
            .map(|i| {
                let a = TAU * i as f64 / 48.0;
                center + Vector3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let curve = SampledCurve::new(points).unwrap();
        GeometryBuilder::default().build(&curve, theme, BuildMode::Tube)
    }

    fn is_scene_error(err: &KnotviewError, expected: SceneError) -> bool {
        matches!(err, KnotviewError::Scene(e) if *e == expected)
    }

    #[test]
    fn mount_allocates_surface_helpers_and_listeners() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::DARK).unwrap();

        assert_eq!(scene.status(), SceneStatus::Active);
        assert_eq!(scene.backend().live_surfaces(), 1);
        assert_eq!(scene.backend().live_meshes(), 5);
        assert_eq!(container.listener_count(), 2);
        assert!(container.attached_surface().is_some());
        assert_relative_eq!(scene.camera().aspect(), 800.0 / 600.0);
    }

    #[test]
    fn mount_twice_is_rejected() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();
        let err = scene.mount(&mut container, DisplayTheme::LIGHT).unwrap_err();
        assert!(is_scene_error(&err, SceneError::AlreadyMounted));
    }

    #[test]
    fn operations_before_mount_fail() {
        let mut scene = scene();
        let err = scene
            .set_curve(ring_geometry(Point3::origin(), DisplayTheme::LIGHT))
            .unwrap_err();
        assert!(is_scene_error(&err, SceneError::NotMounted));
        assert!(scene.render().is_err());
    }

    #[test]
    fn swap_releases_previous_curve() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();

        for _ in 0..5 {
            scene
                .set_curve(ring_geometry(Point3::origin(), DisplayTheme::LIGHT))
                .unwrap();
            scene.render().unwrap();
            assert_eq!(scene.backend().last_frame().unwrap().missing, 0);
        }
        // Five helpers plus exactly one curve.
        assert_eq!(scene.backend().live_meshes(), 6);
        assert_eq!(scene.backend().stats().releases, 4);
    }

    #[test]
    fn swap_recenters_on_curve_bounds() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();
        let eye = scene.camera().position;

        scene
            .set_curve(ring_geometry(Point3::new(5.0, 0.0, 0.0), DisplayTheme::LIGHT))
            .unwrap();
        assert_relative_eq!(scene.controls().target(), Point3::new(5.0, 0.0, 0.0), epsilon = 1e-3);
        assert_relative_eq!(scene.camera().position, eye);

        scene.update_controls();
        assert_relative_eq!(scene.camera().position, eye, epsilon = 1e-9);
    }

    #[test]
    fn resize_is_debounced() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();

        let t0 = Instant::now();
        for i in 0..20u32 {
            let now = t0 + Duration::from_millis(u64::from(i) * 5);
            scene.resize(1000 + i, 500, now).unwrap();
            assert!(!scene.flush_resize(now));
        }
        assert!(!scene.flush_resize(t0 + Duration::from_millis(150)));
        assert!(scene.flush_resize(t0 + Duration::from_millis(195)));

        assert_eq!(scene.size(), Some((1019, 500)));
        assert_eq!(scene.backend().stats().resizes, 1);
        assert_relative_eq!(scene.camera().aspect(), 1019.0 / 500.0);
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();
        let t0 = Instant::now();
        scene.resize(0, 600, t0).unwrap();
        assert!(!scene.flush_resize(t0 + Duration::from_secs(1)));
        assert_eq!(scene.size(), Some((800, 600)));
    }

    #[test]
    fn theme_change_recolors_without_reallocating() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();
        scene
            .set_curve(ring_geometry(Point3::origin(), DisplayTheme::LIGHT))
            .unwrap();
        let uploads = scene.backend().stats().uploads;

        scene.set_theme(DisplayTheme::DARK).unwrap();
        scene.render().unwrap();

        let stats = scene.backend().stats();
        assert_eq!(stats.uploads, uploads);
        assert_eq!(stats.material_updates, 6);
        let frame = scene.backend().last_frame().unwrap();
        assert_eq!(frame.clear_color, DisplayTheme::DARK.palette().background);
        assert_eq!(frame.light_count, 2);
    }

    #[test]
    fn destroy_releases_everything() {
        let mut scene = scene();
        let mut container = HeadlessContainer::new(800, 600);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();
        scene
            .set_curve(ring_geometry(Point3::origin(), DisplayTheme::LIGHT))
            .unwrap();

        scene.destroy(&mut container);
        assert_eq!(scene.status(), SceneStatus::Destroyed);
        assert_eq!(scene.backend().live_meshes(), 0);
        assert_eq!(scene.backend().live_surfaces(), 0);
        assert_eq!(scene.backend().stats().invalid_handles, 0);
        assert_eq!(container.listener_count(), 0);
        assert!(container.attached_surface().is_none());

        // Later calls are errors, never panics, and allocate nothing.
        let err = scene
            .set_curve(ring_geometry(Point3::origin(), DisplayTheme::LIGHT))
            .unwrap_err();
        assert!(is_scene_error(&err, SceneError::Destroyed));
        assert!(scene.resize(10, 10, Instant::now()).is_err());
        assert!(scene.set_theme(DisplayTheme::DARK).is_err());
        scene.destroy(&mut container);
        assert_eq!(scene.backend().live_meshes(), 0);
        assert_eq!(scene.backend().stats().invalid_handles, 0);
    }
}
