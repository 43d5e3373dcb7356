//! Wires evaluation, meshing, the scene and the render loop into one view.

use std::time::Instant;

use crate::backend::{Container, RenderBackend};
use crate::builder::GeometryBuilder;
use crate::config::ViewConfig;
use crate::controls::PointerInput;
use crate::error::Result;
use crate::eval::{CurveEvaluator, DiagnosticSink, SampledCurve};
use crate::render_loop::{CancellationToken, FrameOutcome, FrameScheduler, RenderLoop};
use crate::scene::SceneManager;
use crate::theme::DisplayTheme;

/// Result of feeding new source text to a [`CurveView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The new curve is on screen.
    Updated,
    /// The source failed; the last good curve is still shown.
    Retained,
    /// The source failed and there is no earlier curve to show.
    Empty,
}

/// A mounted, live curve viewport.
///
/// Source and theme changes re-run evaluation and meshing; resizes and
/// pointer input only touch the camera. A failed edit never clears the
/// screen: the last curve that evaluated cleanly stays up.
#[derive(Debug)]
pub struct CurveView<B> {
    scene: SceneManager<B>,
    render_loop: RenderLoop,
    evaluator: CurveEvaluator,
    builder: GeometryBuilder,
    config: ViewConfig,
    theme: DisplayTheme,
    last_good: Option<SampledCurve>,
}

impl<B: RenderBackend> CurveView<B> {
    /// Mounts a view into `container`, starts its render loop and evaluates
    /// `source`.
    ///
    /// A bad `source` does not fail the mount; the view starts empty and the
    /// problem goes to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the scene cannot be
    /// mounted.
    pub fn mount<C, S, D>(
        backend: B,
        container: &mut C,
        scheduler: &mut S,
        source: &str,
        theme: DisplayTheme,
        config: ViewConfig,
        sink: D,
    ) -> Result<Self>
    where
        C: Container,
        S: FrameScheduler,
        D: DiagnosticSink + 'static,
    {
        config.validate()?;

        let mut scene =
            SceneManager::new(backend, &config.camera, config.controls, config.resize_debounce);
        scene.mount(container, theme)?;
        let render_loop = RenderLoop::start(scheduler, config.frame_interval);

        let mut view = Self {
            scene,
            render_loop,
            evaluator: CurveEvaluator::new(config.eval_limits, Box::new(sink)),
            builder: GeometryBuilder::new(config.tube),
            config,
            theme,
            last_good: None,
        };
        let outcome = view.set_source(source);
        tracing::info!(?outcome, "curve view mounted");
        Ok(view)
    }

    #[must_use]
    pub fn scene(&self) -> &SceneManager<B> {
        &self.scene
    }

    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub fn theme(&self) -> DisplayTheme {
        self.theme
    }

    /// The unscaled samples behind the curve on screen.
    #[must_use]
    pub fn last_good_samples(&self) -> Option<&SampledCurve> {
        self.last_good.as_ref()
    }

    /// Token revoked when the view's render loop stops.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.render_loop.token()
    }

    /// Evaluates `source` and shows the result.
    ///
    /// Evaluation errors have already been reported to the diagnostic sink
    /// when this returns.
    pub fn set_source(&mut self, source: &str) -> UpdateOutcome {
        let curve = match self.evaluator.evaluate(source, self.config.samples) {
            Ok(curve) => curve,
            Err(err) => {
                tracing::debug!(%err, "keeping previous curve");
                return self.fallback_outcome();
            }
        };

        match self.show(&curve) {
            Ok(()) => {
                self.last_good = Some(curve);
                UpdateOutcome::Updated
            }
            Err(err) => {
                tracing::warn!(%err, "could not attach curve");
                self.fallback_outcome()
            }
        }
    }

    /// Switches theme: recolors the scene and rebuilds the curve from the
    /// last good samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene rejects the change or the rebuilt
    /// curve cannot be uploaded.
    pub fn set_theme(&mut self, theme: DisplayTheme) -> Result<()> {
        if theme == self.theme {
            return Ok(());
        }
        self.scene.set_theme(theme)?;
        self.theme = theme;

        if let Some(curve) = self.last_good.take() {
            let shown = self.show(&curve);
            self.last_good = Some(curve);
            shown?;
        }
        Ok(())
    }

    /// Queues a debounced viewport resize.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene is not mounted.
    pub fn resize(&mut self, width: u32, height: u32, now: Instant) -> Result<()> {
        self.scene.resize(width, height, now)
    }

    /// Forwards pointer input to the viewport controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene is not mounted.
    pub fn pointer(&mut self, input: PointerInput) -> Result<()> {
        self.scene.pointer(input)
    }

    /// Runs one display-refresh callback.
    pub fn tick<S: FrameScheduler>(&mut self, now: Instant, scheduler: &mut S) -> FrameOutcome {
        self.render_loop.tick(now, scheduler, &mut self.scene)
    }

    /// Stops the loop and tears the scene down, handing back the backend.
    ///
    /// When this returns no frame request is outstanding and every backend
    /// resource the view allocated has been released.
    pub fn unmount<C, S>(mut self, container: &mut C, scheduler: &mut S) -> B
    where
        C: Container,
        S: FrameScheduler,
    {
        self.render_loop.stop(scheduler);
        self.scene.destroy(container);
        tracing::info!("curve view unmounted");
        self.scene.into_backend()
    }

    fn show(&mut self, curve: &SampledCurve) -> Result<()> {
        let scaled = curve.scaled(self.config.scale);
        let geometry = self.builder.build(&scaled, self.theme, self.config.mode);
        self.scene.set_curve(geometry)
    }

    fn fallback_outcome(&self) -> UpdateOutcome {
        if self.scene.curve().is_some() {
            UpdateOutcome::Retained
        } else {
            UpdateOutcome::Empty
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, HeadlessContainer};
    use crate::builder::BuildMode;
    use crate::eval::{Diagnostic, TracingSink};
    use crate::math::Point3;
    use crate::render_loop::ManualScheduler;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    const CIRCLE: &str = "fn generatePoints(t) { [Math::sin(t), Math::cos(t), 0.0] }";
    const TREFOIL: &str = r"
        fn generatePoints(t) {
            let x = Math::sin(t) + 2.0 * Math::sin(2.0 * t);
            let y = Math::cos(t) - 2.0 * Math::cos(2.0 * t);
            let z = -Math::sin(3.0 * t);
            [x, y, z]
        }
    ";
    const BROKEN: &str = "fn generatePoints(t) { [t, ";

    fn config() -> ViewConfig {
        ViewConfig {
            samples: 120,
            ..ViewConfig::default()
        }
    }

    fn mount_with(
        source: &str,
        config: ViewConfig,
    ) -> (
        CurveView<HeadlessBackend>,
        HeadlessContainer,
        ManualScheduler,
        Rc<RefCell<Vec<Diagnostic>>>,
    ) {
        let mut container = HeadlessContainer::new(800, 600);
        let mut scheduler = ManualScheduler::new();
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let reports = Rc::clone(&reports);
            move |d: &Diagnostic| reports.borrow_mut().push(d.clone())
        };
        let view = CurveView::mount(
            HeadlessBackend::new(),
            &mut container,
            &mut scheduler,
            source,
            DisplayTheme::DARK,
            config,
            sink,
        )
        .unwrap();
        (view, container, scheduler, reports)
    }

    #[test]
    fn mount_shows_initial_curve() {
        let (view, _container, _scheduler, reports) = mount_with(TREFOIL, config());
        let curve = view.scene().curve().unwrap();
        assert_eq!(curve.mode(), BuildMode::Tube);
        assert_eq!(view.last_good_samples().unwrap().len(), 120);
        assert!(reports.borrow().is_empty());
        // Helpers plus the curve.
        assert_eq!(view.scene().backend().live_meshes(), 6);
    }

    #[test]
    fn points_are_scaled_before_meshing() {
        let line = ViewConfig {
            mode: BuildMode::Line,
            ..config()
        };
        let (view, _container, _scheduler, _reports) = mount_with(CIRCLE, line);
        let first = view.scene().curve().unwrap().positions()[0];
        assert_relative_eq!(first, Point3::new(0.0, 6.0, 0.0), epsilon = 1e-12);
        let raw = view.last_good_samples().unwrap().points()[0];
        assert_relative_eq!(raw, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn broken_edit_keeps_last_good_curve() {
        let (mut view, _container, _scheduler, reports) = mount_with(TREFOIL, config());
        let before = view.scene().curve().unwrap().clone();
        let uploads = view.scene().backend().stats().uploads;

        assert_eq!(view.set_source(BROKEN), UpdateOutcome::Retained);
        assert_eq!(view.scene().curve().unwrap(), &before);
        assert_eq!(view.scene().backend().stats().uploads, uploads);

        let reports = reports.borrow();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_fatal());
    }

    #[test]
    fn broken_first_source_leaves_view_empty() {
        let (mut view, _container, _scheduler, reports) = mount_with(BROKEN, config());
        assert!(view.scene().curve().is_none());
        assert_eq!(reports.borrow().len(), 1);

        assert_eq!(view.set_source("fn generatePoints(t) { throw 1; }"), UpdateOutcome::Empty);
        assert_eq!(view.set_source(CIRCLE), UpdateOutcome::Updated);
        assert!(view.scene().curve().is_some());
    }

    #[test]
    fn theme_change_rebuilds_from_last_good_samples() {
        let (mut view, _container, _scheduler, reports) = mount_with(TREFOIL, config());
        let dark = view.scene().curve().unwrap().clone();

        // A failing edit must not leak into the rebuild.
        view.set_source(BROKEN);
        view.set_theme(DisplayTheme::LIGHT).unwrap();

        let light = view.scene().curve().unwrap();
        assert_eq!(light.positions(), dark.positions());
        assert_eq!(light.material().color, DisplayTheme::LIGHT.palette().curve);
        assert_eq!(light.theme(), DisplayTheme::LIGHT);
        assert_eq!(reports.borrow().len(), 1);
        assert_eq!(view.scene().backend().live_meshes(), 6);
    }

    #[test]
    fn new_curve_recenters_without_moving_eye() {
        let offset = ViewConfig {
            scale: 1.0,
            ..config()
        };
        let (mut view, _container, mut scheduler, _reports) = mount_with(CIRCLE, offset);
        let eye = view.scene().camera().position;

        let shifted = "fn generatePoints(t) { [5.0 + Math::cos(t), Math::sin(t), 0.0] }";
        assert_eq!(view.set_source(shifted), UpdateOutcome::Updated);
        assert_relative_eq!(
            view.scene().controls().target(),
            Point3::new(5.0, 0.0, 0.0),
            epsilon = 1e-2
        );

        scheduler.fire();
        assert_eq!(view.tick(Instant::now(), &mut scheduler), FrameOutcome::Rendered);
        assert_relative_eq!(view.scene().camera().position, eye, epsilon = 1e-9);
    }

    #[test]
    fn distant_curve_does_not_pull_the_eye() {
        let unscaled = ViewConfig {
            scale: 1.0,
            ..config()
        };
        let (mut view, _container, mut scheduler, _reports) = mount_with(CIRCLE, unscaled);
        let eye = view.scene().camera().position;

        let distant = "fn generatePoints(t) { [800.0 + Math::cos(t), Math::sin(t), 0.0] }";
        assert_eq!(view.set_source(distant), UpdateOutcome::Updated);

        let t0 = Instant::now();
        for i in 0..5u64 {
            scheduler.fire();
            view.tick(t0 + Duration::from_millis(i * 20), &mut scheduler);
        }
        assert_relative_eq!(view.scene().camera().position, eye, epsilon = 1e-9);
        assert!(view.scene().camera().target().x > 799.0);
    }

    #[test]
    fn ticks_render_every_attached_mesh() {
        let (mut view, _container, mut scheduler, _reports) = mount_with(TREFOIL, config());
        let t0 = Instant::now();
        for i in 0..10u64 {
            scheduler.fire();
            view.tick(t0 + Duration::from_millis(i * 20), &mut scheduler);
        }
        let backend = view.scene().backend();
        assert_eq!(backend.stats().frames, 10);
        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.draw_list.len(), 6);
        assert_eq!(frame.missing, 0);
    }

    #[test]
    fn resize_reaches_camera_after_quiet_period() {
        let (mut view, _container, mut scheduler, _reports) = mount_with(CIRCLE, config());
        let t0 = Instant::now();
        view.resize(1200, 600, t0).unwrap();

        scheduler.fire();
        view.tick(t0 + Duration::from_millis(50), &mut scheduler);
        assert_relative_eq!(view.scene().camera().aspect(), 800.0 / 600.0);

        scheduler.fire();
        view.tick(t0 + Duration::from_millis(120), &mut scheduler);
        assert_relative_eq!(view.scene().camera().aspect(), 2.0);
    }

    #[test]
    fn mount_unmount_cycles_leave_nothing_behind() {
        let mut container = HeadlessContainer::new(640, 480);
        let mut scheduler = ManualScheduler::new();
        let mounts = 25;

        for i in 0..mounts {
            let view = CurveView::mount(
                HeadlessBackend::new(),
                &mut container,
                &mut scheduler,
                CIRCLE,
                DisplayTheme::LIGHT,
                config(),
                TracingSink,
            )
            .unwrap();
            let token = view.cancellation_token();
            if i % 2 == 0 {
                scheduler.fire();
                let mut view = view;
                view.tick(Instant::now(), &mut scheduler);
                let backend = view.unmount(&mut container, &mut scheduler);
                assert_eq!(backend.live_meshes(), 0);
                assert_eq!(backend.live_surfaces(), 0);
            } else {
                let backend = view.unmount(&mut container, &mut scheduler);
                assert_eq!(backend.live_meshes(), 0);
            }
            assert!(token.is_cancelled());
        }

        assert_eq!(scheduler.outstanding(), 0);
        assert_eq!(scheduler.cancelled(), mounts);
        assert_eq!(container.listener_count(), 0);
        assert!(container.attached_surface().is_none());
    }

    #[test]
    fn invalid_config_fails_mount() {
        let mut container = HeadlessContainer::new(640, 480);
        let mut scheduler = ManualScheduler::new();
        let config = ViewConfig {
            scale: 0.0,
            ..ViewConfig::default()
        };
        let result = CurveView::mount(
            HeadlessBackend::new(),
            &mut container,
            &mut scheduler,
            CIRCLE,
            DisplayTheme::LIGHT,
            config,
            TracingSink,
        );
        assert!(result.is_err());
        assert_eq!(scheduler.requested(), 0);
        assert_eq!(container.listener_count(), 0);
    }
}
