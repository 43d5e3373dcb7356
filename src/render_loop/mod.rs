//! The per-viewport redraw loop.
//!
//! The host's display refresh drives the loop through a [`FrameScheduler`]:
//! every tick re-arms the next request before doing any work, so a slow or
//! failing frame never breaks the chain. Only [`RenderLoop::stop`] ends it.

mod manual;

pub use manual::ManualScheduler;

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use slotmap::new_key_type;

use crate::backend::RenderBackend;
use crate::scene::SceneManager;

new_key_type! {
    /// Handle to a pending frame callback.
    pub struct FrameRequest;
}

/// Source of display-refresh callbacks.
pub trait FrameScheduler {
    /// Asks for one callback on the next refresh.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraws a pending request. Unknown or already fired requests are
    /// ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Shared flag revoked when a loop stops.
///
/// Clones observe the same flag, so a host callback holding one can tell
/// that its loop is gone.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Too soon after the previous frame; re-armed without drawing.
    Skipped,
    /// The loop is no longer running.
    Stopped,
}

/// Paces redraws of one scene.
#[derive(Debug)]
pub struct RenderLoop {
    pending: Option<FrameRequest>,
    last_frame: Option<Instant>,
    min_interval: Duration,
    token: CancellationToken,
    rendered: u64,
    skipped: u64,
}

impl RenderLoop {
    /// Starts the loop by requesting the first frame.
    pub fn start<S: FrameScheduler>(scheduler: &mut S, min_interval: Duration) -> Self {
        let pending = Some(scheduler.request_frame());
        tracing::debug!(?min_interval, "render loop started");
        Self {
            pending,
            last_frame: None,
            min_interval,
            token: CancellationToken::new(),
            rendered: 0,
            skipped: 0,
        }
    }

    /// Returns a clone of the loop's cancellation token.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Number of frames drawn so far.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.rendered
    }

    /// Number of ticks skipped for arriving too early.
    #[must_use]
    pub fn frames_skipped(&self) -> u64 {
        self.skipped
    }

    /// Handles one refresh callback.
    ///
    /// Flushes a due resize, then, unless the previous frame was drawn less
    /// than `min_interval` ago, advances the controls and renders. A scene
    /// that is no longer mounted stops the loop.
    pub fn tick<S, B>(
        &mut self,
        now: Instant,
        scheduler: &mut S,
        scene: &mut SceneManager<B>,
    ) -> FrameOutcome
    where
        S: FrameScheduler,
        B: RenderBackend,
    {
        if self.token.is_cancelled() {
            return FrameOutcome::Stopped;
        }
        self.pending = Some(scheduler.request_frame());

        scene.flush_resize(now);

        if let Some(last) = self.last_frame {
            if now.saturating_duration_since(last) < self.min_interval {
                self.skipped += 1;
                tracing::trace!("frame skipped");
                return FrameOutcome::Skipped;
            }
        }

        scene.update_controls();
        if let Err(err) = scene.render() {
            tracing::warn!(%err, "stopping render loop");
            self.stop(scheduler);
            return FrameOutcome::Stopped;
        }
        self.last_frame = Some(now);
        self.rendered += 1;
        FrameOutcome::Rendered
    }

    /// Revokes the token and cancels the pending request.
    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        if let Some(request) = self.pending.take() {
            scheduler.cancel_frame(request);
        }
        tracing::debug!(rendered = self.rendered, skipped = self.skipped, "render loop stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, HeadlessContainer};
    use crate::config::CameraConfig;
    use crate::controls::{ControlsConfig, PointerButton, PointerInput};
    use crate::theme::DisplayTheme;

    fn mounted() -> (SceneManager<HeadlessBackend>, HeadlessContainer) {
        let mut scene = SceneManager::new(
            HeadlessBackend::new(),
            &CameraConfig::default(),
            ControlsConfig::default(),
            Duration::from_millis(100),
        );
        let mut container = HeadlessContainer::new(640, 480);
        scene.mount(&mut container, DisplayTheme::LIGHT).unwrap();
        (scene, container)
    }

    /// Fires the outstanding request and runs its tick, as a host would.
    fn step(
        render_loop: &mut RenderLoop,
        scheduler: &mut ManualScheduler,
        scene: &mut SceneManager<HeadlessBackend>,
        now: Instant,
    ) -> FrameOutcome {
        scheduler.fire();
        render_loop.tick(now, scheduler, scene)
    }

    #[test]
    fn frames_closer_than_interval_are_skipped() {
        let (mut scene, _container) = mounted();
        let mut scheduler = ManualScheduler::new();
        let mut render_loop = RenderLoop::start(&mut scheduler, Duration::from_millis(16));

        let t0 = Instant::now();
        assert_eq!(step(&mut render_loop, &mut scheduler, &mut scene, t0), FrameOutcome::Rendered);
        let early = t0 + Duration::from_millis(8);
        assert_eq!(step(&mut render_loop, &mut scheduler, &mut scene, early), FrameOutcome::Skipped);
        let later = t0 + Duration::from_millis(17);
        assert_eq!(step(&mut render_loop, &mut scheduler, &mut scene, later), FrameOutcome::Rendered);

        assert_eq!(render_loop.frames_rendered(), 2);
        assert_eq!(render_loop.frames_skipped(), 1);
        assert_eq!(scene.backend().stats().frames, 2);
        // Every tick re-arms, skipped ones included.
        assert_eq!(scheduler.requested(), 4);
    }

    #[test]
    fn skipped_frames_do_not_advance_controls() {
        let (mut scene, _container) = mounted();
        let mut scheduler = ManualScheduler::new();
        let mut render_loop = RenderLoop::start(&mut scheduler, Duration::from_millis(16));

        let t0 = Instant::now();
        step(&mut render_loop, &mut scheduler, &mut scene, t0);
        scene
            .pointer(PointerInput::Drag {
                button: PointerButton::Primary,
                dx: 50.0,
                dy: 0.0,
            })
            .unwrap();
        let eye = scene.camera().position;
        step(&mut render_loop, &mut scheduler, &mut scene, t0 + Duration::from_millis(1));
        assert_eq!(scene.camera().position, eye);

        step(&mut render_loop, &mut scheduler, &mut scene, t0 + Duration::from_millis(20));
        assert_ne!(scene.camera().position, eye);
    }

    #[test]
    fn stop_cancels_pending_request() {
        let (mut scene, _container) = mounted();
        let mut scheduler = ManualScheduler::new();
        let mut render_loop = RenderLoop::start(&mut scheduler, Duration::from_millis(16));
        let token = render_loop.token();

        step(&mut render_loop, &mut scheduler, &mut scene, Instant::now());
        render_loop.stop(&mut scheduler);
        render_loop.stop(&mut scheduler);

        assert!(token.is_cancelled());
        assert_eq!(scheduler.outstanding(), 0);
        assert_eq!(scheduler.cancelled(), 1);
        assert_eq!(
            step(&mut render_loop, &mut scheduler, &mut scene, Instant::now()),
            FrameOutcome::Stopped
        );
        assert_eq!(scheduler.outstanding(), 0);
    }

    #[test]
    fn destroyed_scene_stops_loop() {
        let (mut scene, mut container) = mounted();
        let mut scheduler = ManualScheduler::new();
        let mut render_loop = RenderLoop::start(&mut scheduler, Duration::from_millis(16));

        scene.destroy(&mut container);
        assert_eq!(
            step(&mut render_loop, &mut scheduler, &mut scene, Instant::now()),
            FrameOutcome::Stopped
        );
        assert!(!render_loop.is_running());
        assert_eq!(scheduler.outstanding(), 0);
    }
}
