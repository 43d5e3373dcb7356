//! Knotview headless demo: drives a full view through the stock curves
//! without a GPU.
//!
//! Usage:
//! ```text
//! cargo run --example headless
//! RUST_LOG=knotview=debug cargo run --example headless
//! ```
//!
//! Each stock curve is loaded into one mounted view, orbited for a second of
//! simulated frames, then followed by a broken edit to show that the last
//! good curve stays on screen. The theme flips halfway through.

use std::time::{Duration, Instant};

use knotview::backend::{HeadlessBackend, HeadlessContainer};
use knotview::controls::{PointerButton, PointerInput};
use knotview::presets::default_curves;
use knotview::render_loop::ManualScheduler;
use knotview::{CurveView, DisplayTheme, KnotviewError, TracingSink, ViewConfig};

/// One simulated display refresh at 60 Hz.
const REFRESH: Duration = Duration::from_micros(16_667);

fn main() -> Result<(), KnotviewError> {
    // Default: WARN for everything, INFO for knotview.
    // Override with RUST_LOG env var (e.g. RUST_LOG=knotview=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("headless=info".parse().unwrap_or_default())
        .add_directive("knotview=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let curves = default_curves();
    let mut container = HeadlessContainer::new(1280, 720);
    let mut scheduler = ManualScheduler::new();
    let mut now = Instant::now();

    let mut view = CurveView::mount(
        HeadlessBackend::new(),
        &mut container,
        &mut scheduler,
        &curves[0].source,
        DisplayTheme::DARK,
        ViewConfig::default(),
        TracingSink,
    )?;

    for (i, curve) in curves.iter().enumerate() {
        let outcome = view.set_source(&curve.source);
        tracing::info!(id = %curve.id, ?outcome, "loaded curve");

        if i == curves.len() / 2 {
            view.set_theme(DisplayTheme::LIGHT)?;
        }

        for frame in 0..60 {
            if frame < 10 {
                view.pointer(PointerInput::Drag {
                    button: PointerButton::Primary,
                    dx: 4.0,
                    dy: 1.0,
                })?;
            }
            scheduler.fire();
            view.tick(now, &mut scheduler);
            now += REFRESH;
        }

        let broken = view.set_source("fn generatePoints(t) { [t, ");
        tracing::info!(id = %curve.id, outcome = ?broken, "after broken edit");

        let scene = view.scene();
        if let Some(geometry) = scene.curve() {
            let center = geometry.bounds().center();
            tracing::info!(
                id = %curve.id,
                mode = ?geometry.mode(),
                vertices = geometry.positions().len(),
                center = ?(center.x, center.y, center.z),
                "curve on screen"
            );
        }
    }

    // A burst of resizes collapses into one.
    for step in 0..10u32 {
        view.resize(1280 - step * 20, 720, now)?;
        now += Duration::from_millis(10);
    }
    for _ in 0..12 {
        scheduler.fire();
        view.tick(now, &mut scheduler);
        now += REFRESH;
    }

    let backend = view.unmount(&mut container, &mut scheduler);
    let stats = backend.stats();
    tracing::info!(
        frames = stats.frames,
        uploads = stats.uploads,
        releases = stats.releases,
        resizes = stats.resizes,
        live_meshes = backend.live_meshes(),
        outstanding_frames = scheduler.outstanding(),
        "view unmounted"
    );
    Ok(())
}
