//! Live code-to-geometry rendering core for parametric 3D curves.
//!
//! Source text defining `generatePoints(t)` flows through
//! [`CurveEvaluator`] into a [`SampledCurve`], through [`GeometryBuilder`]
//! into [`CurveGeometry`], and into a persistent [`SceneManager`] redrawn by
//! a [`RenderLoop`]. [`CurveView`] wires the chain together.

pub mod backend;
pub mod builder;
pub mod config;
pub mod controls;
pub mod error;
pub mod eval;
pub mod geometry;
pub mod math;
pub mod presets;
pub mod render_loop;
pub mod scene;
pub mod tessellation;
pub mod theme;
pub mod view;

pub use builder::{BuildMode, CurveGeometry, GeometryBuilder};
pub use config::{CameraConfig, ViewConfig};
pub use controls::{ControlsConfig, ViewportController};
pub use error::{KnotviewError, Result};
pub use eval::{CurveEvaluator, Diagnostic, DiagnosticSink, EvalLimits, SampledCurve, TracingSink};
pub use render_loop::RenderLoop;
pub use scene::SceneManager;
pub use theme::DisplayTheme;
pub use view::{CurveView, UpdateOutcome};
