//! Curve source evaluation.
//!
//! Curve definitions are [Rhai](https://rhai.rs) scripts that define a
//! one-argument function named `generatePoints`:
//!
//! ```text
//! fn generatePoints(t) {
//!     let x = Math::sin(t) + 2.0 * Math::sin(2.0 * t);
//!     let y = Math::cos(t) - 2.0 * Math::cos(2.0 * t);
//!     let z = -Math::sin(3.0 * t);
//!     [x, y, z]
//! }
//! ```
//!
//! The function returns `[x, y, z]` or `[x, y]` (z defaults to 0). The engine
//! runs with operation, call-depth and allocation limits, so a runaway script
//! fails its sample instead of stalling the caller.

mod diagnostics;
mod math_module;
mod sampled;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use sampled::SampledCurve;

use std::f64::consts::TAU;

use rhai::{Array, CallFnOptions, Dynamic, Engine, Scope, AST};
use thiserror::Error;

use crate::error::EvalError;
use crate::math::Point3;

/// Name of the script function sampled by the evaluator.
pub const ENTRY_POINT: &str = "generatePoints";

/// Default sampling resolution over one period.
pub const DEFAULT_SAMPLES: usize = 300;

/// Resource limits applied to every script call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum script operations per `generatePoints` call.
    pub max_operations: u64,
    /// Maximum nested function call depth.
    pub max_call_levels: usize,
    /// Maximum expression nesting depth.
    pub max_expr_depth: usize,
    /// Maximum array length a script may build.
    pub max_array_size: usize,
    /// Maximum string length a script may build.
    pub max_string_size: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_operations: 50_000,
            max_call_levels: 32,
            max_expr_depth: 64,
            max_array_size: 1_024,
            max_string_size: 4_096,
        }
    }
}

/// Why a single sample was dropped.
#[derive(Debug, Error)]
enum SampleFailure {
    #[error("script error: {0}")]
    Script(String),

    #[error("expected a point: {0}")]
    NotAPoint(String),

    #[error("non-finite coordinate")]
    NonFinite,
}

/// Compiles curve source text and samples it into a [`SampledCurve`].
///
/// Failures never escape as panics: construction and point-count errors are
/// returned as [`EvalError`] and every failure is also sent to the
/// configured [`DiagnosticSink`].
pub struct CurveEvaluator {
    engine: Engine,
    sink: Box<dyn DiagnosticSink>,
}

impl std::fmt::Debug for CurveEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveEvaluator").finish_non_exhaustive()
    }
}

impl CurveEvaluator {
    /// Creates an evaluator with the given limits and diagnostic sink.
    #[must_use]
    pub fn new(limits: EvalLimits, sink: Box<dyn DiagnosticSink>) -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(limits.max_operations);
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_string_size(limits.max_string_size);
        engine.register_static_module("Math", math_module::math_module().into());
        engine.on_print(|text| tracing::debug!(target: "knotview::script", "{text}"));
        Self { engine, sink }
    }

    /// Evaluates `source` at `samples` equally spaced parameters in `[0, 2π)`.
    ///
    /// Samples that error, or return something other than two or three
    /// finite numbers, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::ConstructionFailed`] if the source does not
    /// compile or does not define `generatePoints(t)`, and
    /// [`EvalError::InsufficientPoints`] if fewer than two samples survive.
    #[tracing::instrument(skip(self, source), fields(source_len = source.len()))]
    pub fn evaluate(&self, source: &str, samples: usize) -> Result<SampledCurve, EvalError> {
        let mut function = match self.construct(source) {
            Ok(function) => function,
            Err(err) => {
                self.sink.report(&Diagnostic::from_error(&err));
                return Err(err);
            }
        };

        let mut points = Vec::with_capacity(samples);
        let mut skipped = 0;
        let mut first_failure: Option<(f64, SampleFailure)> = None;

        for i in 0..samples {
            let t = sample_parameter(i, samples);
            match function.sample(t) {
                Ok(p) => points.push(p),
                Err(failure) => {
                    tracing::trace!(t, %failure, "sample skipped");
                    skipped += 1;
                    first_failure.get_or_insert((t, failure));
                }
            }
        }

        if let Some((first_t, failure)) = first_failure {
            self.sink.report(&Diagnostic {
                kind: DiagnosticKind::SamplesSkipped {
                    skipped,
                    total: samples,
                    first_t,
                },
                message: format!(
                    "skipped {skipped} of {samples} samples; first at t = {first_t:.4}: {failure}"
                ),
            });
        }

        let curve = SampledCurve::new(points).inspect_err(|err| {
            self.sink.report(&Diagnostic::from_error(err));
        })?;
        tracing::debug!(points = curve.len(), skipped, "curve evaluated");
        Ok(curve)
    }

    /// Compiles `source` and checks that it defines the entry point.
    fn construct(&self, source: &str) -> Result<CurveFunction<'_>, EvalError> {
        let ast = self
            .engine
            .compile(source)
            .map_err(|err| EvalError::ConstructionFailed {
                reason: err.to_string(),
            })?;

        let has_entry_point = ast
            .iter_functions()
            .any(|f| f.name == ENTRY_POINT && f.params.len() == 1);
        if !has_entry_point {
            return Err(EvalError::ConstructionFailed {
                reason: format!("no `{ENTRY_POINT}(t)` function defined"),
            });
        }

        // Top-level statements run once here, not once per sample.
        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| EvalError::ConstructionFailed {
                reason: err.to_string(),
            })?;

        Ok(CurveFunction {
            engine: &self.engine,
            ast,
            scope,
        })
    }
}

/// A compiled `generatePoints` ready to be sampled.
struct CurveFunction<'e> {
    engine: &'e Engine,
    ast: AST,
    scope: Scope<'static>,
}

impl CurveFunction<'_> {
    fn sample(&mut self, t: f64) -> Result<Point3, SampleFailure> {
        let options = CallFnOptions::new().eval_ast(false);
        let value: Dynamic = self
            .engine
            .call_fn_with_options(options, &mut self.scope, &self.ast, ENTRY_POINT, (t,))
            .map_err(|err| SampleFailure::Script(err.to_string()))?;
        point_from_dynamic(value)
    }
}

/// Returns the `i`-th of `n` equally spaced parameters in `[0, 2π)`.
#[allow(clippy::cast_precision_loss)]
fn sample_parameter(i: usize, n: usize) -> f64 {
    TAU * i as f64 / n as f64
}

fn point_from_dynamic(value: Dynamic) -> Result<Point3, SampleFailure> {
    let type_name = value.type_name();
    let Some(items) = value.try_cast::<Array>() else {
        return Err(SampleFailure::NotAPoint(format!(
            "`{ENTRY_POINT}` returned {type_name}, not an array"
        )));
    };

    let coords = items
        .iter()
        .map(coordinate)
        .collect::<Result<Vec<f64>, _>>()?;
    let point = match coords.as_slice() {
        [x, y] => Point3::new(*x, *y, 0.0),
        [x, y, z] => Point3::new(*x, *y, *z),
        _ => {
            return Err(SampleFailure::NotAPoint(format!(
                "expected 2 or 3 coordinates, got {}",
                coords.len()
            )))
        }
    };

    if point.coords.iter().all(|c| c.is_finite()) {
        Ok(point)
    } else {
        Err(SampleFailure::NonFinite)
    }
}

#[allow(clippy::cast_precision_loss)]
fn coordinate(value: &Dynamic) -> Result<f64, SampleFailure> {
    if let Ok(x) = value.as_float() {
        return Ok(x);
    }
    if let Ok(x) = value.as_int() {
        return Ok(x as f64);
    }
    Err(SampleFailure::NotAPoint(format!(
        "coordinate is {}",
        value.type_name()
    )))
}
