use crate::error::EvalError;

/// What went wrong during an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// The source text could not be turned into a callable.
    ConstructionFailed,
    /// Some samples were dropped; the evaluation may still have succeeded.
    SamplesSkipped {
        skipped: usize,
        total: usize,
        /// Parameter value of the first dropped sample.
        first_t: f64,
    },
    /// Too few samples survived to form a curve.
    InsufficientPoints { valid: usize, required: usize },
}

/// A single report sent to a [`DiagnosticSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    /// Builds the diagnostic describing a fatal evaluation error.
    #[must_use]
    pub fn from_error(err: &EvalError) -> Self {
        let kind = match err {
            EvalError::ConstructionFailed { .. } => DiagnosticKind::ConstructionFailed,
            EvalError::InsufficientPoints { valid, required } => DiagnosticKind::InsufficientPoints {
                valid: *valid,
                required: *required,
            },
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }

    /// Returns `true` if the evaluation that produced this report failed.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::SamplesSkipped { .. })
    }
}

/// Receives evaluation diagnostics.
///
/// Any `Fn(&Diagnostic)` closure is a sink.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic),
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Sink that forwards every diagnostic to `tracing` at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::warn!(kind = ?diagnostic.kind, "{}", diagnostic.message);
    }
}
