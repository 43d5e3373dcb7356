//! The stock curve library a fresh installation starts with.

use std::time::SystemTime;

/// A saved curve as held by the host's item store.
///
/// The rendering core only ever reads `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: String,
    pub last_modified: SystemTime,
}

impl CurveDefinition {
    fn stock(id: &str, name: &str, description: &str, source: &str, now: SystemTime) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            source: source.trim_start().to_owned(),
            last_modified: now,
        }
    }
}

const TREFOIL: &str = r"
fn generatePoints(t) {
    // Trefoil knot
    let x = Math::sin(t) + 2.0 * Math::sin(2.0 * t);
    let y = Math::cos(t) - 2.0 * Math::cos(2.0 * t);
    let z = -Math::sin(3.0 * t);
    [x, y, z]
}
";

const FIGURE_EIGHT: &str = r"
fn generatePoints(t) {
    // Figure-eight knot
    let x = (2.0 + Math::cos(2.0 * t)) * Math::cos(3.0 * t);
    let y = (2.0 + Math::cos(2.0 * t)) * Math::sin(3.0 * t);
    let z = Math::sin(4.0 * t);
    [x, y, z]
}
";

const LEMNISCATE: &str = r"
fn generatePoints(t) {
    // r = a * sqrt(|cos 2t|) keeps the root real on every sample.
    let a = 5.0;
    let r = a * Math::sqrt(Math::abs(Math::cos(2.0 * t)));
    let x = r * Math::cos(t);
    let y = r * Math::sin(t);
    [x, y, 0.0]
}
";

const MOBIUS_SLICE: &str = r"
fn generatePoints(t) {
    // One edge of a strip around a circle of radius R, with a slow twist.
    let R = 5.0;
    let twist = Math::sin(3.0 * t) * 0.5;
    let x = (R + twist * Math::cos(t / 2.0)) * Math::cos(t);
    let y = (R + twist * Math::cos(t / 2.0)) * Math::sin(t);
    let z = twist * Math::sin(t / 2.0);
    [x, y, z]
}
";

const SINE_WAVE: &str = r"
fn generatePoints(t) {
    let scale = 3.1;
    [scale * t, scale * Math::sin(t), 0.0]
}
";

/// Returns the five stock curves, stamped with the current time.
#[must_use]
pub fn default_curves() -> Vec<CurveDefinition> {
    let now = SystemTime::now();
    vec![
        CurveDefinition::stock(
            "trefoil",
            "Trefoil Knot",
            "The simplest non-trivial knot, traced by a smooth parametric curve.",
            TREFOIL,
            now,
        ),
        CurveDefinition::stock(
            "figureEight",
            "Figure-Eight Knot",
            "A knot whose projection crosses itself four times.",
            FIGURE_EIGHT,
            now,
        ),
        CurveDefinition::stock(
            "lemniscate",
            "Lemniscate of Bernoulli",
            "A figure-eight curve in the XY plane.",
            LEMNISCATE,
            now,
        ),
        CurveDefinition::stock(
            "mobius",
            "Möbius Slice",
            "One edge of a twisting strip, looping once around a circle.",
            MOBIUS_SLICE,
            now,
        ),
        CurveDefinition::stock(
            "sineCurve2D",
            "Sine Wave",
            "One period of a sine wave in the XY plane.",
            SINE_WAVE,
            now,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builder::{BuildMode, GeometryBuilder};
    use crate::eval::{CurveEvaluator, EvalLimits, TracingSink, DEFAULT_SAMPLES};
    use crate::theme::DisplayTheme;
    use approx::assert_relative_eq;

    fn evaluator() -> CurveEvaluator {
        CurveEvaluator::new(EvalLimits::default(), Box::new(TracingSink))
    }

    #[test]
    fn ids_are_unique() {
        let curves = default_curves();
        assert_eq!(curves.len(), 5);
        for (i, a) in curves.iter().enumerate() {
            assert!(curves[i + 1..].iter().all(|b| b.id != a.id));
            assert!(a.source.starts_with("fn generatePoints"));
        }
    }

    #[test]
    fn every_preset_evaluates_fully_and_meshes_as_tube() {
        let evaluator = evaluator();
        let builder = GeometryBuilder::default();
        for curve in default_curves() {
            let samples = evaluator.evaluate(&curve.source, DEFAULT_SAMPLES).unwrap();
            assert_eq!(samples.len(), DEFAULT_SAMPLES, "{}", curve.id);
            let geometry = builder.build(&samples.scaled(6.0), DisplayTheme::DARK, BuildMode::Tube);
            assert_eq!(geometry.mode(), BuildMode::Tube, "{}", curve.id);
        }
    }

    #[test]
    fn trefoil_starts_where_expected() {
        let trefoil = &default_curves()[0];
        let samples = evaluator().evaluate(&trefoil.source, DEFAULT_SAMPLES).unwrap();
        // t = 0: (0, 1 - 2, 0)
        assert_relative_eq!(samples.points()[0].y, -1.0, epsilon = 1e-12);
        assert!(samples.closing_gap() < 1.5 * samples.mean_step());
    }

    #[test]
    fn planar_presets_stay_in_xy_plane() {
        let evaluator = evaluator();
        for curve in default_curves()
            .iter()
            .filter(|c| c.id == "lemniscate" || c.id == "sineCurve2D")
        {
            let samples = evaluator.evaluate(&curve.source, DEFAULT_SAMPLES).unwrap();
            assert!(samples.points().iter().all(|p| p.z == 0.0), "{}", curve.id);
        }
    }
}
