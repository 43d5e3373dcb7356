//! The `Math` namespace exposed to curve scripts.
//!
//! Mirrors the usual scientific-calculator surface so function bodies read
//! like `Math::sin(2.0 * t)`. Every function accepts integers or floats and
//! returns a float. Nothing here is stateful or random, which keeps
//! evaluation deterministic.

use rhai::{EvalAltResult, Module, FLOAT, INT};

type Unary = fn(FLOAT) -> FLOAT;
type Binary = fn(FLOAT, FLOAT) -> FLOAT;

const UNARY: &[(&str, Unary)] = &[
    ("sin", FLOAT::sin),
    ("cos", FLOAT::cos),
    ("tan", FLOAT::tan),
    ("asin", FLOAT::asin),
    ("acos", FLOAT::acos),
    ("atan", FLOAT::atan),
    ("sinh", FLOAT::sinh),
    ("cosh", FLOAT::cosh),
    ("tanh", FLOAT::tanh),
    ("sqrt", FLOAT::sqrt),
    ("cbrt", FLOAT::cbrt),
    ("exp", FLOAT::exp),
    ("log", FLOAT::ln),
    ("ln", FLOAT::ln),
    ("log2", FLOAT::log2),
    ("log10", FLOAT::log10),
    ("abs", FLOAT::abs),
    ("floor", FLOAT::floor),
    ("ceil", FLOAT::ceil),
    ("round", FLOAT::round),
    ("trunc", FLOAT::trunc),
    ("sign", sign),
];

const BINARY: &[(&str, Binary)] = &[
    ("atan2", FLOAT::atan2),
    ("pow", FLOAT::powf),
    ("hypot", FLOAT::hypot),
    ("min", FLOAT::min),
    ("max", FLOAT::max),
];

/// Script-side `Math::sign`: zero stays zero, unlike [`f64::signum`].
fn sign(x: FLOAT) -> FLOAT {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_float(x: INT) -> FLOAT {
    x as FLOAT
}

/// Builds the `Math` module.
#[must_use]
pub fn math_module() -> Module {
    let mut module = Module::new();

    module.set_var("PI", std::f64::consts::PI);
    module.set_var("TAU", std::f64::consts::TAU);
    module.set_var("E", std::f64::consts::E);
    module.set_var("SQRT2", std::f64::consts::SQRT_2);
    module.set_var("LN2", std::f64::consts::LN_2);
    module.set_var("LN10", std::f64::consts::LN_10);
    module.set_var("NaN", FLOAT::NAN);
    module.set_var("INFINITY", FLOAT::INFINITY);

    for &(name, f) in UNARY {
        register_unary(&mut module, name, f);
    }
    for &(name, f) in BINARY {
        register_binary(&mut module, name, f);
    }

    module
}

fn register_unary(module: &mut Module, name: &str, f: Unary) {
    module.set_native_fn(name, move |x: FLOAT| -> Result<FLOAT, Box<EvalAltResult>> {
        Ok(f(x))
    });
    module.set_native_fn(name, move |x: INT| -> Result<FLOAT, Box<EvalAltResult>> {
        Ok(f(to_float(x)))
    });
}

fn register_binary(module: &mut Module, name: &str, f: Binary) {
    module.set_native_fn(
        name,
        move |a: FLOAT, b: FLOAT| -> Result<FLOAT, Box<EvalAltResult>> { Ok(f(a, b)) },
    );
    module.set_native_fn(
        name,
        move |a: INT, b: FLOAT| -> Result<FLOAT, Box<EvalAltResult>> { Ok(f(to_float(a), b)) },
    );
    module.set_native_fn(
        name,
        move |a: FLOAT, b: INT| -> Result<FLOAT, Box<EvalAltResult>> { Ok(f(a, to_float(b))) },
    );
    module.set_native_fn(
        name,
        move |a: INT, b: INT| -> Result<FLOAT, Box<EvalAltResult>> {
            Ok(f(to_float(a), to_float(b)))
        },
    );
}
