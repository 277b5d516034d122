//! One-shot analysis entry points.
//!
//! `hints` is an array such as `["tangent", "square_root"]`; `settings` is a
//! partial `AnalysisSettings` object. Both may be `undefined`.

use crate::oracle::{decode_or_default, to_js_error, JsOracle};
use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use surface_core::engine::{Analyzer, Mode};
use surface_core::integral::Rect;
use surface_core::lagrange::{self, ConstraintCandidate};
use surface_core::range::{self, ExpressionHints};
use surface_core::settings::AnalysisSettings;
use wasm_bindgen::prelude::*;

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn decode_settings(settings: JsValue) -> Result<AnalysisSettings, JsValue> {
    decode_or_default(settings, "settings").map_err(to_js_error)
}

fn build_analyzer(settings: JsValue) -> Result<Analyzer, JsValue> {
    console_error_panic_hook::set_once();
    Analyzer::new(decode_settings(settings)?).map_err(to_js_error)
}

fn decode_hints(hints: JsValue) -> Result<ExpressionHints, JsValue> {
    decode_or_default(hints, "hints").map_err(to_js_error)
}

#[wasm_bindgen]
pub fn pick_safe_range(hints: JsValue) -> Result<JsValue, JsValue> {
    let hints = decode_hints(hints)?;
    serialize(&range::pick_safe_range(&hints))
}

/// Value, gradient and Hessian of `f` at `(x, y)`.
#[wasm_bindgen]
pub fn analyze_point(f: &Function, x: f64, y: f64, settings: JsValue) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    serialize(&analyzer.point(&JsOracle::new(f), x, y))
}

#[wasm_bindgen]
pub fn find_critical_points(
    f: &Function,
    hints: JsValue,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    let hints = decode_hints(hints)?;
    let outcome = analyzer
        .critical_points(Mode::Numeric, &JsOracle::new(f), &hints)
        .map_err(|e| JsValue::from_str(&format!("Critical point search failed: {}", e)))?;
    serialize(&outcome.value)
}

/// Extrema of `f` on `g(x, y) = 0`, labeled relative to each other.
#[wasm_bindgen]
pub fn solve_lagrange(
    f: &Function,
    g: &Function,
    hints: JsValue,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    let hints = decode_hints(hints)?;
    let outcome = analyzer
        .constrained_extrema(Mode::Numeric, &JsOracle::new(f), &JsOracle::new(g), &hints)
        .map_err(|e| JsValue::from_str(&format!("Lagrange solve failed: {}", e)))?;
    serialize(&outcome.value)
}

/// Labels candidates produced elsewhere, e.g. by an exact solver on the host.
#[wasm_bindgen]
pub fn label_candidates(candidates: JsValue, settings: JsValue) -> Result<JsValue, JsValue> {
    let settings = decode_settings(settings)?;
    settings.validate().map_err(to_js_error)?;
    let candidates: Vec<ConstraintCandidate> = serde_wasm_bindgen::from_value(candidates)
        .map_err(|e| JsValue::from_str(&format!("Invalid candidates: {}", e)))?;
    serialize(&lagrange::label_candidates(
        &candidates,
        settings.lagrange.label_tolerance,
    ))
}

/// Points of `g = 0` lifted onto `z = f(x, y)` for drawing on the surface.
#[wasm_bindgen]
pub fn sample_constraint_surface(
    f: &Function,
    g: &Function,
    hints: JsValue,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    let hints = decode_hints(hints)?;
    let points = lagrange::sample_constraint_surface(
        &JsOracle::new(f),
        &JsOracle::new(g),
        range::pick_safe_range(&hints),
        &analyzer.settings().surface_curve,
        analyzer.cancel_token(),
    )
    .map_err(|e| JsValue::from_str(&format!("Constraint sampling failed: {}", e)))?;
    serialize(&points)
}

/// `bounds` is `{x0, x1, y0, y1}`; when absent the safe square for `hints`
/// is used.
#[wasm_bindgen]
pub fn double_integral(
    f: &Function,
    bounds: JsValue,
    hints: JsValue,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    let hints = decode_hints(hints)?;
    let rect: Option<Rect> = decode_or_default(bounds, "bounds").map_err(to_js_error)?;
    let outcome = analyzer
        .double_integral(Mode::Numeric, &JsOracle::new(f), rect, &hints)
        .map_err(|e| JsValue::from_str(&format!("Integration failed: {}", e)))?;
    serialize(&outcome.value)
}

#[wasm_bindgen]
pub fn domain_mask(f: &Function, settings: JsValue) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    let mask = analyzer
        .domain_mask(&JsOracle::new(f))
        .map_err(|e| JsValue::from_str(&format!("Domain sampling failed: {}", e)))?;
    serialize(&mask)
}

/// `{min, max, finite_samples}`, or `undefined` when `f` is nowhere defined.
#[wasm_bindgen]
pub fn estimate_value_range(f: &Function, settings: JsValue) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    let range = analyzer
        .value_range(&JsOracle::new(f))
        .map_err(|e| JsValue::from_str(&format!("Value range failed: {}", e)))?;
    serialize(&range)
}

#[wasm_bindgen]
pub fn probe_limit(f: &Function, x0: f64, y0: f64, settings: JsValue) -> Result<JsValue, JsValue> {
    let analyzer = build_analyzer(settings)?;
    let estimate = analyzer
        .limit(&JsOracle::new(f), x0, y0)
        .map_err(|e| JsValue::from_str(&format!("Limit probe failed: {}", e)))?;
    serialize(&estimate)
}
