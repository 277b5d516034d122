//! JS callables as function oracles, plus settings decoding.

use js_sys::Function;
use serde::de::DeserializeOwned;
use serde_wasm_bindgen::from_value;
use surface_core::error::EvaluationFailure;
use surface_core::Oracle;
use wasm_bindgen::prelude::*;

/// Wraps `(x, y) => number`. A thrown exception, a non-number result, or a
/// non-finite number is an evaluation failure.
#[derive(Clone)]
pub(crate) struct JsOracle {
    func: Function,
}

impl JsOracle {
    pub(crate) fn new(func: &Function) -> Self {
        Self { func: func.clone() }
    }
}

impl Oracle for JsOracle {
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationFailure> {
        self.func
            .call2(&JsValue::NULL, &JsValue::from_f64(x), &JsValue::from_f64(y))
            .ok()
            .and_then(|value| value.as_f64())
            .filter(|value| value.is_finite())
            .ok_or(EvaluationFailure { x, y })
    }
}

/// `undefined` and `null` select the defaults; partial objects override
/// individual fields.
pub(crate) fn decode_or_default<T>(value: JsValue, what: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| anyhow::anyhow!("invalid {what}: {e}"))
}

pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
