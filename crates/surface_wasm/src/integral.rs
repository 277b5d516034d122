//! Stepped double-integral runner.

use crate::oracle::{decode_or_default, to_js_error, JsOracle};
use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use surface_core::integral::{IntegralAccumulator, Rect};
use surface_core::settings::IntegralSettings;
use wasm_bindgen::prelude::*;

/// Progress payload for the stepped integral runner.
#[derive(Serialize)]
struct IntegralProgress {
    done: bool,
    rows_done: usize,
    rows_total: usize,
    /// Partial sum over the rows processed so far.
    value: f64,
}

struct IntegralRunnerState {
    oracle: JsOracle,
    accumulator: IntegralAccumulator,
}

impl IntegralRunnerState {
    fn progress(&self) -> IntegralProgress {
        IntegralProgress {
            done: self.accumulator.is_done(),
            rows_done: self.accumulator.rows_done(),
            rows_total: self.accumulator.rows_total(),
            value: self.accumulator.estimate().value,
        }
    }
}

#[wasm_bindgen]
pub struct WasmIntegralRunner {
    state: Option<IntegralRunnerState>,
}

#[wasm_bindgen]
impl WasmIntegralRunner {
    /// `settings` is a partial `{nx, ny}` object or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        f: &Function,
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        settings: JsValue,
    ) -> Result<WasmIntegralRunner, JsValue> {
        console_error_panic_hook::set_once();

        let settings: IntegralSettings =
            decode_or_default(settings, "integral settings").map_err(to_js_error)?;
        let rect = Rect::new(x0, x1, y0, y1)
            .map_err(|e| JsValue::from_str(&format!("Invalid bounds: {}", e)))?;
        let accumulator = IntegralAccumulator::new(rect, &settings)
            .map_err(|e| JsValue::from_str(&format!("Invalid integral settings: {}", e)))?;

        Ok(WasmIntegralRunner {
            state: Some(IntegralRunnerState {
                oracle: JsOracle::new(f),
                accumulator,
            }),
        })
    }

    pub fn is_done(&self) -> bool {
        self.state
            .as_ref()
            .map_or(true, |state| state.accumulator.is_done())
    }

    /// Sums up to `batch_size` more rows.
    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        state
            .accumulator
            .accumulate_rows(&state.oracle, batch_size as usize);

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        if !state.accumulator.is_done() {
            return Err(JsValue::from_str("Integral has not finished yet."));
        }

        to_value(&state.accumulator.estimate())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use serde_wasm_bindgen::from_value;
    use surface_core::integral::IntegralEstimate;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn unit_settings(nx: usize, ny: usize) -> JsValue {
        to_value(&IntegralSettings { nx, ny }).expect("settings")
    }

    #[wasm_bindgen_test]
    fn runner_rejects_inverted_bounds() {
        let f = Function::new_with_args("x, y", "return 1;");
        let result = WasmIntegralRunner::new(&f, 1.0, 0.0, 0.0, 1.0, JsValue::UNDEFINED);
        let message = result.err().and_then(|err| err.as_string()).unwrap_or_default();
        assert!(message.contains("Invalid bounds"), "got {message}");
    }

    #[wasm_bindgen_test]
    fn runner_progresses_and_completes() {
        let f = Function::new_with_args("x, y", "return 1;");
        let mut runner =
            WasmIntegralRunner::new(&f, 0.0, 2.0, 0.0, 3.0, unit_settings(10, 10)).expect("runner");

        assert!(!runner.is_done());
        assert!(runner.get_result().is_err(), "expected unfinished integral");

        runner.run_steps(4).expect("run steps");
        let state = runner.state.as_ref().expect("state");
        assert_eq!(state.accumulator.rows_done(), 4);
        assert!(!runner.is_done());

        runner.run_steps(100).expect("run steps");
        assert!(runner.is_done());

        let estimate: IntegralEstimate =
            from_value(runner.get_result().expect("result")).expect("decode");
        assert!((estimate.value - 6.0).abs() < 1e-6, "got {}", estimate.value);
    }
}
