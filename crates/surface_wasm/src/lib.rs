//! WebAssembly bridge for `surface_core`.
//!
//! JavaScript functions `(x, y) => number` are wrapped as oracles, results are
//! returned as plain JS objects, and errors as string `JsValue`s.

mod analysis;
mod console;
mod integral;
mod oracle;

pub use analysis::*;
pub use console::init_logging;
pub use integral::WasmIntegralRunner;
