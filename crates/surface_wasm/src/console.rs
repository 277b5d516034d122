//! `log` records forwarded to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = debug)]
    fn console_debug(message: &str);
    #[wasm_bindgen(js_namespace = console, js_name = info)]
    fn console_info(message: &str);
    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    fn console_warn(message: &str);
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(message: &str);
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("[{}] {}", record.target(), record.args());
        match record.level() {
            Level::Error => console_error(&message),
            Level::Warn => console_warn(&message),
            Level::Info => console_info(&message),
            Level::Debug | Level::Trace => console_debug(&message),
        }
    }

    fn flush(&self) {}
}

/// Installs the console logger at `level` ("off", "error", "warn", "info",
/// "debug", "trace"). Calling it again only changes the level.
#[wasm_bindgen]
pub fn init_logging(level: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let filter: LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("Unknown log level: {level}")))?;
    // Already installed on repeat calls; only the level changes then.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
    Ok(())
}
