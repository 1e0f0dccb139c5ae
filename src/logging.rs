pub use log::LevelFilter::*;

#[cfg(target_arch = "wasm32")]
struct JsLog;

#[cfg(target_arch = "wasm32")]
impl log::Log for JsLog {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&format!("{}", record.args())));
    }

    fn flush(&self) {}
}

fn format_message(out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args!("({}) {}: {}", record.level(), record.target(), message))
}

/// Route `log` output to the console. Only the first call in a process takes effect.
pub fn setup_logging(verbosity: log::LevelFilter) {
    let dispatch = fern::Dispatch::new().level(verbosity).format(format_message);

    #[cfg(target_arch = "wasm32")]
    let dispatch = dispatch.chain(Box::new(JsLog) as Box<dyn log::Log>);

    #[cfg(not(target_arch = "wasm32"))]
    let dispatch = dispatch.chain(std::io::stdout());

    if dispatch.apply().is_err() {
        log::debug!("Logging already initialized");
    }
}
