use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Number;
use web_sys::Window;

use crate::engine::counter::{FrameScheduler, GroupedDigits, NumberFormat};

pub struct AnimationFrames {
    window: Window,
}

impl AnimationFrames {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for AnimationFrames {
    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        let frame = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        if let Err(e) = self.window.request_animation_frame(frame.unchecked_ref()) {
            warn!("requestAnimationFrame failed: {:?}", e);
        }
    }
}

/// Digit grouping the way the visitor's browser does it
/// (`Number.prototype.toLocaleString`).
pub struct LocaleDigits {
    locale: String,
}

impl LocaleDigits {
    pub fn from_window(window: &Window) -> Self {
        let locale = window
            .navigator()
            .language()
            .unwrap_or_else(|| "en-US".to_string());
        Self { locale }
    }
}

// Number.MAX_SAFE_INTEGER
const MAX_EXACT_JS_INTEGER: u64 = (1 << 53) - 1;

/// Whether `value` survives the trip through a JS number unchanged.
fn exact_in_js(value: u64) -> bool {
    value <= MAX_EXACT_JS_INTEGER
}

impl NumberFormat for LocaleDigits {
    fn format(&self, value: u64) -> String {
        if !exact_in_js(value) {
            return GroupedDigits::default().format(value);
        }
        Number::from(value as f64).to_locale_string(&self.locale).into()
    }
}
