use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use crate::engine::visibility::MotionPreference;
use crate::error::HostError;

pub fn window() -> Result<Window, HostError> {
    web_sys::window().ok_or(HostError::NoWindow)
}

pub fn document(window: &Window) -> Result<Document, HostError> {
    window.document().ok_or(HostError::NoDocument)
}

pub fn query_all(root: &Document, selector: &str) -> Result<Vec<Element>, HostError> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub fn scroll_offset(window: &Window) -> f64 {
    window.scroll_y().unwrap_or(0.0)
}

pub fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0)
}

pub fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

/// Read once per page session; changing the OS setting mid-visit has no effect.
pub fn motion_preference(window: &Window) -> MotionPreference {
    let reduced = window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false);
    if reduced {
        MotionPreference::Reduced
    } else {
        MotionPreference::Full
    }
}

pub fn has_intersection_observer(window: &Window) -> bool {
    web_sys::js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

pub fn set_class(element: &Element, class: &str, on: bool) -> Result<(), HostError> {
    element.class_list().toggle_with_force(class, on)?;
    Ok(())
}

/// [`set_class`] for callbacks, where a failure can only be logged.
pub fn toggle_class(element: &Element, class: &str, on: bool) {
    if let Err(e) = set_class(element, class, on) {
        debug!("could not toggle .{}: {}", class, e);
    }
}

/// `(offsetTop, offsetHeight)` of an element, in page pixels.
pub fn offset_box(element: &Element) -> Option<(f64, f64)> {
    let html = element.dyn_ref::<HtmlElement>()?;
    Some((f64::from(html.offset_top()), f64::from(html.offset_height())))
}

/// An `addEventListener` registration that is removed again on drop.
pub struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, HostError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}
