use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent, Window};

use super::dom::{set_class, toggle_class, EventListener};
use crate::error::HostError;

pub const FOCUS_OUTLINE_CLASS: &str = "show-focus-outline";

/// Only draw focus rings for people navigating with the keyboard: Tab turns
/// them on, any mouse press turns them off again.
pub struct FocusOutline {
    _keydown: EventListener,
    _mousedown: EventListener,
}

impl FocusOutline {
    pub fn install(window: &Window, body: Element) -> Result<Self, HostError> {
        let keydown = {
            let body = body.clone();
            EventListener::new(window, "keydown", move |event| {
                let is_tab = event
                    .dyn_ref::<KeyboardEvent>()
                    .map_or(false, |key| key.key() == "Tab");
                if is_tab && set_class(&body, FOCUS_OUTLINE_CLASS, true).is_err() {
                    debug!("could not enable focus outline");
                }
            })?
        };
        let mousedown = EventListener::new(window, "mousedown", move |_| {
            toggle_class(&body, FOCUS_OUTLINE_CLASS, false);
        })?;

        Ok(Self {
            _keydown: keydown,
            _mousedown: mousedown,
        })
    }
}
