use std::rc::Rc;

use log::{debug, trace};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::engine::visibility::VisibilityFeed;
use crate::error::HostError;

/// Bridges one `IntersectionObserver` into a [`VisibilityFeed`] keyed by the
/// element's index in `elements`. Released targets get unobserved, and the
/// whole observer is disconnected on drop.
pub struct ElementObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl ElementObserver {
    pub fn connect(elements: Rc<Vec<Element>>, feed: &VisibilityFeed<usize>) -> Result<Self, HostError> {
        let lookup = elements.clone();
        let publish = feed.clone();
        let callback = Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let Some(index) = lookup.iter().position(|el| *el == target) else {
                    continue;
                };
                // leaving the viewport is reported as 0 regardless of the
                // last non-zero ratio
                let ratio = if entry.is_intersecting() {
                    entry.intersection_ratio()
                } else {
                    0.0
                };
                trace!("element {} visible at {:.2}", index, ratio);
                publish.publish(&index, ratio);
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(feed.threshold()));
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;

        {
            let observer = observer.clone();
            let elements = elements.clone();
            feed.on_release(move |index| {
                if let Some(element) = elements.get(*index) {
                    observer.unobserve(element);
                }
            });
        }

        for (index, element) in elements.iter().enumerate() {
            if feed.is_observed(&index) {
                observer.observe(element);
            }
        }
        debug!("observing {} of {} elements", feed.observed_count(), elements.len());

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ElementObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
