//! Wires the scroll engine to the rendered landing page.
//!
//! One `PageSession` per page visit. It owns every listener, observer and
//! component state; dropping it tears all of it down. Each effect starts on
//! its own, so one that fails to hook up leaves the others running.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info, trace, warn};
use web_sys::{Document, Element, Event, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window};

use super::dom::{self, toggle_class, EventListener};
use super::focus::FocusOutline;
use super::frames::{AnimationFrames, LocaleDigits};
use super::images::backfill_lazy_images;
use super::observer::ElementObserver;
use crate::config::PageConfig;
use crate::engine::counter::{CounterAnimator, CounterTarget, GroupedDigits, NumberFormat};
use crate::engine::header::HeaderVisibilityController;
use crate::engine::nav::{hash_target, NavHighlighter, Section, SectionRegistry};
use crate::engine::reveal::VisibilityRevealEngine;
use crate::engine::scroll::{ScrollPositionTracker, ScrollSample};
use crate::engine::signal::{Flow, Subscription};
use crate::engine::visibility::{MotionPreference, VisibilityFeed};
use crate::error::HostError;

pub const SECTION_SELECTOR: &str = "main section[id]";
pub const NAV_LINK_SELECTOR: &str = "header nav a";
pub const HEADER_SELECTOR: &str = "header";
pub const REVEAL_SELECTOR: &str = ".animate-on-scroll";
pub const COUNTER_SELECTOR: &str = ".stat-number";

pub const ACTIVE_CLASS: &str = "active";
pub const HEADER_HIDDEN_CLASS: &str = "header-hide";
pub const REVEALED_CLASS: &str = "in-view";
/// Set on `<html>` while reveal targets are being observed. The stylesheet
/// only hides unrevealed targets under it, so without a working reveal
/// engine all content stays visible.
pub const REVEAL_READY_CLASS: &str = "reveal-ready";

pub struct PageSession {
    subscriptions: Vec<Subscription>,
    reveal: Option<VisibilityRevealEngine<usize>>,
    counters: Option<CounterAnimator<usize>>,
    reveal_root: Option<Element>,
    _listeners: Vec<EventListener>,
    _observers: Vec<ElementObserver>,
    _focus: Option<FocusOutline>,
}

impl PageSession {
    pub fn mount(config: &PageConfig) -> Result<Self, HostError> {
        let window = dom::window()?;
        let document = dom::document(&window)?;
        let motion = dom::motion_preference(&window);
        let observer_support = dom::has_intersection_observer(&window);
        info!(
            "mounting page session (motion: {:?}, IntersectionObserver: {})",
            motion, observer_support
        );

        let mut session = PageSession {
            subscriptions: Vec::new(),
            reveal: None,
            counters: None,
            reveal_root: None,
            _listeners: Vec::new(),
            _observers: Vec::new(),
            _focus: None,
        };

        // First reading before anyone subscribes, components start from it
        let tracker = Rc::new(ScrollPositionTracker::new());
        record(&tracker, &window);

        if let Err(e) = session.start_nav(&tracker, &document, config, motion) {
            warn!("nav highlighting disabled: {}", e);
        }
        if let Err(e) = session.start_header(&tracker, &document, config) {
            warn!("header hiding disabled: {}", e);
        }
        if let Err(e) = session.listen_scroll(&tracker, &window) {
            warn!("scroll tracking disabled: {}", e);
        }

        let feed_available = observer_support && motion == MotionPreference::Full;
        if let Err(e) = session.start_reveals(&document, config, motion, feed_available) {
            warn!("reveal animations disabled: {}", e);
        }
        if let Err(e) = session.start_counters(&window, &document, config, motion, feed_available) {
            warn!("counters disabled: {}", e);
        }

        match document.body() {
            Some(body) => match FocusOutline::install(&window, Element::from(body)) {
                Ok(focus) => session._focus = Some(focus),
                Err(e) => warn!("focus outline disabled: {}", e),
            },
            None => warn!("focus outline disabled: {}", HostError::MissingElement("body".into())),
        }

        if let Err(e) = backfill_lazy_images(&document) {
            warn!("lazy image backfill skipped: {}", e);
        }

        Ok(session)
    }

    /// Every scroll and resize turns into exactly one sample.
    fn listen_scroll(&mut self, tracker: &Rc<ScrollPositionTracker>, window: &Window) -> Result<(), HostError> {
        let on_scroll = {
            let tracker = tracker.clone();
            let window = window.clone();
            let last_trend = Rc::new(Cell::new(tracker.trend()));
            move |_: Event| {
                let sample = record(&tracker, &window);
                let trend = tracker.trend();
                if last_trend.replace(trend) != trend {
                    trace!("scrolling {:?} from {}px at {:.0}ms", trend, tracker.offset(), sample.timestamp_ms);
                }
            }
        };
        self._listeners.push(EventListener::new(window, "scroll", on_scroll.clone())?);
        self._listeners.push(EventListener::new(window, "resize", on_scroll)?);
        Ok(())
    }

    fn start_nav(
        &mut self,
        tracker: &ScrollPositionTracker,
        document: &Document,
        config: &PageConfig,
        motion: MotionPreference,
    ) -> Result<(), HostError> {
        let registry = SectionRegistry::new(measure_sections(document)?);
        let links = dom::query_all(document, NAV_LINK_SELECTOR)?;
        let hrefs: Vec<String> = links
            .iter()
            .map(|link| link.get_attribute("href").unwrap_or_default())
            .collect();
        let targets: Vec<String> = hrefs
            .iter()
            .map(|href| hash_target(href).unwrap_or_default().to_string())
            .collect();

        if registry.is_empty() {
            warn!("no sections to highlight");
        }
        debug!("{} sections, {} nav links", registry.len(), links.len());
        let nav = Rc::new(RefCell::new(NavHighlighter::new(registry, targets, config.lookahead_ratio)));

        let highlight = {
            let nav = nav.clone();
            let links = links.clone();
            move |sample: &ScrollSample| {
                let mut nav = nav.borrow_mut();
                if nav.update(sample) {
                    for (element, link) in links.iter().zip(nav.links()) {
                        toggle_class(element, ACTIVE_CLASS, link.active);
                    }
                    debug!(
                        "active section: {}",
                        nav.active_section().map_or("none", |s| s.id.as_str())
                    );
                }
            }
        };
        // light the right link before the first scroll
        if let Some(sample) = tracker.latest() {
            highlight(&sample);
        }
        self.subscriptions.push(tracker.subscribe(move |sample| {
            highlight(sample);
            Flow::Continue
        }));

        let behavior = match motion {
            MotionPreference::Full => ScrollBehavior::Smooth,
            MotionPreference::Reduced => ScrollBehavior::Auto,
        };
        for (element, href) in links.iter().zip(hrefs) {
            let nav = nav.clone();
            let document = document.clone();
            let listener = EventListener::new(element, "click", move |event| {
                let Some(id) = nav.borrow().scroll_target(&href).map(|s| s.id.clone()) else {
                    return;
                };
                let Some(section) = document.get_element_by_id(&id) else {
                    return;
                };
                event.prevent_default();
                // active state follows from the scroll events this causes
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(behavior);
                options.set_block(ScrollLogicalPosition::Start);
                section.scroll_into_view_with_scroll_into_view_options(&options);
            })?;
            self._listeners.push(listener);
        }
        Ok(())
    }

    fn start_header(
        &mut self,
        tracker: &ScrollPositionTracker,
        document: &Document,
        config: &PageConfig,
    ) -> Result<(), HostError> {
        let header = document
            .query_selector(HEADER_SELECTOR)?
            .ok_or_else(|| HostError::MissingElement(HEADER_SELECTOR.into()))?;

        let mut controller = HeaderVisibilityController::new(tracker.offset(), config.header_hide_threshold_px);
        self.subscriptions.push(tracker.subscribe(move |sample| {
            if controller.observe(sample.offset) {
                let state = controller.state();
                toggle_class(&header, HEADER_HIDDEN_CLASS, state.hidden);
                debug!(
                    "header {} at {}px",
                    if state.hidden { "hidden" } else { "shown" },
                    state.last_offset
                );
            }
            Flow::Continue
        }));
        Ok(())
    }

    fn start_reveals(
        &mut self,
        document: &Document,
        config: &PageConfig,
        motion: MotionPreference,
        feed_available: bool,
    ) -> Result<(), HostError> {
        let elements = Rc::new(dom::query_all(document, REVEAL_SELECTOR)?);
        let reveal_class = {
            let elements = elements.clone();
            move |index: &usize| {
                if let Some(element) = elements.get(*index) {
                    toggle_class(element, REVEALED_CLASS, true);
                }
            }
        };

        let feed = feed_available.then(|| VisibilityFeed::new(config.reveal_threshold));
        let engine = VisibilityRevealEngine::attach(0..elements.len(), feed.as_ref(), motion, reveal_class.clone());

        if let Some(feed) = &feed {
            match ElementObserver::connect(elements.clone(), feed) {
                Ok(observer) => {
                    self._observers.push(observer);
                    if let Some(root) = document.document_element() {
                        toggle_class(&root, REVEAL_READY_CLASS, true);
                        self.reveal_root = Some(root);
                    }
                }
                Err(e) => {
                    // hidden content is worse than no animation
                    warn!("reveal observer unavailable, showing everything: {}", e);
                    engine.detach();
                    self.reveal = Some(VisibilityRevealEngine::attach(
                        0..elements.len(),
                        None,
                        motion,
                        reveal_class,
                    ));
                    return Ok(());
                }
            }
        }
        debug!("{} elements waiting to reveal", engine.pending());
        self.reveal = Some(engine);
        Ok(())
    }

    fn start_counters(
        &mut self,
        window: &Window,
        document: &Document,
        config: &PageConfig,
        motion: MotionPreference,
        feed_available: bool,
    ) -> Result<(), HostError> {
        let elements = Rc::new(dom::query_all(document, COUNTER_SELECTOR)?);
        if elements.is_empty() {
            return Ok(());
        }

        let format: Box<dyn NumberFormat> = match &config.digit_separator {
            Some(separator) => Box::new(GroupedDigits::new(separator.clone())),
            None => Box::new(LocaleDigits::from_window(window)),
        };
        let mut counters = {
            let elements = elements.clone();
            CounterAnimator::new(
                config.counter_duration_ms,
                format,
                Box::new(AnimationFrames::new(window.clone())),
                move |index: &usize, text: &str| {
                    if let Some(element) = elements.get(*index) {
                        element.set_text_content(Some(text));
                    }
                },
            )
        };
        for (index, element) in elements.iter().enumerate() {
            let text = element.text_content().unwrap_or_default();
            let unit = element.get_attribute("data-unit").unwrap_or_default();
            let counter = CounterTarget::new(&text, unit);
            debug!("counter {} counts to {}{}", index, counter.target_value(), counter.unit());
            counters.add(index, counter);
        }

        let feed = feed_available.then(|| VisibilityFeed::new(config.counter_threshold));
        counters.start(feed.as_ref(), motion, config.reduced_motion_counters);
        if let Some(feed) = &feed {
            match ElementObserver::connect(elements, feed) {
                Ok(observer) => self._observers.push(observer),
                Err(e) => {
                    warn!("counter observer unavailable: {}", e);
                    // same as a browser without IntersectionObserver
                    counters.stop_observing();
                    counters.start(None, motion, config.reduced_motion_counters);
                }
            }
        }

        self.counters = Some(counters);
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        if let Some(reveal) = self.reveal.take() {
            reveal.detach();
        }
        if let Some(root) = self.reveal_root.take() {
            toggle_class(&root, REVEAL_READY_CLASS, false);
        }
        if let Some(counters) = self.counters.take() {
            debug!("{} counters still animating", counters.animating_count());
            counters.detach();
        }
        debug!("page session torn down");
    }
}

fn record(tracker: &ScrollPositionTracker, window: &Window) -> ScrollSample {
    tracker.record(
        dom::scroll_offset(window),
        dom::viewport_height(window),
        dom::now_ms(window),
    )
}

fn measure_sections(document: &Document) -> Result<Vec<Section>, HostError> {
    Ok(dom::query_all(document, SECTION_SELECTOR)?
        .iter()
        .filter_map(|element| {
            let (top, height) = dom::offset_box(element)?;
            Some(Section::new(element.id(), top, height))
        })
        .collect())
}
