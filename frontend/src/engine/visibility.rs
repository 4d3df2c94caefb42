//! Per-element visibility delivery.
//!
//! The host pushes intersection ratios in with [`VisibilityFeed::publish`];
//! components subscribe per element. Once the last handler for an element
//! is gone the feed calls its release hook so the host can stop observing it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use super::signal::{Emitter, Flow, Subscription};

/// Intersection ratios come back as e.g. 0.9999 for a fully visible element.
const RATIO_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPreference {
    #[default]
    Full,
    Reduced,
}

pub fn reaches_threshold(ratio: f64, threshold: f64) -> bool {
    ratio + RATIO_EPSILON >= threshold
}

type ReleaseHook<K> = Box<dyn FnMut(&K)>;

struct FeedInner<K> {
    threshold: f64,
    channels: RefCell<HashMap<K, Emitter<f64>>>,
    release: RefCell<Option<ReleaseHook<K>>>,
}

impl<K: Eq + Hash> FeedInner<K> {
    fn release_if_idle(&self, target: &K) {
        let idle = self
            .channels
            .borrow()
            .get(target)
            .map_or(false, |channel| channel.is_empty());
        if !idle {
            return;
        }

        self.channels.borrow_mut().remove(target);
        if let Some(hook) = self.release.borrow_mut().as_mut() {
            hook(target);
        }
    }
}

pub struct VisibilityFeed<K> {
    inner: Rc<FeedInner<K>>,
}

impl<K> Clone for VisibilityFeed<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Clone + Eq + Hash + 'static> VisibilityFeed<K> {
    pub fn new(threshold: f64) -> Self {
        Self {
            inner: Rc::new(FeedInner {
                threshold,
                channels: RefCell::new(HashMap::new()),
                release: RefCell::new(None),
            }),
        }
    }

    /// Ratio at which the host reports a crossing for this feed.
    pub fn threshold(&self) -> f64 {
        self.inner.threshold
    }

    pub fn on_release(&self, hook: impl FnMut(&K) + 'static) {
        *self.inner.release.borrow_mut() = Some(Box::new(hook));
    }

    pub fn subscribe(
        &self,
        target: K,
        mut handler: impl FnMut(f64) -> Flow + 'static,
    ) -> Subscription {
        let channel = self
            .inner
            .channels
            .borrow_mut()
            .entry(target.clone())
            .or_default()
            .clone();
        let inner_sub = channel.subscribe(move |ratio: &f64| handler(*ratio));

        let feed: Weak<FeedInner<K>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            inner_sub.unsubscribe();
            if let Some(feed) = feed.upgrade() {
                feed.release_if_idle(&target);
            }
        })
    }

    pub fn publish(&self, target: &K, ratio: f64) {
        let channel = match self.inner.channels.borrow().get(target) {
            Some(channel) => channel.clone(),
            None => return,
        };
        channel.emit(&ratio);
        self.inner.release_if_idle(target);
    }

    pub fn is_observed(&self, target: &K) -> bool {
        self.inner.channels.borrow().contains_key(target)
    }

    pub fn observed_count(&self) -> usize {
        self.inner.channels.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn threshold_tolerates_rounding() {
        assert!(reaches_threshold(0.9995, 1.0));
        assert!(!reaches_threshold(0.98, 1.0));
        assert!(reaches_threshold(0.15, 0.15));
        assert!(!reaches_threshold(0.1, 0.15));
    }

    #[test]
    fn publishes_only_to_the_matching_target() {
        let feed = VisibilityFeed::<usize>::new(0.15);
        let hits = Rc::new(RefCell::new(Vec::new()));
        for target in 0..2 {
            let hits = hits.clone();
            let _ = feed.subscribe(target, move |ratio| {
                hits.borrow_mut().push((target, ratio));
                Flow::Continue
            });
        }

        feed.publish(&1, 0.4);
        feed.publish(&7, 1.0);
        assert_eq!(*hits.borrow(), [(1, 0.4)]);
    }

    #[test]
    fn release_fires_when_last_handler_stops() {
        let feed = VisibilityFeed::<&'static str>::new(0.15);
        let released = Rc::new(RefCell::new(Vec::new()));
        {
            let released = released.clone();
            feed.on_release(move |target| released.borrow_mut().push(*target));
        }

        let _ = feed.subscribe("card", |ratio| {
            if ratio > 0.5 {
                Flow::Stop
            } else {
                Flow::Continue
            }
        });
        assert!(feed.is_observed(&"card"));

        feed.publish(&"card", 0.2);
        assert!(released.borrow().is_empty());

        feed.publish(&"card", 0.6);
        assert_eq!(*released.borrow(), ["card"]);
        assert!(!feed.is_observed(&"card"));
        assert_eq!(feed.observed_count(), 0);
    }

    #[test]
    fn unsubscribe_releases_target() {
        let feed = VisibilityFeed::<u8>::new(1.0);
        let released = Rc::new(Cell::new(0));
        {
            let released = released.clone();
            feed.on_release(move |_| released.set(released.get() + 1));
        }

        let sub = feed.subscribe(3, |_| Flow::Continue);
        sub.unsubscribe();
        assert_eq!(released.get(), 1);
        assert!(!feed.is_observed(&3));
    }
}
