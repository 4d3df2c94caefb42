use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use log::{debug, info};

use super::signal::{Flow, Subscription};
use super::visibility::{reaches_threshold, MotionPreference, VisibilityFeed};

pub const DEFAULT_REVEAL_THRESHOLD: f64 = 0.15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealTarget {
    revealed: bool,
}

impl RevealTarget {
    /// Flips to revealed. True only the first time.
    pub fn reveal(&mut self) -> bool {
        !std::mem::replace(&mut self.revealed, true)
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// One-shot "revealed" state per element, fired the first time enough of it
/// is on screen.
pub struct VisibilityRevealEngine<K> {
    targets: Rc<RefCell<HashMap<K, RevealTarget>>>,
    subscriptions: Vec<Subscription>,
}

impl<K: Clone + Eq + Hash + 'static> VisibilityRevealEngine<K> {
    /// Registers `targets` on `feed`. Without a feed, or with reduced motion,
    /// everything is revealed right away and nothing is observed.
    pub fn attach(
        targets: impl IntoIterator<Item = K>,
        feed: Option<&VisibilityFeed<K>>,
        motion: MotionPreference,
        on_reveal: impl Fn(&K) + 'static,
    ) -> Self {
        let states: Rc<RefCell<HashMap<K, RevealTarget>>> = Rc::default();
        let on_reveal: Rc<dyn Fn(&K)> = Rc::new(on_reveal);

        let feed = match feed {
            Some(feed) if motion == MotionPreference::Full => feed,
            _ => {
                let mut count = 0;
                for key in targets {
                    let first = states.borrow_mut().entry(key.clone()).or_default().reveal();
                    if first {
                        on_reveal(&key);
                        count += 1;
                    }
                }
                info!("revealing {} elements without observing ({:?} motion)", count, motion);
                return Self {
                    targets: states,
                    subscriptions: Vec::new(),
                };
            }
        };

        let threshold = feed.threshold();
        let mut subscriptions = Vec::new();
        for key in targets {
            states.borrow_mut().entry(key.clone()).or_default();

            let states = states.clone();
            let on_reveal = on_reveal.clone();
            let target = key.clone();
            subscriptions.push(feed.subscribe(key, move |ratio| {
                if !reaches_threshold(ratio, threshold) {
                    return Flow::Continue;
                }
                let first = states
                    .borrow_mut()
                    .get_mut(&target)
                    .map_or(false, RevealTarget::reveal);
                if first {
                    on_reveal(&target);
                }
                Flow::Stop
            }));
        }
        debug!("observing {} reveal targets", subscriptions.len());

        Self {
            targets: states,
            subscriptions,
        }
    }

    #[cfg(test)]
    pub fn is_revealed(&self, key: &K) -> bool {
        self.targets
            .borrow()
            .get(key)
            .map_or(false, RevealTarget::is_revealed)
    }

    /// Targets still waiting for their first sighting.
    pub fn pending(&self) -> usize {
        self.targets
            .borrow()
            .values()
            .filter(|target| !target.is_revealed())
            .count()
    }

    /// Stops observing whatever has not been revealed yet.
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
    }
}
