//! Count-up animation for the stat figures.
//!
//! Each counter goes idle -> animating -> done exactly once. Frames are
//! driven by a [`FrameScheduler`]; only counters that are currently
//! animating are touched per frame, and no frame is requested once the last
//! one finishes.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use log::{debug, info};
use serde::Deserialize;

use super::signal::{Flow, Subscription};
use super::visibility::{reaches_threshold, MotionPreference, VisibilityFeed};

pub const DEFAULT_COUNTER_THRESHOLD: f64 = 1.0;
pub const DEFAULT_DURATION_MS: f64 = 1500.0;

/// What counters show when they can't animate (reduced motion, or no way to
/// tell when they come into view).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducedMotionCounters {
    #[default]
    JumpToFinal,
    KeepStatic,
}

pub trait NumberFormat {
    fn format(&self, value: u64) -> String;
}

/// Thousands grouping with a fixed separator.
#[derive(Debug, Clone)]
pub struct GroupedDigits {
    separator: String,
}

impl GroupedDigits {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for GroupedDigits {
    fn default() -> Self {
        Self::new(",")
    }
}

impl NumberFormat for GroupedDigits {
    fn format(&self, value: u64) -> String {
        let digits = value.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 * self.separator.len());
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push_str(&self.separator);
            }
            out.push(ch);
        }
        out
    }
}

pub trait FrameScheduler {
    /// Runs `callback` with the frame timestamp (ms) before the next paint.
    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>);
}

/// Target value from the text a counter is first rendered with: every
/// non-digit is dropped, so the markup must not carry unrelated digits.
/// No digits gives 0; absurdly long digit runs saturate. Browser locale
/// formatting is only exact up to 2^53, bigger figures are grouped with `,`.
pub fn parse_target_value(text: &str) -> u64 {
    text.chars()
        .filter_map(|ch| ch.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit))
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterPhase {
    Idle,
    /// `start_ms` is taken from the first frame, not from the trigger.
    Animating { start_ms: Option<f64> },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterStep {
    pub value: u64,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterTarget {
    target_value: u64,
    unit: String,
    phase: CounterPhase,
}

impl CounterTarget {
    pub fn new(initial_text: &str, unit: impl Into<String>) -> Self {
        Self {
            target_value: parse_target_value(initial_text),
            unit: unit.into(),
            phase: CounterPhase::Idle,
        }
    }

    pub fn target_value(&self) -> u64 {
        self.target_value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[cfg(test)]
    pub fn phase(&self) -> CounterPhase {
        self.phase
    }

    /// Idle -> animating. False if it already ran or is running.
    pub fn trigger(&mut self) -> bool {
        if self.phase != CounterPhase::Idle {
            return false;
        }
        self.phase = CounterPhase::Animating { start_ms: None };
        true
    }

    pub fn step(&mut self, now_ms: f64, duration_ms: f64) -> Option<CounterStep> {
        let CounterPhase::Animating { start_ms } = &mut self.phase else {
            return None;
        };
        let start = *start_ms.get_or_insert(now_ms);

        let progress = if duration_ms > 0.0 {
            ((now_ms - start) / duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let finished = progress >= 1.0;
        let value = if finished {
            self.target_value
        } else {
            ((progress * self.target_value as f64).floor() as u64).min(self.target_value)
        };

        if finished {
            self.phase = CounterPhase::Done;
        }
        Some(CounterStep { value, finished })
    }

    /// Skips straight to done, from any phase.
    pub fn finish(&mut self) -> u64 {
        self.phase = CounterPhase::Done;
        self.target_value
    }

    pub fn display(&self, value: u64, format: &dyn NumberFormat) -> String {
        format!("{}{}", format.format(value), self.unit)
    }
}

struct AnimatorShared<K> {
    counters: RefCell<HashMap<K, CounterTarget>>,
    animating: RefCell<Vec<K>>,
    frame_pending: Cell<bool>,
    duration_ms: f64,
    format: Box<dyn NumberFormat>,
    scheduler: Box<dyn FrameScheduler>,
    write: Box<dyn Fn(&K, &str)>,
}

impl<K: Clone + Eq + Hash + 'static> AnimatorShared<K> {
    fn trigger(shared: &Rc<Self>, key: &K) {
        let started = shared
            .counters
            .borrow_mut()
            .get_mut(key)
            .map_or(false, CounterTarget::trigger);
        if !started {
            return;
        }
        shared.animating.borrow_mut().push(key.clone());
        Self::ensure_frame(shared);
    }

    fn ensure_frame(shared: &Rc<Self>) {
        if shared.frame_pending.replace(true) {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(shared);
        shared.scheduler.request_frame(Box::new(move |now_ms| {
            // page session gone, nothing left to draw into
            if let Some(shared) = weak.upgrade() {
                Self::on_frame(&shared, now_ms);
            }
        }));
    }

    fn on_frame(shared: &Rc<Self>, now_ms: f64) {
        shared.frame_pending.set(false);

        let mut animating = shared.animating.take();
        animating.retain(|key| {
            let rendered = {
                let mut counters = shared.counters.borrow_mut();
                counters.get_mut(key).and_then(|counter| {
                    let step = counter.step(now_ms, shared.duration_ms)?;
                    Some((counter.display(step.value, shared.format.as_ref()), step.finished))
                })
            };
            match rendered {
                Some((text, finished)) => {
                    (shared.write)(key, &text);
                    if finished {
                        debug!("counter finished at {}", text);
                    }
                    !finished
                }
                None => false,
            }
        });

        // anything triggered from inside a write lands here
        animating.append(&mut shared.animating.borrow_mut());
        let more = !animating.is_empty();
        *shared.animating.borrow_mut() = animating;

        if more {
            Self::ensure_frame(shared);
        }
    }
}

pub struct CounterAnimator<K> {
    shared: Rc<AnimatorShared<K>>,
    subscriptions: Vec<Subscription>,
}

impl<K: Clone + Eq + Hash + 'static> CounterAnimator<K> {
    pub fn new(
        duration_ms: f64,
        format: Box<dyn NumberFormat>,
        scheduler: Box<dyn FrameScheduler>,
        write: impl Fn(&K, &str) + 'static,
    ) -> Self {
        Self {
            shared: Rc::new(AnimatorShared {
                counters: RefCell::new(HashMap::new()),
                animating: RefCell::new(Vec::new()),
                frame_pending: Cell::new(false),
                duration_ms,
                format,
                scheduler,
                write: Box::new(write),
            }),
            subscriptions: Vec::new(),
        }
    }

    pub fn add(&mut self, key: K, counter: CounterTarget) {
        self.shared.counters.borrow_mut().insert(key, counter);
    }

    /// Hooks every added counter up to `feed`. Without a feed or with reduced
    /// motion nothing is observed and `policy` decides what gets shown.
    pub fn start(
        &mut self,
        feed: Option<&VisibilityFeed<K>>,
        motion: MotionPreference,
        policy: ReducedMotionCounters,
    ) {
        let keys: Vec<K> = self.shared.counters.borrow().keys().cloned().collect();

        let feed = match feed {
            Some(feed) if motion == MotionPreference::Full => feed,
            _ => {
                info!("counters not animated ({:?} motion, {:?})", motion, policy);
                if policy == ReducedMotionCounters::JumpToFinal {
                    self.show_final(&keys);
                }
                return;
            }
        };

        let threshold = feed.threshold();
        for key in keys {
            let shared = Rc::downgrade(&self.shared);
            let target = key.clone();
            self.subscriptions.push(feed.subscribe(key, move |ratio| {
                if !reaches_threshold(ratio, threshold) {
                    return Flow::Continue;
                }
                if let Some(shared) = shared.upgrade() {
                    AnimatorShared::trigger(&shared, &target);
                }
                // triggered counters never need another visibility event
                Flow::Stop
            }));
        }
        debug!("observing {} counters", self.subscriptions.len());
    }

    fn show_final(&self, keys: &[K]) {
        for key in keys {
            let text = {
                let mut counters = self.shared.counters.borrow_mut();
                counters.get_mut(key).map(|counter| {
                    let value = counter.finish();
                    counter.display(value, self.shared.format.as_ref())
                })
            };
            if let Some(text) = text {
                (self.shared.write)(key, &text);
            }
        }
    }

    #[cfg(test)]
    pub fn phase(&self, key: &K) -> Option<CounterPhase> {
        self.shared.counters.borrow().get(key).map(CounterTarget::phase)
    }

    pub fn animating_count(&self) -> usize {
        self.shared.animating.borrow().len()
    }

    /// Drops every visibility subscription. Counters that have not fired yet
    /// stay idle until `start` is called again.
    pub fn stop_observing(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }

    pub fn detach(mut self) {
        self.stop_observing();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    type Frames = Rc<RefCell<VecDeque<Box<dyn FnOnce(f64)>>>>;

    #[derive(Default, Clone)]
    struct ManualFrames {
        queue: Frames,
    }

    impl ManualFrames {
        /// Runs every frame requested so far with timestamp `now_ms`.
        fn tick(&self, now_ms: f64) -> usize {
            let due: Vec<_> = self.queue.borrow_mut().drain(..).collect();
            let count = due.len();
            for frame in due {
                frame(now_ms);
            }
            count
        }

        fn pending(&self) -> usize {
            self.queue.borrow().len()
        }
    }

    impl FrameScheduler for ManualFrames {
        fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
            self.queue.borrow_mut().push_back(callback);
        }
    }

    type Writes = Rc<RefCell<Vec<(u32, String)>>>;

    fn animator(frames: &ManualFrames) -> (CounterAnimator<u32>, Writes) {
        let writes: Writes = Rc::default();
        let sink = writes.clone();
        let animator = CounterAnimator::new(
            DEFAULT_DURATION_MS,
            Box::new(GroupedDigits::default()),
            Box::new(frames.clone()),
            move |key: &u32, text: &str| sink.borrow_mut().push((*key, text.to_string())),
        );
        (animator, writes)
    }

    fn texts(writes: &Writes, key: u32) -> Vec<String> {
        writes
            .borrow()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, text)| text.clone())
            .collect()
    }

    #[test]
    fn parses_digits_out_of_display_text() {
        assert_eq!(parse_target_value("2,500+"), 2500);
        assert_eq!(parse_target_value("98%"), 98);
        assert_eq!(parse_target_value("1 200 kWh"), 1200);
        assert_eq!(parse_target_value("Many"), 0);
        assert_eq!(parse_target_value(""), 0);
        assert_eq!(parse_target_value("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn groups_thousands() {
        let format = GroupedDigits::default();
        assert_eq!(format.format(0), "0");
        assert_eq!(format.format(999), "999");
        assert_eq!(format.format(1000), "1,000");
        assert_eq!(format.format(2500), "2,500");
        assert_eq!(format.format(1234567), "1,234,567");
        assert_eq!(GroupedDigits::new(".").format(10000), "10.000");
    }

    #[test]
    fn step_interpolates_from_first_frame() {
        let mut counter = CounterTarget::new("2,500", "+");
        assert_eq!(counter.step(0.0, DEFAULT_DURATION_MS), None);

        assert!(counter.trigger());
        assert!(!counter.trigger());

        let at = |c: &mut CounterTarget, t| c.step(t, DEFAULT_DURATION_MS).map(|s| s.value);
        assert_eq!(at(&mut counter, 1000.0), Some(0));
        assert_eq!(at(&mut counter, 1750.0), Some(1250));
        assert_eq!(at(&mut counter, 2499.0), Some(2498));
        assert_eq!(
            counter.step(2500.0, DEFAULT_DURATION_MS),
            Some(CounterStep { value: 2500, finished: true })
        );
        assert_eq!(counter.phase(), CounterPhase::Done);
        assert_eq!(counter.step(3000.0, DEFAULT_DURATION_MS), None);
        assert!(!counter.trigger());
    }

    #[test]
    fn counts_to_2500_plus_in_1500ms() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("2500", "+"));

        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        // partly visible does not count
        feed.publish(&0, 0.6);
        assert_eq!(frames.pending(), 0);

        let t = 10_000.0;
        feed.publish(&0, 1.0);
        assert_eq!(animator.phase(&0), Some(CounterPhase::Animating { start_ms: None }));
        for dt in [0.0, 16.0, 400.0, 750.0, 1100.0, 1499.0, 1500.0] {
            assert_eq!(frames.tick(t + dt), 1);
        }

        let shown = texts(&writes, 0);
        assert_eq!(shown.first().map(String::as_str), Some("0+"));
        assert_eq!(shown.last().map(String::as_str), Some("2,500+"));
        let values: Vec<u64> = shown.iter().map(|s| parse_target_value(s)).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");

        // done: no more frames, no more writes
        assert_eq!(frames.pending(), 0);
        assert_eq!(animator.phase(&0), Some(CounterPhase::Done));
        feed.publish(&0, 1.0);
        assert_eq!(frames.tick(t + 5000.0), 0);
        assert_eq!(texts(&writes, 0).len(), shown.len());
    }

    #[test]
    fn late_frames_land_on_the_final_value() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("2500", "+"));
        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        feed.publish(&0, 1.0);
        frames.tick(0.0);
        frames.tick(4000.0);

        assert_eq!(texts(&writes, 0), ["0+", "2,500+"]);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn no_digits_still_runs_full_duration() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("lots", " kWh"));
        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        feed.publish(&0, 1.0);
        frames.tick(0.0);
        frames.tick(1000.0);
        assert_eq!(animator.phase(&0).map(|p| p == CounterPhase::Done), Some(false));
        frames.tick(1500.0);

        assert_eq!(texts(&writes, 0), ["0 kWh", "0 kWh", "0 kWh"]);
        assert_eq!(animator.phase(&0), Some(CounterPhase::Done));
    }

    #[test]
    fn only_animating_counters_are_touched_per_frame() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("100", ""));
        animator.add(1, CounterTarget::new("300", "%"));
        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        feed.publish(&0, 1.0);
        frames.tick(0.0);
        frames.tick(1500.0);
        assert_eq!(animator.animating_count(), 0);
        assert!(texts(&writes, 1).is_empty());

        // second counter scrolls in later and gets its own start time
        feed.publish(&1, 1.0);
        assert_eq!(animator.animating_count(), 1);
        frames.tick(5000.0);
        frames.tick(5750.0);
        frames.tick(6500.0);

        assert_eq!(texts(&writes, 1), ["0%", "150%", "300%"]);
        assert_eq!(texts(&writes, 0).len(), 2);
    }

    #[test]
    fn shared_frames_for_concurrent_counters() {
        let frames = ManualFrames::default();
        let (mut animator, _writes) = animator(&frames);
        animator.add(0, CounterTarget::new("10", ""));
        animator.add(1, CounterTarget::new("20", ""));
        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        feed.publish(&0, 1.0);
        feed.publish(&1, 1.0);
        // one loop drives both
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn reduced_motion_jumps_to_final_value() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("2500", "+"));
        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Reduced, ReducedMotionCounters::JumpToFinal);

        assert_eq!(texts(&writes, 0), ["2,500+"]);
        assert_eq!(animator.phase(&0), Some(CounterPhase::Done));
        assert_eq!(feed.observed_count(), 0);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn keep_static_leaves_text_alone() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("2500", "+"));
        animator.start(None, MotionPreference::Full, ReducedMotionCounters::KeepStatic);

        assert!(writes.borrow().is_empty());
        assert_eq!(animator.phase(&0), Some(CounterPhase::Idle));
    }

    #[test]
    fn missing_feed_jumps_to_final_value() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("38", " MW"));
        animator.start(None, MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        assert_eq!(texts(&writes, 0), ["38 MW"]);
        assert_eq!(animator.phase(&0), Some(CounterPhase::Done));
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn losing_the_feed_falls_back_to_policy() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("2500", "+"));
        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Full, ReducedMotionCounters::JumpToFinal);
        assert_eq!(feed.observed_count(), 1);

        animator.stop_observing();
        animator.start(None, MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        assert_eq!(feed.observed_count(), 0);
        assert_eq!(texts(&writes, 0), ["2,500+"]);
        // a late event from the old feed changes nothing
        feed.publish(&0, 1.0);
        assert_eq!(frames.pending(), 0);
        assert_eq!(texts(&writes, 0), ["2,500+"]);
    }

    #[test]
    fn dropped_animator_ignores_pending_frame() {
        let frames = ManualFrames::default();
        let (mut animator, writes) = animator(&frames);
        animator.add(0, CounterTarget::new("50", ""));
        let feed = VisibilityFeed::new(DEFAULT_COUNTER_THRESHOLD);
        animator.start(Some(&feed), MotionPreference::Full, ReducedMotionCounters::JumpToFinal);

        feed.publish(&0, 1.0);
        animator.detach();
        frames.tick(0.0);

        assert!(writes.borrow().is_empty());
    }
}
