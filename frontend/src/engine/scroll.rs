use std::cell::Cell;

use super::signal::{Emitter, Flow, Subscription};

/// One reading of the viewport, taken in a single scroll/resize callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub offset: f64,
    pub viewport_height: f64,
    pub timestamp_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollTrend {
    Up,
    Down,
    #[default]
    Still,
}

/// Leaf of the scroll pipeline: turns raw readings into samples and fans them
/// out. It never touches the DOM itself, consumers do their writes after
/// every reading of the tick has been taken.
pub struct ScrollPositionTracker {
    latest: Cell<Option<ScrollSample>>,
    trend: Cell<ScrollTrend>,
    emitter: Emitter<ScrollSample>,
}

impl Default for ScrollPositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollPositionTracker {
    pub fn new() -> Self {
        Self {
            latest: Cell::new(None),
            trend: Cell::new(ScrollTrend::Still),
            emitter: Emitter::new(),
        }
    }

    pub fn subscribe(&self, handler: impl FnMut(&ScrollSample) -> Flow + 'static) -> Subscription {
        self.emitter.subscribe(handler)
    }

    pub fn record(&self, offset: f64, viewport_height: f64, timestamp_ms: f64) -> ScrollSample {
        let sample = ScrollSample {
            offset: non_negative(offset),
            viewport_height: non_negative(viewport_height),
            timestamp_ms,
        };

        let trend = match self.latest.get() {
            Some(prev) if sample.offset > prev.offset => ScrollTrend::Down,
            Some(prev) if sample.offset < prev.offset => ScrollTrend::Up,
            _ => ScrollTrend::Still,
        };
        self.trend.set(trend);
        self.latest.set(Some(sample));

        self.emitter.emit(&sample);
        sample
    }

    pub fn offset(&self) -> f64 {
        self.latest.get().map_or(0.0, |sample| sample.offset)
    }

    pub fn trend(&self) -> ScrollTrend {
        self.trend.get()
    }

    pub fn latest(&self) -> Option<ScrollSample> {
        self.latest.get()
    }
}

// No viewport, NaN and overscroll bounce all read as the top of the page.
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
