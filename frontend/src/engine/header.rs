pub const DEFAULT_HIDE_THRESHOLD_PX: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderState {
    pub last_offset: f64,
    pub hidden: bool,
}

/// Hides the sticky header while the page moves down past the threshold and
/// brings it back on any upward movement.
#[derive(Debug, Clone)]
pub struct HeaderVisibilityController {
    state: HeaderState,
    threshold_px: f64,
}

impl HeaderVisibilityController {
    pub fn new(initial_offset: f64, threshold_px: f64) -> Self {
        Self {
            state: HeaderState {
                last_offset: initial_offset,
                hidden: false,
            },
            threshold_px,
        }
    }

    /// Feeds one offset. Returns true when `hidden` flipped.
    pub fn observe(&mut self, offset: f64) -> bool {
        let hidden = offset > self.state.last_offset && offset > self.threshold_px;
        // frame-to-frame comparison, so last_offset moves on every sample
        self.state.last_offset = offset;

        let changed = hidden != self.state.hidden;
        self.state.hidden = hidden;
        changed
    }

    pub fn is_hidden(&self) -> bool {
        self.state.hidden
    }

    pub fn state(&self) -> HeaderState {
        self.state
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hidden_tracks_latest_transition(
            start in 0.0_f64..3_000.0,
            offsets in prop::collection::vec(0.0_f64..3_000.0, 1..200)
        ) {
            let mut header = HeaderVisibilityController::new(start, DEFAULT_HIDE_THRESHOLD_PX);
            let mut prev = start;
            for offset in offsets {
                let was_hidden = header.is_hidden();
                let changed = header.observe(offset);
                let expected = offset > prev && offset > DEFAULT_HIDE_THRESHOLD_PX;
                prop_assert_eq!(header.is_hidden(), expected, "{} -> {}", prev, offset);
                prop_assert_eq!(changed, was_hidden != expected);
                prop_assert_eq!(header.state().last_offset, offset);
                prev = offset;
            }
        }

        #[test]
        fn upward_sample_always_reveals(
            offsets in prop::collection::vec(0.0_f64..3_000.0, 1..50),
            back in 0.5_f64..500.0
        ) {
            let mut header = HeaderVisibilityController::new(0.0, DEFAULT_HIDE_THRESHOLD_PX);
            for offset in &offsets {
                header.observe(*offset);
            }
            let last = header.state().last_offset;
            header.observe(last - back);
            prop_assert!(!header.is_hidden());
        }
    }
}
