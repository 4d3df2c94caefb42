use log::{info, warn, Level};
use serde::Deserialize;
use web_sys::Document;

use crate::engine::counter::{ReducedMotionCounters, DEFAULT_COUNTER_THRESHOLD, DEFAULT_DURATION_MS};
use crate::engine::header::DEFAULT_HIDE_THRESHOLD_PX;
use crate::engine::nav::DEFAULT_LOOKAHEAD_RATIO;
use crate::engine::reveal::DEFAULT_REVEAL_THRESHOLD;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Chatty while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Id of the optional `<script type="application/json">` block in
/// index.html that overrides the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "page-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub lookahead_ratio: f64,
    pub header_hide_threshold_px: f64,
    pub reveal_threshold: f64,
    pub counter_threshold: f64,
    pub counter_duration_ms: f64,
    /// Fixed thousands separator for counters. Unset means the browser locale.
    pub digit_separator: Option<String>,
    pub reduced_motion_counters: ReducedMotionCounters,
    pub contact_url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            lookahead_ratio: DEFAULT_LOOKAHEAD_RATIO,
            header_hide_threshold_px: DEFAULT_HIDE_THRESHOLD_PX,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            counter_threshold: DEFAULT_COUNTER_THRESHOLD,
            counter_duration_ms: DEFAULT_DURATION_MS,
            digit_separator: None,
            reduced_motion_counters: ReducedMotionCounters::default(),
            contact_url: "#contact".to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let config: PageConfig = serde_json::from_str(raw)?;
        Ok(config.clamped())
    }

    /// Reads the inline config block once at startup. Anything missing or
    /// broken falls back to the defaults.
    pub fn load(document: Option<&Document>) -> Self {
        let raw = document
            .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match raw {
            Some(raw) if !raw.trim().is_empty() => match Self::from_json(&raw) {
                Ok(config) => {
                    info!("loaded page config from #{}", CONFIG_ELEMENT_ID);
                    config
                }
                Err(e) => {
                    warn!("ignoring malformed #{}: {}", CONFIG_ELEMENT_ID, e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    // ratios are fractions of an element, durations can't go backwards
    fn clamped(mut self) -> Self {
        self.reveal_threshold = self.reveal_threshold.clamp(0.0, 1.0);
        self.counter_threshold = self.counter_threshold.clamp(0.0, 1.0);
        self.counter_duration_ms = self.counter_duration_ms.max(0.0);
        self.lookahead_ratio = self.lookahead_ratio.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_constants() {
        let config = PageConfig::default();
        assert_eq!(config.lookahead_ratio, 0.33);
        assert_eq!(config.header_hide_threshold_px, 120.0);
        assert_eq!(config.reveal_threshold, 0.15);
        assert_eq!(config.counter_threshold, 1.0);
        assert_eq!(config.counter_duration_ms, 1500.0);
        assert_eq!(config.reduced_motion_counters, ReducedMotionCounters::JumpToFinal);
        assert!(config.digit_separator.is_none());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = PageConfig::from_json(
            r#"{ "header_hide_threshold_px": 80, "reduced_motion_counters": "keep_static", "digit_separator": "." }"#,
        )
        .unwrap();

        assert_eq!(config.header_hide_threshold_px, 80.0);
        assert_eq!(config.reduced_motion_counters, ReducedMotionCounters::KeepStatic);
        assert_eq!(config.digit_separator.as_deref(), Some("."));
        assert_eq!(config.counter_duration_ms, 1500.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = PageConfig::from_json(
            r#"{ "reveal_threshold": 3.5, "counter_threshold": -1, "counter_duration_ms": -20 }"#,
        )
        .unwrap();

        assert_eq!(config.reveal_threshold, 1.0);
        assert_eq!(config.counter_threshold, 0.0);
        assert_eq!(config.counter_duration_ms, 0.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(PageConfig::from_json("{ nope").is_err());
        assert!(PageConfig::from_json(r#"{ "reduced_motion_counters": "spin" }"#).is_err());
    }

    #[test]
    fn missing_document_uses_defaults() {
        assert_eq!(PageConfig::load(None), PageConfig::default());
    }
}
