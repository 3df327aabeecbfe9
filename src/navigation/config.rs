use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Thresholds for scroll-linked section tracking.
///
/// The defaults are the canonical set; a form that needs different tuning
/// carries an explicit `scroll` override in its schema document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Fraction of the viewport height, measured from its top, where the
    /// activation line sits.
    pub trigger_ratio: f64,
    /// Minimum visible overlap, as a fraction of the viewport height, for the
    /// largest-overlap fallback to pick a section.
    pub min_overlap_ratio: f64,
    pub debounce_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            trigger_ratio: 0.2,
            min_overlap_ratio: 0.1,
            debounce_ms: 100,
        }
    }
}

impl ScrollConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_trigger_ratio(mut self, ratio: f64) -> Self {
        self.trigger_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_overlap_ratio(mut self, ratio: f64) -> Self {
        self.min_overlap_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }
}
