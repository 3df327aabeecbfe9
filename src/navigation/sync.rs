use std::time::Duration;

use tracing::trace;

use crate::form::FormState;

use super::{Debouncer, ScrollBehavior, ScrollConfig, ViewportPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Idle,
    /// A recompute is scheduled for the end of the current burst.
    Scrolling,
}

/// Keeps the active-section indicator in step with the scroll position.
#[derive(Debug, Clone)]
pub struct ScrollSyncNavigator {
    config: ScrollConfig,
    debounce: Debouncer,
}

impl ScrollSyncNavigator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            debounce: Debouncer::new(config.debounce()),
            config,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn phase(&self) -> ScrollPhase {
        if self.debounce.is_pending() {
            ScrollPhase::Scrolling
        } else {
            ScrollPhase::Idle
        }
    }

    /// Record a scroll event; restarts the debounce window.
    pub fn on_scroll(&mut self, now: Duration) {
        self.debounce.schedule(now);
    }

    /// Run the pending recompute if its deadline has passed. Returns the new
    /// active section when it changed.
    pub fn tick(
        &mut self,
        now: Duration,
        viewport: &impl ViewportPort,
        state: &mut FormState,
    ) -> Option<String> {
        if !self.debounce.fire(now) {
            return None;
        }
        let next = self.compute_active(viewport, state)?;
        if state.set_active_section(&next) {
            trace!(section = %next, "active section follows scroll");
            Some(next)
        } else {
            None
        }
    }

    /// The section under the activation line, or failing that the one with
    /// the largest visible overlap above the flicker threshold.
    pub fn compute_active(
        &self,
        viewport: &impl ViewportPort,
        state: &FormState,
    ) -> Option<String> {
        let scroll_top = viewport.scroll_top();
        let height = viewport.viewport_height();
        let trigger = scroll_top + height * self.config.trigger_ratio;
        let view_bottom = scroll_top + height;
        let min_overlap = height * self.config.min_overlap_ratio;

        let mut fallback: Option<(&str, f64)> = None;
        for section in state.schema().sections() {
            let Some(bounds) = viewport.section_bounds(&section.key) else {
                continue;
            };
            if bounds.contains(trigger) {
                return Some(section.key.clone());
            }
            let overlap = bounds.overlap(scroll_top, view_bottom);
            if overlap > min_overlap && fallback.is_none_or(|(_, best)| overlap > best) {
                fallback = Some((section.key.as_str(), overlap));
            }
        }
        fallback.map(|(key, _)| key.to_string())
    }

    /// Jump to a section: mark it active right away and scroll so its top
    /// lands on the activation line. Returns `false` for an unknown or
    /// unrendered section.
    pub fn scroll_to_section(
        &mut self,
        key: &str,
        viewport: &mut impl ViewportPort,
        state: &mut FormState,
    ) -> bool {
        if state.schema().section(key).is_none() {
            return false;
        }
        let Some(bounds) = viewport.section_bounds(key) else {
            return false;
        };
        let offset = (bounds.top - viewport.viewport_height() * self.config.trigger_ratio).max(0.0);
        self.debounce.cancel();
        state.set_active_section(key);
        viewport.scroll_to(offset, ScrollBehavior::Smooth);
        trace!(section = key, offset, "scrolled to section");
        true
    }
}

impl Default for ScrollSyncNavigator {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}
