use std::time::Duration;

use crate::navigation::ScrollConfig;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Canonical scroll thresholds; a schema's own `scroll` block wins.
    pub scroll: ScrollConfig,
    pub validate_formats: bool,
    /// After a rejected submit, make the first section with an error active.
    pub focus_first_error: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            scroll: ScrollConfig::default(),
            validate_formats: true,
            focus_first_error: true,
        }
    }
}

impl EngineOptions {
    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.scroll = self.scroll.with_debounce(delay);
        self
    }

    pub fn with_format_validation(mut self, enabled: bool) -> Self {
        self.validate_formats = enabled;
        self
    }

    pub fn with_focus_first_error(mut self, enabled: bool) -> Self {
        self.focus_first_error = enabled;
        self
    }
}
