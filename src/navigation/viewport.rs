/// Pixel span of a rendered section inside the scroll container's content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Half-open containment: `[top, bottom)`.
    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.top && offset < self.bottom()
    }

    /// Length of the part of this span inside `[start, end)`.
    pub fn overlap(&self, start: f64, end: f64) -> f64 {
        (self.bottom().min(end) - self.top.max(start)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Layout geometry and scrolling supplied by the host, so section tracking
/// runs without a real layout engine.
pub trait ViewportPort {
    fn scroll_top(&self) -> f64;

    fn viewport_height(&self) -> f64;

    /// `None` when the section is not rendered.
    fn section_bounds(&self, key: &str) -> Option<SectionBounds>;

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior);
}
