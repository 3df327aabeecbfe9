mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use schemaform::{
    EngineOptions, ScrollBehavior, ScrollConfig, ScrollPhase, SectionBounds, ViewportPort,
};

use common::lead_controller;

/// Sections stacked top to bottom in schema order.
struct Page {
    sections: Vec<(&'static str, f64)>,
    scroll_top: f64,
    height: f64,
    jumps: Vec<(f64, ScrollBehavior)>,
}

impl Page {
    fn lead() -> Self {
        Self {
            sections: vec![
                ("company", 600.0),
                ("contact", 400.0),
                ("deal", 500.0),
                ("business", 300.0),
                ("remarks", 700.0),
            ],
            scroll_top: 0.0,
            height: 800.0,
            jumps: Vec::new(),
        }
    }
}

impl ViewportPort for Page {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn viewport_height(&self) -> f64 {
        self.height
    }

    fn section_bounds(&self, key: &str) -> Option<SectionBounds> {
        let mut top = 0.0;
        for (name, height) in &self.sections {
            if *name == key {
                return Some(SectionBounds::new(top, *height));
            }
            top += height;
        }
        None
    }

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
        self.scroll_top = offset;
        self.jumps.push((offset, behavior));
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn active_section_follows_trigger_line_after_debounce() {
    let (mut form, _) = lead_controller();
    form.open_create();
    let mut page = Page::lead();
    assert_eq!(form.state().active_section(), "company");

    // trigger at 900 + 0.2 * 800 = 1060, inside deal's [1000, 1500)
    page.scroll_top = 900.0;
    form.on_scroll(ms(0));
    form.on_scroll(ms(60));
    assert_eq!(form.navigator().phase(), ScrollPhase::Scrolling);
    assert_eq!(form.tick(ms(120), &page), None);
    assert_eq!(form.tick(ms(160), &page), Some("deal".to_string()));
    assert_eq!(form.state().active_section(), "deal");
    assert_eq!(form.navigator().phase(), ScrollPhase::Idle);

    // nothing pending, nothing recomputed
    page.scroll_top = 0.0;
    assert_eq!(form.tick(ms(500), &page), None);
    assert_eq!(form.state().active_section(), "deal");
}

#[test]
fn clicking_a_section_scrolls_to_the_trigger_line() {
    let (mut form, _) = lead_controller();
    form.open_create();
    let mut page = Page::lead();

    form.on_scroll(ms(0));
    assert!(form.scroll_to_section("business", &mut page));
    assert_eq!(form.state().active_section(), "business");
    // business starts at 1500; 1500 - 0.2 * 800
    assert_eq!(page.jumps, vec![(1340.0, ScrollBehavior::Smooth)]);
    assert_eq!(form.navigator().phase(), ScrollPhase::Idle);

    // the cancelled recompute never overrides the explicit choice
    assert_eq!(form.tick(ms(200), &page), None);
    assert_eq!(form.state().active_section(), "business");

    assert!(!form.scroll_to_section("pricing", &mut page));
}

#[test]
fn engine_options_retune_debounce() {
    let (form, _) = lead_controller();
    let mut form = form.with_options(EngineOptions::default().with_debounce(ms(250)));
    form.open_create();
    let mut page = Page::lead();
    page.scroll_top = 500.0;

    form.on_scroll(ms(0));
    assert_eq!(form.tick(ms(100), &page), None);
    assert_eq!(form.tick(ms(250), &page), Some("contact".to_string()));
    assert_eq!(
        form.navigator().config(),
        &ScrollConfig::default().with_debounce(ms(250))
    );
}

#[test]
fn closed_form_ignores_scroll_events() {
    let (mut form, _) = lead_controller();
    let mut page = Page::lead();
    page.scroll_top = 900.0;
    form.on_scroll(ms(0));
    assert_eq!(form.tick(ms(200), &page), None);
    assert!(!form.scroll_to_section("deal", &mut page));
    assert!(page.jumps.is_empty());
}
