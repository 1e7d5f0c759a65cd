//! Scroll-position driven effects: reveals, navbar, progress and parallax.
//!
//! Positions are vertical page coordinates in pixels, 0 at the top of the
//! content and growing downwards.

use std::time::Duration;

use crate::timer::{ms, Timers};

/// Scroll offsets past this count as "scrolled" for the navbar.
pub const NAVBAR_THRESHOLD: f32 = 100.0;
/// Offset added to the scroll position when picking the active section.
pub const ACTIVE_SECTION_OFFSET: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

impl Span {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// Shrinks (positive) or grows (negative) the viewport when testing
/// visibility, like a root margin of `-50px` on the bottom edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub top: f32,
    pub bottom: f32,
}

/// Fraction of `span` inside `viewport` after applying `margin`.
pub fn intersection_ratio(span: Span, viewport: Span, margin: RootMargin) -> f32 {
    let top = viewport.top + margin.top;
    let bottom = viewport.bottom() - margin.bottom;
    let overlap = (span.bottom().min(bottom) - span.top.max(top)).max(0.0);

    if span.height <= 0.0 {
        // zero-height elements are either on screen or not
        return if span.top >= top && span.top <= bottom { 1.0 } else { 0.0 };
    }
    (overlap / span.height).clamp(0.0, 1.0)
}

/// One-shot reveal once an element is visible enough.
pub struct RevealObserver<K> {
    threshold: f32,
    margin: RootMargin,
    entries: Vec<RevealEntry<K>>,
}

struct RevealEntry<K> {
    key: K,
    span: Span,
    revealed: bool,
}

impl<K: Copy + PartialEq> RevealObserver<K> {
    /// A zero threshold reveals on any intersection.
    pub fn new(threshold: f32, margin: RootMargin) -> Self {
        Self {
            threshold,
            margin,
            entries: Vec::new(),
        }
    }

    /// Starts observing `key`, or updates its layout if already observed.
    pub fn observe(&mut self, key: K, span: Span) {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.span = span,
            None => self.entries.push(RevealEntry {
                key,
                span,
                revealed: false,
            }),
        }
    }

    pub fn is_revealed(&self, key: K) -> bool {
        self.entries.iter().any(|e| e.key == key && e.revealed)
    }

    /// Returns the keys that became visible for the first time.
    pub fn update(&mut self, viewport: Span) -> Vec<K> {
        let mut newly = Vec::new();
        for entry in self.entries.iter_mut().filter(|e| !e.revealed) {
            let ratio = intersection_ratio(entry.span, viewport, self.margin);
            let visible = if self.threshold <= 0.0 {
                ratio > 0.0
            } else {
                ratio >= self.threshold
            };

            if visible {
                entry.revealed = true;
                newly.push(entry.key);
            }
        }
        newly
    }
}

/// Reveals the items of a group one after another.
pub struct StaggeredReveal {
    step: Duration,
    revealed: Vec<bool>,
    started: bool,
    timers: Timers<usize>,
}

impl StaggeredReveal {
    pub fn new(items: usize) -> Self {
        Self {
            step: ms(100),
            revealed: vec![false; items],
            started: false,
            timers: Timers::new(),
        }
    }

    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        for index in 0..self.revealed.len() {
            self.timers.schedule(self.step * index as u32, index);
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        for index in self.timers.advance(dt) {
            self.revealed[index] = true;
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn is_animating(&self) -> bool {
        !self.timers.is_idle()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Navbar {
    last_scroll_y: f32,
    /// Slid out of view
    pub hidden: bool,
    /// Opaque background once the page has scrolled
    pub solid: bool,
}

impl Navbar {
    pub fn on_scroll(&mut self, scroll_y: f32) {
        self.solid = scroll_y > NAVBAR_THRESHOLD;
        self.hidden = scroll_y > self.last_scroll_y && scroll_y > NAVBAR_THRESHOLD;
        self.last_scroll_y = scroll_y;
    }
}

/// The last section whose span contains the scroll position plus the
/// navbar allowance.
pub fn active_section<K: Copy>(sections: &[(K, Span)], scroll_y: f32) -> Option<K> {
    let position = scroll_y + ACTIVE_SECTION_OFFSET;
    sections
        .iter()
        .filter(|(_, span)| span.contains(position))
        .last()
        .map(|(key, _)| *key)
}

/// Percentage of the scrollable distance covered, in `0.0..=100.0`.
pub fn scroll_progress(scroll_y: f32, content_height: f32, viewport_height: f32) -> f32 {
    let scrollable = content_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParallaxProfile {
    Full,
    Reduced,
}

impl ParallaxProfile {
    fn speeds(self) -> (f32, f32) {
        match self {
            ParallaxProfile::Full => (0.5, 0.1),
            ParallaxProfile::Reduced => (0.3, 0.05),
        }
    }
}

/// Vertical offset of the `index`th floating element.
pub fn parallax_offset(scroll_y: f32, index: usize, profile: ParallaxProfile) -> f32 {
    let (base, step) = profile.speeds();
    -(scroll_y * (base + index as f32 * step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_with_margin() {
        let viewport = Span::new(0.0, 600.0);
        let margin = RootMargin {
            top: 0.0,
            bottom: 50.0,
        };

        // fully inside
        assert_eq!(intersection_ratio(Span::new(100.0, 100.0), viewport, margin), 1.0);
        // below the shrunken bottom edge
        assert_eq!(intersection_ratio(Span::new(560.0, 100.0), viewport, margin), 0.0);
        // half inside
        let half = intersection_ratio(Span::new(500.0, 100.0), viewport, margin);
        assert!((half - 0.5).abs() < 1e-6);
    }

    #[test]
    fn reveal_is_one_shot() {
        let mut observer = RevealObserver::new(
            0.1,
            RootMargin {
                top: 0.0,
                bottom: 50.0,
            },
        );
        observer.observe("about", Span::new(800.0, 400.0));
        observer.observe("contact", Span::new(2000.0, 400.0));

        assert!(observer.update(Span::new(0.0, 600.0)).is_empty());
        assert_eq!(observer.update(Span::new(400.0, 600.0)), vec!["about"]);
        // scrolling away and back does not re-fire
        assert!(observer.update(Span::new(0.0, 600.0)).is_empty());
        assert!(observer.update(Span::new(400.0, 600.0)).is_empty());
        assert!(observer.is_revealed("about"));
        assert!(!observer.is_revealed("contact"));
    }

    #[test]
    fn zero_threshold_fires_on_any_overlap() {
        let mut observer = RevealObserver::new(0.0, RootMargin::default());
        observer.observe(1, Span::new(599.0, 100.0));
        assert_eq!(observer.update(Span::new(0.0, 600.0)), vec![1]);
    }

    #[test]
    fn stagger_reveals_in_order() {
        let mut group = StaggeredReveal::new(3);
        group.advance(ms(500));
        assert!(!group.is_revealed(0));

        group.start();
        group.advance(Duration::ZERO);
        assert!(group.is_revealed(0));
        assert!(!group.is_revealed(1));

        group.advance(ms(100));
        assert!(group.is_revealed(1));
        assert!(!group.is_revealed(2));
        assert!(group.is_animating());

        group.advance(ms(100));
        assert!(group.is_revealed(2));
        assert!(!group.is_animating());
    }

    #[test]
    fn navbar_hides_on_scroll_down_only_past_threshold() {
        let mut navbar = Navbar::default();

        navbar.on_scroll(50.0);
        assert!(!navbar.hidden && !navbar.solid);

        navbar.on_scroll(150.0);
        assert!(navbar.hidden && navbar.solid);

        navbar.on_scroll(140.0);
        assert!(!navbar.hidden && navbar.solid);

        navbar.on_scroll(140.0);
        assert!(!navbar.hidden);

        navbar.on_scroll(90.0);
        assert!(!navbar.hidden && !navbar.solid);
    }

    #[test]
    fn active_section_uses_offset() {
        let sections = [
            ("home", Span::new(0.0, 500.0)),
            ("about", Span::new(500.0, 500.0)),
        ];

        assert_eq!(active_section(&sections, 0.0), Some("home"));
        assert_eq!(active_section(&sections, 400.0), Some("about"));
        assert_eq!(active_section(&sections, 950.0), None);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(scroll_progress(0.0, 2000.0, 500.0), 0.0);
        assert_eq!(scroll_progress(750.0, 2000.0, 500.0), 50.0);
        assert_eq!(scroll_progress(5000.0, 2000.0, 500.0), 100.0);
        assert_eq!(scroll_progress(10.0, 400.0, 500.0), 0.0);
    }

    #[test]
    fn parallax_speeds() {
        assert_eq!(parallax_offset(100.0, 0, ParallaxProfile::Full), -50.0);
        assert!((parallax_offset(100.0, 2, ParallaxProfile::Full) + 70.0).abs() < 1e-4);
        assert!((parallax_offset(100.0, 2, ParallaxProfile::Reduced) + 40.0).abs() < 1e-4);
    }
}
