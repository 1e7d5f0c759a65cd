//! Adaptations for small screens and touch input.

use std::collections::HashSet;
use std::time::Duration;

use glam::Vec2;
use log::debug;

use crate::scroll::ParallaxProfile;
use crate::timer::{TimerId, Timers};

pub const MOBILE_MAX_WIDTH: f32 = 768.0;
pub const TABLET_MAX_WIDTH: f32 = 1024.0;
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// What kind of device the page is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceProfile {
    pub mobile: bool,
    pub tablet: bool,
    pub touch: bool,
}

impl DeviceProfile {
    /// `platform` is an OS name such as `std::env::consts::OS`; handheld
    /// platforms count as mobile at any width.
    pub fn detect(platform: &str, width: f32, touch: bool) -> Self {
        let handheld = matches!(platform, "android" | "ios");
        Self {
            mobile: handheld || width <= MOBILE_MAX_WIDTH,
            tablet: handheld && width > MOBILE_MAX_WIDTH && width <= TABLET_MAX_WIDTH,
            touch: touch || handheld,
        }
    }

    pub fn is_desktop(&self) -> bool {
        !self.mobile && !self.tablet
    }

    pub fn parallax(&self) -> ParallaxProfile {
        if self.is_desktop() {
            ParallaxProfile::Full
        } else {
            ParallaxProfile::Reduced
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerformanceMode {
    Full,
    Reduced,
}

impl PerformanceMode {
    /// Mobile devices with two cores or fewer get the cheap animations.
    pub fn detect(profile: DeviceProfile, cores: usize) -> Self {
        if profile.mobile && cores <= 2 {
            PerformanceMode::Reduced
        } else {
            PerformanceMode::Full
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// A click anywhere outside the navbar closes the menu.
    pub fn clicked(&mut self, inside_nav: bool) {
        if !inside_nav {
            self.close();
        }
    }
}

/// Detects vertical swipes between a touch start and end.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwipeTracker {
    start_y: Option<f32>,
}

impl SwipeTracker {
    pub fn touch_start(&mut self, y: f32) {
        self.start_y = Some(y);
    }

    pub fn touch_end(&mut self, y: f32) -> bool {
        match self.start_y.take() {
            Some(start) => (y - start).abs() > SWIPE_THRESHOLD,
            None => false,
        }
    }
}

/// Pressed state for touched elements. The press shrinks an element while
/// the finger is down and leaves it highlighted for a moment after.
pub struct TouchFeedback<K> {
    pressed: HashSet<K>,
    active: HashSet<K>,
    timers: Timers<K>,
}

impl<K: Copy + Eq + std::hash::Hash> Default for TouchFeedback<K> {
    fn default() -> Self {
        Self {
            pressed: HashSet::new(),
            active: HashSet::new(),
            timers: Timers::new(),
        }
    }
}

impl<K: Copy + Eq + std::hash::Hash> TouchFeedback<K> {
    pub const PRESSED_SCALE: f32 = 0.95;
    pub const LINGER: Duration = Duration::from_millis(300);

    pub fn touch_start(&mut self, key: K) {
        self.pressed.insert(key);
        self.active.insert(key);
    }

    pub fn touch_end(&mut self, key: K) {
        if self.pressed.remove(&key) {
            self.timers.schedule(Self::LINGER, key);
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        for key in self.timers.advance(dt) {
            if !self.pressed.contains(&key) {
                self.active.remove(&key);
            }
        }
    }

    pub fn scale(&self, key: K) -> f32 {
        if self.pressed.contains(&key) {
            Self::PRESSED_SCALE
        } else {
            1.0
        }
    }

    pub fn is_active(&self, key: K) -> bool {
        self.active.contains(&key)
    }

    pub fn is_animating(&self) -> bool {
        !self.timers.is_idle()
    }
}

/// Layout values derived from the window size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    /// One percent of the viewport height
    pub vh: f32,
}

impl ViewportMetrics {
    pub fn new(size: Vec2) -> Self {
        Self { vh: size.y * 0.01 }
    }

    /// The hero fills the whole viewport.
    pub fn hero_min_height(&self) -> f32 {
        self.vh * 100.0
    }
}

/// Applies a window size only after resizes have been quiet for a while.
#[derive(Default)]
pub struct ResizeDebounce {
    pending: Option<(TimerId, Vec2)>,
    timers: Timers<()>,
}

impl ResizeDebounce {
    pub const QUIET: Duration = Duration::from_millis(250);

    pub fn resized(&mut self, size: Vec2) {
        if let Some((timer, _)) = self.pending.take() {
            self.timers.cancel(timer);
        }
        let timer = self.timers.schedule(Self::QUIET, ());
        self.pending = Some((timer, size));
    }

    /// Returns the settled size once the window stopped changing.
    pub fn advance(&mut self, dt: Duration) -> Option<Vec2> {
        if self.timers.advance(dt).is_empty() {
            return None;
        }
        let (_, size) = self.pending.take()?;
        debug!("Viewport settled at {}x{}", size.x, size.y);
        Some(size)
    }

    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ms;

    #[test]
    fn device_detection() {
        let phone = DeviceProfile::detect("android", 400.0, true);
        assert!(phone.mobile && !phone.tablet && phone.touch);

        let tablet = DeviceProfile::detect("ios", 900.0, false);
        assert!(tablet.mobile && tablet.tablet && tablet.touch);

        let narrow_desktop = DeviceProfile::detect("linux", 700.0, false);
        assert!(narrow_desktop.mobile && !narrow_desktop.tablet);
        assert_eq!(narrow_desktop.parallax(), ParallaxProfile::Reduced);

        let desktop = DeviceProfile::detect("windows", 1440.0, false);
        assert!(desktop.is_desktop());
        assert_eq!(desktop.parallax(), ParallaxProfile::Full);
    }

    #[test]
    fn performance_mode() {
        let phone = DeviceProfile::detect("android", 400.0, true);
        let desktop = DeviceProfile::detect("linux", 1440.0, false);
        assert_eq!(PerformanceMode::detect(phone, 2), PerformanceMode::Reduced);
        assert_eq!(PerformanceMode::detect(phone, 8), PerformanceMode::Full);
        assert_eq!(PerformanceMode::detect(desktop, 1), PerformanceMode::Full);
    }

    #[test]
    fn menu_closes_on_outside_click() {
        let mut menu = MobileMenu::default();
        menu.toggle();
        menu.clicked(true);
        assert!(menu.is_open());
        menu.clicked(false);
        assert!(!menu.is_open());
    }

    #[test]
    fn swipe_needs_distance() {
        let mut swipe = SwipeTracker::default();
        swipe.touch_start(300.0);
        assert!(!swipe.touch_end(340.0));

        swipe.touch_start(300.0);
        assert!(swipe.touch_end(240.0));

        // an end without a start is not a swipe
        assert!(!swipe.touch_end(0.0));
    }

    #[test]
    fn touch_feedback_lingers() {
        let mut touch = TouchFeedback::default();
        touch.touch_start("cta");
        assert_eq!(touch.scale("cta"), 0.95);
        assert!(touch.is_active("cta"));

        touch.touch_end("cta");
        assert_eq!(touch.scale("cta"), 1.0);
        touch.advance(ms(299));
        assert!(touch.is_active("cta"));
        touch.advance(ms(1));
        assert!(!touch.is_active("cta"));
    }

    #[test]
    fn retouch_keeps_element_active() {
        let mut touch = TouchFeedback::default();
        touch.touch_start(1);
        touch.touch_end(1);
        touch.advance(ms(200));
        touch.touch_start(1);
        touch.advance(ms(200));
        assert!(touch.is_active(1));
    }

    #[test]
    fn viewport_metrics() {
        let metrics = ViewportMetrics::new(Vec2::new(390.0, 844.0));
        assert!((metrics.vh - 8.44).abs() < 1e-4);
        assert!((metrics.hero_min_height() - 844.0).abs() < 1e-3);
    }

    #[test]
    fn resize_waits_for_quiet() {
        let mut debounce = ResizeDebounce::default();
        debounce.resized(Vec2::new(800.0, 600.0));
        assert_eq!(debounce.advance(ms(200)), None);

        debounce.resized(Vec2::new(700.0, 600.0));
        assert_eq!(debounce.advance(ms(200)), None);
        assert_eq!(debounce.advance(ms(50)), Some(Vec2::new(700.0, 600.0)));
        assert!(!debounce.is_animating());
    }
}
