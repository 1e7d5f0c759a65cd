use std::time::Duration;

use crate::scroll::{parallax_offset, ParallaxProfile};
use crate::timer::Timers;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outline {
    /// Unclipped, before the first morph.
    Square,
    Triangle,
    Diamond,
    Hexagon,
    Circle,
}

impl Outline {
    const CYCLE: [Outline; 4] = [
        Outline::Triangle,
        Outline::Diamond,
        Outline::Hexagon,
        Outline::Circle,
    ];

    /// Polygon corners in unit space, `(0, 0)` top-left to `(1, 1)`.
    /// Circles have none.
    pub fn points(self) -> &'static [[f32; 2]] {
        match self {
            Outline::Square => &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            Outline::Triangle => &[[0.5, 0.0], [1.0, 1.0], [0.0, 1.0]],
            Outline::Diamond => &[[0.5, 0.0], [1.0, 0.5], [0.5, 1.0], [0.0, 0.5]],
            Outline::Hexagon => &[
                [0.25, 0.0],
                [0.75, 0.0],
                [1.0, 0.5],
                [0.75, 1.0],
                [0.25, 1.0],
                [0.0, 0.5],
            ],
            Outline::Circle => &[],
        }
    }
}

/// A background decoration that morphs between outlines and drifts with
/// the scroll position.
pub struct FloatingShape {
    index: usize,
    outline: Option<usize>,
    period: Duration,
    frozen: bool,
    timers: Timers<()>,
}

impl FloatingShape {
    pub fn new(index: usize) -> Self {
        let period = Duration::from_millis(3000 + 1000 * index as u64);
        let mut timers = Timers::new();
        timers.schedule(period, ());

        Self {
            index,
            outline: None,
            period,
            frozen: false,
            timers,
        }
    }

    /// Stops morphing, for devices that can't spare the frames.
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.timers.cancel_all();
    }

    pub fn advance(&mut self, dt: Duration) {
        let target = self.timers.now() + dt;
        while self.timers.pop_until(target).is_some() {
            self.outline = Some(self.outline.map_or(0, |i| (i + 1) % Outline::CYCLE.len()));
            self.timers.schedule(self.period, ());
        }
        self.timers.settle(target);
    }

    pub fn outline(&self) -> Outline {
        self.outline.map_or(Outline::Square, |i| Outline::CYCLE[i])
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn offset(&self, scroll_y: f32, profile: ParallaxProfile) -> f32 {
        parallax_offset(scroll_y, self.index, profile)
    }
}
