//! Hover and click effects computed from the pointer position.

use std::time::Duration;

use glam::Vec2;

use crate::timer::Timers;

/// Axis-aligned element bounds in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub size: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }
}

/// A card's 3D tilt, in degrees, plus how far it lifts towards the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub lift: f32,
}

impl Tilt {
    pub const REST: Self = Self {
        rotate_x: 0.0,
        rotate_y: 0.0,
        lift: 0.0,
    };
}

/// Tilt towards the pointer; `None` means the pointer left the card.
pub fn tilt(pointer: Option<Vec2>, bounds: Bounds) -> Tilt {
    let Some(pointer) = pointer else {
        return Tilt::REST;
    };

    let local = pointer - bounds.min;
    let center = bounds.size / 2.0;
    Tilt {
        rotate_x: (local.y - center.y) / 10.0,
        rotate_y: (center.x - local.x) / 10.0,
        lift: 20.0,
    }
}

/// Offset pulling a button towards the pointer.
pub fn magnetic_offset(pointer: Option<Vec2>, bounds: Bounds) -> Vec2 {
    match pointer {
        Some(pointer) => (pointer - bounds.center()) * 0.2 - Vec2::new(0.0, 3.0),
        None => Vec2::ZERO,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverLift {
    pub rise: f32,
    pub scale: f32,
}

pub fn hover_lift(hovered: bool) -> HoverLift {
    if hovered {
        HoverLift {
            rise: 8.0,
            scale: 1.05,
        }
    } else {
        HoverLift {
            rise: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub scale: f32,
    pub alpha: f32,
}

pub fn glow(hovered: bool) -> Glow {
    if hovered {
        Glow {
            scale: 1.02,
            alpha: 0.8,
        }
    } else {
        Glow {
            scale: 1.0,
            alpha: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ripple {
    pub id: u64,
    /// Centre relative to the element's top-left corner
    pub center: Vec2,
    /// Final diameter
    pub size: f32,
    born: Duration,
}

/// Click ripples, each removed once its animation has run.
#[derive(Default)]
pub struct Ripples {
    next_id: u64,
    active: Vec<Ripple>,
    timers: Timers<u64>,
}

impl Ripples {
    pub const LIFETIME: Duration = Duration::from_millis(600);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, click: Vec2, bounds: Bounds) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.active.push(Ripple {
            id,
            center: click - bounds.min,
            size: bounds.size.x.max(bounds.size.y),
            born: self.timers.now(),
        });
        self.timers.schedule(Self::LIFETIME, id);
        id
    }

    pub fn advance(&mut self, dt: Duration) {
        for id in self.timers.advance(dt) {
            self.active.retain(|r| r.id != id);
        }
    }

    pub fn active(&self) -> &[Ripple] {
        &self.active
    }

    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    /// Current radius with an ease-out from zero to half the final size.
    pub fn radius(&self, ripple: &Ripple) -> f32 {
        let t = (self.timers.now() - ripple.born).as_secs_f32() / Self::LIFETIME.as_secs_f32();
        let t = t.clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        ripple.size / 2.0 * eased
    }

    /// Fades out as the ripple grows.
    pub fn opacity(&self, ripple: &Ripple) -> f32 {
        let t = (self.timers.now() - ripple.born).as_secs_f32() / Self::LIFETIME.as_secs_f32();
        0.3 * (1.0 - t.clamp(0.0, 1.0))
    }
}

/// A soft light that follows the cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AmbientLight {
    center: Option<Vec2>,
}

impl AmbientLight {
    pub const DIAMETER: f32 = 200.0;

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.center = Some(position);
    }

    pub fn pointer_left(&mut self) {
        self.center = None;
    }

    pub fn center(&self) -> Option<Vec2> {
        self.center
    }

    /// Top-left corner of the light's square.
    pub fn origin(&self) -> Option<Vec2> {
        self.center.map(|c| c - Vec2::splat(Self::DIAMETER / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ms;

    fn card() -> Bounds {
        Bounds::new(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0))
    }

    #[test]
    fn tilt_follows_pointer_offset() {
        let t = tilt(Some(Vec2::new(300.0, 200.0)), card());
        // bottom-right corner: 50px below and 100px right of centre
        assert_eq!(t.rotate_x, 5.0);
        assert_eq!(t.rotate_y, -10.0);
        assert_eq!(t.lift, 20.0);

        let centered = tilt(Some(card().center()), card());
        assert_eq!(centered.rotate_x, 0.0);
        assert_eq!(centered.rotate_y, 0.0);

        assert_eq!(tilt(None, card()), Tilt::REST);
    }

    #[test]
    fn magnetic_pull() {
        let offset = magnetic_offset(Some(Vec2::new(250.0, 150.0)), card());
        assert_eq!(offset, Vec2::new(10.0, -3.0));
        assert_eq!(magnetic_offset(None, card()), Vec2::ZERO);
    }

    #[test]
    fn ripple_lives_for_its_animation() {
        let mut ripples = Ripples::new();
        ripples.spawn(Vec2::new(150.0, 120.0), card());

        let ripple = ripples.active()[0];
        assert_eq!(ripple.center, Vec2::new(50.0, 20.0));
        assert_eq!(ripple.size, 200.0);
        assert_eq!(ripples.radius(&ripple), 0.0);

        ripples.advance(ms(300));
        let mid = ripples.radius(&ripples.active()[0]);
        assert!(mid > 50.0 && mid < 100.0);

        ripples.advance(ms(299));
        assert_eq!(ripples.active().len(), 1);
        ripples.advance(ms(1));
        assert!(ripples.active().is_empty());
        assert!(!ripples.is_animating());
    }

    #[test]
    fn overlapping_ripples_expire_independently() {
        let mut ripples = Ripples::new();
        ripples.spawn(Vec2::new(110.0, 110.0), card());
        ripples.advance(ms(400));
        let second = ripples.spawn(Vec2::new(120.0, 110.0), card());

        ripples.advance(ms(200));
        assert_eq!(ripples.active().len(), 1);
        assert_eq!(ripples.active()[0].id, second);
    }

    #[test]
    fn ambient_light_tracks_and_hides() {
        let mut light = AmbientLight::default();
        assert_eq!(light.origin(), None);

        light.pointer_moved(Vec2::new(300.0, 300.0));
        assert_eq!(light.origin(), Some(Vec2::new(200.0, 200.0)));

        light.pointer_left();
        assert_eq!(light.center(), None);
    }

    #[test]
    fn hover_states() {
        assert_eq!(hover_lift(true).scale, 1.05);
        assert_eq!(hover_lift(false).rise, 0.0);
        assert_eq!(glow(true).scale, 1.02);
        assert_eq!(glow(false).alpha, 0.0);
    }
}
