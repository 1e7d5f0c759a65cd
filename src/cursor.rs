//! Pointer-driven particles and their frame loop.

use glam::Vec2;
use log::{debug, info};
use rand::Rng;

use crate::particle::{ParticleCanvas, ParticleSettings, ParticleSystem};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionPreference {
    NoPreference,
    Reduce,
}

pub struct CursorParticles<R> {
    system: ParticleSystem<R>,
    running: bool,
    frames: u64,
}

impl<R: Rng> CursorParticles<R> {
    /// The motion preference is read here and only here, so the effect
    /// never comes alive when reduced motion is requested at startup.
    pub fn start(motion: MotionPreference, settings: ParticleSettings, rng: R) -> Option<Self> {
        if motion == MotionPreference::Reduce {
            info!("Reduced motion requested, cursor particles disabled");
            return None;
        }

        debug!(
            "Cursor particles ready: chance {}, burst {}, cap {}",
            settings.spawn_chance, settings.burst_count, settings.max_particles
        );

        Some(Self {
            system: ParticleSystem::new(settings, rng),
            running: false,
            frames: 0,
        })
    }

    pub fn system(&self) -> &ParticleSystem<R> {
        &self.system
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames rendered since startup.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pointer_moved(&mut self, position: Vec2) -> bool {
        let chance = self.system.settings().spawn_chance as f64;
        // max/min rather than clamp so NaN reads as never
        if !self.system.rng().gen_bool(chance.max(0.0).min(1.0)) {
            return false;
        }

        self.system.spawn(position);
        self.running = true;
        true
    }

    pub fn clicked(&mut self, position: Vec2) {
        self.system.spawn_burst(position);
        self.running = !self.system.is_empty();
    }

    /// One display frame. Returns whether the loop wants another one; the
    /// frame that empties the collection still renders, to clear the canvas.
    pub fn frame(&mut self, canvas: &mut impl ParticleCanvas) -> bool {
        if !self.running {
            return false;
        }

        self.system.step();
        self.system.render(canvas);
        self.frames += 1;

        if self.system.is_empty() {
            self.running = false;
        }
        self.running
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::particle::tests::RecordingCanvas;

    fn driver(settings: ParticleSettings) -> CursorParticles<StdRng> {
        CursorParticles::start(
            MotionPreference::NoPreference,
            settings,
            StdRng::seed_from_u64(9),
        )
        .unwrap()
    }

    #[test]
    fn reduced_motion_never_starts() {
        let driver = CursorParticles::start(
            MotionPreference::Reduce,
            ParticleSettings::default(),
            StdRng::seed_from_u64(0),
        );
        assert!(driver.is_none());
    }

    #[test]
    fn loop_is_idle_until_something_spawns() {
        let mut driver = driver(ParticleSettings::default());
        let mut canvas = RecordingCanvas::default();

        assert!(!driver.frame(&mut canvas));
        assert_eq!(driver.frames(), 0);
        assert_eq!(canvas.clears, 0);
    }

    #[test]
    fn click_spawns_batch_and_loop_terminates() {
        let mut driver = driver(ParticleSettings::default());
        let mut canvas = RecordingCanvas::default();

        driver.clicked(Vec2::new(50.0, 50.0));
        assert_eq!(driver.system().len(), 10);
        assert!(driver.is_running());

        let mut frames = 0;
        while driver.frame(&mut canvas) {
            frames += 1;
            assert!(frames < 1000);
        }

        assert!(!driver.is_running());
        assert!(driver.system().is_empty());
        assert!(canvas.circles.is_empty());
        assert_eq!(driver.frames(), frames + 1);

        // restarts on the next spawn
        driver.clicked(Vec2::new(10.0, 10.0));
        assert!(driver.frame(&mut canvas));
    }

    #[test]
    fn pointer_moves_are_sampled() {
        let mut driver = driver(ParticleSettings::default());
        let spawned = (0..1000)
            .filter(|_| driver.pointer_moved(Vec2::new(1.0, 1.0)))
            .count();

        assert_eq!(spawned, driver.system().len());
        assert!((50..=150).contains(&spawned), "spawned {spawned}");
    }

    #[test]
    fn unusable_spawn_chance_spawns_nothing() {
        let mut driver = driver(ParticleSettings {
            spawn_chance: f32::NAN,
            ..Default::default()
        });
        assert!(!(0..100).any(|_| driver.pointer_moved(Vec2::ZERO)));
        assert!(driver.system().is_empty());
    }

    #[test]
    fn certain_and_impossible_spawn_chances() {
        let mut always = driver(ParticleSettings {
            spawn_chance: 1.0,
            ..Default::default()
        });
        assert!(always.pointer_moved(Vec2::ZERO));
        assert!(always.is_running());

        let mut never = driver(ParticleSettings {
            spawn_chance: 0.0,
            ..Default::default()
        });
        assert!(!never.pointer_moved(Vec2::ZERO));
        assert!(!never.is_running());
    }
}
