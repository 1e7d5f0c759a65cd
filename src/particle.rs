use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use crate::color::{Hsl, Rgba};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Pixels per frame
    pub velocity: Vec2,
    pub life: f32,
    pub decay: f32,
    pub size: f32,
    pub color: Rgba,
    pub opacity: f32,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Tuning for spawn, integration and the live-particle cap.
#[derive(Clone, Debug)]
pub struct ParticleSettings {
    /// Each velocity component is sampled from `-max_speed..max_speed`
    pub max_speed: f32,
    /// Added to the vertical velocity every frame
    pub gravity: f32,
    pub decay_min: f32,
    pub decay_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub hue_min: f32,
    pub hue_max: f32,
    pub saturation: f32,
    pub lightness_min: f32,
    pub lightness_max: f32,

    /// Probability of a spawn per pointer move
    pub spawn_chance: f32,
    /// Particles per click
    pub burst_count: usize,
    /// Full width of the per-axis offset applied to burst particles
    pub burst_jitter: f32,

    /// Oldest particles are evicted beyond this
    pub max_particles: usize,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            gravity: 0.05,
            decay_min: 0.01,
            decay_max: 0.03,
            size_min: 2.0,
            size_max: 6.0,
            hue_min: 240.0,
            hue_max: 300.0,
            saturation: 0.7,
            lightness_min: 0.5,
            lightness_max: 0.8,

            spawn_chance: 0.1,
            burst_count: 10,
            burst_jitter: 20.0,

            max_particles: 500,
        }
    }
}

/// Anything particles can be drawn onto.
pub trait ParticleCanvas {
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, opacity: f32);
}

pub struct ParticleSystem<R> {
    settings: ParticleSettings,
    particles: VecDeque<Particle>,
    rng: R,
}

impl<R: Rng> ParticleSystem<R> {
    pub fn new(settings: ParticleSettings, rng: R) -> Self {
        Self {
            particles: VecDeque::with_capacity(settings.max_particles),
            settings,
            rng,
        }
    }

    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn spawn(&mut self, position: Vec2) {
        let s = &self.settings;
        let rng = &mut self.rng;

        let velocity = Vec2::new(
            rng.gen_range(-s.max_speed..s.max_speed),
            rng.gen_range(-s.max_speed..s.max_speed),
        );
        let decay = rng.gen_range(s.decay_min..s.decay_max);
        let size = rng.gen_range(s.size_min..s.size_max);
        let color = Hsl::new(
            rng.gen_range(s.hue_min..s.hue_max),
            s.saturation,
            rng.gen_range(s.lightness_min..s.lightness_max),
        );

        if s.max_particles == 0 {
            return;
        }
        while self.particles.len() >= s.max_particles {
            self.particles.pop_front();
        }

        self.particles.push_back(Particle {
            position,
            velocity,
            life: 1.0,
            decay,
            size,
            color: color.into(),
            opacity: 1.0,
        });
    }

    pub fn spawn_burst(&mut self, position: Vec2) {
        let half = self.settings.burst_jitter / 2.0;
        for _ in 0..self.settings.burst_count {
            let offset = if half > 0.0 {
                Vec2::new(
                    self.rng.gen_range(-half..half),
                    self.rng.gen_range(-half..half),
                )
            } else {
                Vec2::ZERO
            };
            self.spawn(position + offset);
        }
    }

    pub fn step(&mut self) {
        let gravity = self.settings.gravity;
        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.life -= particle.decay;
            particle.opacity = particle.life;
            particle.velocity.y += gravity;
        }

        self.particles.retain(Particle::is_alive);
    }

    pub fn render(&self, canvas: &mut impl ParticleCanvas) {
        canvas.clear();
        for particle in self.particles.iter().filter(|p| p.is_alive()) {
            canvas.fill_circle(
                particle.position,
                particle.size,
                particle.color,
                particle.opacity,
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[derive(Default)]
    pub struct RecordingCanvas {
        pub clears: usize,
        pub circles: Vec<(Vec2, f32, f32)>,
    }

    impl ParticleCanvas for RecordingCanvas {
        fn clear(&mut self) {
            self.clears += 1;
            self.circles.clear();
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, _color: Rgba, opacity: f32) {
            self.circles.push((center, radius, opacity));
        }
    }

    fn system(seed: u64) -> ParticleSystem<StdRng> {
        ParticleSystem::new(ParticleSettings::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn spawn_respects_settings_bounds() {
        let mut sim = system(1);
        for _ in 0..200 {
            sim.spawn(Vec2::new(100.0, 100.0));
        }

        for p in sim.particles() {
            assert_eq!(p.position, Vec2::new(100.0, 100.0));
            assert_eq!(p.life, 1.0);
            assert!(p.velocity.x >= -2.0 && p.velocity.x < 2.0);
            assert!(p.velocity.y >= -2.0 && p.velocity.y < 2.0);
            assert!(p.decay >= 0.01 && p.decay < 0.03);
            assert!(p.size >= 2.0 && p.size < 6.0);
            // hue band 240..300 is always blue-dominant over green
            assert!(p.color.b > p.color.g);
        }
    }

    #[test]
    fn life_strictly_decreases_until_removal() {
        let mut sim = system(7);
        sim.spawn(Vec2::new(100.0, 100.0));

        let mut last = 1.0;
        let mut steps = 0;
        while !sim.is_empty() {
            sim.step();
            steps += 1;
            if let Some(p) = sim.particles().next() {
                assert!(p.life < last);
                assert!(p.life > 0.0);
                assert_eq!(p.opacity, p.life);
                last = p.life;
            }
        }

        // decay in [0.01, 0.03) means between 34 and 100 frames
        assert!((34..=101).contains(&steps));
    }

    #[test]
    fn integration_applies_gravity_after_moving() {
        let mut sim = system(3);
        sim.spawn(Vec2::ZERO);
        let p0 = *sim.particles().next().unwrap();

        sim.step();
        let p1 = *sim.particles().next().unwrap();
        assert_eq!(p1.position, p0.velocity);
        assert_eq!(p1.velocity.x, p0.velocity.x);
        assert!((p1.velocity.y - (p0.velocity.y + 0.05)).abs() < 1e-6);

        sim.step();
        let p2 = *sim.particles().next().unwrap();
        assert!((p2.position - (p1.position + p1.velocity)).length() < 1e-5);
    }

    #[test]
    fn seeded_trajectories_are_reproducible() {
        let run = |seed| {
            let mut sim = system(seed);
            sim.spawn(Vec2::new(100.0, 100.0));
            let mut trajectory = Vec::new();
            for _ in 0..20 {
                sim.step();
                let p = sim.particles().next().copied();
                trajectory.push(p.map(|p| (p.position, p.life)));
            }
            trajectory
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn burst_spawns_batch_within_jitter() {
        let mut sim = system(11);
        let click = Vec2::new(300.0, 200.0);
        sim.spawn_burst(click);

        assert_eq!(sim.len(), 10);
        for p in sim.particles() {
            let offset = p.position - click;
            assert!(offset.x.abs() <= 10.0);
            assert!(offset.y.abs() <= 10.0);
        }
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let settings = ParticleSettings {
            max_particles: 3,
            ..Default::default()
        };
        let mut sim = ParticleSystem::new(settings, StdRng::seed_from_u64(0));
        for i in 0..5 {
            sim.spawn(Vec2::new(i as f32, 0.0));
        }

        let xs: Vec<f32> = sim.particles().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn render_clears_then_draws_live_particles() {
        let mut sim = system(5);
        sim.spawn(Vec2::new(10.0, 10.0));
        sim.spawn(Vec2::new(20.0, 20.0));

        let mut canvas = RecordingCanvas::default();
        sim.render(&mut canvas);
        assert_eq!(canvas.clears, 1);
        assert_eq!(canvas.circles.len(), 2);

        while !sim.is_empty() {
            sim.step();
            sim.render(&mut canvas);
            assert!(canvas.circles.iter().all(|(_, _, opacity)| *opacity > 0.0));
        }
        assert!(canvas.circles.is_empty());
    }
}
