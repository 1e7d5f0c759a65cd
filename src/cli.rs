use clap::Parser;

use crate::cursor::MotionPreference;
use crate::particle::ParticleSettings;

/// A portfolio page with cursor particles and scroll effects
#[derive(Parser, Debug)]
#[command()]
pub struct Args {
    /// The framerate the page will run at
    ///
    /// 0 runs as fast as the display allows
    #[arg(short, long, default_value_t = 60)]
    pub framerate: u32,

    /// Seed for every random effect, for reproducible sessions
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Disable the particle effects, as a reduced-motion preference would
    #[arg(long)]
    pub reduced_motion: bool,

    /// Live particles beyond this evict the oldest
    #[arg(long, default_value_t = 500)]
    pub max_particles: usize,

    /// Particles spawned per click or tap
    #[arg(long, default_value_t = 10)]
    pub burst: usize,

    /// Probability of a particle per pointer move
    #[arg(long, default_value_t = 0.1, value_parser = probability)]
    pub spawn_chance: f64,

    /// Downward acceleration in pixels per frame squared
    #[arg(short, long, default_value_t = 0.05f32)]
    pub gravity: f32,

    /// Fraction of simulated form submissions that succeed
    #[arg(long, default_value_t = 0.9, value_parser = probability)]
    pub submit_success_rate: f64,
}

/// Parses a finite value in `0..=1`.
fn probability(value: &str) -> Result<f64, String> {
    let p: f64 = value.parse().map_err(|err| format!("{err}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{value} is not between 0 and 1"))
    }
}

impl Args {
    pub fn motion_preference(&self) -> MotionPreference {
        if self.reduced_motion {
            MotionPreference::Reduce
        } else {
            MotionPreference::NoPreference
        }
    }

    pub fn particle_settings(&self) -> ParticleSettings {
        ParticleSettings {
            max_particles: self.max_particles,
            burst_count: self.burst,
            spawn_chance: self.spawn_chance as f32,
            gravity: self.gravity,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_particle_settings() {
        let args = Args::parse_from(["portfolio_effects"]);
        let settings = args.particle_settings();
        let defaults = ParticleSettings::default();

        assert_eq!(settings.max_particles, defaults.max_particles);
        assert_eq!(settings.burst_count, defaults.burst_count);
        assert_eq!(settings.spawn_chance, defaults.spawn_chance);
        assert_eq!(settings.gravity, defaults.gravity);
        assert_eq!(args.motion_preference(), MotionPreference::NoPreference);
        assert_eq!(args.framerate, 60);
    }

    #[test]
    fn reduced_motion_flag() {
        let args = Args::parse_from(["portfolio_effects", "--reduced-motion", "--burst", "5"]);
        assert_eq!(args.motion_preference(), MotionPreference::Reduce);
        assert_eq!(args.particle_settings().burst_count, 5);
    }

    #[test]
    fn rates_must_be_probabilities() {
        for bad in ["NaN", "inf", "-0.5", "1.5", "often"] {
            assert!(
                Args::try_parse_from(["portfolio_effects", "--spawn-chance", bad]).is_err(),
                "accepted spawn chance {bad}"
            );
            assert!(
                Args::try_parse_from(["portfolio_effects", "--submit-success-rate", bad]).is_err(),
                "accepted success rate {bad}"
            );
        }

        let args = Args::parse_from([
            "portfolio_effects",
            "--spawn-chance",
            "1",
            "--submit-success-rate",
            "0",
        ]);
        assert_eq!(args.particle_settings().spawn_chance, 1.0);
        assert_eq!(args.submit_success_rate, 0.0);
    }
}
