//! Simulation settings and the builder that validates them.

use crate::error::{ConfigError, Result};
use crate::firework::{Launcher, Sampler, max_launch_height};
use crate::random;
use crate::simulation::Simulation;
use fastrand::Rng;
use glam::DVec2;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const DEFAULT_FRAME_RATE: f64 = 60.0;
pub const DEFAULT_SECONDS_BETWEEN_LAUNCHES: f64 = 3.0;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 3;
pub const DEFAULT_LAUNCH_ANGLE_DEGREES: (f64, f64) = (60.0, 120.0);

/// Validated numeric settings, fixed for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub width: f64,
    pub height: f64,
    pub frame_rate: f64,
    pub seconds_between_launches: f64,
    pub max_batch_size: usize,
    pub start_position: DVec2,
    pub seed: u64,
}

impl SimulationConfig {
    /// Seconds per frame.
    pub fn timestep(&self) -> f64 {
        1.0 / self.frame_rate
    }
}

enum AngleSource {
    Degrees(f64, f64),
    Custom(Sampler),
}

pub struct SimulationBuilder {
    width: f64,
    height: f64,
    frame_rate: f64,
    seconds_between_launches: f64,
    max_batch_size: usize,
    start_position: Option<DVec2>,
    launch_angle: AngleSource,
    min_launch_height: Option<Sampler>,
    seed: Option<u64>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            frame_rate: DEFAULT_FRAME_RATE,
            seconds_between_launches: DEFAULT_SECONDS_BETWEEN_LAUNCHES,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            start_position: None,
            launch_angle: AngleSource::Degrees(
                DEFAULT_LAUNCH_ANGLE_DEGREES.0,
                DEFAULT_LAUNCH_ANGLE_DEGREES.1,
            ),
            min_launch_height: None,
            seed: None,
        }
    }
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn seconds_between_launches(mut self, seconds: f64) -> Self {
        self.seconds_between_launches = seconds;
        self
    }

    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Launch site. Defaults to the bottom-center of the canvas.
    pub fn start_position(mut self, position: DVec2) -> Self {
        self.start_position = Some(position);
        self
    }

    /// Uniform launch angle between two bearings in degrees, 90° being straight up.
    pub fn launch_angle_degrees(mut self, min: f64, max: f64) -> Self {
        self.launch_angle = AngleSource::Degrees(min, max);
        self
    }

    /// Launch angle in radians, drawn once per firework.
    pub fn launch_angle(mut self, sampler: impl Fn(&mut Rng) -> f64 + 'static) -> Self {
        self.launch_angle = AngleSource::Custom(Box::new(sampler));
        self
    }

    /// Lowest apex in metres a rocket is given enough speed to reach, drawn
    /// once per firework. Defaults to half the canvas-derived maximum.
    pub fn min_launch_height(mut self, sampler: impl Fn(&mut Rng) -> f64 + 'static) -> Self {
        self.min_launch_height = Some(Box::new(sampler));
        self
    }

    /// Seed for the simulation's random generator. Unseeded builds draw one.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Simulation> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) {
            return Err(ConfigError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if !positive(self.frame_rate) {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }
        if !positive(self.seconds_between_launches) {
            return Err(ConfigError::InvalidLaunchInterval(self.seconds_between_launches));
        }

        let launch_angle: Sampler = match self.launch_angle {
            AngleSource::Degrees(min, max) => {
                if min > max {
                    return Err(ConfigError::EmptyRange {
                        name: "launch angle",
                        min,
                        max,
                    });
                }
                let (lo, hi) = (min.to_radians(), max.to_radians());
                Box::new(move |rng: &mut Rng| random::uniform(rng, lo, hi))
            }
            AngleSource::Custom(sampler) => sampler,
        };

        let height = self.height;
        let min_launch_height: Sampler = match self.min_launch_height {
            Some(sampler) => sampler,
            None => Box::new(move |_: &mut Rng| max_launch_height(height) / 2.0),
        };

        let config = SimulationConfig {
            width: self.width,
            height: self.height,
            frame_rate: self.frame_rate,
            seconds_between_launches: self.seconds_between_launches,
            max_batch_size: self.max_batch_size,
            start_position: self
                .start_position
                .unwrap_or(DVec2::new(self.width / 2.0, self.height)),
            seed: self.seed.unwrap_or_else(|| fastrand::u64(..)),
        };
        let launcher = Launcher::new(
            config.start_position,
            launch_angle,
            min_launch_height,
            config.timestep(),
        );
        Ok(Simulation::new(config, launcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documentation() {
        let sim = SimulationBuilder::new().seed(1).build().unwrap();
        let config = sim.config();
        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 600.0);
        assert_eq!(config.frame_rate, 60.0);
        assert_eq!(config.seconds_between_launches, 3.0);
        assert_eq!(config.max_batch_size, 3);
        assert_eq!(config.start_position, DVec2::new(400.0, 600.0));
        assert_eq!(config.seed, 1);
    }

    #[test]
    fn rejects_degenerate_canvas() {
        let err = SimulationBuilder::new().width(0.0).build().err();
        assert_eq!(
            err,
            Some(ConfigError::InvalidCanvas {
                width: 0.0,
                height: 600.0
            })
        );
        assert!(SimulationBuilder::new().height(f64::NAN).build().is_err());
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert_eq!(
            SimulationBuilder::new().frame_rate(0.0).build().err(),
            Some(ConfigError::InvalidFrameRate(0.0))
        );
        assert_eq!(
            SimulationBuilder::new().seconds_between_launches(-1.0).build().err(),
            Some(ConfigError::InvalidLaunchInterval(-1.0))
        );
    }

    #[test]
    fn rejects_inverted_angle_range() {
        let err = SimulationBuilder::new()
            .launch_angle_degrees(120.0, 60.0)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::EmptyRange { name: "launch angle", .. }));
        assert_eq!(err.to_string(), "launch angle range is empty: min 120 > max 60");
    }

    #[test]
    fn launch_angles_stay_within_configured_bearings() {
        let mut sim = SimulationBuilder::new()
            .seed(9)
            .launch_angle_degrees(80.0, 100.0)
            .build()
            .unwrap();
        sim.launch_batch(20);
        for fw in sim.fireworks() {
            let degrees = fw.launch_angle().to_degrees();
            assert!((80.0 - 1e-9..100.0 + 1e-9).contains(&degrees));
        }
    }

    #[test]
    fn custom_samplers_are_used() {
        let mut sim = SimulationBuilder::new()
            .seed(4)
            .launch_angle(|_| std::f64::consts::FRAC_PI_2)
            .min_launch_height(|_| 39.0)
            .build()
            .unwrap();
        sim.launch_batch(5);
        let floor = (2.0 * crate::firework::GRAVITY * 39.0).sqrt() / std::f64::consts::FRAC_PI_4.sin();
        for fw in sim.fireworks() {
            assert_eq!(fw.launch_angle(), std::f64::consts::FRAC_PI_2);
            assert!(fw.initial_speed() >= floor);
        }
    }
}
