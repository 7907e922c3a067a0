//! Firework display simulation: rockets climb under gravity, burst into
//! fragments whose look depends on the rocket variant, and fade out while a
//! scheduler keeps launching new batches at an adaptive cadence.
//!
//! The core never touches a clock or a screen. A host calls
//! [`Simulation::advance`] once per frame and hands a [`Surface`] to
//! [`Simulation::draw`]; all randomness flows from one seeded generator, so
//! a given seed replays the same show.

pub mod config;
pub mod error;
pub mod firework;
pub mod particle;
pub mod policy;
mod random;
pub mod scheduler;
pub mod simulation;
pub mod surface;
pub mod tasks;

pub use config::{SimulationBuilder, SimulationConfig};
pub use error::ConfigError;
pub use firework::{Firework, FireworkId, Launcher, Sampler};
pub use particle::{DecayClass, Particle, ParticleKind};
pub use policy::{ExplosionPolicy, FireworkVariant};
pub use scheduler::LaunchScheduler;
pub use simulation::Simulation;
pub use surface::{Color, Surface, Viewport};
