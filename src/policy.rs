//! Burst parameters for each firework variant.

use crate::particle::{DecayClass, Particle, ParticleKind};
use crate::random;
use crate::surface::Color;
use fastrand::Rng;
use glam::DVec2;
use std::fmt;

/// Frames between the two bursts of a [`FireworkVariant::Double`].
pub const SECOND_BURST_DELAY_FRAMES: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireworkVariant {
    Strobe,
    Sparkle,
    Small,
    Medium,
    Large,
    Double,
}

/// Immutable recipe for one burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionPolicy {
    pub count: usize,
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub decay: DecayClass,
    pub kind: ParticleKind,
}

const STROBE: ExplosionPolicy = ExplosionPolicy {
    count: 200,
    min_speed: 0.1,
    max_speed: 1.5,
    min_size: 2.0,
    max_size: 5.0,
    decay: DecayClass::SuperSlow,
    kind: ParticleKind::Strobe,
};

const SPARKLE: ExplosionPolicy = ExplosionPolicy {
    count: 75,
    min_speed: 0.5,
    max_speed: 1.0,
    min_size: 7.0,
    max_size: 14.0,
    decay: DecayClass::Medium,
    kind: ParticleKind::Sparkle,
};

const SMALL: ExplosionPolicy = ExplosionPolicy {
    count: 50,
    min_speed: 1.0,
    max_speed: 3.0,
    min_size: 1.0,
    max_size: 3.0,
    decay: DecayClass::Medium,
    kind: ParticleKind::Standard,
};

const MEDIUM: ExplosionPolicy = ExplosionPolicy {
    count: 100,
    min_speed: 2.0,
    max_speed: 4.0,
    min_size: 2.0,
    max_size: 5.0,
    decay: DecayClass::Medium,
    kind: ParticleKind::Standard,
};

const LARGE: ExplosionPolicy = ExplosionPolicy {
    count: 150,
    min_speed: 3.0,
    max_speed: 6.0,
    min_size: 3.0,
    max_size: 7.0,
    decay: DecayClass::Slow,
    kind: ParticleKind::Standard,
};

const DOUBLE_FIRST: ExplosionPolicy = ExplosionPolicy {
    count: 300,
    min_speed: 5.0,
    max_speed: 7.0,
    min_size: 10.0,
    max_size: 15.0,
    decay: DecayClass::Slow,
    kind: ParticleKind::Standard,
};

const DOUBLE_SECOND: ExplosionPolicy = ExplosionPolicy {
    count: 150,
    ..DOUBLE_FIRST
};

impl FireworkVariant {
    pub const ALL: [FireworkVariant; 6] = [
        FireworkVariant::Strobe,
        FireworkVariant::Sparkle,
        FireworkVariant::Small,
        FireworkVariant::Medium,
        FireworkVariant::Large,
        FireworkVariant::Double,
    ];

    pub fn random(rng: &mut Rng) -> Self {
        Self::ALL[rng.usize(0..Self::ALL.len())]
    }

    /// The burst fired when the rocket explodes.
    pub fn policy(self) -> ExplosionPolicy {
        match self {
            FireworkVariant::Strobe => STROBE,
            FireworkVariant::Sparkle => SPARKLE,
            FireworkVariant::Small => SMALL,
            FireworkVariant::Medium => MEDIUM,
            FireworkVariant::Large => LARGE,
            FireworkVariant::Double => DOUBLE_FIRST,
        }
    }

    /// The delayed second burst, if this variant has one.
    pub fn follow_up(self) -> Option<ExplosionPolicy> {
        match self {
            FireworkVariant::Double => Some(DOUBLE_SECOND),
            _ => None,
        }
    }

    /// Seconds added to the next launch interval when this variant is in a batch.
    pub fn additional_delay(self) -> f64 {
        match self {
            FireworkVariant::Double => 2.0,
            FireworkVariant::Large => 1.5,
            _ => 0.0,
        }
    }
}

impl fmt::Display for FireworkVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FireworkVariant::Strobe => "strobe",
            FireworkVariant::Sparkle => "sparkle",
            FireworkVariant::Small => "small",
            FireworkVariant::Medium => "medium",
            FireworkVariant::Large => "large",
            FireworkVariant::Double => "double",
        };
        f.write_str(name)
    }
}

impl ExplosionPolicy {
    /// Scatter `count` fragments from `origin` in uniformly random directions.
    pub fn spawn(&self, origin: DVec2, rng: &mut Rng) -> Vec<Particle> {
        let decay_rate = self.decay.rate();
        (0..self.count)
            .map(|_| {
                let angle = random::angle(rng);
                let speed = random::uniform(rng, self.min_speed, self.max_speed);
                let size = random::uniform(rng, self.min_size, self.max_size);
                let velocity = DVec2::new(angle.cos() * speed, angle.sin() * speed);
                Particle::new(self.kind, origin, velocity, Color::vibrant(rng), size, decay_rate)
            })
            .collect()
    }
}
