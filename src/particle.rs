//! Burst fragments. Every kind shares the same physics and differs only in
//! when it counts as dead and how it shows up on screen.

use crate::random;
use crate::surface::{Color, Surface};
use fastrand::Rng;
use glam::DVec2;

/// Downward acceleration applied to every fragment, in pixels per frame².
pub const PARTICLE_GRAVITY: f64 = 0.06;

const SPARKLE_THRESHOLD: f64 = 0.5;
const SPARKLE_CHILDREN: usize = 10;
const SPARKLE_CHILD_SPEED: (f64, f64) = (0.5, 2.5);
// Probability a strobe fragment flips visibility on a given step
const BLINK_RATE: f64 = 0.2;

/// Named per-frame opacity decrements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayClass {
    SuperSuperSlow,
    SuperSlow,
    Slow,
    Medium,
    Fast,
}

impl DecayClass {
    pub fn rate(self) -> f64 {
        match self {
            DecayClass::SuperSuperSlow => 0.001,
            DecayClass::SuperSlow => 0.005,
            DecayClass::Slow => 0.01,
            DecayClass::Medium => 0.03,
            DecayClass::Fast => 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Standard,
    /// Bursts into a handful of standard fragments once it has faded halfway
    Sparkle,
    /// Blinks on and off at random
    Strobe,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Behavior {
    Standard,
    Sparkle { second_explosion: bool },
    Strobe { visible: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: DVec2,
    velocity: DVec2,
    color: Color,
    size: f64,
    opacity: f64,
    decay_rate: f64,
    behavior: Behavior,
}

impl Particle {
    pub fn new(
        kind: ParticleKind,
        position: DVec2,
        velocity: DVec2,
        color: Color,
        size: f64,
        decay_rate: f64,
    ) -> Self {
        let behavior = match kind {
            ParticleKind::Standard => Behavior::Standard,
            ParticleKind::Sparkle => Behavior::Sparkle {
                second_explosion: false,
            },
            ParticleKind::Strobe => Behavior::Strobe { visible: true },
        };
        Self {
            position,
            velocity,
            color,
            size,
            opacity: 1.0,
            decay_rate,
            behavior,
        }
    }

    /// Advance one frame. Returns `true` on the step where a sparkle fragment
    /// becomes ready to burst; the caller should collect [`Particle::burst`] then.
    pub fn step(&mut self, rng: &mut Rng) -> bool {
        self.velocity.y += PARTICLE_GRAVITY;
        self.position += self.velocity;
        self.opacity -= self.decay_rate;

        match &mut self.behavior {
            Behavior::Standard => false,
            Behavior::Sparkle { second_explosion } => {
                if !*second_explosion && self.opacity < SPARKLE_THRESHOLD {
                    *second_explosion = true;
                    return true;
                }
                false
            }
            Behavior::Strobe { visible } => {
                // Blink state lives with the physics so that skipped draws
                // never change what the simulation does.
                if rng.f64() < BLINK_RATE {
                    *visible = !*visible;
                }
                false
            }
        }
    }

    /// A sparkle fragment counts as dead as soon as it has burst; its children
    /// carry on independently.
    pub fn is_dead(&self) -> bool {
        match self.behavior {
            Behavior::Sparkle { second_explosion } => self.opacity <= 0.0 || second_explosion,
            _ => self.opacity <= 0.0,
        }
    }

    /// Children of a sparkle fragment: always ten slow-fading standard
    /// fragments flying off in random directions. Other kinds have none.
    pub fn burst(&self, rng: &mut Rng) -> Vec<Particle> {
        if self.kind() != ParticleKind::Sparkle {
            return Vec::new();
        }
        (0..SPARKLE_CHILDREN)
            .map(|_| {
                let angle = random::angle(rng);
                let speed = random::uniform(rng, SPARKLE_CHILD_SPEED.0, SPARKLE_CHILD_SPEED.1);
                let velocity = DVec2::new(angle.cos() * speed, -angle.sin() * speed);
                Particle::new(
                    ParticleKind::Standard,
                    self.position,
                    velocity,
                    self.color,
                    self.size,
                    DecayClass::Slow.rate(),
                )
            })
            .collect()
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        if let Behavior::Strobe { visible: false } = self.behavior {
            return;
        }
        if self.opacity <= 0.0 {
            return;
        }
        surface.fill_circle(self.position, self.size, self.color, self.opacity.min(1.0));
    }

    pub fn kind(&self) -> ParticleKind {
        match self.behavior {
            Behavior::Standard => ParticleKind::Standard,
            Behavior::Sparkle { .. } => ParticleKind::Sparkle,
            Behavior::Strobe { .. } => ParticleKind::Strobe,
        }
    }

    pub fn second_explosion(&self) -> bool {
        matches!(
            self.behavior,
            Behavior::Sparkle {
                second_explosion: true
            }
        )
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.behavior, Behavior::Strobe { visible: false })
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }
}
