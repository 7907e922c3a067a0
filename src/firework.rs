//! A single rocket: ballistic ascent, a one-way explosion trigger, and the
//! fragments it owns afterwards.

use crate::particle::Particle;
use crate::policy::{FireworkVariant, SECOND_BURST_DELAY_FRAMES};
use crate::random;
use crate::surface::{Color, Surface, Viewport};
use fastrand::Rng;
use glam::DVec2;
use log::{debug, trace};
use std::collections::VecDeque;
use std::f64::consts::FRAC_PI_4;
use std::fmt;

/// Acceleration due to gravity, m/s²
pub const GRAVITY: f64 = 9.81;
/// Pixels per metre
pub const SCALE: f64 = 10.0;
/// Number of past positions kept for the rocket trail
pub const TAIL_LENGTH: usize = 20;

const MAX_FALL_VELOCITY: f64 = 250.0;
const BOTTOM_MARGIN: f64 = 200.0;
const EDGE_MARGIN: f64 = 100.0;
const TRAIL_SIZE_STEP: f64 = 0.2;

/// Draws one `f64` from the shared generator, e.g. a launch angle.
pub type Sampler = Box<dyn Fn(&mut Rng) -> f64>;

/// Highest a rocket may be aimed, in metres, for a canvas of the given height.
pub fn max_launch_height(viewport_height: f64) -> f64 {
    viewport_height / (SCALE * 1.5)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FireworkId(pub u64);

impl fmt::Display for FireworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a rocket blew up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Falling and already past the bottom margin
    Bottom,
    /// Falling faster than its own threshold
    Speed,
    /// About to leave through the top, left or right
    Edge,
}

#[derive(Debug)]
pub struct Firework {
    id: FireworkId,
    variant: FireworkVariant,
    position: DVec2,
    velocity: DVec2,
    launch_angle: f64,
    initial_speed: f64,
    fall_velocity: f64,
    timestep: f64,

    has_exploded: bool,
    second_burst_pending: bool,
    tail: VecDeque<DVec2>,
    particles: Vec<Particle>,

    color: Color,
    alpha: f64,
    fade: f64,
    size: f64,
}

impl Firework {
    /// Advance one frame. Returns the delay in seconds before
    /// [`Firework::second_burst`] is due when this step triggered a
    /// two-phase explosion.
    pub fn step(&mut self, viewport: &Viewport, rng: &mut Rng) -> Option<f64> {
        if self.has_exploded {
            self.step_particles(rng);
            return None;
        }

        // Screen Y grows downward, so gravity pulls velocity positive.
        self.velocity.y += GRAVITY * self.timestep * SCALE;
        self.position += self.velocity * self.timestep;

        if self.tail.len() >= TAIL_LENGTH {
            self.tail.pop_front();
        }
        self.tail.push_back(self.position);

        let trigger = self.check_trigger(viewport)?;
        debug!(
            "firework {} ({}) exploded at ({:.1}, {:.1}) via {:?}",
            self.id, self.variant, self.position.x, self.position.y, trigger
        );
        self.explode(rng)
    }

    fn check_trigger(&self, viewport: &Viewport) -> Option<Trigger> {
        let pos = self.position;
        let falling = self.velocity.y > 0.0;

        if falling && !viewport.contains(pos + DVec2::new(0.0, BOTTOM_MARGIN)) {
            return Some(Trigger::Bottom);
        }
        if self.velocity.y > self.fall_velocity {
            return Some(Trigger::Speed);
        }
        let leaving = [
            DVec2::new(0.0, -EDGE_MARGIN),
            DVec2::new(-EDGE_MARGIN, 0.0),
            DVec2::new(EDGE_MARGIN, 0.0),
        ]
        .iter()
        .any(|offset| !viewport.contains(pos + *offset));
        leaving.then_some(Trigger::Edge)
    }

    fn step_particles(&mut self, rng: &mut Rng) {
        let before = self.particles.len();
        self.particles.retain(|p| !p.is_dead());
        if before != self.particles.len() {
            trace!(
                "firework {} pruned {} particles",
                self.id,
                before - self.particles.len()
            );
        }

        let mut children = Vec::new();
        for particle in &mut self.particles {
            if particle.step(rng) {
                children.extend(particle.burst(rng));
            }
        }
        self.particles.extend(children);
    }

    /// Fire the primary burst. Later calls are no-ops, so a rocket bursts
    /// exactly once however often this is invoked. Returns the second-burst
    /// delay for variants that have one.
    pub fn explode(&mut self, rng: &mut Rng) -> Option<f64> {
        if self.has_exploded {
            return None;
        }
        self.has_exploded = true;
        self.particles
            .extend(self.variant.policy().spawn(self.position, rng));

        self.variant.follow_up().map(|_| {
            self.second_burst_pending = true;
            SECOND_BURST_DELAY_FRAMES as f64 * self.timestep
        })
    }

    /// Fire the delayed second burst. Does nothing unless one is pending.
    pub fn second_burst(&mut self, rng: &mut Rng) {
        if !self.second_burst_pending {
            return;
        }
        if let Some(policy) = self.variant.follow_up() {
            self.particles.extend(policy.spawn(self.position, rng));
            debug!("firework {} second burst: {} particles", self.id, policy.count);
        }
        self.second_burst_pending = false;
    }

    /// Exploded, with every burst delivered.
    pub fn is_complete(&self) -> bool {
        self.has_exploded && !self.second_burst_pending
    }

    pub fn is_dead(&self) -> bool {
        self.is_complete() && self.particles.iter().all(Particle::is_dead)
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        if self.has_exploded {
            for particle in &self.particles {
                particle.draw(surface);
            }
            return;
        }

        // Trail fades and shrinks from newest to oldest.
        let mut alpha = self.alpha;
        let mut size = self.size;
        for pos in self.tail.iter().rev() {
            if alpha <= 0.0 || size <= 0.0 {
                break;
            }
            surface.fill_circle(*pos, size, self.color, alpha.min(1.0));
            alpha -= self.fade;
            size -= TRAIL_SIZE_STEP;
        }
        surface.fill_circle(self.position, self.size, self.color, self.alpha);
    }

    pub fn id(&self) -> FireworkId {
        self.id
    }

    pub fn variant(&self) -> FireworkVariant {
        self.variant
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn launch_angle(&self) -> f64 {
        self.launch_angle
    }

    pub fn initial_speed(&self) -> f64 {
        self.initial_speed
    }

    pub fn fall_velocity(&self) -> f64 {
        self.fall_velocity
    }

    pub fn has_exploded(&self) -> bool {
        self.has_exploded
    }

    pub fn tail(&self) -> &VecDeque<DVec2> {
        &self.tail
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

/// Builds rockets from a launch site. The minimum-height sampler is not
/// optional, so a rocket can't exist without a defined speed floor.
pub struct Launcher {
    start: DVec2,
    launch_angle: Sampler,
    min_launch_height: Sampler,
    timestep: f64,
    next_id: u64,
}

impl Launcher {
    pub fn new(start: DVec2, launch_angle: Sampler, min_launch_height: Sampler, timestep: f64) -> Self {
        Self {
            start,
            launch_angle,
            min_launch_height,
            timestep,
            next_id: 0,
        }
    }

    pub fn build(&mut self, variant: FireworkVariant, viewport: &Viewport, rng: &mut Rng) -> Firework {
        let id = FireworkId(self.next_id);
        self.next_id += 1;

        let launch_angle = (self.launch_angle)(rng);
        let max_height = max_launch_height(viewport.height);
        let min_height = (self.min_launch_height)(rng);

        // Vertical speed needed to reach each height, scaled up for a 45° shot.
        let min_speed = (2.0 * GRAVITY * min_height).max(0.0).sqrt() / FRAC_PI_4.sin();
        let max_speed = (2.0 * GRAVITY * max_height).max(0.0).sqrt() / FRAC_PI_4.sin();
        let initial_speed = random::uniform(rng, min_speed, max_speed);

        let velocity = DVec2::new(
            launch_angle.cos() * initial_speed * SCALE,
            -launch_angle.sin() * initial_speed * SCALE,
        );

        Firework {
            id,
            variant,
            position: self.start,
            velocity,
            launch_angle,
            initial_speed,
            fall_velocity: random::uniform(rng, 0.0, MAX_FALL_VELOCITY),
            timestep: self.timestep,
            has_exploded: false,
            second_burst_pending: false,
            tail: VecDeque::with_capacity(TAIL_LENGTH),
            particles: Vec::new(),
            color: Color::vibrant(rng),
            alpha: 1.0,
            fade: rng.f64() * 0.1,
            size: random::uniform(rng, 5.0, 15.0),
        }
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }
}
