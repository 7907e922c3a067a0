//! Frame driver: owns every live firework, the launch cycle and the deferred
//! task queue, and advances them one fixed timestep at a time.

use crate::config::{SimulationBuilder, SimulationConfig};
use crate::firework::{Firework, FireworkId, Launcher};
use crate::policy::FireworkVariant;
use crate::scheduler::LaunchScheduler;
use crate::surface::{Surface, Viewport};
use crate::tasks::{Task, TaskQueue};
use fastrand::Rng;
use log::{info, trace};

pub struct Simulation {
    config: SimulationConfig,
    viewport: Viewport,
    launcher: Launcher,
    scheduler: LaunchScheduler,
    tasks: TaskQueue,
    rng: Rng,
    fireworks: Vec<Firework>,
    frame: u64,
    running: bool,
}

impl Simulation {
    pub(crate) fn new(config: SimulationConfig, launcher: Launcher) -> Self {
        Self {
            viewport: Viewport::new(config.width, config.height),
            scheduler: LaunchScheduler::new(config.seconds_between_launches),
            tasks: TaskQueue::new(),
            rng: Rng::with_seed(config.seed),
            fireworks: Vec::new(),
            frame: 0,
            running: false,
            launcher,
            config,
        }
    }

    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Arm the frame and launch triggers. The first batch goes up one base
    /// delay from now.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        if !self.tasks.contains(Task::is_launch_timer) {
            let due = self.now() + self.scheduler.base_delay();
            self.tasks.schedule(
                due,
                Task::Launch {
                    batch: self.config.max_batch_size,
                },
            );
        }
        info!(
            "simulation started at {:.2}s (seed {}, {} fireworks live)",
            self.now(),
            self.config.seed,
            self.fireworks.len()
        );
    }

    /// Disarm both triggers. Pending launch timers are cancelled. Pending
    /// second bursts stay queued against their firework and go off once the
    /// simulation is started again, since simulation time is frozen meanwhile.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.tasks.retain(|task| !task.is_launch_timer());
        info!("simulation stopped at {:.2}s", self.now());
    }

    /// One frame tick: run due tasks, move every firework, drop the dead ones.
    /// Does nothing while stopped.
    pub fn advance(&mut self) {
        if !self.running {
            return;
        }
        self.frame += 1;
        let now = self.now();

        while let Some((_, task)) = self.tasks.pop_due(now) {
            self.run_task(task);
        }

        for firework in &mut self.fireworks {
            if let Some(delay) = firework.step(&self.viewport, &mut self.rng) {
                self.tasks.schedule(
                    now + delay,
                    Task::SecondBurst {
                        firework: firework.id(),
                    },
                );
            }
        }

        let before = self.fireworks.len();
        self.fireworks.retain(|fw| !fw.is_dead());
        if self.fireworks.len() != before {
            trace!("pruned {} dead fireworks", before - self.fireworks.len());
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Launch { batch } => self.launch_batch(batch),
            Task::ResetDelay { batch } => {
                self.fire_batch(batch);
                let delay = self.scheduler.reset_delay(&mut self.rng);
                self.tasks.schedule(self.now() + delay, Task::Launch { batch });
            }
            Task::SecondBurst { firework } => {
                match self.fireworks.iter_mut().find(|fw| fw.id() == firework) {
                    Some(fw) => fw.second_burst(&mut self.rng),
                    None => trace!("second burst for {firework} skipped, firework is gone"),
                }
            }
        }
    }

    /// Launch `n` fireworks now. While running this replaces whatever launch
    /// timer was armed: the next batch goes up after the adaptive delay, and
    /// the one after that follows the randomized reset.
    pub fn launch_batch(&mut self, n: usize) {
        self.fire_batch(n);
        if self.running {
            self.tasks.retain(|task| !task.is_launch_timer());
            let due = self.now() + self.scheduler.current_delay();
            self.tasks.schedule(due, Task::ResetDelay { batch: n });
        }
    }

    fn fire_batch(&mut self, n: usize) {
        let batch = self
            .scheduler
            .launch_batch(n, &mut self.launcher, &self.viewport, &mut self.rng);
        self.fireworks.extend(batch);
    }

    /// Build a firework of the given variant and queue it ahead of random picks.
    pub fn queue_firework(&mut self, variant: FireworkVariant) -> FireworkId {
        let firework = self.launcher.build(variant, &self.viewport, &mut self.rng);
        let id = firework.id();
        self.scheduler.enqueue(firework);
        id
    }

    /// Force a live firework to explode. Returns false if it isn't live.
    pub fn explode(&mut self, id: FireworkId) -> bool {
        let now = self.now();
        let Some(firework) = self.fireworks.iter_mut().find(|fw| fw.id() == id) else {
            return false;
        };
        if let Some(delay) = firework.explode(&mut self.rng) {
            self.tasks
                .schedule(now + delay, Task::SecondBurst { firework: id });
        }
        true
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for firework in &self.fireworks {
            firework.draw(surface);
        }
    }

    /// Simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.frame as f64 * self.launcher.timestep()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_delay(&self) -> f64 {
        self.scheduler.current_delay()
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn firework(&self, id: FireworkId) -> Option<&Firework> {
        self.fireworks.iter().find(|fw| fw.id() == id)
    }

    pub fn particle_count(&self) -> usize {
        self.fireworks.iter().map(|fw| fw.particles().len()).sum()
    }

    #[cfg(test)]
    pub(crate) fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::tests::RecordingSurface;

    fn quiet(seed: u64) -> Simulation {
        Simulation::builder()
            .seed(seed)
            .seconds_between_launches(1_000.0)
            .max_batch_size(1)
            .build()
            .unwrap()
    }

    #[test]
    fn advance_is_inert_while_stopped() {
        let mut sim = quiet(1);
        sim.launch_batch(2);
        let before: Vec<_> = sim.fireworks().iter().map(|fw| fw.position()).collect();
        sim.advance();
        let after: Vec<_> = sim.fireworks().iter().map(|fw| fw.position()).collect();
        assert_eq!(before, after);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn first_batch_waits_one_base_delay() {
        let mut sim = Simulation::builder()
            .seed(2)
            .seconds_between_launches(0.5)
            .max_batch_size(2)
            .build()
            .unwrap();
        sim.start();
        for _ in 0..29 {
            sim.advance();
            assert!(sim.fireworks().is_empty());
        }
        sim.advance();
        assert_eq!(sim.fireworks().len(), 2);
    }

    #[test]
    fn stop_cancels_launch_timers() {
        let mut sim = Simulation::builder()
            .seed(3)
            .seconds_between_launches(0.1)
            .build()
            .unwrap();
        sim.start();
        assert_eq!(sim.pending_tasks(), 1);
        sim.stop();
        assert_eq!(sim.pending_tasks(), 0);
        assert!(!sim.is_running());

        sim.start();
        sim.start();
        assert_eq!(sim.pending_tasks(), 1);
    }

    #[test]
    fn double_second_burst_fires_fifteen_frames_later() {
        let mut sim = quiet(4);
        let id = sim.queue_firework(FireworkVariant::Double);
        sim.launch_batch(1);
        sim.start();

        assert!(sim.explode(id));
        assert!(sim.explode(id));
        assert_eq!(sim.firework(id).unwrap().particles().len(), 300);

        for _ in 0..14 {
            sim.advance();
            assert_eq!(sim.firework(id).unwrap().particles().len(), 300);
        }
        sim.advance();
        let fw = sim.firework(id).unwrap();
        assert_eq!(fw.particles().len(), 450);
        assert!(fw.is_complete());
    }

    #[test]
    fn second_burst_survives_a_pause() {
        let mut sim = quiet(5);
        let id = sim.queue_firework(FireworkVariant::Double);
        sim.launch_batch(1);
        sim.start();
        sim.explode(id);
        for _ in 0..5 {
            sim.advance();
        }
        sim.stop();
        assert_eq!(sim.pending_tasks(), 1);
        sim.start();
        for _ in 0..10 {
            sim.advance();
        }
        assert_eq!(sim.firework(id).unwrap().particles().len(), 450);
    }

    #[test]
    fn dead_fireworks_are_pruned() {
        let mut sim = quiet(6);
        let id = sim.queue_firework(FireworkVariant::Small);
        sim.launch_batch(1);
        sim.start();
        sim.explode(id);
        for _ in 0..40 {
            sim.advance();
        }
        assert!(sim.firework(id).is_none());
        assert!(sim.fireworks().is_empty());
    }

    #[test]
    fn launch_cycle_alternates_adaptive_and_reset_delays() {
        let mut sim = Simulation::builder()
            .seed(7)
            .seconds_between_launches(0.5)
            .max_batch_size(1)
            .build()
            .unwrap();
        let id = sim.queue_firework(FireworkVariant::Double);
        sim.start();
        for _ in 0..30 {
            sim.advance();
        }
        assert!(sim.firework(id).is_some());
        assert_eq!(sim.current_delay(), 2.5);

        // The next batch goes up 2.5s (150 frames) after the Double.
        for _ in 0..149 {
            sim.advance();
            assert!(sim.fireworks().iter().all(|fw| fw.id() == id));
        }
        sim.advance();
        let follower = sim
            .fireworks()
            .iter()
            .find(|fw| fw.id() != id)
            .map(|fw| fw.id())
            .unwrap();
        let delay = sim.current_delay();
        assert!(delay == 0.5 || delay == 0.25, "got {delay}");

        // ...and the one after it waits only the randomized delay.
        let frames = (delay * 60.0).round() as u64;
        for _ in 0..frames - 1 {
            sim.advance();
            assert!(sim.fireworks().iter().all(|fw| fw.id() <= follower));
        }
        sim.advance();
        assert!(sim.fireworks().iter().any(|fw| fw.id() > follower));
    }

    #[test]
    fn draw_reaches_the_surface() {
        let mut sim = quiet(8);
        sim.launch_batch(3);
        sim.start();
        sim.advance();
        let mut surface = RecordingSurface::default();
        sim.draw(&mut surface);
        assert!(surface.circles.len() >= 3);
    }
}
