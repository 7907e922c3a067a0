//! Decides what goes up next and how long to wait afterwards.

use crate::firework::{Firework, Launcher};
use crate::policy::FireworkVariant;
use crate::surface::Viewport;
use fastrand::Rng;
use log::debug;
use std::collections::VecDeque;

pub struct LaunchScheduler {
    pending: VecDeque<Firework>,
    base_delay: f64,
    current_delay: f64,
}

impl LaunchScheduler {
    pub fn new(base_delay: f64) -> Self {
        Self {
            pending: VecDeque::new(),
            base_delay,
            current_delay: base_delay,
        }
    }

    /// Queue a pre-built firework; queued fireworks go up before random ones.
    pub fn enqueue(&mut self, firework: Firework) {
        self.pending.push_back(firework);
    }

    /// Interval after a batch: the base delay plus the largest extra any
    /// variant in the batch asks for.
    pub fn batch_delay(base_delay: f64, variants: impl IntoIterator<Item = FireworkVariant>) -> f64 {
        let extra = variants
            .into_iter()
            .map(FireworkVariant::additional_delay)
            .fold(0.0, f64::max);
        base_delay + extra
    }

    /// Produce `n` fireworks, queued ones first, and make the adaptive
    /// interval the current delay.
    pub fn launch_batch(
        &mut self,
        n: usize,
        launcher: &mut Launcher,
        viewport: &Viewport,
        rng: &mut Rng,
    ) -> Vec<Firework> {
        let batch: Vec<Firework> = (0..n)
            .map(|_| match self.pending.pop_front() {
                Some(firework) => firework,
                None => launcher.build(FireworkVariant::random(rng), viewport, rng),
            })
            .collect();

        self.current_delay = Self::batch_delay(self.base_delay, batch.iter().map(Firework::variant));
        if !batch.is_empty() {
            let names: Vec<String> = batch
                .iter()
                .map(|fw| format!("{}{}", fw.variant(), fw.id()))
                .collect();
            debug!(
                "launching [{}], next delay {:.2}s",
                names.join(", "),
                self.current_delay
            );
        }
        batch
    }

    /// Coin flip between the base delay and half of it.
    pub fn reset_delay(&mut self, rng: &mut Rng) -> f64 {
        self.current_delay = if rng.f64() > 0.5 {
            self.base_delay
        } else {
            self.base_delay / 2.0
        };
        debug!("launch delay reset to {:.2}s", self.current_delay);
        self.current_delay
    }

    pub fn current_delay(&self) -> f64 {
        self.current_delay
    }

    pub fn base_delay(&self) -> f64 {
        self.base_delay
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
