//! One-shot deferred work keyed by simulation time.

use crate::firework::FireworkId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// Absorbs rounding between `frame * dt` and a sum of delays.
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Launch a batch of this many fireworks
    Launch { batch: usize },
    /// Launch the delayed batch, then pick the randomized delay before the next
    ResetDelay { batch: usize },
    /// Deliver a two-phase firework's second burst
    SecondBurst { firework: FireworkId },
}

impl Task {
    /// Part of the launch cycle rather than tied to a firework.
    pub fn is_launch_timer(&self) -> bool {
        matches!(self, Task::Launch { .. } | Task::ResetDelay { .. })
    }
}

#[derive(Debug)]
struct Entry {
    due: f64,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest task on top,
    // with ties broken by scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64, task: Task) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Entry { due, seq, task });
    }

    /// Remove and return the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, Task)> {
        if self.heap.peek()?.due > now + TIME_EPSILON {
            return None;
        }
        self.heap.pop().map(|entry| (entry.due, entry.task))
    }

    /// Drop every task for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&Task) -> bool) {
        self.heap.retain(|entry| keep(&entry.task));
    }

    #[cfg(test)]
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.due)
    }

    pub fn contains(&self, mut pred: impl FnMut(&Task) -> bool) -> bool {
        self.heap.iter().any(|entry| pred(&entry.task))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
