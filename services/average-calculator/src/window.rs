//! Bounded, deduplicated window of recently seen numbers
//!
//! Numbers are kept in arrival order, oldest first. A batch only contributes
//! values not already in the window; once the window is full each accepted
//! value evicts the oldest one.

use std::collections::VecDeque;
use std::time::SystemTime;

#[derive(Debug)]
pub struct SlidingWindow {
    capacity: usize,
    values: VecDeque<i64>,
    last_updated: SystemTime,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            last_updated: SystemTime::now(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert a batch and return how many of its values were accepted.
    ///
    /// Membership is tested against the window as it was before the batch,
    /// so repeats inside one batch are all accepted. A batch with nothing new
    /// leaves the window and its timestamp untouched.
    pub fn insert(&mut self, batch: &[i64]) -> usize {
        let fresh: Vec<i64> = batch
            .iter()
            .copied()
            .filter(|n| !self.values.contains(n))
            .collect();
        if fresh.is_empty() {
            return 0;
        }

        for n in &fresh {
            if self.values.len() >= self.capacity {
                self.values.pop_front();
            }
            self.values.push_back(*n);
        }
        self.last_updated = SystemTime::now();
        fresh.len()
    }

    pub fn snapshot(&self) -> Vec<i64> {
        self.values.iter().copied().collect()
    }

    /// Arithmetic mean rounded to two decimals; 0 for an empty window.
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.values.iter().map(|&n| n as f64).sum();
        let mean = sum / self.values.len() as f64;
        (mean * 100.0).round() / 100.0
    }

    /// Wall-clock time of the last mutation, or of construction.
    pub fn last_updated(&self) -> SystemTime {
        self.last_updated
    }
}
