//! Sliding-window smoothing for bursty byte-rate samples.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Window width used for hot peer byte rates.
pub const ROLLING_WINDOW: usize = 5;

/// Fixed-width window over the most recent samples, evicted in arrival
/// order. Owned by exactly one live hot peer stat; it moves to the
/// successor stat when an observation is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    window: usize,
    samples: VecDeque<f64>,
}

impl RollingStats {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    /// Append a sample, discarding the oldest once the window is full.
    pub fn add(&mut self, sample: f64) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Median of the currently held samples; zero when empty. With an even
    /// count the two middle samples are averaged.
    pub fn median(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted = self.samples.iter().copied().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        }
    }

    /// Arithmetic mean of the currently held samples; zero when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_reads_zero() {
        let stats = RollingStats::new(5);
        assert_eq!(stats.median(), 0.0);
        assert_eq!(stats.mean(), 0.0);
        assert!(stats.is_empty());
    }

    #[test]
    fn partial_window_uses_what_exists() {
        let mut stats = RollingStats::new(5);
        stats.add(10.0);
        stats.add(30.0);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.median(), 20.0);
        assert_eq!(stats.mean(), 20.0);

        stats.add(50.0);
        assert_eq!(stats.median(), 30.0);
        assert_eq!(stats.mean(), 30.0);
    }

    #[test]
    fn full_window_discards_oldest() {
        let mut stats = RollingStats::new(3);
        for sample in [1.0, 2.0, 3.0, 100.0] {
            stats.add(sample);
        }
        assert_eq!(stats.len(), 3);
        // 1.0 fell out of the window.
        assert_eq!(stats.median(), 3.0);
        assert_eq!(stats.mean(), 35.0);
    }

    #[test]
    fn zero_width_window_is_normalized() {
        let mut stats = RollingStats::new(0);
        stats.add(7.0);
        stats.add(9.0);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.median(), 9.0);
    }
}
