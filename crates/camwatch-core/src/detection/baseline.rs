use std::collections::VecDeque;

/// Exact moving average over the last `capacity` capped samples.
///
/// The window is pre-filled with copies of the first sample, so it is always
/// full and the average is always the mean of exactly `capacity` values.
#[derive(Clone, Debug)]
pub struct Baseline {
    window: VecDeque<f64>,
    capacity: usize,
    average: f64,
    /// Updates since the average was last recomputed from the window.
    since_resync: usize,
}

impl Baseline {
    /// Start a baseline from its first sample.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; `CaptureConfig::validate` rejects that.
    pub fn seeded(first: f64, capacity: usize) -> Self {
        assert!(capacity > 0, "baseline window must hold at least one sample");
        Self {
            window: std::iter::repeat(first).take(capacity).collect(),
            capacity,
            average: first,
            since_resync: 0,
        }
    }

    /// Fold in one sample: O(1) add-newest / subtract-oldest.
    pub fn push(&mut self, sample: f64) {
        let oldest = self.window.pop_front().unwrap_or(sample);
        self.window.push_back(sample);
        self.average += (sample - oldest) / self.capacity as f64;

        // Recompute once per full window to keep rounding error from piling up.
        self.since_resync += 1;
        if self.since_resync >= self.capacity {
            self.resync();
        }
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Window contents, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }

    fn resync(&mut self) {
        self.average = self.window.iter().sum::<f64>() / self.capacity as f64;
        self.since_resync = 0;
    }
}
