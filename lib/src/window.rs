//! A fixed-capacity FIFO of recent sensor samples.
//!
//! The strip chart draws one vertical pixel column per sample, so each
//! window's capacity equals the panel width. Windows are pre-filled with a
//! sentinel value at startup and stay at exactly their capacity forever:
//! every push evicts the oldest sample.

use std::collections::VecDeque;

/// Neutral value the window starts out filled with.
pub const SENTINEL: f64 = 1.0;

/// Ring buffer of the most recent `capacity` samples for one metric.
pub struct MetricWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl MetricWindow {
    /// Create a window pre-filled with [`SENTINEL`].
    ///
    /// `capacity` must be > 0.
    pub fn new(capacity: usize) -> Self {
        Self::with_fill(capacity, SENTINEL)
    }

    /// Create a window pre-filled with an arbitrary value.
    pub fn with_fill(capacity: usize, fill: f64) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        let mut samples = VecDeque::with_capacity(capacity);
        samples.extend(std::iter::repeat_n(fill, capacity));
        Self { samples, capacity }
    }

    /// Append a sample, evicting the oldest. Length is unchanged.
    pub fn push(&mut self, sample: f64) {
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    /// Always equal to the configured capacity.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Oldest sample (leftmost column).
    pub fn oldest(&self) -> f64 {
        *self.samples.front().unwrap()
    }

    /// Newest sample (rightmost column).
    pub fn newest(&self) -> f64 {
        *self.samples.back().unwrap()
    }

    /// Min and max over the current contents.
    pub fn bounds(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for s in self.iter() {
            min = min.min(s);
            max = max.max(s);
        }
        (min, max)
    }

    /// Arithmetic mean of the current contents.
    pub fn mean(&self) -> f64 {
        self.iter().sum::<f64>() / self.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_full_of_sentinel() {
        let window = MetricWindow::new(8);
        assert_eq!(window.len(), 8);
        assert!(window.iter().all(|s| s == SENTINEL));
    }

    #[test]
    fn test_push_preserves_length() {
        let mut window = MetricWindow::new(16);
        for i in 0..1000 {
            window.push(i as f64);
            assert_eq!(window.len(), 16);
        }
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = MetricWindow::with_fill(3, 20.0);
        window.push(25.0);
        assert_eq!(window.oldest(), 20.0);
        assert_eq!(window.newest(), 25.0);
        window.push(30.0);
        window.push(35.0);
        // All fill values are gone now
        assert_eq!(
            window.iter().collect::<Vec<_>>(),
            vec![25.0, 30.0, 35.0]
        );
    }

    #[test]
    fn test_bounds() {
        let mut window = MetricWindow::with_fill(4, 10.0);
        window.push(5.0);
        window.push(30.0);
        assert_eq!(window.bounds(), (5.0, 30.0));
    }

    #[test]
    fn test_mean() {
        let mut window = MetricWindow::with_fill(4, 2.0);
        window.push(6.0);
        assert_eq!(window.mean(), 3.0);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_panics() {
        MetricWindow::new(0);
    }
}
