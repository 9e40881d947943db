//! Debounced metric cycling driven by the proximity sensor.
//!
//! A hand held near the panel spikes the proximity reading; each accepted
//! spike advances the display to the next metric. Accepted spikes are rate
//! limited so one tap doesn't skip several metrics at once.

use std::time::{Duration, Instant};

use crate::metric::Metric;

/// Proximity readings above this count as a tap.
pub const PROXIMITY_THRESHOLD: f64 = 1500.0;

/// Minimum gap between two accepted taps.
pub const DEBOUNCE: Duration = Duration::from_secs(1);

/// Tracks which metric is on screen and advances it on debounced proximity
/// crossings.
pub struct ModeController {
    active: Metric,
    last_toggle: Option<Instant>,
}

impl ModeController {
    pub fn new(start: Metric) -> Self {
        Self {
            active: start,
            last_toggle: None,
        }
    }

    pub fn active(&self) -> Metric {
        self.active
    }

    /// Feed one proximity reading. Returns true if the active metric
    /// advanced. `now` is passed in so ticks and tests share one clock.
    pub fn observe(&mut self, proximity: f64, now: Instant) -> bool {
        if proximity <= PROXIMITY_THRESHOLD {
            return false;
        }
        if let Some(last) = self.last_toggle
            && now.duration_since(last) < DEBOUNCE
        {
            return false;
        }
        self.active = self.active.next();
        self.last_toggle = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAP: f64 = 2000.0;
    const IDLE: f64 = 0.0;

    #[test]
    fn test_below_threshold_never_advances() {
        let mut modes = ModeController::new(Metric::Temperature);
        let now = Instant::now();
        for i in 0..10 {
            assert!(!modes.observe(IDLE, now + Duration::from_secs(i)));
        }
        assert_eq!(modes.active(), Metric::Temperature);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut modes = ModeController::new(Metric::Temperature);
        assert!(!modes.observe(PROXIMITY_THRESHOLD, Instant::now()));
        assert!(modes.observe(PROXIMITY_THRESHOLD + 1.0, Instant::now()));
    }

    #[test]
    fn test_rapid_taps_advance_at_most_once() {
        let mut modes = ModeController::new(Metric::Temperature);
        let start = Instant::now();
        let mut advances = 0;
        // 5 taps, 100ms apart: all gaps below the 1s debounce
        for i in 0..5 {
            if modes.observe(TAP, start + Duration::from_millis(100 * i)) {
                advances += 1;
            }
        }
        assert_eq!(advances, 1);
        assert_eq!(modes.active(), Metric::Pressure);
    }

    #[test]
    fn test_spaced_taps_all_advance() {
        let mut modes = ModeController::new(Metric::Temperature);
        let start = Instant::now();
        let mut advances = 0;
        // 5 taps, 1.5s apart: all gaps above the debounce
        for i in 0..5 {
            if modes.observe(TAP, start + Duration::from_millis(1500 * i)) {
                advances += 1;
            }
        }
        assert_eq!(advances, 5);
        // (start + 5) mod 4 == 1 -> Pressure
        assert_eq!(modes.active(), Metric::Pressure);
    }

    #[test]
    fn test_debounce_releases_after_interval() {
        let mut modes = ModeController::new(Metric::Humidity);
        let start = Instant::now();
        assert!(modes.observe(TAP, start));
        assert!(!modes.observe(TAP, start + Duration::from_millis(999)));
        assert!(modes.observe(TAP, start + Duration::from_millis(999) + DEBOUNCE));
    }
}
