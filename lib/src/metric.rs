//! The fixed set of displayable metrics and their cyclic ordering.

/// One of the four environmental metrics the device can show. The variant
/// order is the order the display cycles through them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Pressure,
    Humidity,
    Light,
}

/// All metrics in display-cycle order.
pub const METRICS: [Metric; 4] = [
    Metric::Temperature,
    Metric::Pressure,
    Metric::Humidity,
    Metric::Light,
];

impl Metric {
    /// The lowercase name used in labels and logs.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Pressure => "pressure",
            Metric::Humidity => "humidity",
            Metric::Light => "light",
        }
    }

    /// The first four characters of the name, as shown on the panel label.
    pub fn short_name(self) -> &'static str {
        &self.name()[..4]
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "C",
            Metric::Pressure => "hPa",
            Metric::Humidity => "%",
            Metric::Light => "Lux",
        }
    }

    /// The next metric in the display cycle, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Metric::Temperature => Metric::Pressure,
            Metric::Pressure => Metric::Humidity,
            Metric::Humidity => Metric::Light,
            Metric::Light => Metric::Temperature,
        }
    }

    /// Position in [`METRICS`], for indexing per-metric storage.
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_order_matches_metrics_array() {
        let mut m = METRICS[0];
        for expected in METRICS.iter().skip(1) {
            m = m.next();
            assert_eq!(m, *expected);
        }
        assert_eq!(m.next(), METRICS[0]);
    }

    #[test]
    fn test_short_names_are_four_chars() {
        for m in METRICS {
            assert_eq!(m.short_name().len(), 4);
            assert!(m.name().starts_with(m.short_name()));
        }
    }

    #[test]
    fn test_index_matches_cycle_position() {
        for (i, m) in METRICS.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }
}
