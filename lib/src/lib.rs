/// Initialize logging with the given default level. Respects `RUST_LOG`
/// overrides.
pub fn init_logging(default_level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}

pub mod chart;
pub mod metric;
pub mod mode;
pub mod window;

pub use chart::{Frame, FrameContent, InvalidReading, StripChart};
pub use metric::Metric;
pub use mode::ModeController;
pub use window::MetricWindow;
