//! The rolling strip-chart visualizer.
//!
//! Each update appends the newest reading to the active metric's window,
//! min-max normalizes the whole window, and describes one display frame: a
//! colored vertical strip per sample, a black trend marker per column, and a
//! text label. Low ambient light short-circuits all of that into a blank
//! frame with the backlight off.
//!
//! The normalization carries a deliberate quirk inherited from the device's
//! firmware lineage: both numerator and denominator get a "+1" stabilizer, so
//! a window of identical samples normalizes to exactly 1.0 rather than
//! dividing by zero. Downstream numeric-parity tests depend on this, so the
//! formula must not be "simplified".

use thiserror::Error;

use crate::metric::Metric;
use crate::window::MetricWindow;

/// Ambient light at or below this many lux blanks the panel.
pub const LUX_BLANKING_THRESHOLD: f64 = 2.0;

/// Fixed backlight brightness whenever the panel is lit.
pub const BACKLIGHT_BRIGHTNESS: u8 = 12;

/// Rows above this are reserved for the text label; the chart body spans
/// `CHART_TOP..height`.
pub const CHART_TOP: u32 = 25;

/// Hue band the chart maps values into: 0.0 (red, high values) through
/// 0.6 (blue, low values).
pub const HUE_SPAN: f64 = 0.6;

#[derive(Debug, Error, PartialEq)]
#[error("non-finite {metric} reading: {value}")]
pub struct InvalidReading {
    pub metric: &'static str,
    pub value: f64,
}

/// One 1-pixel-wide vertical slice of the chart body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameColumn {
    /// Strip color for the full chart-body height of this column.
    pub rgb: (u8, u8, u8),
    /// Row of the black trend marker, in `CHART_TOP..height`.
    pub trend_row: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameContent {
    /// Panel fully black (low ambient light).
    Blank,
    /// Chart body on a white background with a black label at the top left.
    Chart {
        columns: Vec<FrameColumn>,
        label: String,
    },
}

/// Ephemeral output of one [`StripChart::update`] call. Handed to the display
/// gateway and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub backlight_on: bool,
    pub content: FrameContent,
}

/// Owns one sample window per metric and turns readings into frames.
///
/// Only the active metric's window is pushed to on a given tick; the other
/// three go stale until the user cycles back to them.
pub struct StripChart {
    windows: [MetricWindow; 4],
    width: usize,
    height: u32,
}

impl StripChart {
    /// `width` is the panel width in pixels and becomes every window's
    /// capacity; `height` must exceed [`CHART_TOP`].
    pub fn new(width: usize, height: u32) -> Self {
        assert!(height > CHART_TOP, "panel too short for the chart body");
        Self {
            windows: std::array::from_fn(|_| MetricWindow::new(width)),
            width,
            height,
        }
    }

    /// Record `value` for `metric` and describe the resulting frame.
    ///
    /// When ambient light is at or below [`LUX_BLANKING_THRESHOLD`] the
    /// window is left untouched and a blank backlight-off frame is returned;
    /// the chart freezes while the panel is dark.
    pub fn update(
        &mut self,
        metric: Metric,
        value: f64,
        lux: f64,
    ) -> Result<Frame, InvalidReading> {
        if !value.is_finite() {
            return Err(InvalidReading {
                metric: metric.name(),
                value,
            });
        }

        if lux <= LUX_BLANKING_THRESHOLD {
            return Ok(Frame {
                backlight_on: false,
                content: FrameContent::Blank,
            });
        }

        let window = &mut self.windows[metric.index()];
        window.push(value);

        let factors = colour_factors(window);
        let columns = factors
            .iter()
            .map(|&f| FrameColumn {
                rgb: hsv_to_rgb(hue_for(f), 1.0, 1.0),
                trend_row: self.trend_row(f),
            })
            .collect();

        Ok(Frame {
            backlight_on: true,
            content: FrameContent::Chart {
                columns,
                label: format!("{}: {:.1} {}", metric.short_name(), value, metric.unit()),
            },
        })
    }

    pub fn window(&self, metric: Metric) -> &MetricWindow {
        &self.windows[metric.index()]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row of the trend marker for a normalized factor. Factor 1.0 lands on
    /// the chart's top row, factor ~0 near the bottom; the raw formula can
    /// land one row past the panel edge, so clamp.
    fn trend_row(&self, factor: f64) -> u32 {
        let height = self.height as f64;
        let top = CHART_TOP as f64;
        let row = height - (top + factor * (height - top)) + top;
        (row as u32).clamp(CHART_TOP, self.height - 1)
    }
}

/// Min-max normalize the window into (0, 1], with the +1 stabilizer on both
/// sides of the division. A window of identical samples yields 1.0 for every
/// column.
pub fn colour_factors(window: &MetricWindow) -> Vec<f64> {
    let (vmin, vmax) = window.bounds();
    window
        .iter()
        .map(|v| (v - vmin + 1.0) / (vmax - vmin + 1.0))
        .collect()
}

/// Map a normalized factor to a hue: high values toward red (0.0), low
/// values toward blue (0.6).
pub fn hue_for(factor: f64) -> f64 {
    (1.0 - factor) * HUE_SPAN
}

/// HSV to 8-bit RGB. Hue wraps at 1.0; saturation and value are clamped
/// implicitly by the callers always passing 1.0. Channel scaling truncates,
/// matching the device's original rendering.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let to_byte = |x: f64| (x * 255.0) as u8;
    if s == 0.0 {
        let g = to_byte(v);
        return (g, g, g);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    (to_byte(r), to_byte(g), to_byte(b))
}
