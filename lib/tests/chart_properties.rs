//! End-to-end properties of the strip-chart kernel, exercised through the
//! public API the daemon uses.

use enviromon::chart::{CHART_TOP, FrameContent, LUX_BLANKING_THRESHOLD};
use enviromon::metric::METRICS;
use enviromon::{Metric, StripChart};

const WIDTH: usize = 160;
const HEIGHT: u32 = 80;

fn chart() -> StripChart {
    StripChart::new(WIDTH, HEIGHT)
}

/// Fill a metric's window with a constant by pushing `width` readings.
fn saturate(chart: &mut StripChart, metric: Metric, value: f64) {
    for _ in 0..WIDTH {
        chart.update(metric, value, 10.0).expect("finite reading");
    }
}

#[test]
fn window_length_is_invariant_over_many_updates() {
    let mut chart = chart();
    for metric in METRICS {
        for i in 0..(WIDTH * 20) {
            chart.update(metric, i as f64, 10.0).unwrap();
            assert_eq!(chart.window(metric).len(), WIDTH);
        }
    }
}

#[test]
fn steady_temperature_then_step_change() {
    let mut chart = chart();
    saturate(&mut chart, Metric::Temperature, 20.0);

    let frame = chart.update(Metric::Temperature, 25.0, 10.0).unwrap();

    let window = chart.window(Metric::Temperature);
    assert_eq!(window.newest(), 25.0);
    // The oldest 20.0 was evicted; the window is now 159x 20.0 and one 25.0
    assert_eq!(window.oldest(), 20.0);
    assert_eq!(window.iter().filter(|&s| s == 25.0).count(), 1);

    let FrameContent::Chart { columns, label } = frame.content else {
        panic!("expected a chart frame");
    };
    assert_eq!(label, "temp: 25.0 C");
    assert_eq!(columns.len(), WIDTH);

    // The lone maximum draws red and sits on the chart's top row; the flat
    // majority sits lower and bluer.
    let newest = columns.last().unwrap();
    assert_eq!(newest.rgb, (255, 0, 0));
    assert_eq!(newest.trend_row, CHART_TOP);
    let oldest = columns.first().unwrap();
    assert!(oldest.trend_row > newest.trend_row);
    assert!(oldest.rgb.2 > 0);
}

#[test]
fn trend_rows_stay_inside_the_chart_body() {
    let mut chart = chart();
    for i in 0..(WIDTH * 2) {
        let frame = chart
            .update(Metric::Pressure, (i % 37) as f64 * 3.7, 10.0)
            .unwrap();
        let FrameContent::Chart { columns, .. } = frame.content else {
            panic!("expected a chart frame");
        };
        for column in columns {
            assert!(column.trend_row >= CHART_TOP);
            assert!(column.trend_row < HEIGHT);
        }
    }
}

#[test]
fn blanking_threshold_is_inclusive() {
    let mut chart = chart();
    let frame = chart
        .update(Metric::Light, 5.0, LUX_BLANKING_THRESHOLD)
        .unwrap();
    assert!(!frame.backlight_on);
    assert_eq!(frame.content, FrameContent::Blank);

    let frame = chart
        .update(Metric::Light, 5.0, LUX_BLANKING_THRESHOLD + 0.1)
        .unwrap();
    assert!(frame.backlight_on);
}

#[test]
fn stale_windows_resume_where_they_left_off() {
    let mut chart = chart();
    saturate(&mut chart, Metric::Humidity, 55.0);

    // Other metrics update in between; humidity's window must not move.
    saturate(&mut chart, Metric::Pressure, 1000.0);
    saturate(&mut chart, Metric::Light, 120.0);
    assert!(chart.window(Metric::Humidity).iter().all(|s| s == 55.0));

    chart.update(Metric::Humidity, 60.0, 10.0).unwrap();
    assert_eq!(chart.window(Metric::Humidity).newest(), 60.0);
}
