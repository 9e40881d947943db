//! envirod: polls the board's environmental sensors and renders a rotating
//! single-metric strip chart on the attached LCD, with optional periodic
//! telemetry upload.

mod config;
mod display;
mod sensors;
mod telemetry;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use enviromon::chart::BACKLIGHT_BRIGHTNESS;
use enviromon::{Metric, ModeController, StripChart};

use crate::config::Config;
use crate::display::{DisplayGateway, FbDisplay, HEIGHT, WIDTH};
use crate::sensors::{SensorGateway, SysfsSensors, TemperatureCompensator, shadowed_lux};

const DEFAULT_CONFIG_PATH: &str = "/etc/enviromon/config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    enviromon::init_logging(log::LevelFilter::Info);

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = config::load(Path::new(&config_path)).await?;
    info!("envirod {} starting", env!("CARGO_PKG_VERSION"));

    let sensors: Arc<dyn SensorGateway> = Arc::new(SysfsSensors::new(config.sensors.clone()));
    let mut display = FbDisplay::new(config.display.clone());

    let shutdown_token = CancellationToken::new();
    let task_tracker = TaskTracker::new();

    if config.telemetry.enabled {
        telemetry::spawn_uploader(
            &task_tracker,
            shutdown_token.clone(),
            config.telemetry.clone(),
            Arc::clone(&sensors),
        );
    } else {
        info!("telemetry disabled");
    }

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
        info!("shutdown signal received");
        signal_token.cancel();
    });

    let result = render_loop(&config, sensors.as_ref(), &mut display, &shutdown_token).await;

    // The backlight must go dark on every exit path, fatal errors included.
    if let Err(e) = display.set_backlight(false, 0).await {
        warn!("failed to turn off backlight on exit: {e:#}");
    }
    shutdown_token.cancel();
    task_tracker.close();
    task_tracker.wait().await;

    if result.is_ok() {
        info!("envirod exiting");
    }
    result
}

/// The main tick loop: proximity-driven mode cycling, one sensor read, one
/// chart update, one framebuffer write per tick. Sensor failures skip the
/// tick; display failures are fatal.
async fn render_loop(
    config: &Config,
    sensors: &dyn SensorGateway,
    display: &mut dyn DisplayGateway,
    shutdown_token: &CancellationToken,
) -> Result<()> {
    let mut chart = StripChart::new(WIDTH, HEIGHT as u32);
    let mut modes = ModeController::new(Metric::Temperature);
    let mut compensator = TemperatureCompensator::new();

    let mut ticker = interval(Duration::from_millis(config.tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                info!("render loop shutting down");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let (proximity, lux) = match ambient(sensors).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("ambient read failed, skipping tick: {e:#}");
                continue;
            }
        };

        if modes.observe(proximity, Instant::now()) {
            info!("display mode -> {}", modes.active().name());
        }

        let metric = modes.active();
        let value = match metric_value(metric, sensors, &mut compensator, lux, proximity).await {
            Ok(v) => v,
            Err(e) => {
                warn!("{} read failed, skipping tick: {e:#}", metric.name());
                continue;
            }
        };

        let frame = match chart.update(metric, value, lux) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("skipping tick: {e}");
                continue;
            }
        };

        display.render(&frame).await?;
        display
            .set_backlight(frame.backlight_on, BACKLIGHT_BRIGHTNESS)
            .await?;
    }
}

/// Proximity and lux are read every tick: proximity drives mode cycling, lux
/// drives blanking.
async fn ambient(sensors: &dyn SensorGateway) -> Result<(f64, f64)> {
    let proximity = sensors.proximity().await?;
    let lux = sensors.lux().await?;
    Ok((proximity, lux))
}

async fn metric_value(
    metric: Metric,
    sensors: &dyn SensorGateway,
    compensator: &mut TemperatureCompensator,
    lux: f64,
    proximity: f64,
) -> Result<f64> {
    match metric {
        Metric::Temperature => {
            let raw = sensors.temperature_c().await?;
            let cpu = sensors.cpu_temperature_c().await?;
            Ok(compensator.compensate(raw, cpu))
        }
        Metric::Pressure => sensors.pressure_hpa().await,
        Metric::Humidity => sensors.humidity_pct().await,
        Metric::Light => Ok(shadowed_lux(lux, proximity)),
    }
}
