//! Periodic telemetry upload.
//!
//! Every interval the uploader reads all four metrics (temperature corrected
//! for CPU heat) and fires one GET at the configured endpoint, encoding the
//! readings as query parameters. No retry, no backoff, no response parsing;
//! a failed upload is logged and dropped. Each tick spawns its request as a
//! detached task, so a stalled upload never delays the schedule — concurrent
//! in-flight requests are an accepted policy here.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::TelemetryConfig;
use crate::sensors::{SensorGateway, TemperatureCompensator};

/// One batch of readings as the endpoint expects them.
#[derive(Debug, PartialEq)]
pub struct Readings {
    pub temperature_c: f64,
    pub pressure_hpa: f64,
    pub lux: f64,
    pub humidity_pct: f64,
}

/// The endpoint's fixed field layout: field1 temperature, field2 pressure,
/// field3 light, field5 humidity. field4 is unassigned on the channel.
pub fn build_update_url(base_url: &str, api_key: &str, readings: &Readings) -> String {
    format!(
        "{}?api_key={}&field1={}&field2={}&field3={}&field5={}",
        base_url,
        api_key,
        readings.temperature_c,
        readings.pressure_hpa,
        readings.lux,
        readings.humidity_pct
    )
}

async fn gather_readings(
    sensors: &dyn SensorGateway,
    compensator: &mut TemperatureCompensator,
) -> Result<Readings> {
    let raw_temp = sensors.temperature_c().await?;
    let cpu_temp = sensors.cpu_temperature_c().await?;
    Ok(Readings {
        temperature_c: compensator.compensate(raw_temp, cpu_temp),
        pressure_hpa: sensors.pressure_hpa().await?,
        lux: sensors.lux().await?,
        humidity_pct: sensors.humidity_pct().await?,
    })
}

pub fn spawn_uploader(
    task_tracker: &TaskTracker,
    shutdown_token: CancellationToken,
    config: TelemetryConfig,
    sensors: Arc<dyn SensorGateway>,
) {
    info!(
        "telemetry: uploading to {} every {}s",
        config.base_url, config.interval_secs
    );
    task_tracker.spawn(async move {
        let client = reqwest::Client::new();
        let mut compensator = TemperatureCompensator::new();
        let mut ticker = interval(Duration::from_secs(config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval fires immediately; skip the startup tick so sensors have
        // settled before the first upload
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => {
                    info!("telemetry uploader shutting down");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let readings = match gather_readings(sensors.as_ref(), &mut compensator).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("telemetry: sensor read failed, skipping upload: {e:#}");
                    continue;
                }
            };

            let url = build_update_url(&config.base_url, &config.api_key, &readings);
            let client = client.clone();
            tokio::spawn(async move {
                match client.get(url).send().await {
                    Ok(response) => debug!("telemetry: upload status {}", response.status()),
                    Err(e) => warn!("telemetry: upload failed: {e}"),
                }
            });
        }
    });
}
