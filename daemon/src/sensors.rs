//! Sensor gateway: sysfs/iio reads plus the CPU-heat temperature correction.
//!
//! The environmental sensor (temperature/pressure/humidity) and the
//! light/proximity sensor are exposed by the kernel as iio devices; each
//! reading is one small file. All unit conversions from the kernel's iio
//! conventions happen here so the rest of the daemon only sees C, hPa, %,
//! lux, and raw proximity counts.

use std::collections::VecDeque;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::SensorConfig;

/// Board-specific tuning factor for the CPU-heat correction. Decrease to
/// adjust the reported temperature down, increase to adjust up.
const TUNING_FACTOR: f64 = 2.25;

/// CPU temperature samples averaged to smooth correction jitter.
const CPU_SMOOTHING_SAMPLES: usize = 5;

/// Proximity counts at or above this mean something is shadowing the light
/// sensor.
pub const PROXIMITY_SHADOW: f64 = 10.0;

/// Read access to the board's sensors. Implementations must be safe for
/// concurrent reads; both the render loop and the telemetry uploader hold a
/// reference.
#[async_trait]
pub trait SensorGateway: Send + Sync {
    async fn temperature_c(&self) -> Result<f64>;
    async fn pressure_hpa(&self) -> Result<f64>;
    async fn humidity_pct(&self) -> Result<f64>;
    async fn lux(&self) -> Result<f64>;
    async fn proximity(&self) -> Result<f64>;
    async fn cpu_temperature_c(&self) -> Result<f64>;
}

pub struct SysfsSensors {
    config: SensorConfig,
}

impl SysfsSensors {
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    async fn read_f64(&self, path: String) -> Result<f64> {
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {path}"))?;
        contents
            .trim()
            .parse()
            .with_context(|| format!("malformed reading in {path}"))
    }
}

#[async_trait]
impl SensorGateway for SysfsSensors {
    async fn temperature_c(&self) -> Result<f64> {
        // iio reports millidegrees C
        let raw = self
            .read_f64(format!("{}/in_temp_input", self.config.env_device_dir))
            .await?;
        Ok(raw / 1000.0)
    }

    async fn pressure_hpa(&self) -> Result<f64> {
        // iio reports kPa
        let raw = self
            .read_f64(format!("{}/in_pressure_input", self.config.env_device_dir))
            .await?;
        Ok(raw * 10.0)
    }

    async fn humidity_pct(&self) -> Result<f64> {
        // iio reports millipercent
        let raw = self
            .read_f64(format!(
                "{}/in_humidityrelative_input",
                self.config.env_device_dir
            ))
            .await?;
        Ok(raw / 1000.0)
    }

    async fn lux(&self) -> Result<f64> {
        self.read_f64(format!(
            "{}/in_illuminance_input",
            self.config.light_device_dir
        ))
        .await
    }

    async fn proximity(&self) -> Result<f64> {
        self.read_f64(format!(
            "{}/in_proximity_raw",
            self.config.light_device_dir
        ))
        .await
    }

    async fn cpu_temperature_c(&self) -> Result<f64> {
        // thermal zone reports millidegrees C
        let raw = self.read_f64(self.config.cpu_temp_path.clone()).await?;
        Ok(raw / 1000.0)
    }
}

/// The raw board temperature reads high because the sensor sits next to the
/// CPU. Correct it against a smoothed CPU temperature:
/// `corrected = raw - (avg_cpu - raw) / TUNING_FACTOR`.
pub struct TemperatureCompensator {
    cpu_temps: VecDeque<f64>,
}

impl TemperatureCompensator {
    pub fn new() -> Self {
        Self {
            cpu_temps: VecDeque::with_capacity(CPU_SMOOTHING_SAMPLES),
        }
    }

    pub fn compensate(&mut self, raw_c: f64, cpu_c: f64) -> f64 {
        if self.cpu_temps.len() == CPU_SMOOTHING_SAMPLES {
            self.cpu_temps.pop_front();
        }
        self.cpu_temps.push_back(cpu_c);
        let avg_cpu = self.cpu_temps.iter().sum::<f64>() / self.cpu_temps.len() as f64;
        raw_c - (avg_cpu - raw_c) / TUNING_FACTOR
    }
}

impl Default for TemperatureCompensator {
    fn default() -> Self {
        Self::new()
    }
}

/// Displayed lux value for the light metric. A hand close enough to tap the
/// panel also covers the light sensor, which would graph as a dark spike, so
/// shadowed readings are pinned to a neutral 1.0.
pub fn shadowed_lux(lux: f64, proximity: f64) -> f64 {
    if proximity < PROXIMITY_SHADOW { lux } else { 1.0 }
}
