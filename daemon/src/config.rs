//! Daemon configuration, loaded from a TOML file.
//!
//! Every field has a default so the daemon runs without a config file at all;
//! a missing file just logs and falls back.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Render loop period in milliseconds.
    pub tick_interval_ms: u64,
    pub display: DisplayConfig,
    pub sensors: SensorConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub framebuffer_path: String,
    /// sysfs brightness file; the fixed on-brightness or 0 is written here.
    pub backlight_path: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// iio device directory for the temperature/pressure/humidity sensor.
    pub env_device_dir: String,
    /// iio device directory for the light/proximity sensor.
    pub light_device_dir: String,
    /// Thermal zone temperature file, in millidegrees C.
    pub cpu_temp_path: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub base_url: String,
    pub api_key: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            framebuffer_path: "/dev/fb0".to_string(),
            backlight_path: "/sys/class/backlight/soc:backlight/brightness".to_string(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            env_device_dir: "/sys/bus/iio/devices/iio:device0".to_string(),
            light_device_dir: "/sys/bus/iio/devices/iio:device1".to_string(),
            cpu_temp_path: "/sys/class/thermal/thermal_zone0/temp".to_string(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 30,
            base_url: "https://api.thingspeak.com/update".to_string(),
            api_key: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            display: DisplayConfig::default(),
            sensors: SensorConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

pub async fn load(path: &Path) -> Result<Config> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            toml::from_str(&contents).with_context(|| format!("failed to parse {path:?}"))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("no config file at {path:?}, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {path:?}")),
    }
}
