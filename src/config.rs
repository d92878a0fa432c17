use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::backend::{EchoBackend, HttpEchoBackend};
use crate::orbit::{KeplerSource, OrbitError, OrbitalElements, PositionSource, TleSource};
use crate::pulse::TargetGridOptions;
use crate::radar::{compute_swath_range, RadarError, RangeModel, SarConfig, SwathRange};
use crate::tracker::{BatchTrigger, TrackingOptions, DEFAULT_UPDATE_INTERVAL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("orbit: {0}")]
    Orbit(#[from] OrbitError),
    #[error("sar: {0}")]
    Radar(#[from] RadarError),
    #[error("tracking: {0}")]
    Tracking(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub orbit: OrbitConfig,
    pub sar: SarConfig,
    #[serde(default)]
    pub range_model: RangeModel,
    #[serde(default)]
    pub tracking: TrackingConfig,
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OrbitConfig {
    Kepler {
        elements: OrbitalElements,
        /// Defaults to load time.
        epoch: Option<DateTime<Utc>>,
    },
    Tle {
        tle: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub heading_offset_deg: f64,
    #[serde(default = "default_max_swaths")]
    pub max_swaths: usize,
    #[serde(
        default = "default_update_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub update_interval: Duration,
    #[serde(default)]
    pub auto_process: bool,
    pub batch: Option<BatchTrigger>,
    #[serde(default)]
    pub target_grid: TargetGridOptions,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            heading_offset_deg: 0.0,
            max_swaths: default_max_swaths(),
            update_interval: default_update_interval(),
            auto_process: false,
            batch: None,
            target_grid: TargetGridOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_swaths() -> usize {
    50
}

fn default_update_interval() -> Duration {
    DEFAULT_UPDATE_INTERVAL
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parses and validates. A missing Kepler epoch is pinned to now.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        if let OrbitConfig::Kepler { epoch, .. } = &mut config.orbit {
            epoch.get_or_insert_with(Utc::now);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let OrbitConfig::Tle { tle } = &self.orbit {
            TleSource::from_tle(tle)?;
        }
        self.swath_range()?;

        let tracking = &self.tracking;
        if tracking.update_interval.is_zero() {
            return Err(ConfigError::Tracking(
                "update_interval must be greater than zero".into(),
            ));
        }
        if tracking.max_swaths == 0 {
            return Err(ConfigError::Tracking(
                "max_swaths must be at least 1".into(),
            ));
        }
        if let Some(batch) = tracking.batch {
            if batch.batch_size(self.sar.prf) == 0 {
                return Err(ConfigError::Tracking(format!(
                    "batch {:?} is empty at prf {}",
                    batch, self.sar.prf
                )));
            }
        }
        if (tracking.auto_process || tracking.batch.is_some()) && self.backend.is_none() {
            return Err(ConfigError::Tracking(
                "auto_process and batch need a backend section".into(),
            ));
        }
        Ok(())
    }

    pub fn swath_range(&self) -> Result<SwathRange, ConfigError> {
        Ok(compute_swath_range(&self.sar, self.range_model)?)
    }

    /// Kepler elements, when the orbit is not TLE-driven.
    pub fn kepler_source(&self) -> Option<KeplerSource> {
        match &self.orbit {
            OrbitConfig::Kepler { elements, epoch } => Some(KeplerSource::new(
                *elements,
                epoch.unwrap_or_else(Utc::now),
            )),
            OrbitConfig::Tle { .. } => None,
        }
    }

    pub fn position_source(&self) -> Result<Arc<dyn PositionSource>, ConfigError> {
        match &self.orbit {
            OrbitConfig::Kepler { elements, epoch } => Ok(Arc::new(KeplerSource::new(
                *elements,
                epoch.unwrap_or_else(Utc::now),
            ))),
            OrbitConfig::Tle { tle } => Ok(Arc::new(TleSource::from_tle(tle)?)),
        }
    }

    pub fn http_backend(&self) -> Option<HttpEchoBackend> {
        self.backend.as_ref().map(|b| HttpEchoBackend::new(&b.url))
    }

    pub fn echo_backend(&self) -> Option<Arc<dyn EchoBackend>> {
        self.http_backend()
            .map(|b| Arc::new(b) as Arc<dyn EchoBackend>)
    }

    pub fn tracking_options(&self) -> TrackingOptions {
        TrackingOptions {
            heading_offset_deg: self.tracking.heading_offset_deg,
            update_interval: self.tracking.update_interval,
            auto_process: self.tracking.auto_process,
            batch: self.tracking.batch,
            target_grid: self.tracking.target_grid,
        }
    }
}
