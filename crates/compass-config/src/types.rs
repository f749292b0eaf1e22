use compass_geo::GeoPoint;
use compass_sensors::SensorDelay;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed destination the marker points at, as `[lat, lng]`.
    pub target: GeoPoint,
    /// Position used for the bearing until the first live fix arrives.
    pub fallback_origin: GeoPoint,
    /// Location request parameters.
    pub location: LocationConfig,
    /// Sensor subscription parameters.
    pub sensors: SensorConfig,
    /// Orientation fusion parameters.
    pub fusion: FusionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: GeoPoint::new(21.42264920624544, 39.82639113882412).unwrap_or_default(),
            fallback_origin: GeoPoint::new(-6.97465995592464, 108.50091662123228)
                .unwrap_or_default(),
            location: LocationConfig::default(),
            sensors: SensorConfig::default(),
            fusion: FusionConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(alpha) = self.fusion.smoothing {
            if !(alpha > 0.0 && alpha <= 1.0) {
                anyhow::bail!("fusion.smoothing must be in (0, 1], got {alpha}");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccuracyPriority {
    /// Prefer GPS-level accuracy.
    HighAccuracy,
    /// Block-level accuracy with lower power draw.
    Balanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub priority: AccuracyPriority,
    /// Desired update interval.
    pub interval_ms: u64,
    /// Fixes are never delivered faster than this.
    pub min_update_interval_ms: u64,
    /// Longest the provider may batch fixes before delivering.
    pub max_update_delay_ms: u64,
    /// Hold the first fix until the provider reaches the requested accuracy.
    pub wait_for_accurate_location: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            priority: AccuracyPriority::HighAccuracy,
            interval_ms: 100,
            min_update_interval_ms: 3000,
            max_update_delay_ms: 100,
            wait_for_accurate_location: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Delivery cadence requested for both gravity and magnetic channels.
    pub delay: SensorDelay,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Low-pass weight of the newest raw sample, in (0, 1]. `None` feeds raw
    /// samples straight into the fuser.
    pub smoothing: Option<f32>,
}
