use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw sensor channels consumed by the orientation fuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Accelerometer reading, used as the gravity direction (m/s^2).
    Gravity,
    /// Magnetic field reading (μT).
    Magnetic,
}

/// Accuracy level reported by the platform for a sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorAccuracy {
    Unreliable,
    Low,
    Medium,
    High,
}

/// A single event delivered by a sensor source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    Gravity(Vec3),
    Magnetic(Vec3),
    /// The platform changed its accuracy estimate for a channel.
    AccuracyChanged {
        kind: SensorKind,
        accuracy: SensorAccuracy,
    },
}

impl SensorEvent {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorEvent::Gravity(_) => SensorKind::Gravity,
            SensorEvent::Magnetic(_) => SensorKind::Magnetic,
            SensorEvent::AccuracyChanged { kind, .. } => *kind,
        }
    }
}

/// Requested delivery cadence, mirroring the usual platform presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorDelay {
    /// As fast as the hardware allows.
    Fastest,
    /// 50 Hz.
    Game,
    /// ~15 Hz.
    Ui,
    /// 5 Hz.
    #[default]
    Normal,
}

impl SensorDelay {
    pub fn sampling_period(self) -> Duration {
        match self {
            SensorDelay::Fastest => Duration::ZERO,
            SensorDelay::Game => Duration::from_micros(20_000),
            SensorDelay::Ui => Duration::from_micros(66_667),
            SensorDelay::Normal => Duration::from_micros(200_000),
        }
    }
}
