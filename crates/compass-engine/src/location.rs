use compass_config::{AccuracyPriority, LocationConfig};
use compass_geo::GeoPoint;
use compass_sensors::SourceError;
use std::time::Duration;
use tokio::sync::mpsc;

/// Parameters handed to a [`LocationSource`] when updates start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequest {
    pub priority: AccuracyPriority,
    pub interval: Duration,
    pub min_update_interval: Duration,
    pub max_update_delay: Duration,
    pub wait_for_accurate_location: bool,
}

impl From<&LocationConfig> for LocationRequest {
    fn from(config: &LocationConfig) -> Self {
        Self {
            priority: config.priority,
            interval: Duration::from_millis(config.interval_ms),
            min_update_interval: Duration::from_millis(config.min_update_interval_ms),
            max_update_delay: Duration::from_millis(config.max_update_delay_ms),
            wait_for_accurate_location: config.wait_for_accurate_location,
        }
    }
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self::from(&LocationConfig::default())
    }
}

/// Non-blocking entry point handed to a location source.
///
/// Providers may deliver several fixes at once; the last fix of a batch is
/// the one the bearing ends up reflecting.
#[derive(Debug, Clone)]
pub struct LocationSink {
    tx: mpsc::UnboundedSender<Vec<GeoPoint>>,
}

impl LocationSink {
    pub fn new(tx: mpsc::UnboundedSender<Vec<GeoPoint>>) -> Self {
        Self { tx }
    }

    /// Forward a batch of fixes. Returns `false` once the consumer has shut down.
    pub fn push_batch(&self, fixes: Vec<GeoPoint>) -> bool {
        if fixes.is_empty() {
            return !self.tx.is_closed();
        }
        self.tx.send(fixes).is_ok()
    }

    pub fn push(&self, fix: GeoPoint) -> bool {
        self.push_batch(vec![fix])
    }

    /// Forward a raw platform fix, dropping it if the coordinates are invalid.
    pub fn push_coordinates(&self, lat: f64, lng: f64) -> bool {
        match GeoPoint::new(lat, lng) {
            Ok(fix) => self.push(fix),
            Err(e) => {
                tracing::warn!(%e, lat, lng, "Dropping invalid location fix");
                !self.tx.is_closed()
            }
        }
    }
}

/// Platform-specific provider of position fixes.
pub trait LocationSource: Send {
    /// Begin delivering fixes into `sink` according to `request`.
    fn start(&mut self, request: &LocationRequest, sink: LocationSink) -> Result<(), SourceError>;

    /// Stop delivering fixes. Calling this while stopped is a no-op.
    fn stop(&mut self) -> Result<(), SourceError>;
}
