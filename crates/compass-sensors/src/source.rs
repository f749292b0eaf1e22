use crate::types::{SensorDelay, SensorEvent, SensorKind};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Sensor {0:?} is not available on this device")]
    SensorUnavailable(SensorKind),
    #[error("Location provider is not available")]
    LocationUnavailable,
    #[error("Source backend error: {0}")]
    Backend(String),
}

/// What a sensor source should deliver and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorRequest {
    pub kinds: Vec<SensorKind>,
    pub delay: SensorDelay,
}

impl SensorRequest {
    /// Gravity and magnetic field at the given cadence.
    pub fn orientation(delay: SensorDelay) -> Self {
        Self {
            kinds: vec![SensorKind::Gravity, SensorKind::Magnetic],
            delay,
        }
    }
}

/// Queue depth between sensor callbacks and the orientation consumer.
pub const SENSOR_QUEUE_CAPACITY: usize = 256;

/// Non-blocking entry point handed to a sensor source.
///
/// Pushing never waits, so platform callbacks return immediately. The queue is
/// bounded; while the consumer lags and the queue is full, new samples are
/// dropped.
#[derive(Debug, Clone)]
pub struct SensorSink {
    tx: mpsc::Sender<SensorEvent>,
}

impl SensorSink {
    pub fn new(tx: mpsc::Sender<SensorEvent>) -> Self {
        Self { tx }
    }

    /// Forward an event. Returns `false` once the consumer has shut down.
    pub fn push(&self, event: SensorEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::trace!(kind = ?event.kind(), "Sensor queue full, dropping sample");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Platform-specific provider of raw gravity and magnetic samples.
pub trait SensorSource: Send {
    /// Start delivering the requested channels into `sink`.
    fn subscribe(&mut self, request: &SensorRequest, sink: SensorSink) -> Result<(), SourceError>;

    /// Stop delivering. Calling this while not subscribed is a no-op.
    fn unsubscribe(&mut self) -> Result<(), SourceError>;
}
