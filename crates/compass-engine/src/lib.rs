pub mod combiner;
pub mod location;
pub mod permission;
pub mod session;
pub mod sim;

pub use combiner::{DisplayState, HeadingCombiner};
pub use location::{LocationRequest, LocationSink, LocationSource};
pub use permission::{Notice, PermissionGate, PermissionScope, LOCATION_SCOPES};
pub use session::{CompassController, ForegroundSession};

use compass_config::AppConfig;
use compass_geo::{BearingTracker, GeoPoint};
use compass_sensors::{OrientationFuser, SensorEvent, SensorSink, SENSOR_QUEUE_CAPACITY};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Real-time heading engine.
///
/// Owns one task per input stream, each the single writer of its own state,
/// plus a combiner task that reacts to either state changing and publishes
/// the latest [`DisplayState`].
pub struct HeadingEngine {
    display_rx: watch::Receiver<DisplayState>,
    azimuth_rx: watch::Receiver<Option<f32>>,
    bearing_rx: watch::Receiver<f64>,
    sensor_sink: SensorSink,
    location_sink: LocationSink,
    tasks: Vec<JoinHandle<()>>,
}

impl HeadingEngine {
    /// Spawn the engine tasks. Must be called from within a Tokio runtime.
    pub fn start(config: &AppConfig) -> Self {
        let fuser = match config.fusion.smoothing {
            Some(alpha) => {
                tracing::info!(alpha, "Sensor smoothing enabled");
                OrientationFuser::with_smoothing(alpha)
            }
            None => OrientationFuser::new(),
        };
        let tracker = BearingTracker::new(config.target, config.fallback_origin);
        let combiner = HeadingCombiner::new(tracker.bearing());

        tracing::info!(
            target_lat = config.target.lat(),
            target_lng = config.target.lng(),
            bearing = tracker.bearing(),
            "Heading engine starting from fallback origin"
        );

        let (sensor_tx, sensor_rx) = mpsc::channel(SENSOR_QUEUE_CAPACITY);
        let (location_tx, location_rx) = mpsc::unbounded_channel();
        let (azimuth_tx, azimuth_rx) = watch::channel(None);
        let (bearing_tx, bearing_rx) = watch::channel(tracker.bearing());
        let (display_tx, display_rx) = watch::channel(combiner.state());

        let tasks = vec![
            tokio::spawn(orientation_loop(sensor_rx, azimuth_tx, fuser)),
            tokio::spawn(bearing_loop(location_rx, bearing_tx, tracker)),
            tokio::spawn(combiner_loop(
                azimuth_rx.clone(),
                bearing_rx.clone(),
                display_tx,
                combiner,
            )),
        ];

        Self {
            display_rx,
            azimuth_rx,
            bearing_rx,
            sensor_sink: SensorSink::new(sensor_tx),
            location_sink: LocationSink::new(location_tx),
            tasks,
        }
    }

    /// Handle for sensor sources to push raw events into.
    pub fn sensor_sink(&self) -> SensorSink {
        self.sensor_sink.clone()
    }

    /// Handle for location sources to push fixes into.
    pub fn location_sink(&self) -> LocationSink {
        self.location_sink.clone()
    }

    /// Latest display state (non-blocking).
    pub fn display(&self) -> DisplayState {
        *self.display_rx.borrow()
    }

    /// Receiver notified on every display recompute.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display_rx.clone()
    }

    /// Latest azimuth in degrees, `None` until both sensor channels reported.
    pub fn azimuth(&self) -> Option<f32> {
        *self.azimuth_rx.borrow()
    }

    /// Latest bearing toward the target, in degrees.
    pub fn bearing(&self) -> f64 {
        *self.bearing_rx.borrow()
    }

    /// Abort all engine tasks and wait until they have stopped.
    ///
    /// Dropping the engine also aborts the tasks, without waiting.
    pub async fn shutdown(mut self) {
        tracing::info!("Heading engine shutting down");
        for task in self.tasks.drain(..) {
            task.abort();
            // Cancellation is the expected outcome here.
            let _ = task.await;
        }
    }
}

impl Drop for HeadingEngine {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Single writer of the orientation state.
async fn orientation_loop(
    mut sensor_rx: mpsc::Receiver<SensorEvent>,
    azimuth_tx: watch::Sender<Option<f32>>,
    mut fuser: OrientationFuser,
) {
    let mut sample_count: u64 = 0;
    while let Some(event) = sensor_rx.recv().await {
        if let Some(azimuth) = fuser.handle(event) {
            azimuth_tx.send_replace(Some(azimuth));
        }
        sample_count += 1;
        if sample_count % 1000 == 0 {
            tracing::debug!(
                sample_count,
                singular = fuser.singular_count(),
                "Sensor samples processed"
            );
        }
    }
    tracing::debug!("Sensor stream closed");
}

/// Single writer of the bearing state.
async fn bearing_loop(
    mut location_rx: mpsc::UnboundedReceiver<Vec<GeoPoint>>,
    bearing_tx: watch::Sender<f64>,
    mut tracker: BearingTracker,
) {
    while let Some(batch) = location_rx.recv().await {
        let first_fix = !tracker.has_fix();
        for fix in batch {
            tracker.update(fix);
        }
        let bearing = tracker.bearing();
        if first_fix {
            tracing::info!(bearing, "First location fix received");
        } else {
            tracing::debug!(
                lat = tracker.position().lat(),
                lng = tracker.position().lng(),
                bearing,
                "Bearing updated"
            );
        }
        bearing_tx.send_replace(bearing);
    }
    tracing::debug!("Location stream closed");
}

/// Recomputes the display whenever either upstream value changes.
async fn combiner_loop(
    mut azimuth_rx: watch::Receiver<Option<f32>>,
    mut bearing_rx: watch::Receiver<f64>,
    display_tx: watch::Sender<DisplayState>,
    mut combiner: HeadingCombiner,
) {
    loop {
        let state = tokio::select! {
            changed = azimuth_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let azimuth = *azimuth_rx.borrow_and_update();
                combiner.set_azimuth(azimuth)
            }
            changed = bearing_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let bearing = *bearing_rx.borrow_and_update();
                combiner.set_bearing(bearing)
            }
        };
        display_tx.send_replace(state);
    }
    tracing::debug!("Display combiner stopped");
}
