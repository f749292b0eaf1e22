//! Stand-in sources for running without device sensors or a location provider.

use crate::location::{LocationRequest, LocationSink, LocationSource};
use crate::permission::{PermissionGate, PermissionScope};
use compass_geo::GeoPoint;
use compass_sensors::{SensorEvent, SensorKind, SensorRequest, SensorSink, SensorSource, SourceError};
use glam::Vec3;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cadence used when the request asks for "as fast as possible".
const FASTEST_PERIOD: Duration = Duration::from_millis(10);

/// A flat device turning in place at a constant rate.
///
/// Emits one gravity and one magnetic sample per period. Must be subscribed
/// from within a Tokio runtime.
pub struct SimulatedSensorSource {
    degrees_per_second: f32,
    task: Option<JoinHandle<()>>,
}

impl SimulatedSensorSource {
    pub fn new(degrees_per_second: f32) -> Self {
        Self {
            degrees_per_second,
            task: None,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.task.is_some()
    }
}

impl SensorSource for SimulatedSensorSource {
    fn subscribe(&mut self, request: &SensorRequest, sink: SensorSink) -> Result<(), SourceError> {
        self.unsubscribe()?;

        let mut period = request.delay.sampling_period();
        if period.is_zero() {
            period = FASTEST_PERIOD;
        }
        let gravity = request.kinds.contains(&SensorKind::Gravity);
        let magnetic = request.kinds.contains(&SensorKind::Magnetic);
        let rate = self.degrees_per_second;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut azimuth = 0.0_f32;
            loop {
                ticker.tick().await;
                if gravity && !sink.push(SensorEvent::Gravity(Vec3::new(0.0, 0.0, 9.81))) {
                    break;
                }
                if magnetic && !sink.push(SensorEvent::Magnetic(field_for_azimuth(azimuth))) {
                    break;
                }
                azimuth = (azimuth + rate * period.as_secs_f32()) % 360.0;
            }
        }));
        Ok(())
    }

    fn unsubscribe(&mut self) -> Result<(), SourceError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }
}

impl Drop for SimulatedSensorSource {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Magnetic field seen by a flat device whose azimuth is `azimuth` degrees.
fn field_for_azimuth(azimuth: f32) -> Vec3 {
    let r = azimuth.to_radians();
    Vec3::new(-22.0 * r.sin(), 22.0 * r.cos(), -42.0)
}

/// Replays a fixed route, one fix per minimum update interval.
///
/// Stays on the last fix once the route is exhausted.
pub struct ScriptedLocationSource {
    route: Vec<GeoPoint>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedLocationSource {
    pub fn new(route: Vec<GeoPoint>) -> Self {
        Self { route, task: None }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl LocationSource for ScriptedLocationSource {
    fn start(&mut self, request: &LocationRequest, sink: LocationSink) -> Result<(), SourceError> {
        if self.route.is_empty() {
            return Err(SourceError::LocationUnavailable);
        }
        self.stop()?;

        let route = self.route.clone();
        let period = request.min_update_interval.max(request.interval);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            for fix in route {
                ticker.tick().await;
                if !sink.push(fix) {
                    break;
                }
            }
        }));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SourceError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }
}

impl Drop for ScriptedLocationSource {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Answers every prompt the same way.
pub struct StaticPermissionGate {
    held: HashSet<PermissionScope>,
    grant_on_request: bool,
}

impl StaticPermissionGate {
    /// Nothing held up front; every prompt is granted.
    pub fn granting() -> Self {
        Self {
            held: HashSet::new(),
            grant_on_request: true,
        }
    }

    /// Nothing held up front; every prompt is denied.
    pub fn denying() -> Self {
        Self {
            held: HashSet::new(),
            grant_on_request: false,
        }
    }
}

impl PermissionGate for StaticPermissionGate {
    fn has_permission(&self, scope: PermissionScope) -> bool {
        self.held.contains(&scope)
    }

    fn request_permission(&mut self, scope: PermissionScope) -> impl Future<Output = bool> + Send {
        if self.grant_on_request {
            self.held.insert(scope);
        }
        let granted = self.grant_on_request;
        async move { granted }
    }
}
