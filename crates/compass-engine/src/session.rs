//! Foreground lifecycle for sensor and location subscriptions.
//!
//! Subscriptions only exist while a [`ForegroundSession`] is alive. Dropping
//! the session, including during unwinding, releases both sources.

use crate::location::{LocationRequest, LocationSink, LocationSource};
use crate::permission::{Notice, PermissionGate, LOCATION_SCOPES};
use compass_config::AppConfig;
use compass_sensors::{SensorRequest, SensorSink, SensorSource, SourceError};
use tracing::{info, warn};

/// Owns the external sources and decides when they run.
pub struct CompassController<S, L, P>
where
    S: SensorSource,
    L: LocationSource,
    P: PermissionGate,
{
    sensors: S,
    location: L,
    permissions: P,
    sensor_request: SensorRequest,
    location_request: LocationRequest,
    sensor_sink: SensorSink,
    location_sink: LocationSink,
    /// Set once location permission has been granted; survives foreground changes.
    location_required: bool,
    location_active: bool,
}

impl<S, L, P> CompassController<S, L, P>
where
    S: SensorSource,
    L: LocationSource,
    P: PermissionGate,
{
    pub fn new(
        config: &AppConfig,
        sensor_sink: SensorSink,
        location_sink: LocationSink,
        sensors: S,
        location: L,
        permissions: P,
    ) -> Self {
        Self {
            sensors,
            location,
            permissions,
            sensor_request: SensorRequest::orientation(config.sensors.delay),
            location_request: LocationRequest::from(&config.location),
            sensor_sink,
            location_sink,
            location_required: false,
            location_active: false,
        }
    }

    /// Subscribe to sensors and, if previously granted, resume location updates.
    pub fn enter_foreground(&mut self) -> Result<ForegroundSession<'_, S, L, P>, SourceError> {
        // The guard exists before anything is acquired so a failure below still
        // releases whatever was started.
        let mut session = ForegroundSession { controller: self };
        let controller = &mut *session.controller;

        controller
            .sensors
            .subscribe(&controller.sensor_request, controller.sensor_sink.clone())?;
        info!(delay = ?controller.sensor_request.delay, "Sensors subscribed");

        if controller.location_required {
            if let Err(e) = controller.start_location() {
                warn!(?e, "Could not resume location updates, keeping last bearing");
            }
        }
        Ok(session)
    }

    pub fn location_required(&self) -> bool {
        self.location_required
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn permissions(&self) -> &P {
        &self.permissions
    }

    fn start_location(&mut self) -> Result<(), SourceError> {
        if self.location_active {
            return Ok(());
        }
        self.location
            .start(&self.location_request, self.location_sink.clone())?;
        self.location_active = true;
        info!(
            priority = ?self.location_request.priority,
            min_interval_ms = self.location_request.min_update_interval.as_millis() as u64,
            "Location updates started"
        );
        Ok(())
    }

    fn release(&mut self) {
        if let Err(e) = self.location.stop() {
            warn!(?e, "Failed to stop location updates");
        }
        if let Err(e) = self.sensors.unsubscribe() {
            warn!(?e, "Failed to unsubscribe sensors");
        }
        if self.location_active {
            info!("Location updates stopped");
        }
        self.location_active = false;
    }
}

/// Live sensor (and possibly location) subscriptions.
pub struct ForegroundSession<'a, S, L, P>
where
    S: SensorSource,
    L: LocationSource,
    P: PermissionGate,
{
    controller: &'a mut CompassController<S, L, P>,
}

impl<S, L, P> ForegroundSession<'_, S, L, P>
where
    S: SensorSource,
    L: LocationSource,
    P: PermissionGate,
{
    /// Start location updates, prompting for permission when needed.
    ///
    /// Returns the notice to show the user, if any. A denial is not an error:
    /// the bearing keeps using the last known or fallback position.
    pub async fn request_location(&mut self) -> Result<Option<Notice>, SourceError> {
        let controller = &mut *self.controller;

        if LOCATION_SCOPES
            .iter()
            .all(|scope| controller.permissions.has_permission(*scope))
        {
            controller.location_required = true;
            controller.start_location()?;
            return Ok(None);
        }

        let mut granted = true;
        for scope in LOCATION_SCOPES {
            if !controller.permissions.has_permission(scope) {
                granted &= controller.permissions.request_permission(scope).await;
            }
        }

        if granted {
            info!("Location permission granted");
            controller.location_required = true;
            controller.start_location()?;
            Ok(Some(Notice::PermissionGranted))
        } else {
            warn!("Location permission denied, bearing stays on last known position");
            Ok(Some(Notice::PermissionDenied))
        }
    }

    pub fn is_location_active(&self) -> bool {
        self.controller.location_active
    }

    /// Release both subscriptions now.
    pub fn leave(self) {}
}

impl<S, L, P> Drop for ForegroundSession<'_, S, L, P>
where
    S: SensorSource,
    L: LocationSource,
    P: PermissionGate,
{
    fn drop(&mut self) {
        self.controller.release();
        info!("Left foreground, subscriptions released");
    }
}
