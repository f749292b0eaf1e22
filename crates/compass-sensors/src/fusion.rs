use crate::filter::LowPassFilter;
use crate::types::SensorEvent;
use glam::Vec3;

/// Below this norm the east vector (magnetic x gravity) is too short to trust:
/// the device is in free fall or the field is nearly parallel to gravity.
const MIN_EAST_NORM: f32 = 0.1;

/// Tilt-compensated azimuth, in degrees within `(-180, 180]`.
///
/// Builds the device-to-Earth rotation from the gravity and magnetic vectors
/// (east = m x g, north = g x east) and measures the device's forward (y) axis
/// against magnetic north. Returns `None` when the inputs are singular.
pub fn azimuth_from(gravity: Vec3, magnetic: Vec3) -> Option<f32> {
    if !gravity.is_finite() || !magnetic.is_finite() {
        return None;
    }
    let up = gravity.try_normalize()?;

    let east = magnetic.cross(gravity);
    if east.length() < MIN_EAST_NORM {
        return None;
    }
    let east = east.normalize();
    let north = up.cross(east);

    let azimuth = east.y.atan2(north.y).to_degrees();
    if !azimuth.is_finite() {
        return None;
    }
    Some(if azimuth <= -180.0 {
        azimuth + 360.0
    } else {
        azimuth
    })
}

/// Orientation fusion from raw gravity and magnetic samples.
///
/// Every sample triggers an immediate recompute from the latest pair. No
/// smoothing is applied unless a low-pass weight is configured.
pub struct OrientationFuser {
    gravity: Option<Vec3>,
    magnetic: Option<Vec3>,
    azimuth: Option<f32>,
    /// Optional low-pass on each channel: (gravity, magnetic).
    filters: Option<(LowPassFilter, LowPassFilter)>,
    singular_count: u64,
}

impl OrientationFuser {
    pub fn new() -> Self {
        Self {
            gravity: None,
            magnetic: None,
            azimuth: None,
            filters: None,
            singular_count: 0,
        }
    }

    /// Fuser that low-passes both raw channels with weight `alpha` before fusion.
    pub fn with_smoothing(alpha: f32) -> Self {
        Self {
            filters: Some((LowPassFilter::new(alpha), LowPassFilter::new(alpha))),
            ..Self::new()
        }
    }

    /// Process one event and return the recomputed azimuth, if any.
    ///
    /// Returns `None` when the event carried no vector, when one channel has not
    /// reported yet, or when the sample is non-finite or the pair singular. The
    /// last valid azimuth is kept in the latter cases; a non-finite sample
    /// changes no state at all.
    pub fn handle(&mut self, event: SensorEvent) -> Option<f32> {
        if let SensorEvent::Gravity(v) | SensorEvent::Magnetic(v) = event {
            // A single bad sample would otherwise poison the low-pass state.
            if !v.is_finite() {
                self.singular_count += 1;
                tracing::trace!(kind = ?event.kind(), ?v, "Dropping non-finite sample");
                return None;
            }
        }
        match event {
            SensorEvent::Gravity(v) => {
                let v = match &mut self.filters {
                    Some((gravity, _)) => gravity.update(v),
                    None => v,
                };
                self.gravity = Some(v);
            }
            SensorEvent::Magnetic(v) => {
                let v = match &mut self.filters {
                    Some((_, magnetic)) => magnetic.update(v),
                    None => v,
                };
                self.magnetic = Some(v);
            }
            SensorEvent::AccuracyChanged { kind, accuracy } => {
                tracing::debug!(?kind, ?accuracy, "Sensor accuracy changed");
                return None;
            }
        }
        self.recompute()
    }

    fn recompute(&mut self) -> Option<f32> {
        let (gravity, magnetic) = (self.gravity?, self.magnetic?);
        match azimuth_from(gravity, magnetic) {
            Some(azimuth) => {
                self.azimuth = Some(azimuth);
                Some(azimuth)
            }
            None => {
                self.singular_count += 1;
                tracing::trace!(
                    ?gravity,
                    ?magnetic,
                    singular_count = self.singular_count,
                    "Singular rotation input, keeping last azimuth"
                );
                None
            }
        }
    }

    /// Latest azimuth in degrees, or `None` before a valid pair has been seen.
    pub fn current_azimuth(&self) -> Option<f32> {
        self.azimuth
    }

    /// Number of samples skipped as non-finite or because the rotation was singular.
    pub fn singular_count(&self) -> u64 {
        self.singular_count
    }
}

impl Default for OrientationFuser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SensorAccuracy, SensorKind};

    const FLAT: Vec3 = Vec3::new(0.0, 0.0, 9.81);

    /// Field with a downward dip, as seen by a flat device whose azimuth is
    /// `azimuth` degrees.
    fn field_at(azimuth: f32) -> Vec3 {
        let r = azimuth.to_radians();
        Vec3::new(-20.0 * r.sin(), 20.0 * r.cos(), -40.0)
    }

    #[test]
    fn facing_north_is_zero() {
        let azimuth = azimuth_from(FLAT, field_at(0.0)).unwrap();
        assert!(azimuth.abs() < 1e-4, "got {azimuth}");
    }

    #[test]
    fn field_direction_maps_to_azimuth() {
        // North to the device's right means the device faces west.
        let azimuth = azimuth_from(FLAT, Vec3::new(20.0, 0.0, -40.0)).unwrap();
        assert!((azimuth + 90.0).abs() < 1e-4, "got {azimuth}");

        let azimuth = azimuth_from(FLAT, field_at(-30.0)).unwrap();
        assert!((azimuth + 30.0).abs() < 1e-3, "got {azimuth}");
    }

    #[test]
    fn facing_south_is_positive_180() {
        let azimuth = azimuth_from(FLAT, Vec3::new(0.0, -20.0, -40.0)).unwrap();
        assert!((azimuth - 180.0).abs() < 1e-4, "got {azimuth}");
        assert!(azimuth > -180.0);
    }

    #[test]
    fn tilt_does_not_change_heading() {
        // Device pitched up 30 degrees about its x axis, still facing north.
        let pitch = 30f32.to_radians();
        let rot = glam::Quat::from_rotation_x(-pitch);
        let gravity = rot * FLAT;
        let azimuth = azimuth_from(gravity, rot * field_at(0.0)).unwrap();
        assert!(azimuth.abs() < 1e-3, "got {azimuth}");
        let azimuth = azimuth_from(gravity, rot * field_at(45.0)).unwrap();
        assert!((azimuth - 45.0).abs() < 1e-3, "got {azimuth}");
    }

    #[test]
    fn gravity_only_is_undefined() {
        let mut fuser = OrientationFuser::new();
        assert_eq!(fuser.handle(SensorEvent::Gravity(FLAT)), None);
        assert_eq!(fuser.current_azimuth(), None);
    }

    #[test]
    fn identical_pair_is_idempotent() {
        let mut fuser = OrientationFuser::new();
        fuser.handle(SensorEvent::Gravity(FLAT));
        let first = fuser.handle(SensorEvent::Magnetic(field_at(42.0))).unwrap();
        fuser.handle(SensorEvent::Gravity(FLAT));
        let second = fuser.handle(SensorEvent::Magnetic(field_at(42.0))).unwrap();
        assert_eq!(first, second);
        assert_eq!(fuser.current_azimuth(), Some(first));
    }

    #[test]
    fn zero_gravity_keeps_last_azimuth() {
        let mut fuser = OrientationFuser::new();
        fuser.handle(SensorEvent::Gravity(FLAT));
        let valid = fuser.handle(SensorEvent::Magnetic(field_at(10.0))).unwrap();

        assert_eq!(fuser.handle(SensorEvent::Gravity(Vec3::ZERO)), None);
        assert_eq!(fuser.current_azimuth(), Some(valid));
        assert_eq!(fuser.singular_count(), 1);

        // Field parallel to gravity is singular too.
        fuser.handle(SensorEvent::Gravity(FLAT));
        assert_eq!(fuser.handle(SensorEvent::Magnetic(Vec3::new(0.0, 0.0, 50.0))), None);
        assert_eq!(fuser.current_azimuth(), Some(valid));
    }

    #[test]
    fn non_finite_input_never_leaks() {
        let mut fuser = OrientationFuser::new();
        fuser.handle(SensorEvent::Gravity(Vec3::new(f32::NAN, 0.0, 9.81)));
        assert_eq!(fuser.handle(SensorEvent::Magnetic(field_at(0.0))), None);
        assert_eq!(fuser.current_azimuth(), None);
    }

    #[test]
    fn accuracy_change_is_ignored() {
        let mut fuser = OrientationFuser::new();
        fuser.handle(SensorEvent::Gravity(FLAT));
        let azimuth = fuser.handle(SensorEvent::Magnetic(field_at(5.0)));
        let out = fuser.handle(SensorEvent::AccuracyChanged {
            kind: SensorKind::Magnetic,
            accuracy: SensorAccuracy::Unreliable,
        });
        assert_eq!(out, None);
        assert_eq!(fuser.current_azimuth(), azimuth);
    }

    #[test]
    fn latest_sample_wins_without_smoothing() {
        let mut fuser = OrientationFuser::new();
        fuser.handle(SensorEvent::Gravity(FLAT));
        for heading in [10.0, 20.0, 30.0] {
            fuser.handle(SensorEvent::Magnetic(field_at(heading)));
        }
        let azimuth = fuser.current_azimuth().unwrap();
        assert!((azimuth - 30.0).abs() < 1e-3, "got {azimuth}");
    }

    #[test]
    fn smoothing_recovers_after_nan_sample() {
        let mut fuser = OrientationFuser::with_smoothing(0.5);
        fuser.handle(SensorEvent::Gravity(FLAT));
        let before = fuser.handle(SensorEvent::Magnetic(field_at(10.0))).unwrap();

        assert_eq!(
            fuser.handle(SensorEvent::Magnetic(Vec3::new(f32::NAN, 0.0, 0.0))),
            None
        );
        assert_eq!(fuser.current_azimuth(), Some(before));

        for _ in 0..200 {
            fuser.handle(SensorEvent::Gravity(FLAT));
            fuser.handle(SensorEvent::Magnetic(field_at(90.0)));
        }
        let azimuth = fuser.current_azimuth().unwrap();
        assert!((azimuth - 90.0).abs() < 1.0, "got {azimuth}");
    }

    #[test]
    fn smoothing_lags_behind() {
        let mut fuser = OrientationFuser::with_smoothing(0.5);
        fuser.handle(SensorEvent::Gravity(FLAT));
        fuser.handle(SensorEvent::Magnetic(field_at(0.0)));
        let azimuth = fuser
            .handle(SensorEvent::Magnetic(field_at(60.0)))
            .unwrap();
        assert!(azimuth > 0.0 && azimuth < 60.0, "got {azimuth}");
    }
}
