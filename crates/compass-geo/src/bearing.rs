//! Rhumb-line bearing toward a fixed target.
//!
//! Both longitudes are negated before the longitude difference is taken. The
//! resulting angle is the mirror image of the conventional rhumb bearing
//! (`360 - conventional`), which the display side compensates for by rotating
//! the target marker by `-bearing`. Downstream consumers depend on these exact
//! numbers, so the convention is kept as is.

use crate::point::GeoPoint;
use std::f64::consts::{FRAC_PI_4, PI};

/// Rhumb-line (Mercator) bearing from `from` to `to`, in degrees within `[0, 360)`.
///
/// Coincident points give exactly `0.0`.
pub fn rhumb_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    if from == to {
        return 0.0;
    }

    let phi1 = from.lat().to_radians();
    let lambda1 = (-from.lng()).to_radians();
    let phi2 = to.lat().to_radians();
    let lambda2 = (-to.lng()).to_radians();

    let mut d_lambda = lambda2 - lambda1;

    // Equal latitudes make the ratio exactly 1; short-circuit so two points on
    // the south pole do not produce 0/0.
    let d_psi = if from.lat() == to.lat() {
        0.0
    } else {
        ((phi2 / 2.0 + FRAC_PI_4).tan() / (phi1 / 2.0 + FRAC_PI_4).tan()).ln()
    };

    // Take the short way across the antimeridian.
    if d_lambda.abs() > PI {
        d_lambda = if d_lambda > 0.0 {
            -(2.0 * PI - d_lambda)
        } else {
            2.0 * PI + d_lambda
        };
    }

    (d_lambda.atan2(d_psi).to_degrees() + 360.0) % 360.0
}

/// Bearing from the latest known position to a fixed target.
///
/// Starts from a fallback origin so a bearing is always available, even
/// before the first live fix.
#[derive(Debug, Clone)]
pub struct BearingTracker {
    target: GeoPoint,
    position: GeoPoint,
    bearing: f64,
    fixes: u64,
}

impl BearingTracker {
    pub fn new(target: GeoPoint, fallback_origin: GeoPoint) -> Self {
        Self {
            target,
            position: fallback_origin,
            bearing: rhumb_bearing(fallback_origin, target),
            fixes: 0,
        }
    }

    /// Record a new position fix and return the recomputed bearing.
    pub fn update(&mut self, fix: GeoPoint) -> f64 {
        self.position = fix;
        self.bearing = rhumb_bearing(fix, self.target);
        self.fixes += 1;
        self.bearing
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn target(&self) -> GeoPoint {
        self.target
    }

    /// Whether at least one live fix has replaced the fallback origin.
    pub fn has_fix(&self) -> bool {
        self.fixes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn origin() -> GeoPoint {
        p(-6.97465995592464, 108.50091662123228)
    }

    fn target() -> GeoPoint {
        p(21.42264920624544, 39.82639113882412)
    }

    #[test]
    fn coincident_points_give_zero() {
        for point in [p(0.0, 0.0), origin(), p(90.0, 45.0), p(-90.0, -180.0)] {
            assert_eq!(rhumb_bearing(point, point), 0.0);
        }
    }

    #[test]
    fn always_within_range() {
        let lats = [-90.0, -60.0, -0.5, 0.0, 12.3, 45.0, 89.9, 90.0];
        let lngs = [-180.0, -179.9, -90.0, 0.0, 0.1, 90.0, 179.9, 180.0];
        for &lat1 in &lats {
            for &lng1 in &lngs {
                for &lat2 in &lats {
                    for &lng2 in &lngs {
                        let b = rhumb_bearing(p(lat1, lng1), p(lat2, lng2));
                        assert!(
                            (0.0..360.0).contains(&b),
                            "({lat1}, {lng1}) -> ({lat2}, {lng2}) gave {b}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn crosses_antimeridian_the_short_way() {
        let b = rhumb_bearing(p(0.0, 179.9), p(0.0, -179.9));
        // Mirrored east: the marker ends up at -270, i.e. 90 degrees clockwise.
        assert!((b - 270.0).abs() < 1e-9, "got {b}");
        assert!(((360.0 - b) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn reference_pair() {
        let b = rhumb_bearing(origin(), target());
        assert!((b - 67.155).abs() < 0.01, "got {b}");
        // Conventional rhumb bearing toward the target is ~292.85 degrees.
        assert!(((360.0 - b) - 292.845).abs() < 0.01);
    }

    #[test]
    fn due_north_and_south() {
        assert_eq!(rhumb_bearing(p(0.0, 10.0), p(10.0, 10.0)), 0.0);
        assert_eq!(rhumb_bearing(p(10.0, 10.0), p(0.0, 10.0)), 180.0);
    }

    #[test]
    fn reverse_is_not_always_opposite() {
        let a = p(33.0, -117.0);
        let forward = rhumb_bearing(a, a);
        let reverse = rhumb_bearing(a, a);
        assert_ne!(forward, (reverse + 180.0) % 360.0);
    }

    #[test]
    fn tracker_starts_from_fallback() {
        let tracker = BearingTracker::new(target(), origin());
        assert!(!tracker.has_fix());
        assert_eq!(tracker.position(), origin());
        assert_eq!(tracker.bearing(), rhumb_bearing(origin(), target()));
    }

    #[test]
    fn tracker_follows_fixes() {
        let mut tracker = BearingTracker::new(target(), origin());
        let fix = p(21.42264920624544, 50.0);
        let b = tracker.update(fix);
        assert!(tracker.has_fix());
        assert_eq!(tracker.bearing(), b);
        // Target lies due west; mirrored west is 90.
        assert!((b - 90.0).abs() < 1e-9, "got {b}");

        assert_eq!(tracker.update(target()), 0.0);
    }
}
