/// Rotation angles consumed by the renderer, in degrees (positive = clockwise).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    /// Rotation applied to the compass dial so that its north faces magnetic north.
    pub dial_rotation_deg: f32,
    /// Rotation of the target marker inside the already rotated dial.
    pub target_marker_rotation_deg: f32,
    /// Incremented on every recompute.
    pub revision: u64,
}

impl DisplayState {
    /// Clockwise angle of the marker from the dial's north, in `[0, 360)`.
    pub fn visible_target_angle(&self) -> f32 {
        wrap_degrees(self.target_marker_rotation_deg)
    }

    /// Clockwise angle of the marker from the top of the device, in `[0, 360)`.
    pub fn screen_target_angle(&self) -> f32 {
        wrap_degrees(self.dial_rotation_deg + self.target_marker_rotation_deg)
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Combines the latest azimuth and bearing into a [`DisplayState`].
///
/// An undefined azimuth holds the previous dial rotation instead of snapping
/// back to zero.
#[derive(Debug, Clone)]
pub struct HeadingCombiner {
    state: DisplayState,
}

impl HeadingCombiner {
    pub fn new(initial_bearing: f64) -> Self {
        Self {
            state: DisplayState {
                dial_rotation_deg: 0.0,
                target_marker_rotation_deg: -(initial_bearing as f32),
                revision: 0,
            },
        }
    }

    pub fn set_azimuth(&mut self, azimuth: Option<f32>) -> DisplayState {
        if let Some(azimuth) = azimuth {
            self.state.dial_rotation_deg = -azimuth;
        }
        self.bump()
    }

    pub fn set_bearing(&mut self, bearing: f64) -> DisplayState {
        self.state.target_marker_rotation_deg = -(bearing as f32);
        self.bump()
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    fn bump(&mut self) -> DisplayState {
        self.state.revision += 1;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_initial_bearing() {
        let combiner = HeadingCombiner::new(67.5);
        let state = combiner.state();
        assert_eq!(state.dial_rotation_deg, 0.0);
        assert_eq!(state.target_marker_rotation_deg, -67.5);
        assert_eq!(state.revision, 0);
        assert!((state.visible_target_angle() - 292.5).abs() < 1e-4);
    }

    #[test]
    fn undefined_azimuth_holds_last_heading() {
        let mut combiner = HeadingCombiner::new(0.0);
        combiner.set_azimuth(Some(45.0));
        let state = combiner.set_azimuth(None);
        assert_eq!(state.dial_rotation_deg, -45.0);
        assert_eq!(state.revision, 2);

        let mut fresh = HeadingCombiner::new(0.0);
        assert_eq!(fresh.set_azimuth(None).dial_rotation_deg, 0.0);
    }

    #[test]
    fn dial_tracks_only_latest_azimuth() {
        let mut combiner = HeadingCombiner::new(0.0);
        for azimuth in [5.0, 17.0, 33.0, 90.0, 120.5] {
            combiner.set_azimuth(Some(azimuth));
        }
        assert_eq!(combiner.state().dial_rotation_deg, -120.5);
        assert_eq!(combiner.state().revision, 5);
    }

    #[test]
    fn visible_angle_ignores_heading() {
        let mut combiner = HeadingCombiner::new(270.0);
        combiner.set_azimuth(Some(30.0));
        let a = combiner.state().visible_target_angle();
        combiner.set_azimuth(Some(-150.0));
        let b = combiner.state().visible_target_angle();
        assert_eq!(a, b);
        assert!((a - 90.0).abs() < 1e-4);
    }

    #[test]
    fn screen_angle_combines_both() {
        let mut combiner = HeadingCombiner::new(270.0);
        combiner.set_azimuth(Some(30.0));
        // Target 90 degrees east of north, device facing 30: 60 degrees to the right.
        assert!((combiner.state().screen_target_angle() - 60.0).abs() < 1e-4);
    }

    #[test]
    fn wrap_never_returns_360() {
        assert_eq!(wrap_degrees(-1e-9), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
    }
}
