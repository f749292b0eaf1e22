use glam::Vec3;

/// Exponential low-pass over raw sensor vectors.
///
/// The first sample seeds the filter so the output does not ramp up from zero.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    alpha: f32,
    prev: Option<Vec3>,
}

impl LowPassFilter {
    /// `alpha` is the weight of the newest sample, clamped to `(0, 1]`.
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(f32::EPSILON, 1.0),
            prev: None,
        }
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }

    pub fn update(&mut self, sample: Vec3) -> Vec3 {
        let next = match self.prev {
            Some(prev) => prev + (sample - prev) * self.alpha,
            None => sample,
        };
        self.prev = Some(next);
        next
    }
}
