//! L4 Atomic Layer: Interpolation curves for engine-driven motion
//!
//! Maps animation progress in [0, 1] to trajectory progress in [0, 1].

pub use crate::config::Interpolator;

const VISCOUS_FLUID_SCALE: f64 = 8.0;

/// Extension trait for Interpolator with calculation methods
pub trait InterpolatorExt {
    /// Apply the curve to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Interpolated value in range [0, 1]
    fn apply(&self, t: f64) -> f64;
}

impl InterpolatorExt for Interpolator {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Interpolator::Linear => t,
            Interpolator::Quintic => quintic(t),
            Interpolator::ViscousFluid => viscous_fluid_normalized(t),
        }
    }
}

/// Quintic ease-out: f(t) = (t-1)^5 + 1
#[inline]
fn quintic(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t * t * t + 1.0
}

/// Derivative of the quintic curve, used for instantaneous velocity
#[inline]
pub(crate) fn quintic_slope(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    5.0 * inv * inv * inv * inv
}

fn viscous_fluid(x: f64) -> f64 {
    let x = x * VISCOUS_FLUID_SCALE;
    if x < 1.0 {
        x - (1.0 - (-x).exp())
    } else {
        // 1/e, the value of the first branch at x = 1
        let start = 0.367_879_44;
        let x = 1.0 - (1.0 - x).exp();
        start + x * (1.0 - start)
    }
}

/// Viscous fluid curve scaled so that f(1) == 1
fn viscous_fluid_normalized(t: f64) -> f64 {
    let normalize = 1.0 / viscous_fluid(1.0);
    (normalize * viscous_fluid(t)).min(1.0)
}
