//! Elastic over-drag past the content edges
//!
//! [`ElasticCurve`] maps a raw over-drag distance to a saturating visual
//! displacement. [`BounceStepper`] carries fling momentum past an edge and
//! [`ReboundAnimation`] springs the container back to it.

use std::time::{Duration, Instant};

use super::interpolator::{Interpolator, InterpolatorExt};
use super::timing::{is_complete, lerp_i32, progress};
use crate::config::DisplayConfig;

/// Base of the saturation exponent
const SATURATION_BASE: f64 = 100.0;

/// Per-frame decay of the bounce velocity, applied as `DECAY^(2 * frame)`
const BOUNCE_DECAY: f64 = 0.85;

/// y = min(M * (1 - 100^(-x / H)), x) with x = raw * drag_rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticCurve {
    max_distance: f64,
    height: f64,
    drag_rate: f64,
}

impl ElasticCurve {
    /// # Arguments
    /// * `max_distance` - M, the displacement the curve saturates at (px)
    /// * `viewport_height` - container height
    /// * `screen_height` - physical screen height; H is the larger of half of it and the viewport
    /// * `drag_rate` - damping applied to the raw distance
    pub fn new(max_distance: i32, viewport_height: i32, screen_height: i32, drag_rate: f32) -> Self {
        let height = (screen_height / 2).max(viewport_height);
        Self {
            max_distance: max_distance.max(0) as f64,
            height: if height <= 0 { 1.0 } else { height as f64 },
            drag_rate: drag_rate.max(0.0) as f64,
        }
    }

    /// Visual displacement for a raw over-drag distance (both >= 0)
    pub fn displacement(&self, raw: f64) -> f64 {
        if self.max_distance <= 0.0 {
            return 0.0;
        }
        let x = (raw * self.drag_rate).max(0.0);
        let saturated = self.max_distance * (1.0 - SATURATION_BASE.powf(-x / self.height));
        saturated.min(x)
    }

    /// Whole-pixel displacement, truncated toward zero
    pub fn displacement_px(&self, raw: f64) -> i32 {
        self.displacement(raw) as i32
    }

    /// Raw distance that produces `displacement`
    pub fn raw_for(&self, displacement: f64) -> f64 {
        if self.max_distance <= 0.0 || self.drag_rate <= 0.0 {
            return 0.0;
        }
        let y = displacement.clamp(0.0, self.max_distance * (1.0 - 1e-9));
        let on_curve = -self.height * (1.0 - y / self.max_distance).ln() / SATURATION_BASE.ln();
        y.max(on_curve) / self.drag_rate
    }
}

/// Spring-back duration for a bounce that stopped `distance` px past the edge
pub fn spring_back_duration(distance: i32, display: &DisplayConfig) -> Duration {
    let dp = display.px_to_dp(distance.abs()) as u64;
    Duration::from_millis(10 * dp.clamp(30, 100))
}

/// Outcome of one bounce frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BounceStep {
    /// The cumulative raw over-drag distance moved to this signed value
    Moved(f64),
    /// The step fell under one pixel; hand off to a spring-back
    Settled,
}

/// Decaying-velocity integrator for momentum carried past an edge.
///
/// Negative velocity overshoots the top edge, positive the bottom one.
#[derive(Debug, Clone)]
pub struct BounceStepper {
    velocity: f64,
    frame: i32,
    raw: f64,
    last: Instant,
    target: i32,
}

impl BounceStepper {
    pub fn new(velocity: f32, raw_start: f64, target: i32, now: Instant) -> Self {
        Self {
            velocity: velocity as f64,
            frame: 0,
            raw: raw_start,
            last: now,
            target,
        }
    }

    /// Offset the container springs back to once the bounce settles
    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn step(&mut self, now: Instant) -> BounceStep {
        self.frame += 1;
        self.velocity *= BOUNCE_DECAY.powi(self.frame * 2);
        let dt = now.saturating_duration_since(self.last).as_secs_f64();
        let step = self.velocity * dt;
        if step.abs() >= 1.0 {
            self.last = now;
            self.raw += step;
            BounceStep::Moved(self.raw)
        } else {
            BounceStep::Settled
        }
    }
}

/// How a rebound animation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEnd {
    /// Reached its end value; completion side effects run
    Completed,
    /// Interrupted with zero duration; completion side effects are skipped
    Cancelled,
}

/// Timed container animation between two offsets
#[derive(Debug, Clone)]
pub struct ReboundAnimation {
    from: i32,
    to: i32,
    duration: Duration,
    interpolator: Interpolator,
    start: Option<Instant>,
}

impl ReboundAnimation {
    pub fn new(from: i32, to: i32, duration: Duration, interpolator: Interpolator) -> Self {
        Self {
            from,
            to,
            duration,
            interpolator,
            start: None,
        }
    }

    /// Sample at frame time `now`; the first sample starts the clock
    pub fn sample(&mut self, now: Instant) -> (i32, Option<AnimationEnd>) {
        let start = *self.start.get_or_insert(now);
        if is_complete(start, now, self.duration) {
            return (self.to, Some(AnimationEnd::Completed));
        }
        let t = progress(start, now, self.duration);
        (lerp_i32(self.from, self.to, self.interpolator.apply(t)), None)
    }

    pub fn cancel(self) -> AnimationEnd {
        AnimationEnd::Cancelled
    }
}
