//! L3 Molecular Layer: Ballistic fling and timed scroll trajectories
//!
//! Distances and durations follow the spline deceleration model of touch
//! platforms; positions along the trajectory are sampled through the
//! configured interpolator. All positions are integer pixels.

use std::time::{Duration, Instant};

use tracing::trace;

use super::interpolator::{quintic_slope, Interpolator, InterpolatorExt};
use super::timing::{is_complete, lerp_i32, progress};

const INFLEXION: f64 = 0.35;
const GRAVITY_EARTH: f64 = 9.806_65;
const INCHES_PER_METER: f64 = 39.37;
const SCROLL_FRICTION: f64 = 0.015;

fn deceleration_rate() -> f64 {
    0.78_f64.ln() / 0.9_f64.ln()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Scroll,
    Fling,
}

/// Integer trajectory driven by frame timestamps.
///
/// An animation starts at the first `compute_scroll_offset` call after
/// `fling` or `start_scroll`, so the first sample always sits at the start
/// position.
#[derive(Debug, Clone)]
pub struct OverScroller {
    physical_coeff: f64,
    interpolator: Interpolator,
    mode: Mode,
    finished: bool,
    start_y: i32,
    final_y: i32,
    curr_y: i32,
    duration: Duration,
    start_time: Option<Instant>,
    curr_velocity: f32,
}

impl OverScroller {
    /// # Arguments
    /// * `density` - Pixels per density-independent pixel
    /// * `interpolator` - Curve for sampling trajectories
    pub fn new(density: f32, interpolator: Interpolator) -> Self {
        let density = if density > 0.0 { density as f64 } else { 1.0 };
        let ppi = density * 160.0;
        Self {
            physical_coeff: GRAVITY_EARTH * INCHES_PER_METER * ppi * 0.84,
            interpolator,
            mode: Mode::Scroll,
            finished: true,
            start_y: 0,
            final_y: 0,
            curr_y: 0,
            duration: Duration::ZERO,
            start_time: None,
            curr_velocity: 0.0,
        }
    }

    fn spline_deceleration(&self, velocity: f64) -> f64 {
        (INFLEXION * velocity.abs() / (SCROLL_FRICTION * self.physical_coeff)).ln()
    }

    /// Total travel of a fling released at `velocity` px/s
    pub fn spline_fling_distance(&self, velocity: i32) -> f64 {
        if velocity == 0 {
            return 0.0;
        }
        let decel = deceleration_rate();
        let l = self.spline_deceleration(velocity as f64);
        SCROLL_FRICTION * self.physical_coeff * (decel / (decel - 1.0) * l).exp()
    }

    /// Time a fling released at `velocity` px/s takes to stop
    pub fn spline_fling_duration(&self, velocity: i32) -> Duration {
        if velocity == 0 {
            return Duration::ZERO;
        }
        let decel = deceleration_rate();
        let l = self.spline_deceleration(velocity as f64);
        Duration::from_secs_f64((l / (decel - 1.0)).exp())
    }

    /// Start a ballistic fling from `start`; positive velocity increases the offset
    pub fn fling(&mut self, start: i32, velocity: i32) {
        let distance = self.spline_fling_distance(velocity).round() as i32;
        self.mode = Mode::Fling;
        self.start_y = start;
        self.curr_y = start;
        self.final_y = start + distance * velocity.signum();
        self.duration = self.spline_fling_duration(velocity);
        self.start_time = None;
        self.curr_velocity = velocity.unsigned_abs() as f32;
        self.finished = velocity == 0;
        trace!(
            start,
            velocity,
            final_y = self.final_y,
            duration_ms = self.duration.as_millis() as u64,
            "fling trajectory"
        );
    }

    /// Start a timed scroll of `dy` pixels from `start`
    pub fn start_scroll(&mut self, start: i32, dy: i32, duration: Duration) {
        self.mode = Mode::Scroll;
        self.start_y = start;
        self.curr_y = start;
        self.final_y = start + dy;
        self.duration = duration;
        self.start_time = None;
        self.curr_velocity = 0.0;
        self.finished = dy == 0;
    }

    /// Advance to frame time `now`.
    ///
    /// Returns `false` once the trajectory has finished; the frame that
    /// reaches the final position still returns `true`.
    pub fn compute_scroll_offset(&mut self, now: Instant) -> bool {
        if self.finished {
            return false;
        }

        let start = *self.start_time.get_or_insert(now);
        if is_complete(start, now, self.duration) {
            self.curr_y = self.final_y;
            self.curr_velocity = 0.0;
            self.finished = true;
            return true;
        }

        // Flings follow the spline; timed scrolls use the configured curve
        let curve = match self.mode {
            Mode::Fling => Interpolator::Quintic,
            Mode::Scroll => self.interpolator,
        };
        let t = progress(start, now, self.duration);
        self.curr_y = lerp_i32(self.start_y, self.final_y, curve.apply(t));
        self.curr_velocity = self.velocity_at(curve, t);
        true
    }

    fn velocity_at(&self, curve: Interpolator, t: f64) -> f32 {
        let secs = self.duration.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        let distance = (self.final_y - self.start_y).abs() as f64;
        let slope = match curve {
            Interpolator::Quintic => quintic_slope(t),
            Interpolator::Linear => 1.0,
            Interpolator::ViscousFluid => {
                let h = 1e-3;
                (curve.apply(t + h) - curve.apply(t - h)) / (2.0 * h)
            }
        };
        (distance * slope / secs) as f32
    }

    pub fn curr_y(&self) -> i32 {
        self.curr_y
    }

    pub fn final_y(&self) -> i32 {
        self.final_y
    }

    /// Speed magnitude at the last sample, px/s
    pub fn curr_velocity(&self) -> f32 {
        self.curr_velocity
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop where the trajectory currently is
    pub fn force_finished(&mut self) {
        self.finished = true;
        self.curr_velocity = 0.0;
    }

    /// Stop and jump to the final position
    pub fn abort_animation(&mut self) {
        self.curr_y = self.final_y;
        self.force_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(scroller: &mut OverScroller, start: Instant, step_ms: u64) -> Vec<i32> {
        let mut samples = Vec::new();
        let mut now = start;
        while scroller.compute_scroll_offset(now) {
            samples.push(scroller.curr_y());
            now += Duration::from_millis(step_ms);
        }
        samples
    }

    #[test]
    fn test_spline_model_values() {
        let scroller = OverScroller::new(1.0, Interpolator::Quintic);
        let distance = scroller.spline_fling_distance(3000);
        let duration = scroller.spline_fling_duration(3000);

        assert!((1250.0..1400.0).contains(&distance), "distance {distance}");
        assert!(
            (1150..1350).contains(&duration.as_millis()),
            "duration {duration:?}"
        );
        // Faster flings travel further
        assert!(scroller.spline_fling_distance(6000) > distance);
        assert_eq!(scroller.spline_fling_distance(0), 0.0);
    }

    #[test]
    fn test_fling_samples_are_monotonic_and_land_on_final() {
        let mut scroller = OverScroller::new(1.0, Interpolator::Quintic);
        scroller.fling(100, 3000);
        let final_y = scroller.final_y();
        assert!(final_y > 100);

        let samples = frames(&mut scroller, Instant::now(), 16);
        assert_eq!(samples.first(), Some(&100));
        assert_eq!(samples.last(), Some(&final_y));
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
        assert!(scroller.is_finished());
    }

    #[test]
    fn test_negative_fling_moves_up() {
        let mut scroller = OverScroller::new(1.0, Interpolator::Quintic);
        scroller.fling(2000, -3000);
        assert!(scroller.final_y() < 2000);
        assert!(!scroller.is_finished());
    }

    #[test]
    fn test_fling_ignores_configured_curve() {
        let t0 = Instant::now();
        let mut quintic = OverScroller::new(1.0, Interpolator::Quintic);
        let mut linear = OverScroller::new(1.0, Interpolator::Linear);
        quintic.fling(0, 3000);
        linear.fling(0, 3000);
        assert_eq!(frames(&mut linear, t0, 16), frames(&mut quintic, t0, 16));
    }

    #[test]
    fn test_start_scroll_uses_duration() {
        let mut scroller = OverScroller::new(1.0, Interpolator::Linear);
        let t0 = Instant::now();
        scroller.start_scroll(0, 200, Duration::from_millis(200));

        assert!(scroller.compute_scroll_offset(t0));
        assert_eq!(scroller.curr_y(), 0);
        assert!(scroller.compute_scroll_offset(t0 + Duration::from_millis(100)));
        assert_eq!(scroller.curr_y(), 100);
        assert!(scroller.curr_velocity() > 999.0);
        assert!(scroller.compute_scroll_offset(t0 + Duration::from_millis(250)));
        assert_eq!(scroller.curr_y(), 200);
        assert!(!scroller.compute_scroll_offset(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_abort_jumps_to_final() {
        let mut scroller = OverScroller::new(1.0, Interpolator::Quintic);
        scroller.start_scroll(0, -300, Duration::from_millis(400));
        scroller.abort_animation();
        assert!(scroller.is_finished());
        assert_eq!(scroller.curr_y(), -300);

        scroller.start_scroll(0, 300, Duration::from_millis(400));
        scroller.force_finished();
        assert_eq!(scroller.curr_y(), 0);
    }

    #[test]
    fn test_zero_distance_is_finished() {
        let mut scroller = OverScroller::new(1.0, Interpolator::Quintic);
        scroller.start_scroll(40, 0, Duration::from_millis(200));
        assert!(scroller.is_finished());
        scroller.fling(40, 0);
        assert!(!scroller.compute_scroll_offset(Instant::now()));
    }
}
