//! L4 Atomic Layer: Time calculation utilities for frame sampling
//!
//! Pure functions over explicit timestamps; the host owns the clock.

use std::time::{Duration, Instant};

/// Animation progress (0.0 to 1.0) at frame time `now`
///
/// # Arguments
/// * `start` - Time of the first sampled frame
/// * `now` - Current frame time
/// * `duration` - Total animation duration
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(start: Instant, now: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Check if an animation sampled at `now` is complete
#[inline]
pub fn is_complete(start: Instant, now: Instant, duration: Duration) -> bool {
    now.saturating_duration_since(start) >= duration
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Linear interpolation for pixel positions
#[inline]
pub fn lerp_i32(from: i32, to: i32, t: f64) -> i32 {
    lerp(from as f64, to as f64, t).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_i32() {
        assert_eq!(lerp_i32(0, 100, 0.0), 0);
        assert_eq!(lerp_i32(0, 100, 0.5), 50);
        assert_eq!(lerp_i32(-40, 0, 0.25), -30);
        assert_eq!(lerp_i32(0, 100, 1.0), 100);
    }

    #[test]
    fn test_progress_from_explicit_clock() {
        let start = Instant::now();
        let duration = Duration::from_millis(200);
        assert!((progress(start, start + Duration::from_millis(50), duration) - 0.25).abs() < 1e-9);
        assert!((progress(start, start + Duration::from_secs(1), duration) - 1.0).abs() < 1e-9);
        assert!(!is_complete(start, start + Duration::from_millis(199), duration));
        assert!(is_complete(start, start + duration, duration));
    }

    #[test]
    fn test_progress_zero_duration() {
        let start = Instant::now();
        assert!((progress(start, start, Duration::ZERO) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_clock_before_start_is_zero() {
        let now = Instant::now();
        let start = now + Duration::from_millis(10);
        assert!(progress(start, now, Duration::from_millis(100)).abs() < 1e-9);
    }
}
