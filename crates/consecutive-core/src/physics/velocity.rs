//! Release velocity estimation over a trailing window of pointer samples

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const HORIZON: Duration = Duration::from_millis(100);
const MAX_SAMPLES: usize = 20;

/// Least-squares velocity estimator
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, f64)>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn add_sample(&mut self, time: Instant, position: i32) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((time, position as f64));
    }

    /// Velocity in px/s over the last 100 ms, clamped to `±max_velocity`.
    ///
    /// Positive means the position was increasing.
    pub fn velocity(&self, max_velocity: i32) -> i32 {
        let Some(&(latest, _)) = self.samples.back() else {
            return 0;
        };

        let window: Vec<(f64, f64)> = self
            .samples
            .iter()
            .filter(|(t, _)| latest.saturating_duration_since(*t) <= HORIZON)
            .map(|(t, y)| (-(latest.saturating_duration_since(*t).as_secs_f64()), *y))
            .collect();
        if window.len() < 2 {
            return 0;
        }

        let n = window.len() as f64;
        let mean_t = window.iter().map(|(t, _)| t).sum::<f64>() / n;
        let mean_y = window.iter().map(|(_, y)| y).sum::<f64>() / n;
        let (num, den) = window.iter().fold((0.0, 0.0), |(num, den), (t, y)| {
            let dt = t - mean_t;
            (num + dt * (y - mean_y), den + dt * dt)
        });
        if den <= f64::EPSILON {
            return 0;
        }

        let max = f64::from(max_velocity.unsigned_abs());
        (num / den).clamp(-max, max).round() as i32
    }
}
