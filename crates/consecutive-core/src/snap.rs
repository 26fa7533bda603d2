//! Snap engine
//!
//! A user-declared set of virtual offsets the stack settles onto, queried
//! on demand. No ordering is kept; duplicates are harmless.

use std::time::Duration;

/// Insertion-ordered snap targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapPoints {
    points: Vec<i32>,
}

impl SnapPoints {
    pub fn new(points: Vec<i32>) -> Self {
        Self { points }
    }

    pub fn set(&mut self, points: Vec<i32>) {
        self.points = points;
    }

    pub fn add(&mut self, point: i32) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[i32] {
        &self.points
    }

    pub fn max(&self) -> Option<i32> {
        self.points.iter().copied().max()
    }

    /// Closest point to `offset` and its distance; the earliest wins ties
    pub fn nearest(&self, offset: i32) -> Option<(i32, i32)> {
        self.points
            .iter()
            .map(|&p| (p, (offset - p).abs()))
            .fold(None, |best, (p, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((p, d)),
            })
    }

    /// Closest point strictly ahead of `offset` in the direction of `velocity`
    pub fn ahead(&self, offset: i32, velocity: i32) -> Option<i32> {
        let ahead = self.points.iter().copied().filter(|&p| {
            if velocity > 0 {
                p > offset
            } else {
                p < offset
            }
        });
        ahead.min_by_key(|&p| (p - offset).abs())
    }

    /// Target for a fling released at `offset`, if it should snap instead of coasting.
    ///
    /// The nearest point ahead must lie less than `travel_limit` away. A
    /// fling toward the maximum point that is already within
    /// `close_threshold` of it keeps its momentum so it can carry on into
    /// the content below.
    pub fn predictive_target(
        &self,
        offset: i32,
        velocity: i32,
        travel_limit: i32,
        close_threshold: i32,
    ) -> Option<i32> {
        if velocity == 0 {
            return None;
        }
        let target = self.ahead(offset, velocity)?;
        let distance = (target - offset).abs();
        if distance >= travel_limit {
            return None;
        }

        let is_last = Some(target) == self.max();
        if velocity > 0 && is_last && distance < close_threshold {
            return None;
        }
        Some(target)
    }

    /// Correction target once motion settles at `offset`.
    ///
    /// Nothing snaps when the offset is already on a point, further than
    /// `threshold` from every point, or deep past the last point.
    pub fn settle_target(&self, offset: i32, threshold: i32) -> Option<i32> {
        let max = self.max()?;
        if offset > max + threshold {
            return None;
        }
        let (target, distance) = self.nearest(offset)?;
        (target != offset && distance < threshold).then_some(target)
    }
}

/// Duration of a smooth scroll over `dy` pixels on a screen `screen_height` tall
pub fn smooth_scroll_duration(dy: i32, screen_height: i32) -> Duration {
    let distance = dy.abs();
    let screen = screen_height.max(1);
    let millis = if distance < 100 {
        200
    } else if distance > screen {
        600
    } else {
        let ratio = distance as f32 / screen as f32;
        200 + (ratio * 400.0) as u64
    };
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_snaps_to_near_point() {
        let snap = SnapPoints::new(vec![0, 200, 500]);
        assert_eq!(snap.settle_target(480, 60), Some(500));
        assert_eq!(snap.settle_target(230, 60), Some(200));
        assert_eq!(snap.settle_target(110, 60), None);
    }

    #[test]
    fn test_settle_ignores_deep_content() {
        let snap = SnapPoints::new(vec![0, 200, 500]);
        assert_eq!(snap.settle_target(700, 60), None);
        assert_eq!(snap.settle_target(561, 60), None);
    }

    #[test]
    fn test_settle_on_point_is_noop() {
        let snap = SnapPoints::new(vec![0, 200, 200, 500]);
        assert_eq!(snap.settle_target(200, 60), None);
        assert_eq!(SnapPoints::default().settle_target(10, 60), None);
    }

    #[test]
    fn test_nearest_prefers_earliest_on_tie() {
        let snap = SnapPoints::new(vec![100, 0, 200]);
        assert_eq!(snap.nearest(50), Some((100, 50)));
        assert_eq!(snap.max(), Some(200));
    }

    #[test]
    fn test_predictive_looks_ahead_only() {
        let snap = SnapPoints::new(vec![0, 200, 250]);
        assert_eq!(snap.predictive_target(120, 2000, 800, 50), Some(200));
        assert_eq!(snap.predictive_target(120, -2000, 800, 50), Some(0));
        assert_eq!(snap.predictive_target(250, 2000, 800, 50), None);
    }

    #[test]
    fn test_predictive_rejects_far_points() {
        let snap = SnapPoints::new(vec![900]);
        assert_eq!(snap.predictive_target(0, 3000, 800, 50), None);
        assert_eq!(snap.predictive_target(0, 3000, 1000, 50), Some(900));
    }

    #[test]
    fn test_predictive_lets_momentum_through_near_last_point() {
        let snap = SnapPoints::new(vec![0, 200, 250]);
        assert_eq!(snap.predictive_target(220, 2000, 800, 50), None);
        // Toward the top the exception does not apply
        assert_eq!(snap.predictive_target(270, -2000, 800, 50), Some(250));
        // A larger threshold widens the pass-through zone
        assert_eq!(snap.predictive_target(180, 2000, 800, 50), Some(200));
        assert_eq!(snap.predictive_target(205, 2000, 800, 100), None);
    }

    #[test]
    fn test_smooth_scroll_duration_scales() {
        assert_eq!(smooth_scroll_duration(60, 800), Duration::from_millis(200));
        assert_eq!(smooth_scroll_duration(-400, 800), Duration::from_millis(400));
        assert_eq!(smooth_scroll_duration(900, 800), Duration::from_millis(600));
        assert_eq!(smooth_scroll_duration(300, 0), Duration::from_millis(600));
    }
}
