//! Fling, rebound and snap
//!
//! Everything that moves the stack across frames lives here. The host calls
//! [`ConsecutiveScroller::on_frame`] with the frame timestamp for as long as
//! [`ConsecutiveScroller::needs_frame`] is true. Each frame runs at most one
//! of: a smooth target-seek step, a bounce step, a rebound sample or a fling
//! sample, followed by the settle check.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::Interpolator;
use crate::dispatch::Edge;
use crate::nested::ScrollSource;
use crate::physics::elastic::spring_back_duration;
use crate::physics::{AnimationEnd, BounceStep, BounceStepper, ReboundAnimation};
use crate::scroller::ConsecutiveScroller;
use crate::snap::smooth_scroll_duration;
use crate::state::{MotionState, MotionTrigger};

/// Per-frame step of a smooth target seek never grows past this
const MAX_SEEK_STEP: i32 = 200;
/// Per-frame acceleration of a smooth target seek
const SEEK_ACCELERATION: i32 = 5;

impl ConsecutiveScroller {
    /// Fling the content at `velocity` px/s; positive grows the offset.
    ///
    /// The ancestor gets the first refusal. A snap point close ahead turns
    /// the fling into a smooth scroll onto it.
    pub fn fling(&mut self, velocity: i32) {
        let fling = &self.config.fling;
        let max = fling.max_velocity.saturating_abs();
        let velocity = velocity.clamp(-max, max);
        if velocity.abs() <= fling.min_velocity {
            return;
        }

        if self.parent.offer_pre_fling(velocity) {
            debug!(velocity, "fling taken by ancestor");
            return;
        }
        let can_scroll =
            (velocity < 0 && !self.is_scroll_top()) || (velocity > 0 && !self.is_scroll_bottom());
        self.parent.report_fling(velocity, can_scroll);

        if self.try_predictive_snap(velocity) {
            return;
        }

        self.scroller.fling(self.virtual_offset, velocity);
        self.begin_non_touch();
        self.set_state(MotionTrigger::AnimationStarted);
        self.last_scroller_y = self.virtual_offset;
        debug!(
            velocity,
            from = self.virtual_offset,
            to = self.scroller.final_y(),
            "fling"
        );
    }

    fn try_predictive_snap(&mut self, velocity: i32) -> bool {
        let target = self.snap.predictive_target(
            self.virtual_offset,
            velocity,
            self.screen_height(),
            self.config.snap.predictive_close_threshold_px,
        );
        match target {
            Some(target) => {
                debug!(velocity, target, "predictive snap");
                self.smooth_scroll_to_offset(target);
                true
            }
            None => false,
        }
    }

    /// Animate to virtual offset `y` over a distance-dependent duration
    pub fn smooth_scroll_to_offset(&mut self, y: i32) {
        let dy = y - self.virtual_offset;
        if dy == 0 {
            return;
        }

        let duration = smooth_scroll_duration(dy, self.screen_height());
        self.scroller.start_scroll(self.virtual_offset, dy, duration);
        self.begin_non_touch();
        self.set_state(MotionTrigger::AnimationStarted);
        self.last_scroller_y = self.virtual_offset;
        debug!(from = self.virtual_offset, to = y, duration_ms = duration.as_millis() as u64, "smooth scroll");
    }

    /// Abort a running fling or smooth scroll where it stands.
    ///
    /// Resets the state to idle unless a target seek is driving the motion.
    pub fn stop_scroll(&mut self) {
        if self.scroller.is_finished() {
            return;
        }
        self.scroller.abort_animation();
        self.end_non_touch();
        if self.seek.is_none() {
            self.set_state(MotionTrigger::Abort);
        }
    }

    /// Whether the host should keep delivering frames
    pub fn needs_frame(&self) -> bool {
        self.seek.is_some_and(|s| s.smooth_step.is_some())
            || !self.scroller.is_finished()
            || self.bounce.is_some()
            || self.rebound.is_some()
            || (self.state == MotionState::Settling && !self.touching)
    }

    /// Advance every running animation to frame time `now`.
    ///
    /// Returns whether another frame is needed.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if self.step_seek() {
            return self.needs_frame();
        }

        if self.bounce.is_some() {
            self.step_bounce(now);
        } else if self.rebound.is_some() {
            self.step_rebound(now);
        } else if !self.scroller.is_finished() {
            self.step_fling(now);
        }

        self.settle_if_done();
        self.needs_frame()
    }

    /// One frame of a smooth target seek; `false` when none is running
    fn step_seek(&mut self) -> bool {
        let Some(step) = self.seek.and_then(|s| s.smooth_step) else {
            return false;
        };

        let step = if step > 0 {
            (step + SEEK_ACCELERATION).min(MAX_SEEK_STEP)
        } else {
            (step - SEEK_ACCELERATION).max(-MAX_SEEK_STEP)
        };
        if let Some(seek) = self.seek.as_mut() {
            seek.smooth_step = Some(step);
        }

        self.dispatch_scroll(step);
        if let Some(seek) = self.seek.as_mut() {
            seek.cycles += 1;
        }
        true
    }

    fn step_fling(&mut self, now: Instant) {
        if !self.scroller.compute_scroll_offset(now) {
            return;
        }

        let y = self.scroller.curr_y();
        let mut unconsumed = y - self.last_scroller_y;
        self.last_scroller_y = y;

        let pre = self.parent.offer_pre_scroll(unconsumed, ScrollSource::NonTouch);
        self.ledger.record(ScrollSource::NonTouch, |books| {
            books.requested += unconsumed;
            books.ancestor_pre += pre;
        });
        unconsumed -= pre;

        let before = self.virtual_offset;
        self.dispatch_scroll(unconsumed);
        let by_self = self.virtual_offset - before;
        unconsumed -= by_self;
        self.ledger
            .record(ScrollSource::NonTouch, |books| books.by_self += by_self);
        trace!(y, by_self, unconsumed, "fling frame");

        if !self.hit_boundary(unconsumed) {
            return;
        }
        let taken = self
            .parent
            .report_unconsumed_scroll(by_self, unconsumed, ScrollSource::NonTouch);
        self.ledger
            .record(ScrollSource::NonTouch, |books| books.ancestor_post += taken);
        unconsumed -= taken;

        if self.hit_boundary(unconsumed) {
            let velocity = self.scroller.curr_velocity() * unconsumed.signum() as f32;
            if self.start_bounce(velocity, now) {
                self.scroller.force_finished();
            } else {
                self.stop_scroll();
            }
        }
    }

    fn hit_boundary(&self, unconsumed: i32) -> bool {
        (unconsumed < 0 && self.is_scroll_top()) || (unconsumed > 0 && self.is_scroll_bottom())
    }

    /// Carry fling momentum past the edge it ran into.
    ///
    /// Negative velocity overshoots the top. Returns `false` when over-drag
    /// is disabled on that edge.
    fn start_bounce(&mut self, velocity: f32, now: Instant) -> bool {
        if self.rebound.is_some() {
            return false;
        }
        let (edge, target) = if velocity < 0.0 {
            (Edge::Top, 0)
        } else if velocity > 0.0 {
            (Edge::Bottom, self.stack.scroll_range())
        } else {
            return false;
        };
        if self.over_drag.limit(edge) <= 0 {
            return false;
        }

        let curve = self.elastic_curve(edge);
        let raw = self.current_raw(&curve, self.overscroll_distance(edge));
        let signed_raw = if edge == Edge::Top { -raw } else { raw };
        self.bounce = Some(BounceStepper::new(velocity, signed_raw, target, now));
        debug!(velocity, ?edge, "edge bounce");
        true
    }

    fn step_bounce(&mut self, now: Instant) {
        let Some(bounce) = self.bounce.as_mut() else {
            return;
        };

        match bounce.step(now) {
            BounceStep::Moved(raw) => {
                let edge = if raw < 0.0 { Edge::Top } else { Edge::Bottom };
                let curve = self.elastic_curve(edge);
                let displacement = curve.displacement_px(raw.abs());
                self.over_drag.raw = raw.abs();
                match edge {
                    Edge::Top => self.scroll_self(-displacement),
                    Edge::Bottom => self.scroll_self(self.stack.scroll_range() + displacement),
                }
                self.sync_virtual(true);
                self.update_sticky();
            }
            BounceStep::Settled => {
                let target = bounce.target();
                self.bounce = None;
                let from = self.scroll_y;
                if from != target {
                    let duration = spring_back_duration(from - target, &self.config.display);
                    self.start_rebound(target, duration);
                }
            }
        }
    }

    fn step_rebound(&mut self, now: Instant) {
        let Some(rebound) = self.rebound.as_mut() else {
            return;
        };

        let (y, end) = rebound.sample(now);
        self.scroll_self(y);
        self.sync_virtual(true);
        self.update_sticky();

        if end == Some(AnimationEnd::Completed) {
            self.rebound = None;
            self.over_drag.raw = 0.0;
            self.check_targets_scroll(false, false);
        }
    }

    fn start_rebound(&mut self, to: i32, duration: Duration) {
        let from = self.scroll_y;
        trace!(from, to, duration_ms = duration.as_millis() as u64, "rebound");
        self.rebound = Some(ReboundAnimation::new(
            from,
            to,
            duration,
            Interpolator::ViscousFluid,
        ));
        self.set_state(MotionTrigger::AnimationStarted);
    }

    /// Animate an overscrolled container back to its edge.
    ///
    /// Does nothing when the container is inside its range or a rebound is
    /// already running. Returns whether a spring-back started.
    pub(crate) fn spring_back(&mut self) -> bool {
        if self.rebound.is_some() {
            return false;
        }
        let range = self.stack.scroll_range();
        let to = if self.scroll_y < 0 {
            0
        } else if self.scroll_y > range {
            range
        } else {
            return false;
        };

        self.bounce = None;
        let duration = Duration::from_millis(self.config.overscroll.rebound_duration_ms);
        self.start_rebound(to, duration);
        true
    }

    /// Finish a settling stack once nothing moves anymore
    fn settle_if_done(&mut self) {
        let busy = self.touching
            || self.seek.is_some()
            || !self.scroller.is_finished()
            || self.bounce.is_some()
            || self.rebound.is_some();
        if busy || self.state != MotionState::Settling {
            return;
        }
        if self.spring_back() {
            return;
        }

        self.end_non_touch();
        self.check_targets_scroll(false, false);
        self.set_state(MotionTrigger::SettleComplete);
        self.check_snap();
    }

    /// Correct onto a nearby snap point once motion has settled
    pub(crate) fn check_snap(&mut self) {
        let snap = &self.config.snap;
        let threshold = match self.config.display.dp_to_px(snap.threshold_dp as f32) {
            px if px > 0 => px,
            _ => snap.fallback_threshold_px,
        };

        if let Some(target) = self.snap.settle_target(self.virtual_offset, threshold) {
            debug!(offset = self.virtual_offset, target, threshold, "snap correction");
            self.smooth_scroll_to_offset(target);
        }
    }

    fn begin_non_touch(&mut self) {
        if self.ledger.begin(ScrollSource::NonTouch) {
            self.parent.on_nested_scroll_started(ScrollSource::NonTouch);
        }
    }

    fn end_non_touch(&mut self) {
        if self.ledger.end(ScrollSource::NonTouch).is_some() {
            self.parent.on_nested_scroll_stopped(ScrollSource::NonTouch);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::config::ScrollerConfig;
    use crate::events::ScrollEvent;
    use crate::region::{LinearContent, Region, RegionId, Viewport};
    use crate::scroller::ConsecutiveScroller;
    use crate::state::MotionState;

    fn scroller(config: ScrollerConfig) -> ConsecutiveScroller {
        let mut scroller = ConsecutiveScroller::new(config);
        scroller.set_viewport(Viewport::new(400, 800));
        scroller.push_region(Region::fixed(RegionId(1), 300));
        scroller.push_region(Region::scrollable(RegionId(2), 800, LinearContent::new(3000)));
        scroller.push_region(Region::fixed(RegionId(3), 500));
        scroller
    }

    /// Run frames 16 ms apart until the stack is at rest
    fn run(scroller: &mut ConsecutiveScroller, start: Instant) -> Instant {
        let mut now = start;
        for _ in 0..2000 {
            if !scroller.on_frame(now) {
                break;
            }
            now += Duration::from_millis(16);
        }
        now
    }

    #[test]
    fn test_slow_fling_is_ignored() {
        let mut scroller = scroller(ScrollerConfig::default());
        scroller.fling(50);
        scroller.fling(-30);
        assert_eq!(scroller.state(), MotionState::Idle);
        assert!(!scroller.needs_frame());
    }

    #[test]
    fn test_extreme_velocity_is_clamped() {
        let t0 = Instant::now();
        let mut reference = scroller(ScrollerConfig::default());
        reference.fling(8000);
        run(&mut reference, t0);

        let mut extreme = scroller(ScrollerConfig::default());
        extreme.fling(i32::MIN);
        run(&mut extreme, t0);
        assert_eq!(extreme.scroll_offset(), 0);

        extreme.fling(i32::MAX);
        run(&mut extreme, t0 + Duration::from_secs(60));
        assert_eq!(extreme.state(), MotionState::Idle);
        assert_eq!(extreme.scroll_offset(), reference.scroll_offset());
    }

    #[test]
    fn test_fling_drains_content_in_order() {
        let mut scroller = scroller(ScrollerConfig::default());
        scroller.fling(3000);
        assert_eq!(scroller.state(), MotionState::Settling);

        run(&mut scroller, Instant::now());
        assert_eq!(scroller.state(), MotionState::Idle);
        let offset = scroller.scroll_offset();
        assert!(offset > 0);

        let internal = scroller.regions().internal_offsets();
        assert_eq!(offset, scroller.container_offset() + internal);
        if internal > 0 {
            // Content only scrolls once the header is fully collapsed
            assert_eq!(scroller.container_offset(), 300);
        }
    }

    #[test]
    fn test_fling_stops_at_bottom_without_over_drag() {
        let mut scroller = scroller(ScrollerConfig::default());
        scroller.scroll_by(3900);
        scroller.fling(8000);
        run(&mut scroller, Instant::now());

        assert!(scroller.is_scroll_bottom());
        assert_eq!(scroller.container_offset(), scroller.scroll_range());
        assert_eq!(scroller.state(), MotionState::Idle);
    }

    #[test]
    fn test_fling_bounces_past_edge_and_returns() {
        let mut config = ScrollerConfig::default();
        config.overscroll.enabled = true;
        let mut scroller = scroller(config);
        scroller.scroll_by(100);
        scroller.take_events();

        scroller.fling(-8000);
        run(&mut scroller, Instant::now());

        let events = scroller.take_events();
        let deepest = events
            .iter()
            .filter_map(|e| match e {
                ScrollEvent::ScrollChanged { offset, .. } => Some(*offset),
                _ => None,
            })
            .min();
        assert!(deepest.is_some_and(|d| d < 0), "never overshot: {deepest:?}");
        assert_eq!(scroller.container_offset(), 0);
        assert_eq!(scroller.state(), MotionState::Idle);
    }

    #[test]
    fn test_predictive_snap_takes_near_point() {
        let mut config = ScrollerConfig::default();
        config.snap.points = vec![0, 300];
        let mut scroller = scroller(config);
        scroller.scroll_by(100);

        scroller.fling(3000);
        run(&mut scroller, Instant::now());
        assert_eq!(scroller.scroll_offset(), 300);
    }

    #[test]
    fn test_predictive_snap_lets_close_last_point_coast() {
        let mut config = ScrollerConfig::default();
        config.snap.points = vec![0, 300];
        let mut scroller = scroller(config);
        scroller.scroll_by(280);

        scroller.fling(3000);
        run(&mut scroller, Instant::now());
        assert!(scroller.scroll_offset() > 300);
    }

    #[test]
    fn test_settle_snaps_to_near_point() {
        let mut config = ScrollerConfig::default();
        config.snap.points = vec![0, 300];
        let mut scroller = scroller(config);
        scroller.scroll_by(260);

        scroller.check_snap();
        assert_eq!(scroller.state(), MotionState::Settling);
        run(&mut scroller, Instant::now());
        assert_eq!(scroller.scroll_offset(), 300);
        assert_eq!(scroller.state(), MotionState::Idle);
    }

    #[test]
    fn test_smooth_scroll_to_offset() {
        let mut scroller = scroller(ScrollerConfig::default());
        scroller.smooth_scroll_to_offset(1000);
        let t0 = Instant::now();
        scroller.on_frame(t0);
        scroller.on_frame(t0 + Duration::from_millis(100));
        let midway = scroller.scroll_offset();
        assert!(midway > 0 && midway < 1000);

        run(&mut scroller, t0 + Duration::from_millis(116));
        assert_eq!(scroller.scroll_offset(), 1000);
        assert_eq!(scroller.container_offset(), 300);
    }

    #[test]
    fn test_smooth_scroll_to_region_accelerates() {
        let mut scroller = scroller(ScrollerConfig::default());
        scroller.smooth_scroll_to_region(RegionId(3)).unwrap();
        assert!(scroller.needs_frame());

        let t0 = Instant::now();
        scroller.on_frame(t0);
        assert_eq!(scroller.scroll_offset(), 55);
        scroller.on_frame(t0 + Duration::from_millis(16));
        assert_eq!(scroller.scroll_offset(), 115);

        // Region 3 can never reach the top; the seek ends at the bottom edge
        run(&mut scroller, t0 + Duration::from_millis(32));
        assert!(scroller.is_scroll_bottom());
        assert_eq!(scroller.last_visible_region(), Some(RegionId(3)));
        assert_eq!(scroller.state(), MotionState::Idle);
        assert!(!scroller.needs_frame());
    }

    #[test]
    fn test_stop_scroll_resets_state() {
        let mut scroller = scroller(ScrollerConfig::default());
        scroller.fling(5000);
        let t0 = Instant::now();
        scroller.on_frame(t0);
        scroller.on_frame(t0 + Duration::from_millis(16));

        scroller.stop_scroll();
        assert_eq!(scroller.state(), MotionState::Idle);
        assert!(!scroller.needs_frame());
    }
}
