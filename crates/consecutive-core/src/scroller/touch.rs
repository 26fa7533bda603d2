//! Pointer gestures and the nested-scroll parent side

use std::time::Instant;

use tracing::{debug, trace};

use super::ConsecutiveScroller;
use crate::gesture::{MoveOutcome, Orientation, PointerId, UpOutcome};
use crate::nested::ScrollSource;
use crate::region::{Direction, Region, RegionId};
use crate::state::{MotionState, MotionTrigger};

impl ConsecutiveScroller {
    /// A pointer touched down at viewport coordinates (`x`, `y`).
    ///
    /// The first pointer of a gesture interrupts every running animation;
    /// further pointers only take over the drag.
    pub fn pointer_down(&mut self, id: PointerId, x: i32, y: i32, now: Instant) {
        if self.gesture.is_active() {
            self.gesture.pointer_down(id, x, y, now, false);
            return;
        }

        let braking = self.state == MotionState::Settling;
        self.interrupt_animations();
        self.finish_seek();
        self.stop_scroll();

        self.touching = true;
        self.gesture.pointer_down(id, x, y, now, braking);
        if self.ledger.begin(ScrollSource::Touch) {
            self.parent.on_nested_scroll_started(ScrollSource::Touch);
        }

        self.touch_on_pinned = self
            .pinned_region_at(y)
            .is_some_and(|r| !r.params().touch_scrolls_when_pinned);
        trace!(id, y, braking, on_pinned = self.touch_on_pinned, "pointer down");
    }

    pub fn pointer_move(&mut self, id: PointerId, x: i32, y: i32, now: Instant) {
        let slop = self.config.fling.touch_slop;
        let vertical_only = self.config.disable_child_horizontal_scroll;

        match self.gesture.pointer_move(id, x, y, now, slop, vertical_only) {
            MoveOutcome::SlopExceeded { delta } => {
                if self.can_drag() {
                    self.set_state(MotionTrigger::SlopExceeded);
                }
                self.drag_by(delta);
            }
            MoveOutcome::Scroll { delta } => self.drag_by(delta),
            MoveOutcome::Pending | MoveOutcome::Horizontal | MoveOutcome::Ignored => {}
        }
    }

    pub fn pointer_up(&mut self, id: PointerId, now: Instant) {
        let max_velocity = self.config.fling.max_velocity;
        match self.gesture.pointer_up(id, now, max_velocity) {
            UpOutcome::Handover => {}
            UpOutcome::Released {
                velocity,
                orientation,
            } => self.release(Some(velocity), orientation),
        }
    }

    /// The host took the gesture away; release without flinging
    pub fn pointer_cancel(&mut self) {
        if !self.touching {
            return;
        }
        let orientation = self.gesture.cancel();
        self.release(None, orientation);
    }

    /// Check if the current gesture started by catching a settling animation
    pub fn is_braking(&self) -> bool {
        self.gesture.is_braking()
    }

    fn can_drag(&self) -> bool {
        self.can_scroll_vertically(Direction::Up)
            || self.can_scroll_vertically(Direction::Down)
            || self.is_over_drag_enabled()
    }

    fn drag_by(&mut self, delta: i32) {
        let pre = self.parent.offer_pre_scroll(delta, ScrollSource::Touch);
        self.ledger.record(ScrollSource::Touch, |books| {
            books.requested += delta;
            books.ancestor_pre += pre;
        });
        let delta = delta - pre;
        if delta == 0 {
            return;
        }

        if self.state == MotionState::Dragging && !self.touch_on_pinned {
            let before = self.virtual_offset;
            self.dispatch_scroll(delta);
            let by_self = self.virtual_offset - before;
            self.ledger
                .record(ScrollSource::Touch, |books| books.by_self += by_self);
        } else {
            let taken = self
                .parent
                .report_unconsumed_scroll(0, delta, ScrollSource::Touch);
            self.ledger
                .record(ScrollSource::Touch, |books| books.ancestor_post += taken);
        }
    }

    fn release(&mut self, velocity: Option<i32>, orientation: Option<Orientation>) {
        self.touching = false;
        if let Some(totals) = self.ledger.end(ScrollSource::Touch) {
            debug!(?totals, "touch scroll ended");
            self.parent.on_nested_scroll_stopped(ScrollSource::Touch);
        }

        let flings = orientation == Some(Orientation::Vertical)
            && self.state == MotionState::Dragging
            && !self.touch_on_pinned;
        if let Some(velocity) = velocity.filter(|_| flings) {
            // The content travels against the finger
            self.fling(-velocity);
        }
        self.spring_back();

        let settling = !self.scroller.is_finished() || self.rebound.is_some();
        self.set_state(MotionTrigger::Release { settling });
        if self.state.is_idle() && !self.ledger.has_descendant() {
            self.check_snap();
        }
        self.touch_on_pinned = false;
    }

    /// Topmost pinned region under viewport y
    fn pinned_region_at(&self, y: i32) -> Option<&Region> {
        self.stack
            .iter()
            .filter(|r| self.sticky.is_pinned(r.id()))
            .filter(|r| {
                let top = self.screen_top(r);
                (top..top + r.height()).contains(&y)
            })
            .last()
    }

    /// Cancel the rebound and bounce without running their completion
    pub(crate) fn interrupt_animations(&mut self) {
        if let Some(rebound) = self.rebound.take() {
            let end = rebound.cancel();
            trace!(?end, "rebound interrupted");
        }
        self.bounce = None;
    }

    // ---- nested-scroll parent side --------------------------------------

    /// A scrolling descendant inside `region` asks to start a nested scroll
    pub fn on_start_nested_scroll(&mut self, region: RegionId, source: ScrollSource) -> bool {
        let accepts = self
            .stack
            .get(region)
            .is_some_and(|r| r.params().participates_in_nested_scroll);
        if !accepts {
            return false;
        }

        self.check_targets_scroll(false, false);
        let opened = !self.ledger.is_active(source);
        self.ledger.accept_descendant(source, region);
        if opened {
            self.parent.on_nested_scroll_started(source);
        }
        self.interrupt_animations();
        debug!(%region, ?source, "nested scroll accepted");
        true
    }

    /// First refusal before the descendant consumes `delta`.
    ///
    /// Passed straight up the chain; returns what the ancestors took.
    pub fn on_nested_pre_scroll(&mut self, delta: i32, source: ScrollSource) -> i32 {
        let consumed = self.parent.offer_pre_scroll(delta, source);
        self.ledger.record(source, |books| {
            books.requested += delta;
            books.ancestor_pre += consumed;
        });
        consumed
    }

    /// The descendant consumed `consumed` and left `unconsumed` over.
    ///
    /// This scroller takes what it can of the leftover and reports the rest
    /// to its own ancestor. Returns the amount taken here.
    pub fn on_nested_scroll(&mut self, consumed: i32, unconsumed: i32, source: ScrollSource) -> i32 {
        self.ledger
            .record(source, |books| books.by_descendant += consumed);

        // A finger on a descendant still drags this container past its edges
        let touching = self.touching;
        self.touching = touching || source == ScrollSource::Touch;
        let before = self.virtual_offset;
        self.dispatch_scroll(unconsumed);
        let mine = self.virtual_offset - before;
        self.touching = touching;

        let taken = self
            .parent
            .report_unconsumed_scroll(mine, unconsumed - mine, source);
        self.ledger.record(source, |books| {
            books.by_self += mine;
            books.ancestor_post += taken;
        });
        mine
    }

    pub fn on_nested_pre_fling(&mut self, velocity: i32) -> bool {
        self.parent.offer_pre_fling(velocity)
    }

    /// A descendant finished flinging; take over the velocity it did not consume
    pub fn on_nested_fling(&mut self, velocity: i32, consumed: bool) -> bool {
        if consumed {
            return false;
        }
        self.fling(velocity);
        true
    }

    pub fn on_stop_nested_scroll(&mut self, source: ScrollSource) {
        if self.ledger.end(source).is_some() {
            self.parent.on_nested_scroll_stopped(source);
        }
        self.spring_back();
        if self.rebound.is_none() {
            self.check_snap();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::config::ScrollerConfig;
    use crate::nested::{NestedScrollParent, ScrollSource};
    use crate::region::{LinearContent, Region, RegionId, Viewport};
    use crate::scroller::ConsecutiveScroller;
    use crate::state::MotionState;

    fn ms(t0: std::time::Instant, millis: u64) -> std::time::Instant {
        t0 + Duration::from_millis(millis)
    }

    fn scroller(config: ScrollerConfig) -> ConsecutiveScroller {
        let mut scroller = ConsecutiveScroller::new(config);
        scroller.set_viewport(Viewport::new(400, 800));
        scroller.push_region(Region::fixed(RegionId(1), 300));
        scroller.push_region(Region::scrollable(RegionId(2), 800, LinearContent::new(2000)));
        scroller.push_region(Region::fixed(RegionId(3), 500));
        scroller
    }

    #[test]
    fn test_drag_moves_content_against_finger() {
        let mut scroller = scroller(ScrollerConfig::default());
        let t0 = std::time::Instant::now();

        scroller.pointer_down(1, 100, 600, t0);
        scroller.pointer_move(1, 100, 595, ms(t0, 10));
        assert_eq!(scroller.state(), MotionState::Idle);

        scroller.pointer_move(1, 100, 580, ms(t0, 20));
        assert_eq!(scroller.state(), MotionState::Dragging);
        assert_eq!(scroller.scroll_offset(), 20);

        scroller.pointer_move(1, 100, 480, ms(t0, 30));
        assert_eq!(scroller.scroll_offset(), 120);

        // Lifting after a long pause carries no velocity
        scroller.pointer_up(1, ms(t0, 500));
        assert_eq!(scroller.state(), MotionState::Idle);
        assert_eq!(scroller.scroll_offset(), 120);
        assert!(!scroller.is_touching());
    }

    #[test]
    fn test_fast_release_flings() {
        let mut scroller = scroller(ScrollerConfig::default());
        let t0 = std::time::Instant::now();

        scroller.pointer_down(1, 100, 700, t0);
        for i in 1..=5u64 {
            scroller.pointer_move(1, 100, 700 - (i as i32) * 30, ms(t0, i * 10));
        }
        scroller.pointer_up(1, ms(t0, 50));

        assert_eq!(scroller.state(), MotionState::Settling);
        assert!(scroller.needs_frame());
        let mut now = ms(t0, 50);
        while scroller.needs_frame() {
            now += Duration::from_millis(16);
            scroller.on_frame(now);
        }
        assert_eq!(scroller.state(), MotionState::Idle);
        assert!(scroller.scroll_offset() > 150);
    }

    #[test]
    fn test_pointer_down_stops_fling() {
        let mut scroller = scroller(ScrollerConfig::default());
        let t0 = std::time::Instant::now();
        scroller.fling(4000);
        scroller.on_frame(t0);
        scroller.on_frame(ms(t0, 16));
        scroller.on_frame(ms(t0, 32));
        let caught = scroller.scroll_offset();
        assert!(caught > 0);

        scroller.pointer_down(1, 100, 400, ms(t0, 40));
        assert!(scroller.is_braking());
        assert_eq!(scroller.state(), MotionState::Idle);
        assert!(!scroller.needs_frame());
        assert_eq!(scroller.scroll_offset(), caught);
    }

    #[test]
    fn test_over_drag_and_spring_back() {
        let mut config = ScrollerConfig::default();
        config.overscroll.enabled = true;
        let mut scroller = scroller(config);
        let t0 = std::time::Instant::now();

        scroller.pointer_down(1, 100, 100, t0);
        scroller.pointer_move(1, 100, 300, ms(t0, 10));
        scroller.pointer_move(1, 100, 500, ms(t0, 20));
        let displaced = scroller.container_offset();
        assert!(displaced < 0);
        assert!(-displaced < 180);
        // Damped: far less than the finger travel
        assert!(-displaced < 400);

        scroller.pointer_up(1, ms(t0, 400));
        assert_eq!(scroller.state(), MotionState::Settling);
        let mut now = ms(t0, 400);
        while scroller.needs_frame() {
            now += Duration::from_millis(16);
            scroller.on_frame(now);
        }
        assert_eq!(scroller.container_offset(), 0);
        assert_eq!(scroller.state(), MotionState::Idle);
    }

    #[test]
    fn test_catching_rebound_skips_its_completion() {
        let mut config = ScrollerConfig::default();
        config.overscroll.enabled = true;
        let mut scroller = scroller(config);
        let t0 = std::time::Instant::now();

        scroller.pointer_down(1, 100, 100, t0);
        scroller.pointer_move(1, 100, 300, ms(t0, 10));
        scroller.pointer_move(1, 100, 500, ms(t0, 20));
        scroller.pointer_up(1, ms(t0, 400));
        scroller.on_frame(ms(t0, 416));
        scroller.on_frame(ms(t0, 516));
        let caught = scroller.container_offset();
        assert!(caught < 0);

        // The host scrolls region 2 while the container springs back
        let moved = scroller
            .region_mut(RegionId(2))
            .and_then(|r| r.content_mut())
            .map(|c| c.consume_scroll(100));
        assert_eq!(moved, Some(100));

        scroller.pointer_down(1, 100, 400, ms(t0, 520));
        assert!(!scroller.needs_frame());
        assert_eq!(scroller.container_offset(), caught);
        assert_eq!(scroller.region(RegionId(2)).unwrap().internal_scroll_offset(), 100);

        // Releasing without moving springs back the rest of the way
        scroller.pointer_up(1, ms(t0, 600));
        assert_eq!(scroller.state(), MotionState::Settling);
        let mut now = ms(t0, 600);
        while scroller.needs_frame() {
            now += Duration::from_millis(16);
            scroller.on_frame(now);
        }
        assert_eq!(scroller.container_offset(), 0);
        assert_eq!(scroller.state(), MotionState::Idle);
    }

    #[test]
    fn test_second_resting_finger_does_not_fling() {
        let mut scroller = scroller(ScrollerConfig::default());
        let t0 = std::time::Instant::now();

        scroller.pointer_down(1, 100, 400, t0);
        scroller.pointer_move(1, 100, 380, ms(t0, 10));
        scroller.pointer_move(1, 100, 378, ms(t0, 20));
        scroller.pointer_down(2, 200, 780, ms(t0, 30));
        scroller.pointer_move(2, 200, 779, ms(t0, 40));
        scroller.pointer_up(2, ms(t0, 50));
        scroller.pointer_move(1, 100, 377, ms(t0, 60));
        scroller.pointer_up(1, ms(t0, 70));

        assert_eq!(scroller.scroll_offset(), 24);
        assert_eq!(scroller.state(), MotionState::Idle);
        assert!(!scroller.needs_frame());
    }

    #[test]
    fn test_drag_back_from_over_drag_is_linear_then_content() {
        let mut config = ScrollerConfig::default();
        config.overscroll.enabled = true;
        let mut scroller = scroller(config);
        let t0 = std::time::Instant::now();

        scroller.pointer_down(1, 100, 100, t0);
        scroller.pointer_move(1, 100, 300, ms(t0, 10));
        assert!(scroller.container_offset() < 0);

        // Dragging back past the down point returns to the edge, then scrolls
        scroller.pointer_move(1, 100, 50, ms(t0, 20));
        assert!(scroller.container_offset() > 0);
        assert_eq!(scroller.scroll_offset(), scroller.container_offset());
    }

    #[test]
    fn test_touch_on_pinned_region_does_not_scroll() {
        let mut scroller = ConsecutiveScroller::default();
        scroller.set_viewport(Viewport::new(400, 800));
        scroller.push_region(Region::fixed(RegionId(1), 300));
        scroller.push_region(Region::fixed(RegionId(2), 100).sticky());
        scroller.push_region(Region::fixed(RegionId(3), 2000));
        scroller.scroll_by(500);
        assert_eq!(scroller.current_sticky(), Some(RegionId(2)));

        let t0 = std::time::Instant::now();
        scroller.pointer_down(1, 100, 50, t0);
        scroller.pointer_move(1, 100, 0, ms(t0, 10));
        scroller.pointer_up(1, ms(t0, 400));
        assert_eq!(scroller.scroll_offset(), 500);

        // Below the pinned bar the drag works
        scroller.pointer_down(1, 100, 400, ms(t0, 500));
        scroller.pointer_move(1, 100, 350, ms(t0, 510));
        assert_eq!(scroller.scroll_offset(), 550);
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        pre_take: i32,
    }

    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Recorder>>);

    impl NestedScrollParent for Shared {
        fn on_nested_scroll_started(&mut self, source: ScrollSource) -> bool {
            self.0.borrow_mut().calls.push(format!("start {source:?}"));
            true
        }

        fn offer_pre_scroll(&mut self, delta: i32, _source: ScrollSource) -> i32 {
            let take = self.0.borrow().pre_take;
            take.min(delta)
        }

        fn on_nested_scroll_stopped(&mut self, source: ScrollSource) {
            self.0.borrow_mut().calls.push(format!("stop {source:?}"));
        }
    }

    #[test]
    fn test_ancestor_takes_pre_scroll_first() {
        let parent = Shared::default();
        parent.0.borrow_mut().pre_take = 5;
        let mut scroller = scroller(ScrollerConfig::default());
        scroller.set_parent(parent.clone());
        let t0 = std::time::Instant::now();

        scroller.pointer_down(1, 100, 600, t0);
        scroller.pointer_move(1, 100, 580, ms(t0, 10));
        assert_eq!(scroller.scroll_offset(), 15);

        let books = scroller.ledger().consumption(ScrollSource::Touch);
        assert_eq!(books.requested, 20);
        assert_eq!(books.ancestor_pre, 5);
        assert_eq!(books.by_self, 15);
        assert_eq!(books.unconsumed(), 0);

        scroller.pointer_up(1, ms(t0, 400));
        assert_eq!(parent.0.borrow().calls, vec!["start Touch", "stop Touch"]);
        assert!(!scroller.ledger().is_active(ScrollSource::Touch));
    }

    #[test]
    fn test_nested_descendant_leftover() {
        let mut scroller = scroller(ScrollerConfig::default());
        assert!(scroller.on_start_nested_scroll(RegionId(2), ScrollSource::Touch));
        assert_eq!(scroller.ledger().descendant(ScrollSource::Touch), Some(RegionId(2)));

        // The descendant used 30 and left 100 for the container
        assert_eq!(scroller.on_nested_pre_scroll(130, ScrollSource::Touch), 0);
        let mine = scroller.on_nested_scroll(30, 100, ScrollSource::Touch);
        assert_eq!(mine, 100);
        assert_eq!(scroller.container_offset(), 100);

        let books = scroller.ledger().consumption(ScrollSource::Touch);
        assert_eq!(books.by_descendant, 30);
        assert_eq!(books.by_self, 100);

        scroller.on_stop_nested_scroll(ScrollSource::Touch);
        assert!(!scroller.ledger().has_descendant());
    }

    #[test]
    fn test_nested_scroll_refused_for_opted_out_region() {
        let mut scroller = ConsecutiveScroller::default();
        scroller.set_viewport(Viewport::new(400, 800));
        let params = crate::region::RegionParams {
            participates_in_nested_scroll: false,
            ..Default::default()
        };
        scroller.push_region(Region::fixed(RegionId(1), 1000).with_params(params));

        assert!(!scroller.on_start_nested_scroll(RegionId(1), ScrollSource::Touch));
        assert!(!scroller.on_start_nested_scroll(RegionId(9), ScrollSource::Touch));
        assert!(!scroller.ledger().is_active(ScrollSource::Touch));
    }
}
