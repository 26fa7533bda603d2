//! The consecutive scroller
//!
//! [`ConsecutiveScroller`] owns a [`RegionStack`] and makes it scroll as one
//! continuous surface. The host feeds it pointer events, layout changes and
//! frame ticks; the scroller answers with offsets, region translations and
//! queued [`ScrollEvent`]s.
//!
//! The implementation is split by concern:
//! - `layout` - layout passes, region mutation and offset correction
//! - `touch` - pointer gestures and the nested-scroll parent side
//! - `crate::dispatch` - per-region delta consumption and over-drag
//! - `crate::fling` - fling, rebound, snap and frame stepping

mod layout;
mod touch;

use std::fmt;

use tracing::debug;

use crate::config::ScrollerConfig;
use crate::dispatch::OverDrag;
use crate::error::{Error, Result};
use crate::events::ScrollEvent;
use crate::gesture::GestureTracker;
use crate::nested::{Detached, NestedScrollLedger, NestedScrollParent};
use crate::physics::{BounceStepper, OverScroller, ReboundAnimation};
use crate::region::{Direction, Region, RegionId, RegionStack, ScrollCapable, Viewport};
use crate::snap::SnapPoints;
use crate::state::{MotionState, MotionTrigger};
use crate::sticky::{PinLine, StickyTracker};

/// Iteration cap shared by dispatch loops, target seeks and offset correction
pub(crate) const MAX_CYCLES: u32 = 1000;

/// Scroll-to-region in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TargetSeek {
    pub index: usize,
    pub offset: i32,
    pub cycles: u32,
    /// Per-frame step of a smooth seek, `None` for an immediate one
    pub smooth_step: Option<i32>,
}

/// Scroll coordinator for a vertical stack of regions
pub struct ConsecutiveScroller {
    pub(crate) config: ScrollerConfig,
    pub(crate) stack: RegionStack,
    pub(crate) viewport: Viewport,
    /// Container offset, negative or past the range while over-dragged
    pub(crate) scroll_y: i32,
    /// Container offset plus every region's internal offset
    pub(crate) virtual_offset: i32,
    pub(crate) state: MotionState,
    pub(crate) events: Vec<ScrollEvent>,
    pub(crate) parent: Box<dyn NestedScrollParent>,
    pub(crate) ledger: NestedScrollLedger,
    pub(crate) snap: SnapPoints,
    pub(crate) sticky: StickyTracker,
    pub(crate) scroller: OverScroller,
    /// Trajectory position consumed by the previous frame
    pub(crate) last_scroller_y: i32,
    pub(crate) bounce: Option<BounceStepper>,
    pub(crate) rebound: Option<ReboundAnimation>,
    pub(crate) seek: Option<TargetSeek>,
    pub(crate) over_drag: OverDrag,
    pub(crate) gesture: GestureTracker,
    pub(crate) touching: bool,
    /// The current touch landed on a pinned region that swallows drags
    pub(crate) touch_on_pinned: bool,
}

impl fmt::Debug for ConsecutiveScroller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsecutiveScroller")
            .field("scroll_y", &self.scroll_y)
            .field("virtual_offset", &self.virtual_offset)
            .field("scroll_range", &self.stack.scroll_range())
            .field("state", &self.state)
            .field("regions", &self.stack.len())
            .field("seek", &self.seek)
            .finish_non_exhaustive()
    }
}

impl Default for ConsecutiveScroller {
    fn default() -> Self {
        Self::new(ScrollerConfig::default())
    }
}

impl ConsecutiveScroller {
    /// Create a root scroller with no ancestor
    pub fn new(config: ScrollerConfig) -> Self {
        Self::with_parent(config, Detached)
    }

    /// Create a scroller that negotiates with `parent` before and after consuming
    pub fn with_parent(config: ScrollerConfig, parent: impl NestedScrollParent + 'static) -> Self {
        let over_drag = OverDrag::from_config(&config.overscroll, &config.display);
        let snap = SnapPoints::new(config.snap.points.clone());
        let scroller = OverScroller::new(config.display.density, config.fling.interpolator);

        Self {
            config,
            stack: RegionStack::new(),
            viewport: Viewport::default(),
            scroll_y: 0,
            virtual_offset: 0,
            state: MotionState::Idle,
            events: Vec::new(),
            parent: Box::new(parent),
            ledger: NestedScrollLedger::new(),
            snap,
            sticky: StickyTracker::new(),
            scroller,
            last_scroller_y: 0,
            bounce: None,
            rebound: None,
            seek: None,
            over_drag,
            gesture: GestureTracker::new(),
            touching: false,
            touch_on_pinned: false,
        }
    }

    pub fn set_parent(&mut self, parent: impl NestedScrollParent + 'static) {
        self.parent = Box::new(parent);
    }

    /// Get current configuration
    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    // ---- configuration -------------------------------------------------

    /// Turn elastic over-drag on with the configured limits, or off
    pub fn enable_over_drag(&mut self, enable: bool) {
        self.enable_over_drag_with(enable, 0, 0);
    }

    /// Turn elastic over-drag on with explicit limits in px.
    ///
    /// A limit `<= 0` falls back to the configured distance.
    pub fn enable_over_drag_with(&mut self, enable: bool, top: i32, bottom: i32) {
        self.config.overscroll.enabled = enable;
        if enable {
            let display = &self.config.display;
            let overscroll = &self.config.overscroll;
            self.over_drag.top = if top > 0 {
                top
            } else {
                display.dp_to_px(overscroll.max_top_dp as f32)
            };
            self.over_drag.bottom = if bottom > 0 {
                bottom
            } else {
                display.dp_to_px(overscroll.max_bottom_dp as f32)
            };
        } else {
            self.over_drag.top = 0;
            self.over_drag.bottom = 0;
        }
        self.over_drag.raw = 0.0;
        debug!(
            enable,
            top = self.over_drag.top,
            bottom = self.over_drag.bottom,
            "over-drag configured"
        );
    }

    /// Check if elastic over-drag is enabled on either edge
    #[inline]
    pub fn is_over_drag_enabled(&self) -> bool {
        self.over_drag.is_enabled()
    }

    /// Maximum elastic distance past the top edge, 0 disables that edge
    pub fn set_over_drag_max_top(&mut self, px: i32) {
        self.over_drag.top = px.max(0);
    }

    /// Maximum elastic distance past the bottom edge, 0 disables that edge
    pub fn set_over_drag_max_bottom(&mut self, px: i32) {
        self.over_drag.bottom = px.max(0);
    }

    pub fn set_over_drag_rate(&mut self, rate: f32) {
        self.config.overscroll.drag_rate = rate;
        self.over_drag.rate = rate;
    }

    pub fn over_drag_limits(&self) -> (i32, i32) {
        (self.over_drag.top, self.over_drag.bottom)
    }

    pub fn set_snap_points(&mut self, points: Vec<i32>) {
        self.snap.set(points);
    }

    pub fn add_snap_point(&mut self, point: i32) {
        self.snap.add(point);
    }

    pub fn clear_snap_points(&mut self) {
        self.snap.clear();
    }

    pub fn snap_points(&self) -> &[i32] {
        self.snap.points()
    }

    /// Distance between the viewport top and the pin line
    pub fn set_sticky_offset(&mut self, offset: i32) {
        if self.config.sticky.offset != offset {
            self.config.sticky.offset = offset;
            self.sticky.invalidate();
            self.update_sticky();
        }
    }

    /// Keep every reached sticky region pinned, stacked top to bottom
    pub fn set_permanent_sticky(&mut self, permanent: bool) {
        if self.config.sticky.permanent != permanent {
            self.config.sticky.permanent = permanent;
            self.sticky.invalidate();
            self.layout();
        }
    }

    pub fn is_permanent_sticky(&self) -> bool {
        self.config.sticky.permanent
    }

    /// Shrink the bottom region by the height pinned regions cover
    pub fn set_auto_adjust_height_at_bottom(&mut self, enable: bool) {
        if self.config.sticky.auto_adjust_height_at_bottom != enable {
            self.config.sticky.auto_adjust_height_at_bottom = enable;
            self.layout();
        }
    }

    pub fn set_adjust_height_offset(&mut self, offset: i32) {
        if self.config.sticky.adjust_height_offset != offset {
            self.config.sticky.adjust_height_offset = offset;
            self.layout();
        }
    }

    pub fn set_disable_child_horizontal_scroll(&mut self, disable: bool) {
        self.config.disable_child_horizontal_scroll = disable;
    }

    // ---- queries -------------------------------------------------------

    /// Virtual offset: the container offset plus all internal offsets
    #[inline]
    pub fn scroll_offset(&self) -> i32 {
        self.virtual_offset
    }

    #[inline]
    pub fn container_offset(&self) -> i32 {
        self.scroll_y
    }

    #[inline]
    pub fn scroll_range(&self) -> i32 {
        self.stack.scroll_range()
    }

    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn regions(&self) -> &RegionStack {
        &self.stack
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.stack.get(id)
    }

    /// Mutable access to a region's content.
    ///
    /// Call [`sync_offsets`](Self::sync_offsets) after scrolling content
    /// directly, or [`check_layout_change`](Self::check_layout_change)
    /// after resizing it.
    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.stack.get_mut(id)
    }

    pub fn ledger(&self) -> &NestedScrollLedger {
        &self.ledger
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// At the top edge with no region able to scroll further up
    pub fn is_scroll_top(&self) -> bool {
        if self.stack.is_empty() {
            return true;
        }
        self.scroll_y <= 0
            && !self
                .stack
                .iter()
                .any(|r| r.can_scroll_further(Direction::Up))
    }

    /// At the bottom edge with no region able to scroll further down
    pub fn is_scroll_bottom(&self) -> bool {
        if self.stack.is_empty() {
            return true;
        }
        self.scroll_y >= self.stack.scroll_range()
            && !self
                .stack
                .iter()
                .any(|r| r.can_scroll_further(Direction::Down))
    }

    pub fn can_scroll_vertically(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => !self.is_scroll_top(),
            Direction::Down => !self.is_scroll_bottom(),
        }
    }

    pub fn first_visible_region(&self) -> Option<RegionId> {
        self.stack
            .first_visible(self.scroll_y, &self.viewport)
            .and_then(|i| self.stack.at(i))
            .map(Region::id)
    }

    pub fn last_visible_region(&self) -> Option<RegionId> {
        self.stack
            .last_visible(self.scroll_y, &self.viewport)
            .and_then(|i| self.stack.at(i))
            .map(Region::id)
    }

    /// Region pinned in single mode
    pub fn current_sticky(&self) -> Option<RegionId> {
        self.sticky.current()
    }

    /// Regions pinned in permanent mode, top to bottom
    pub fn current_sticky_views(&self) -> &[RegionId] {
        self.sticky.current_views()
    }

    /// Regions pinned right now in either mode, top to bottom
    pub fn pinned_regions(&self) -> Vec<RegionId> {
        if self.config.sticky.permanent {
            self.sticky.current_views().to_vec()
        } else {
            self.sticky.current().into_iter().collect()
        }
    }

    pub fn is_region_pinned(&self, id: RegionId) -> bool {
        self.sticky.is_pinned(id)
    }

    /// Total scrollable height of all region content
    pub fn compute_vertical_scroll_range(&self) -> i32 {
        self.stack.total_content_height()
    }

    /// Visible height of the stack
    pub fn compute_vertical_scroll_extent(&self) -> i32 {
        self.viewport.inner_height()
    }

    pub fn draw_order(&self) -> Vec<RegionId> {
        self.stack.draw_order()
    }

    /// On-screen y of a region's top edge, pin translation included
    pub fn screen_top(&self, region: &Region) -> i32 {
        region.top() + region.translation_y() - self.scroll_y
    }

    /// Drain queued notifications
    pub fn take_events(&mut self) -> Vec<ScrollEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- commands ------------------------------------------------------

    pub fn scroll_by(&mut self, dy: i32) {
        self.scroll_to(self.virtual_offset + dy);
    }

    /// Move to virtual offset `y`, draining regions in stack order
    pub fn scroll_to(&mut self, y: i32) {
        self.dispatch_scroll(y - self.virtual_offset);
    }

    pub fn scroll_to_region(&mut self, id: RegionId) -> Result<()> {
        self.scroll_to_region_with_offset(id, 0)
    }

    /// Bring region `id` to `offset` px below the viewport top, immediately
    pub fn scroll_to_region_with_offset(&mut self, id: RegionId, offset: i32) -> Result<()> {
        let index = self.stack.index_of(id).ok_or(Error::RegionNotFound(id))?;
        let Some(direction) = self.seek_direction(index, offset) else {
            return Ok(());
        };

        self.begin_seek(index, offset, None);
        debug!(region = %id, offset, ?direction, "scroll to region");
        while let Some(seek) = self.seek.as_mut() {
            seek.cycles += 1;
            self.dispatch_scroll(direction.sign() * 200);
        }
        Ok(())
    }

    pub fn smooth_scroll_to_region(&mut self, id: RegionId) -> Result<()> {
        self.smooth_scroll_to_region_with_offset(id, 0)
    }

    /// Like [`scroll_to_region_with_offset`](Self::scroll_to_region_with_offset),
    /// stepping a little further each frame
    pub fn smooth_scroll_to_region_with_offset(&mut self, id: RegionId, offset: i32) -> Result<()> {
        let index = self.stack.index_of(id).ok_or(Error::RegionNotFound(id))?;
        let Some(direction) = self.seek_direction(index, offset) else {
            return Ok(());
        };

        self.begin_seek(index, offset, Some(direction.sign() * 50));
        debug!(region = %id, offset, ?direction, "smooth scroll to region");
        Ok(())
    }

    /// Re-read region offsets after the host scrolled content directly
    pub fn sync_offsets(&mut self) {
        self.sync_virtual(true);
        self.update_sticky();
    }

    // ---- internals -----------------------------------------------------

    fn begin_seek(&mut self, index: usize, offset: i32, smooth_step: Option<i32>) {
        self.seek = Some(TargetSeek {
            index,
            offset,
            cycles: 0,
            smooth_step,
        });
        self.stop_scroll();
        self.set_state(MotionTrigger::TargetStarted);
    }

    /// Travel direction toward the seek anchor, `None` when already there
    fn seek_direction(&self, index: usize, offset: i32) -> Option<Direction> {
        let anchor = self.seek_anchor(index, offset);
        let mut position = self.scroll_y + self.viewport.padding_top;
        if offset < 0 {
            position += self.stack.views_scroll_offset(index);
        }

        if position > anchor {
            Some(Direction::Up)
        } else if position < anchor {
            Some(Direction::Down)
        } else if offset >= 0
            && self
                .stack
                .at(index)
                .is_some_and(|r| r.can_scroll_further(Direction::Up))
        {
            Some(Direction::Up)
        } else {
            None
        }
    }

    pub(crate) fn finish_seek(&mut self) {
        if let Some(seek) = self.seek.take() {
            debug!(index = seek.index, cycles = seek.cycles, "seek finished");
            self.set_state(MotionTrigger::Abort);
        }
    }

    /// Physical screen height, falling back to the viewport
    pub(crate) fn screen_height(&self) -> i32 {
        match self.config.display.screen_height_px {
            h if h > 0 => h,
            _ => self.viewport.height,
        }
    }

    pub(crate) fn compute_virtual(&self) -> i32 {
        self.scroll_y + self.stack.internal_offsets()
    }

    /// Recompute the virtual offset, optionally notifying a change
    pub(crate) fn sync_virtual(&mut self, notify: bool) {
        let old = self.virtual_offset;
        self.virtual_offset = self.compute_virtual();
        if notify && old != self.virtual_offset {
            self.events.push(ScrollEvent::ScrollChanged {
                offset: self.virtual_offset,
                old_offset: old,
                state: self.state,
            });
        }
    }

    pub(crate) fn update_sticky(&mut self) {
        let line = PinLine {
            container_offset: self.scroll_y,
            padding_top: self.viewport.padding_top,
            global_offset: self.config.sticky.offset,
        };
        self.sticky.update(
            &mut self.stack,
            line,
            self.config.sticky.permanent,
            &mut self.events,
        );
    }

    pub(crate) fn set_state(&mut self, trigger: MotionTrigger) {
        let next = self.state.next(trigger);
        if next == self.state {
            return;
        }
        debug!(from = ?self.state, to = ?next, ?trigger, "motion state");
        self.state = next;
        self.events.push(ScrollEvent::ScrollChanged {
            offset: self.virtual_offset,
            old_offset: self.virtual_offset,
            state: next,
        });
        if next.is_idle() {
            self.sticky.invalidate();
            self.update_sticky();
        }
    }
}

/// A scroller nests inside another scroller's stack as a region's content
impl ScrollCapable for ConsecutiveScroller {
    fn can_scroll_further(&self, direction: Direction) -> bool {
        self.can_scroll_vertically(direction)
    }

    fn internal_scroll_offset(&self) -> i32 {
        self.virtual_offset
    }

    fn consume_scroll(&mut self, delta: i32) -> i32 {
        let before = self.virtual_offset;
        self.dispatch_scroll(delta);
        self.virtual_offset - before
    }

    fn top_overflow(&self) -> i32 {
        self.virtual_offset.max(0)
    }

    fn bottom_overflow(&self) -> i32 {
        let max = self.stack.total_content_height() - self.viewport.inner_height();
        (max - self.virtual_offset).max(0)
    }

    fn set_extent(&mut self, height: i32) {
        if self.viewport.height != height {
            self.viewport.height = height;
            self.layout();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::region::LinearContent;

    fn scroller() -> ConsecutiveScroller {
        let mut scroller = ConsecutiveScroller::default();
        scroller.set_viewport(Viewport::new(400, 800));
        scroller.push_region(Region::fixed(RegionId(1), 300));
        scroller.push_region(Region::fixed(RegionId(2), 100).sticky());
        scroller.push_region(Region::scrollable(RegionId(3), 800, LinearContent::new(3000)));
        scroller
    }

    #[test]
    fn test_scroll_to_region_aligns_top() {
        let mut scroller = scroller();
        scroller.scroll_to_region(RegionId(2)).unwrap();
        assert_eq!(scroller.container_offset(), 300);
        assert_eq!(scroller.state(), MotionState::Idle);
        assert_eq!(scroller.current_sticky(), Some(RegionId(2)));

        scroller.scroll_to_region_with_offset(RegionId(1), 0).unwrap();
        assert_eq!(scroller.container_offset(), 0);
    }

    #[test]
    fn test_scroll_to_region_with_offset_leaves_gap() {
        let mut scroller = scroller();
        scroller.scroll_to_region_with_offset(RegionId(3), 100).unwrap();
        assert_eq!(scroller.container_offset(), 300);
        assert_eq!(scroller.scroll_offset(), 300);
    }

    #[test]
    fn test_unknown_region_is_an_error() {
        let mut scroller = scroller();
        let err = scroller.scroll_to_region(RegionId(42)).unwrap_err();
        assert!(matches!(err, Error::RegionNotFound(RegionId(42))));
        assert!(scroller.smooth_scroll_to_region(RegionId(42)).is_err());
    }

    #[test]
    fn test_state_changes_are_notified() {
        let mut scroller = scroller();
        scroller.take_events();
        scroller.set_state(MotionTrigger::AnimationStarted);
        scroller.set_state(MotionTrigger::AnimationStarted);

        let events = scroller.take_events();
        assert_eq!(
            events,
            vec![ScrollEvent::ScrollChanged {
                offset: 0,
                old_offset: 0,
                state: MotionState::Settling
            }]
        );
    }

    #[test]
    fn test_enable_over_drag_defaults_limits() {
        let mut scroller = scroller();
        assert!(!scroller.is_over_drag_enabled());

        scroller.enable_over_drag(true);
        assert_eq!(scroller.over_drag_limits(), (180, 180));

        scroller.enable_over_drag_with(true, 50, 0);
        assert_eq!(scroller.over_drag_limits(), (50, 180));

        scroller.enable_over_drag(false);
        assert_eq!(scroller.over_drag_limits(), (0, 0));
    }

    #[test]
    fn test_nested_scroller_as_region_content() {
        let mut inner = ConsecutiveScroller::default();
        inner.push_region(Region::fixed(RegionId(10), 600));
        inner.push_region(Region::fixed(RegionId(11), 600));

        let mut outer = ConsecutiveScroller::default();
        outer.set_viewport(Viewport::new(400, 800));
        outer.push_region(Region::fixed(RegionId(1), 200));
        outer.push_region(Region::scrollable(RegionId(2), 800, inner));

        // The inner stack is laid out with the region height as its viewport
        outer.scroll_by(600);
        assert_eq!(outer.container_offset(), 200);
        assert_eq!(outer.regions().get(RegionId(2)).unwrap().internal_scroll_offset(), 400);
        assert!(outer.is_scroll_bottom());
    }

    /// Claims room to scroll but never moves
    struct Stuck;

    impl ScrollCapable for Stuck {
        fn internal_scroll_offset(&self) -> i32 {
            0
        }

        fn consume_scroll(&mut self, _delta: i32) -> i32 {
            0
        }

        fn top_overflow(&self) -> i32 {
            0
        }

        fn bottom_overflow(&self) -> i32 {
            500
        }
    }

    fn stuck_stack() -> ConsecutiveScroller {
        let mut scroller = ConsecutiveScroller::default();
        scroller.set_viewport(Viewport::new(400, 800));
        scroller.push_region(Region::fixed(RegionId(1), 300));
        scroller.push_region(Region::scrollable(RegionId(2), 400, Stuck));
        scroller.push_region(Region::fixed(RegionId(3), 2000));
        scroller
    }

    #[test]
    fn test_seek_gives_up_on_content_that_never_moves() {
        let mut scroller = stuck_stack();
        scroller.scroll_to_region(RegionId(3)).unwrap();

        // The container reaches the stuck region and stops there
        assert_eq!(scroller.container_offset(), 300);
        assert_eq!(scroller.state(), MotionState::Idle);
        assert!(!scroller.needs_frame());
    }

    #[test]
    fn test_smooth_seek_gives_up_on_content_that_never_moves() {
        let mut scroller = stuck_stack();
        scroller.smooth_scroll_to_region(RegionId(3)).unwrap();
        assert!(scroller.needs_frame());

        let mut now = Instant::now();
        let mut frames = 0;
        while scroller.needs_frame() {
            scroller.on_frame(now);
            now += Duration::from_millis(16);
            frames += 1;
            assert!(frames <= MAX_CYCLES + 10, "seek never gave up");
        }
        assert_eq!(scroller.container_offset(), 300);
        assert_eq!(scroller.state(), MotionState::Idle);
    }
}
