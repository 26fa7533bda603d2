//! Layout passes, region mutation and offset correction

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::{ConsecutiveScroller, MAX_CYCLES};
use crate::error::{Error, Result};
use crate::region::{Direction, Region, RegionId, Viewport};

impl ConsecutiveScroller {
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.layout();
        }
    }

    pub fn push_region(&mut self, region: Region) {
        self.stack.push(region);
        self.layout();
    }

    pub fn insert_region(&mut self, index: usize, region: Region) {
        self.stack.insert(index, region);
        self.layout();
    }

    pub fn remove_region(&mut self, id: RegionId) -> Result<Region> {
        let region = self.stack.remove(id).ok_or(Error::RegionNotFound(id))?;
        self.layout();
        Ok(region)
    }

    /// Report a new measured height for region `id`
    pub fn set_region_height(&mut self, id: RegionId, height: i32) -> Result<()> {
        let region = self.stack.get_mut(id).ok_or(Error::RegionNotFound(id))?;
        if region.measured_height() != height {
            region.set_measured_height(height);
            self.layout();
        }
        Ok(())
    }

    /// Lay the regions out again and correct offsets if anything moved.
    ///
    /// The first visible region keeps its position relative to the
    /// viewport top across the pass.
    pub fn layout(&mut self) {
        let anchor = self
            .stack
            .first_visible(self.scroll_y, &self.viewport)
            .and_then(|i| self.stack.at(i))
            .map(|r| (r.id(), self.scroll_y - r.top()));

        let sticky = &self.config.sticky;
        let reservation = sticky
            .auto_adjust_height_at_bottom
            .then(|| self.stack.reserved_height(sticky.permanent, sticky.adjust_height_offset));
        let changed = self.stack.layout(&self.viewport, reservation);
        if changed {
            debug!(
                regions = self.stack.len(),
                range = self.stack.scroll_range(),
                "layout changed"
            );
        }

        self.correct_after_layout(changed, false, anchor);
    }

    /// Re-validate every offset after the host changed region content
    pub fn check_layout_change(&mut self) {
        self.correct_after_layout(false, true, None);
    }

    fn correct_after_layout(&mut self, changed: bool, force: bool, anchor: Option<(RegionId, i32)>) {
        let old_virtual = self.virtual_offset;

        let restored = anchor
            .filter(|_| changed)
            .and_then(|(id, adjust)| self.stack.get(id).map(|r| r.top() + adjust));
        self.scroll_self(restored.unwrap_or(self.scroll_y));

        self.check_targets_scroll(true, force);
        self.sync_virtual(true);

        // The layout moved what was on screen; go back to the old position
        let first = self.first_visible_region();
        if old_virtual != self.virtual_offset && anchor.map(|(id, _)| id) != first {
            self.scroll_to(old_virtual);
        }

        self.sticky.invalidate();
        self.update_sticky();
    }

    /// Align region content around the first visible region.
    ///
    /// Regions above it are scrolled to their content end and regions below
    /// it to their content start. Skipped while a gesture, fling or seek is
    /// running unless `force` is set.
    pub(crate) fn check_targets_scroll(&mut self, layout_change: bool, force: bool) {
        if !force && (self.touching || !self.scroller.is_finished() || self.seek.is_some()) {
            return;
        }
        let Some(index) = self.stack.first_visible(self.scroll_y, &self.viewport) else {
            return;
        };

        if layout_change {
            self.realign_first_visible(index);
        }

        let last = self.stack.len().saturating_sub(1);
        let mut queue: VecDeque<(usize, Direction)> = (0..index)
            .map(|i| (i, Direction::Down))
            .chain((index + 1..self.stack.len()).map(|i| (i, Direction::Up)))
            .collect();

        let mut cycles = 0;
        while let Some((i, direction)) = queue.pop_front() {
            cycles += 1;
            if cycles > MAX_CYCLES {
                warn!(pending = queue.len(), "offset correction iteration cap reached");
                break;
            }

            let at_bottom = self.scroll_y >= self.stack.scroll_range();
            let viewport_height = self.viewport.height;
            let Some(region) = self.stack.at_mut(i) else {
                continue;
            };
            if !region.is_effective() {
                continue;
            }
            if i == last && direction == Direction::Up && region.height() < viewport_height && at_bottom {
                continue;
            }

            let delta = match direction {
                Direction::Down => region.scroll_bottom_offset(),
                Direction::Up => region.scroll_top_offset(),
            };
            if delta == 0 {
                continue;
            }
            region.consume_scroll(delta);
            if region.can_scroll_further(direction) {
                queue.push_back((i, direction));
            }
        }

        self.sync_virtual(layout_change);
        self.update_sticky();
    }

    /// Pull a first visible region that starts above the viewport back into
    /// place, moving its offset from the container into its content
    fn realign_first_visible(&mut self, index: usize) {
        for _ in 0..MAX_CYCLES {
            let padding_top = self.viewport.padding_top;
            let scroll_y = self.scroll_y;
            let Some(region) = self.stack.at(index) else {
                return;
            };
            let bottom_offset = region.scroll_bottom_offset();
            let top_gap = region.top() - padding_top - scroll_y;
            if bottom_offset <= 0 || top_gap >= 0 {
                return;
            }

            let offset = bottom_offset.min(-top_gap);
            self.scroll_self(scroll_y - offset);
            let moved = scroll_y - self.scroll_y;
            if let Some(region) = self.stack.at_mut(index) {
                region.consume_scroll(moved);
            }
            if moved == 0 {
                return;
            }
        }
    }
}
