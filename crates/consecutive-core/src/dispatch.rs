//! Scroll dispatcher
//!
//! Splits a signed delta into per-region consumptions. Content is always
//! drained before the container offset moves, and regions are visited in
//! stack order for the direction of travel.
//!
//! Positive deltas move the content up (offsets grow), negative deltas move
//! it down. Past an edge the container is displaced along the elastic
//! curve while a finger drives it.

use tracing::{trace, warn};

use crate::config::{DisplayConfig, OverscrollConfig};
use crate::nested::ScrollSource;
use crate::physics::ElasticCurve;
use crate::scroller::{ConsecutiveScroller, MAX_CYCLES};

/// Which edge the container is displaced past
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    Top,
    Bottom,
}

/// Elastic over-drag limits (px) and the raw distance of the current over-drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OverDrag {
    pub top: i32,
    pub bottom: i32,
    pub rate: f32,
    pub raw: f64,
}

impl OverDrag {
    pub fn from_config(config: &OverscrollConfig, display: &DisplayConfig) -> Self {
        let (top, bottom) = if config.enabled {
            (
                display.dp_to_px(config.max_top_dp as f32),
                display.dp_to_px(config.max_bottom_dp as f32),
            )
        } else {
            (0, 0)
        };
        Self {
            top,
            bottom,
            rate: config.drag_rate,
            raw: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.top > 0 || self.bottom > 0
    }

    pub fn limit(&self, edge: Edge) -> i32 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

impl ConsecutiveScroller {
    /// Route a content delta through the regions and the container
    pub(crate) fn dispatch_scroll(&mut self, delta: i32) {
        if delta > 0 {
            self.scroll_up(delta);
        } else if delta < 0 {
            self.scroll_down(delta);
        }
        self.sync_virtual(true);
        self.update_sticky();
    }

    /// Content moves up: drain the leading region, then the container
    fn scroll_up(&mut self, delta: i32) {
        let mut remaining = delta;

        for cycle in 0.. {
            if cycle >= MAX_CYCLES {
                warn!(delta, remaining, "scroll up iteration cap reached");
                self.finish_seek();
                break;
            }

            // Bound the step so a seek never passes its anchor
            let mut bound = i32::MAX;
            if let Some(seek) = self.seek {
                let views_offset = if seek.offset < 0 {
                    self.stack.views_scroll_offset(seek.index)
                } else {
                    0
                };
                let anchor = self.seek_anchor(seek.index, seek.offset);
                let position = self.scroll_y + self.viewport.padding_top + views_offset;
                if seek.cycles >= MAX_CYCLES || position >= anchor || self.is_scroll_bottom() {
                    self.finish_seek();
                    break;
                }
                bound = anchor - position;
            }

            let scroll_y = self.scroll_y;
            let step;
            if !self.is_scroll_bottom() && scroll_y >= 0 {
                let leading = if scroll_y < self.stack.scroll_range() {
                    self.stack.first_visible(scroll_y, &self.viewport)
                } else {
                    self.stack.bottom_index()
                };
                let Some(index) = leading else {
                    break;
                };
                let Some(region) = self.stack.at_mut(index) else {
                    break;
                };

                let bottom_offset = region.scroll_bottom_offset();
                if bottom_offset > 0 {
                    step = region.consume_scroll(remaining.min(bottom_offset).min(bound));
                } else {
                    let room = region.bottom() - self.viewport.padding_top - scroll_y;
                    let range_left = self.stack.scroll_range() - scroll_y;
                    let amount = remaining.min(room).min(range_left).min(bound);
                    self.scroll_self(scroll_y + amount);
                    step = self.scroll_y - scroll_y;
                }
            } else if self.touching {
                if scroll_y < 0 {
                    step = self.drag_back(Edge::Top, remaining);
                } else {
                    self.over_drag_at_edge(Edge::Bottom, delta - remaining, remaining);
                    remaining = 0;
                    break;
                }
            } else if scroll_y < 0 {
                let into_content = !self.scroller.is_finished()
                    && self.scroller.final_y() >= self.virtual_offset - scroll_y;
                if into_content {
                    self.rebound = None;
                    let amount = remaining.min(-scroll_y);
                    self.scroll_self(scroll_y + amount);
                    step = self.scroll_y - scroll_y;
                } else {
                    self.scroller.force_finished();
                    break;
                }
            } else {
                break;
            }

            remaining -= step;
            if step <= 0 || remaining <= 0 {
                break;
            }
        }
        trace!(delta, remaining, "scroll up");
    }

    /// Content moves down: drain the trailing region, then the container
    fn scroll_down(&mut self, delta: i32) {
        let mut remaining = delta;

        for cycle in 0.. {
            if cycle >= MAX_CYCLES {
                warn!(delta, remaining, "scroll down iteration cap reached");
                self.finish_seek();
                break;
            }

            let mut bound = i32::MIN;
            if let Some(seek) = self.seek {
                let views_offset = self.stack.views_scroll_offset(seek.index);
                let anchor = self.seek_anchor(seek.index, seek.offset);
                let position = self.scroll_y + self.viewport.padding_top + views_offset;
                if seek.cycles >= MAX_CYCLES || position <= anchor || self.is_scroll_top() {
                    self.finish_seek();
                    break;
                }
                bound = anchor - position;
            }

            let scroll_y = self.scroll_y;
            let range = self.stack.scroll_range();
            let step;
            if !self.is_scroll_top() && (0..=range).contains(&scroll_y) {
                let trailing = if scroll_y < range {
                    self.stack.last_visible(scroll_y, &self.viewport)
                } else {
                    self.stack.bottom_index()
                };
                let Some(index) = trailing else {
                    break;
                };
                let Some(region) = self.stack.at_mut(index) else {
                    break;
                };

                let top_offset = region.scroll_top_offset();
                if top_offset < 0 {
                    step = region.consume_scroll(remaining.max(top_offset).max(bound));
                } else {
                    let room = region.top() + self.viewport.padding_bottom - scroll_y - self.viewport.height;
                    let amount = remaining.max(room).max(-scroll_y).max(bound);
                    self.scroll_self(scroll_y + amount);
                    step = self.scroll_y - scroll_y;
                }
            } else if self.touching {
                if scroll_y > range {
                    step = -self.drag_back(Edge::Bottom, -remaining);
                } else {
                    self.over_drag_at_edge(Edge::Top, delta - remaining, remaining);
                    remaining = 0;
                    break;
                }
            } else if scroll_y > range {
                let edge_virtual = self.virtual_offset - (scroll_y - range);
                let into_content =
                    !self.scroller.is_finished() && self.scroller.final_y() <= edge_virtual;
                if into_content {
                    self.rebound = None;
                    let amount = remaining.max(range - scroll_y);
                    self.scroll_self(scroll_y + amount);
                    step = self.scroll_y - scroll_y;
                } else {
                    self.scroller.force_finished();
                    break;
                }
            } else {
                break;
            }

            remaining -= step;
            if step >= 0 || remaining >= 0 {
                break;
            }
        }
        trace!(delta, remaining, "scroll down");
    }

    /// Pull the container back from `edge` by `amount` (> 0) raw pixels.
    ///
    /// The raw distance shrinks linearly; the displacement follows the
    /// curve. Returns how much of `amount` was used.
    fn drag_back(&mut self, edge: Edge, amount: i32) -> i32 {
        let curve = self.elastic_curve(edge);
        let raw = self.current_raw(&curve, self.overscroll_distance(edge));

        let (new_raw, used) = if amount as f64 >= raw {
            (0.0, (raw.ceil() as i32).clamp(1, amount))
        } else {
            (raw - amount as f64, amount)
        };

        let displacement = curve.displacement_px(new_raw);
        self.over_drag.raw = if displacement == 0 { 0.0 } else { new_raw };
        match edge {
            Edge::Top => self.scroll_self(-displacement),
            Edge::Bottom => self.scroll_self(self.stack.scroll_range() + displacement),
        }
        used
    }

    /// Offer a leftover at `edge` to the ancestor, then turn what it refused
    /// into elastic displacement.
    fn over_drag_at_edge(&mut self, edge: Edge, consumed: i32, remaining: i32) {
        let taken = self
            .parent
            .report_unconsumed_scroll(consumed, remaining, ScrollSource::Touch);
        self.ledger
            .record(ScrollSource::Touch, |books| books.ancestor_post += taken);

        let left = remaining - taken;
        if left == 0 || self.over_drag.limit(edge) <= 0 {
            return;
        }

        let curve = self.elastic_curve(edge);
        let raw = self.current_raw(&curve, self.overscroll_distance(edge)) + f64::from(left).abs();
        self.over_drag.raw = raw;
        let displacement = curve.displacement_px(raw);
        match edge {
            Edge::Top => self.scroll_self(-displacement),
            Edge::Bottom => self.scroll_self(self.stack.scroll_range() + displacement),
        }
        trace!(?edge, raw, displacement, "over-drag");
    }

    /// Raw distance behind the current displacement.
    ///
    /// Re-derived through the inverse curve when something other than a
    /// drag moved the container since the last over-drag step.
    pub(crate) fn current_raw(&self, curve: &ElasticCurve, displacement: i32) -> f64 {
        if curve.displacement_px(self.over_drag.raw) == displacement {
            self.over_drag.raw
        } else {
            curve.raw_for(displacement as f64)
        }
    }

    /// How far the container sits past `edge` (>= 0)
    pub(crate) fn overscroll_distance(&self, edge: Edge) -> i32 {
        match edge {
            Edge::Top => (-self.scroll_y).max(0),
            Edge::Bottom => (self.scroll_y - self.stack.scroll_range()).max(0),
        }
    }

    pub(crate) fn elastic_curve(&self, edge: Edge) -> ElasticCurve {
        ElasticCurve::new(
            self.over_drag.limit(edge),
            self.viewport.height,
            self.screen_height(),
            self.over_drag.rate,
        )
    }

    /// Move the container, clamped to the range plus the enabled over-drag limits
    pub(crate) fn scroll_self(&mut self, y: i32) {
        let min = -self.over_drag.top.max(0);
        let max = self.stack.scroll_range() + self.over_drag.bottom.max(0);
        self.scroll_y = y.clamp(min, max);
    }

    /// Content offset the container must reach for the seek target at `index`
    pub(crate) fn seek_anchor(&self, index: usize, offset: i32) -> i32 {
        let top = self.stack.at(index).map_or(0, |r| r.top());
        top - offset - self.adjust_height_for(index)
    }

    /// Height reserved below pinned regions when `index` is the bottom region
    fn adjust_height_for(&self, index: usize) -> i32 {
        let sticky = &self.config.sticky;
        if sticky.auto_adjust_height_at_bottom && index + 1 == self.stack.len() {
            self.stack
                .reserved_height(sticky.permanent, sticky.adjust_height_offset)
        } else {
            0
        }
    }
}
