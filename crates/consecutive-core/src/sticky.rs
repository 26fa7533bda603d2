//! Sticky / pin engine
//!
//! Computes which sticky regions are pinned at a container offset and the
//! translation that places each of them on its pin line.

use tracing::debug;

use crate::events::ScrollEvent;
use crate::region::{Region, RegionId, RegionStack};

/// Inputs that position the pin line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLine {
    pub container_offset: i32,
    pub padding_top: i32,
    pub global_offset: i32,
}

impl PinLine {
    /// Pin line of one region, in content coordinates
    pub fn for_region(&self, region: &Region) -> i32 {
        self.container_offset + self.padding_top + self.global_offset + region.params().sticky_offset
    }
}

/// Single mode: the pinned region's index and how far the next sticky region pushes it up.
///
/// Scans from the bottom; the last sticky region whose top reached its pin
/// line wins. While the container is overscrolled past the top, a region
/// whose on-screen top reaches the line also qualifies.
pub fn single_pin(stack: &RegionStack, line: &PinLine) -> Option<(usize, i32)> {
    let stickies = stack.sticky_indices();

    for (pos, &index) in stickies.iter().enumerate().rev() {
        let region = stack.at(index)?;
        let pin_y = line.for_region(region);
        let overscrolled = line.container_offset < 0 && region.top() + line.container_offset <= pin_y;
        if !(overscrolled || region.top() <= pin_y) {
            continue;
        }

        let push = if region.is_sink() {
            0
        } else {
            stickies[pos + 1..]
                .iter()
                .filter_map(|&i| stack.at(i))
                .find(|next| !next.is_sink())
                .map_or(0, |next| (region.height() - (next.top() - pin_y)).max(0))
        };
        return Some((index, push));
    }
    None
}

/// Permanent mode: every pinned region's index and the y it is stacked at.
///
/// Each sticky region stacks below the heights of all earlier non-sink
/// sticky regions. Sinks pin without extending the stack.
pub fn permanent_pins(stack: &RegionStack, line: &PinLine) -> Vec<(usize, i32)> {
    let mut stacked = 0;
    let mut pins = Vec::new();

    for index in stack.sticky_indices() {
        let Some(region) = stack.at(index) else {
            continue;
        };
        let pin_y = line.for_region(region) + stacked;
        if region.top() <= pin_y {
            pins.push((index, pin_y));
        }
        if !region.is_sink() {
            stacked += region.measured_height();
        }
    }
    pins
}

/// Current pin state and change detection
#[derive(Debug, Clone, Default)]
pub struct StickyTracker {
    last_offset: Option<i32>,
    current: Option<RegionId>,
    current_views: Vec<RegionId>,
}

impl StickyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next update to recompute
    pub fn invalidate(&mut self) {
        self.last_offset = None;
    }

    pub fn current(&self) -> Option<RegionId> {
        self.current
    }

    pub fn current_views(&self) -> &[RegionId] {
        &self.current_views
    }

    pub fn is_pinned(&self, id: RegionId) -> bool {
        self.current == Some(id) || self.current_views.contains(&id)
    }

    /// Recompute pins if the container moved since the last update.
    ///
    /// Writes translations into the stack and queues a notification for
    /// every change of pinned regions. Returns whether a recompute ran.
    pub fn update(
        &mut self,
        stack: &mut RegionStack,
        line: PinLine,
        permanent: bool,
        events: &mut Vec<ScrollEvent>,
    ) -> bool {
        if self.last_offset == Some(line.container_offset) {
            return false;
        }
        self.last_offset = Some(line.container_offset);
        stack.reset_translations();

        if permanent {
            self.clear_single(events);
            self.apply_permanent(stack, &line, events);
        } else {
            self.clear_views(events);
            self.apply_single(stack, &line, events);
        }
        true
    }

    fn apply_single(&mut self, stack: &mut RegionStack, line: &PinLine, events: &mut Vec<ScrollEvent>) {
        let pinned = single_pin(stack, line);
        let new = pinned.and_then(|(index, push)| {
            let region = stack.at_mut(index)?;
            let pin_y = line.for_region(region);
            region.translation_y = pin_y - push - region.top();
            Some(region.id())
        });

        if new != self.current {
            let old = self.current;
            self.current = new;
            debug!(?old, ?new, "sticky changed");
            events.push(ScrollEvent::StickyChanged { old, new });
        }
    }

    fn apply_permanent(&mut self, stack: &mut RegionStack, line: &PinLine, events: &mut Vec<ScrollEvent>) {
        let mut pinned = Vec::new();
        for (index, y) in permanent_pins(stack, line) {
            if let Some(region) = stack.at_mut(index) {
                region.translation_y = y - region.top();
                pinned.push(region.id());
            }
        }

        if pinned != self.current_views {
            debug!(count = pinned.len(), "permanent sticky changed");
            self.current_views = pinned;
            events.push(ScrollEvent::PermanentStickyChanged {
                regions: self.current_views.clone(),
            });
        }
    }

    fn clear_single(&mut self, events: &mut Vec<ScrollEvent>) {
        if let Some(old) = self.current.take() {
            events.push(ScrollEvent::StickyChanged {
                old: Some(old),
                new: None,
            });
        }
    }

    fn clear_views(&mut self, events: &mut Vec<ScrollEvent>) {
        if !self.current_views.is_empty() {
            self.current_views.clear();
            events.push(ScrollEvent::PermanentStickyChanged {
                regions: Vec::new(),
            });
        }
    }
}
