use serde::{Deserialize, Serialize};

use super::{Alignment, Region, RegionId};

/// Container geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub padding_top: i32,
    #[serde(default)]
    pub padding_bottom: i32,
    #[serde(default)]
    pub padding_left: i32,
    #[serde(default)]
    pub padding_right: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_padding(mut self, top: i32, bottom: i32) -> Self {
        self.padding_top = top;
        self.padding_bottom = bottom;
        self
    }

    /// Height left for regions once vertical padding is removed
    pub fn inner_height(&self) -> i32 {
        (self.height - self.padding_top - self.padding_bottom).max(0)
    }
}

/// The ordered regions of one layout generation
#[derive(Debug, Default)]
pub struct RegionStack {
    regions: Vec<Region>,
    scroll_range: i32,
    laid_out_len: usize,
}

impl RegionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn insert(&mut self, index: usize, region: Region) {
        let index = index.min(self.regions.len());
        self.regions.insert(index, region);
    }

    pub fn remove(&mut self, id: RegionId) -> Option<Region> {
        let index = self.index_of(id)?;
        Some(self.regions.remove(index))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Region> {
        self.regions.iter_mut()
    }

    pub fn index_of(&self, id: RegionId) -> Option<usize> {
        self.regions.iter().position(|r| r.id() == id)
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id() == id)
    }

    pub fn at(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut Region> {
        self.regions.get_mut(index)
    }

    pub fn scroll_range(&self) -> i32 {
        self.scroll_range
    }

    /// Lay regions out top to bottom from the top padding.
    ///
    /// `bottom_reservation` caps the last region's height to the inner
    /// viewport minus the reserved height. Returns whether any region moved
    /// or resized.
    pub fn layout(&mut self, viewport: &Viewport, bottom_reservation: Option<i32>) -> bool {
        let inner = viewport.inner_height();
        let last = self.regions.len().checked_sub(1);
        let mut changed = self.laid_out_len != self.regions.len();
        let mut top = viewport.padding_top;
        let mut total = 0;

        for (i, region) in self.regions.iter_mut().enumerate() {
            let mut height = region.measured_height();
            if Some(i) == last {
                if let Some(reserved) = bottom_reservation {
                    height = height.min((inner - reserved).max(0));
                }
            }

            if region.top != top || region.height != height {
                changed = true;
            }
            region.top = top;
            region.height = height;
            if let Some(content) = region.content_mut() {
                content.set_extent(height);
            }

            top += height;
            total += height;
        }

        self.laid_out_len = self.regions.len();
        self.scroll_range = (total - inner).max(0);
        changed
    }

    /// Sum of every region's full content height
    pub fn total_content_height(&self) -> i32 {
        self.regions.iter().map(Region::content_height).sum()
    }

    /// Internal offsets of the region at `index` and everything below it
    pub fn views_scroll_offset(&self, index: usize) -> i32 {
        self.regions
            .iter()
            .skip(index)
            .map(Region::internal_scroll_offset)
            .sum()
    }

    pub fn internal_offsets(&self) -> i32 {
        self.views_scroll_offset(0)
    }

    /// Region spanning the inner viewport top
    pub fn first_visible(&self, scroll_y: i32, viewport: &Viewport) -> Option<usize> {
        let offset = scroll_y + viewport.padding_top;
        self.regions
            .iter()
            .position(|r| r.is_effective() && r.top() <= offset && r.bottom() > offset)
    }

    /// Region spanning the inner viewport bottom
    pub fn last_visible(&self, scroll_y: i32, viewport: &Viewport) -> Option<usize> {
        let offset = viewport.height - viewport.padding_bottom + scroll_y;
        self.regions
            .iter()
            .position(|r| r.is_effective() && r.top() < offset && r.bottom() >= offset)
    }

    pub fn bottom_index(&self) -> Option<usize> {
        self.regions.iter().rposition(Region::is_effective)
    }

    pub fn sticky_indices(&self) -> Vec<usize> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_sticky())
            .map(|(i, _)| i)
            .collect()
    }

    /// Height pinned regions take away from the bottom region.
    ///
    /// Permanent mode reserves every non-sink sticky height, single mode
    /// only the last non-sink sticky one.
    pub fn reserved_height(&self, permanent: bool, adjust_offset: i32) -> i32 {
        let mut stickies = self
            .regions
            .iter()
            .filter(|r| r.is_sticky() && !r.is_sink());

        let pinned = if permanent {
            stickies.map(Region::measured_height).sum()
        } else {
            stickies.next_back().map_or(0, Region::measured_height)
        };
        adjust_offset + pinned
    }

    /// Draw order: plain and sink regions first, then pinned-over stickies
    pub fn draw_order(&self) -> Vec<RegionId> {
        let under = self
            .regions
            .iter()
            .filter(|r| !r.is_sticky() || r.is_sink());
        let over = self
            .regions
            .iter()
            .filter(|r| r.is_sticky() && !r.is_sink());
        under.chain(over).map(Region::id).collect()
    }

    /// Horizontal position of the region at `index`
    pub fn child_left(&self, index: usize, viewport: &Viewport) -> Option<i32> {
        let region = self.regions.get(index)?;
        let params = region.params();
        let width = if region.width() > 0 {
            region.width()
        } else {
            viewport.width - viewport.padding_left - viewport.padding_right
                - params.margin_left
                - params.margin_right
        };

        let left = match params.alignment {
            Alignment::Left => viewport.padding_left + params.margin_left,
            Alignment::Right => {
                viewport.width - width - viewport.padding_right - params.margin_right
            }
            Alignment::Center => {
                viewport.padding_left
                    + params.margin_left
                    + (viewport.width
                        - width
                        - viewport.padding_left
                        - params.margin_left
                        - viewport.padding_right
                        - params.margin_right)
                        / 2
            }
        };
        Some(left)
    }

    pub(crate) fn reset_translations(&mut self) {
        for region in &mut self.regions {
            region.translation_y = 0;
        }
    }
}
