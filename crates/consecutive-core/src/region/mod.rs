//! Region model
//!
//! A region is one element of the vertical stack. The engine reads its
//! geometry and flags and drives its internal scrolling through the
//! [`ScrollCapable`] interface; it never owns concrete widget types.

pub mod content;
pub mod stack;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use content::LinearContent;
pub use stack::{RegionStack, Viewport};

/// Stable identifier assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Vertical scroll direction
///
/// `Up` moves toward the start of the content (offsets decrease),
/// `Down` moves toward its end (offsets increase).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction a signed content delta travels in, `None` for zero
    pub fn of(delta: i32) -> Option<Self> {
        match delta.signum() {
            1 => Some(Direction::Down),
            -1 => Some(Direction::Up),
            _ => None,
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// Horizontal placement of a region narrower than the container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Capability interface every scrollable region content implements
pub trait ScrollCapable {
    /// Whether unconsumed scroll capacity remains in `direction`
    fn can_scroll_further(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.top_overflow() > 0,
            Direction::Down => self.bottom_overflow() > 0,
        }
    }

    /// Current scroll position within the content
    fn internal_scroll_offset(&self) -> i32;

    /// Scroll the content by `delta`, returning the amount actually applied
    fn consume_scroll(&mut self, delta: i32) -> i32;

    /// How far the content can still scroll toward its start (>= 0)
    fn top_overflow(&self) -> i32;

    /// How far the content can still scroll toward its end (>= 0)
    fn bottom_overflow(&self) -> i32;

    /// Layout hook: the visible height the content was given
    fn set_extent(&mut self, _height: i32) {}
}

/// Per-region flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionParams {
    /// The container drives this region's internal scrolling
    #[serde(default = "default_true")]
    pub is_scroll_group: bool,
    /// Accept nested scrolls started by this region's descendants
    #[serde(default = "default_true")]
    pub participates_in_nested_scroll: bool,
    #[serde(default)]
    pub is_sticky: bool,
    /// Pinned beneath other pinned regions instead of over them
    #[serde(default)]
    pub is_sink: bool,
    /// A drag that lands on this region while pinned still scrolls the container
    #[serde(default)]
    pub touch_scrolls_when_pinned: bool,
    #[serde(default)]
    pub alignment: Alignment,
    /// Extra distance below the pin line while pinned
    #[serde(default)]
    pub sticky_offset: i32,
    #[serde(default)]
    pub margin_left: i32,
    #[serde(default)]
    pub margin_right: i32,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            is_scroll_group: true,
            participates_in_nested_scroll: true,
            is_sticky: false,
            is_sink: false,
            touch_scrolls_when_pinned: false,
            alignment: Alignment::Left,
            sticky_offset: 0,
            margin_left: 0,
            margin_right: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One element of the stack
pub struct Region {
    id: RegionId,
    params: RegionParams,
    measured_height: i32,
    /// Measured width, 0 means "fill the container"
    width: i32,
    pub(crate) top: i32,
    pub(crate) height: i32,
    pub(crate) translation_y: i32,
    content: Option<Box<dyn ScrollCapable>>,
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("id", &self.id)
            .field("top", &self.top)
            .field("height", &self.height)
            .field("translation_y", &self.translation_y)
            .field("internal_offset", &self.internal_scroll_offset())
            .field("params", &self.params)
            .finish()
    }
}

impl Region {
    /// A region without internal scrolling
    pub fn fixed(id: RegionId, height: i32) -> Self {
        Self {
            id,
            params: RegionParams::default(),
            measured_height: height.max(0),
            width: 0,
            top: 0,
            height: height.max(0),
            translation_y: 0,
            content: None,
        }
    }

    /// A region whose content scrolls internally
    pub fn scrollable(id: RegionId, height: i32, content: impl ScrollCapable + 'static) -> Self {
        let mut region = Self::fixed(id, height);
        region.content = Some(Box::new(content));
        region
    }

    pub fn with_params(mut self, params: RegionParams) -> Self {
        self.params = params;
        self
    }

    pub fn sticky(mut self) -> Self {
        self.params.is_sticky = true;
        self
    }

    /// Sticky, pinned beneath the other pinned regions
    pub fn sink(mut self) -> Self {
        self.params.is_sticky = true;
        self.params.is_sink = true;
        self
    }

    pub fn sticky_offset(mut self, offset: i32) -> Self {
        self.params.sticky_offset = offset;
        self
    }

    pub fn align(mut self, alignment: Alignment, width: i32) -> Self {
        self.params.alignment = alignment;
        self.width = width.max(0);
        self
    }

    pub fn scroll_group(mut self, enabled: bool) -> Self {
        self.params.is_scroll_group = enabled;
        self
    }

    pub fn nested_scroll(mut self, enabled: bool) -> Self {
        self.params.participates_in_nested_scroll = enabled;
        self
    }

    pub fn touch_scrolls_when_pinned(mut self, enabled: bool) -> Self {
        self.params.touch_scrolls_when_pinned = enabled;
        self
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn measured_height(&self) -> i32 {
        self.measured_height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn translation_y(&self) -> i32 {
        self.translation_y
    }

    pub fn is_sticky(&self) -> bool {
        self.params.is_sticky
    }

    pub fn is_sink(&self) -> bool {
        self.params.is_sink
    }

    /// Zero-height regions take no part in visibility lookups
    pub fn is_effective(&self) -> bool {
        self.height > 0
    }

    pub(crate) fn set_measured_height(&mut self, height: i32) {
        self.measured_height = height.max(0);
    }

    /// Content the container drives, if this region is a scroll group
    pub fn content(&self) -> Option<&dyn ScrollCapable> {
        if self.params.is_scroll_group {
            self.content.as_deref()
        } else {
            None
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut (dyn ScrollCapable + 'static)> {
        if self.params.is_scroll_group {
            self.content.as_deref_mut()
        } else {
            None
        }
    }

    pub fn internal_scroll_offset(&self) -> i32 {
        self.content().map_or(0, |c| c.internal_scroll_offset())
    }

    pub fn can_scroll_further(&self, direction: Direction) -> bool {
        self.content()
            .is_some_and(|c| c.can_scroll_further(direction))
    }

    /// Full content height: the region height for fixed regions
    pub fn content_height(&self) -> i32 {
        match self.content() {
            Some(c) => self.height + c.top_overflow() + c.bottom_overflow(),
            None => self.height,
        }
    }

    /// Negative distance the content can still travel upward, or 0.
    ///
    /// Never returns a value in (-1, 0) when the content reports it can
    /// scroll, so callers always make progress.
    pub fn scroll_top_offset(&self) -> i32 {
        match self.content() {
            Some(c) if c.can_scroll_further(Direction::Up) => -c.top_overflow().max(1),
            _ => 0,
        }
    }

    /// Positive distance the content can still travel downward, or 0
    pub fn scroll_bottom_offset(&self) -> i32 {
        match self.content() {
            Some(c) if c.can_scroll_further(Direction::Down) => c.bottom_overflow().max(1),
            _ => 0,
        }
    }

    /// Drive the content by `delta`; fixed regions consume nothing
    pub fn consume_scroll(&mut self, delta: i32) -> i32 {
        match self.content_mut() {
            Some(c) if delta != 0 => c.consume_scroll(delta),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_of_delta() {
        assert_eq!(Direction::of(12), Some(Direction::Down));
        assert_eq!(Direction::of(-3), Some(Direction::Up));
        assert_eq!(Direction::of(0), None);
        assert_eq!(Direction::Up.sign(), -1);
    }

    #[test]
    fn test_fixed_region_has_no_capacity() {
        let mut region = Region::fixed(RegionId(1), 200);
        assert_eq!(region.scroll_bottom_offset(), 0);
        assert_eq!(region.scroll_top_offset(), 0);
        assert_eq!(region.consume_scroll(50), 0);
        assert_eq!(region.content_height(), 200);
    }

    #[test]
    fn test_scroll_offsets_follow_content() {
        let mut content = LinearContent::new(500);
        content.set_extent(300);
        let mut region = Region::scrollable(RegionId(1), 300, content);

        assert_eq!(region.scroll_bottom_offset(), 200);
        assert_eq!(region.scroll_top_offset(), 0);

        assert_eq!(region.consume_scroll(150), 150);
        assert_eq!(region.scroll_bottom_offset(), 50);
        assert_eq!(region.scroll_top_offset(), -150);
        assert_eq!(region.content_height(), 500);
    }

    #[test]
    fn test_non_scroll_group_hides_content() {
        let mut content = LinearContent::new(500);
        content.set_extent(300);
        let mut region = Region::scrollable(RegionId(1), 300, content).scroll_group(false);

        assert!(region.content().is_none());
        assert_eq!(region.consume_scroll(100), 0);
        assert!(!region.can_scroll_further(Direction::Down));
    }

    #[test]
    fn test_params_defaults_from_toml() {
        let params: RegionParams = toml::from_str("is_sticky = true").unwrap();
        assert!(params.is_sticky);
        assert!(params.is_scroll_group);
        assert!(params.participates_in_nested_scroll);
        assert!(!params.touch_scrolls_when_pinned);
        assert_eq!(params.alignment, Alignment::Left);
    }
}
