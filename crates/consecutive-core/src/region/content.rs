use super::ScrollCapable;

/// A plain block of scrollable content: a list, an article body, a web page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearContent {
    content_height: i32,
    extent: i32,
    offset: i32,
}

impl LinearContent {
    pub fn new(content_height: i32) -> Self {
        Self {
            content_height: content_height.max(0),
            extent: 0,
            offset: 0,
        }
    }

    pub fn content_height(&self) -> i32 {
        self.content_height
    }

    pub fn extent(&self) -> i32 {
        self.extent
    }

    /// Replace the content height, keeping the offset inside the new bounds
    pub fn set_content_height(&mut self, height: i32) {
        self.content_height = height.max(0);
        self.offset = self.offset.clamp(0, self.max_offset());
    }

    fn max_offset(&self) -> i32 {
        (self.content_height - self.extent).max(0)
    }
}

impl ScrollCapable for LinearContent {
    fn internal_scroll_offset(&self) -> i32 {
        self.offset
    }

    fn consume_scroll(&mut self, delta: i32) -> i32 {
        let old = self.offset;
        self.offset = (self.offset + delta).clamp(0, self.max_offset());
        self.offset - old
    }

    fn top_overflow(&self) -> i32 {
        self.offset
    }

    fn bottom_overflow(&self) -> i32 {
        self.max_offset() - self.offset
    }

    fn set_extent(&mut self, height: i32) {
        self.extent = height.max(0);
        self.offset = self.offset.clamp(0, self.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Direction;

    #[test]
    fn test_consume_is_clamped() {
        let mut content = LinearContent::new(1000);
        content.set_extent(400);

        assert_eq!(content.consume_scroll(250), 250);
        assert_eq!(content.consume_scroll(500), 350);
        assert_eq!(content.internal_scroll_offset(), 600);
        assert!(!content.can_scroll_further(Direction::Down));

        assert_eq!(content.consume_scroll(-900), -600);
        assert!(!content.can_scroll_further(Direction::Up));
    }

    #[test]
    fn test_growing_extent_pulls_offset_back() {
        let mut content = LinearContent::new(1000);
        content.set_extent(400);
        content.consume_scroll(600);

        content.set_extent(700);
        assert_eq!(content.internal_scroll_offset(), 300);
        assert_eq!(content.bottom_overflow(), 0);
    }

    #[test]
    fn test_content_shorter_than_extent() {
        let mut content = LinearContent::new(100);
        content.set_extent(300);
        assert_eq!(content.consume_scroll(50), 0);
        assert_eq!(content.top_overflow(), 0);
        assert_eq!(content.bottom_overflow(), 0);
    }
}
