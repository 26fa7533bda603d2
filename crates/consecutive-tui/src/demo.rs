//! The playground stack: a collapsing header over a sticky tab bar and a
//! long feed

use consecutive_core::{ConsecutiveScroller, LinearContent, Region, RegionId};

pub const HEADER: RegionId = RegionId(1);
pub const TABS: RegionId = RegionId(2);
pub const BANNER: RegionId = RegionId(3);
pub const FEED: RegionId = RegionId(4);
pub const FOOTER: RegionId = RegionId(5);

const HEADER_ROWS: i32 = 10;
const TABS_ROWS: i32 = 3;
const BANNER_ROWS: i32 = 2;
const FOOTER_ROWS: i32 = 6;
const FEED_ITEMS: i32 = 200;
const ITEM_ROWS: i32 = 2;

/// How a region is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Header,
    Bar,
    Banner,
    /// Scrollable list of fixed-height rows
    List { item_px: i32 },
    Footer,
}

#[derive(Debug, Clone)]
pub struct DemoRegion {
    pub id: RegionId,
    pub label: &'static str,
    pub kind: RegionKind,
}

/// Fill `scroller` with the demo stack, returning how to draw each region
pub fn build(scroller: &mut ConsecutiveScroller, px_per_row: i32) -> Vec<DemoRegion> {
    let row = px_per_row.max(1);
    let feed_height = scroller.viewport().inner_height().max(row);

    scroller.push_region(Region::fixed(HEADER, HEADER_ROWS * row));
    scroller.push_region(Region::fixed(TABS, TABS_ROWS * row).sticky());
    scroller.push_region(Region::fixed(BANNER, BANNER_ROWS * row).sticky().sink());
    scroller.push_region(Region::scrollable(
        FEED,
        feed_height,
        LinearContent::new(FEED_ITEMS * ITEM_ROWS * row),
    ));
    scroller.push_region(Region::fixed(FOOTER, FOOTER_ROWS * row));

    // Expanded, half collapsed, collapsed
    if scroller.snap_points().is_empty() {
        let header = HEADER_ROWS * row;
        scroller.set_snap_points(vec![0, header / 2, header]);
    }

    vec![
        DemoRegion {
            id: HEADER,
            label: "Header",
            kind: RegionKind::Header,
        },
        DemoRegion {
            id: TABS,
            label: "Tabs",
            kind: RegionKind::Bar,
        },
        DemoRegion {
            id: BANNER,
            label: "Banner",
            kind: RegionKind::Banner,
        },
        DemoRegion {
            id: FEED,
            label: "Feed",
            kind: RegionKind::List {
                item_px: ITEM_ROWS * row,
            },
        },
        DemoRegion {
            id: FOOTER,
            label: "Footer",
            kind: RegionKind::Footer,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use consecutive_core::{ScrollerConfig, Viewport};

    #[test]
    fn test_demo_stack_layout() {
        let mut scroller = ConsecutiveScroller::new(ScrollerConfig::default());
        scroller.set_viewport(Viewport::new(640, 480));
        let regions = build(&mut scroller, 16);

        assert_eq!(regions.len(), scroller.regions().len());
        assert_eq!(scroller.region(TABS).unwrap().top(), 160);
        assert!(scroller.region(BANNER).unwrap().is_sink());
        assert_eq!(scroller.region(FEED).unwrap().height(), 480);
        assert_eq!(scroller.snap_points(), &[0, 80, 160]);
    }

    #[test]
    fn test_configured_snap_points_win() {
        let mut config = ScrollerConfig::default();
        config.snap.points = vec![40];
        let mut scroller = ConsecutiveScroller::new(config);
        scroller.set_viewport(Viewport::new(640, 480));
        build(&mut scroller, 16);
        assert_eq!(scroller.snap_points(), &[40]);
    }
}
