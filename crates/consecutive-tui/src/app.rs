use std::collections::VecDeque;
use std::time::Instant;

use consecutive_core::{
    AppConfig, ConsecutiveScroller, MotionState, PointerId, RegionId, ScrollEvent, Viewport,
};
use ratatui::layout::Rect;
use tracing::{debug, warn};

use crate::demo::{self, DemoRegion, FEED};
use crate::input::Action;
use crate::theme::Theme;

/// Only the latest notifications are kept for the log panel
const LOG_CAPACITY: usize = 200;
/// The single pointer a mouse can drive
const MOUSE_POINTER: PointerId = 0;

/// Playground state
pub struct App {
    pub scroller: ConsecutiveScroller,
    pub regions: Vec<DemoRegion>,
    pub theme: Theme,
    /// Engine pixels per terminal row and column
    pub px_per_row: i32,
    /// Where the stack was last drawn
    pub stack_area: Rect,
    /// Newest first
    pub event_log: VecDeque<String>,
    pub status_message: Option<String>,
    pub should_quit: bool,
    /// Snap points put aside while snapping is toggled off
    parked_snap_points: Option<Vec<i32>>,
    pointer_down: bool,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let px_per_row = config.ui.px_per_row.max(1);
        let mut scroller = ConsecutiveScroller::new(config.scroller.clone());
        scroller.set_viewport(Viewport::new(80 * px_per_row, 24 * px_per_row));
        let regions = demo::build(&mut scroller, px_per_row);
        scroller.take_events();

        Self {
            scroller,
            regions,
            theme: Theme::default(),
            px_per_row,
            stack_area: Rect::new(0, 0, 80, 24),
            event_log: VecDeque::new(),
            status_message: None,
            should_quit: false,
            parked_snap_points: None,
            pointer_down: false,
        }
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// Whether the loop should poll at the frame rate
    pub fn needs_frame(&self) -> bool {
        self.scroller.needs_frame()
    }

    /// Fit the engine viewport to the area the stack is drawn in
    pub fn resize(&mut self, area: Rect) {
        if area == self.stack_area {
            return;
        }
        self.stack_area = area;

        let viewport = Viewport::new(
            i32::from(area.width) * self.px_per_row,
            i32::from(area.height) * self.px_per_row,
        );
        self.scroller.set_viewport(viewport);
        // The feed always fills the screen
        if let Err(e) = self.scroller.set_region_height(FEED, viewport.inner_height()) {
            warn!("resize: {}", e);
        }
        debug!(width = area.width, height = area.height, "stack resized");
        self.drain_events();
    }

    /// Advance running animations to `now`
    pub fn on_frame(&mut self, now: Instant) {
        if self.scroller.needs_frame() {
            self.scroller.on_frame(now);
        }
        self.drain_events();
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        let half_page = self.scroller.viewport().inner_height() / 2;

        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollRows(rows) => self.scroller.scroll_by(rows * self.px_per_row),
            Action::ScrollHalfPageDown => self.scroller.scroll_by(half_page),
            Action::ScrollHalfPageUp => self.scroller.scroll_by(-half_page),
            Action::Fling(velocity) => self.scroller.fling(velocity),
            Action::SmoothToTop => self.scroller.smooth_scroll_to_offset(0),
            Action::SmoothToBottom => {
                let end = self.scroller.compute_vertical_scroll_range()
                    - self.scroller.compute_vertical_scroll_extent();
                self.scroller.smooth_scroll_to_offset(end.max(0));
            }
            Action::SmoothToRegion(index) => self.seek(index, true),
            Action::JumpToRegion(index) => self.seek(index, false),
            Action::Stop => self.scroller.stop_scroll(),
            Action::ToggleOverDrag => {
                let enable = !self.scroller.is_over_drag_enabled();
                self.scroller.enable_over_drag(enable);
                self.status(format!("over-drag {}", on_off(enable)));
            }
            Action::TogglePermanentSticky => {
                let permanent = !self.scroller.is_permanent_sticky();
                self.scroller.set_permanent_sticky(permanent);
                self.status(format!("permanent pinning {}", on_off(permanent)));
            }
            Action::ToggleSnap => match self.parked_snap_points.take() {
                Some(points) => {
                    self.scroller.set_snap_points(points);
                    self.status("snap on".to_string());
                }
                None => {
                    self.parked_snap_points = Some(self.scroller.snap_points().to_vec());
                    self.scroller.clear_snap_points();
                    self.status("snap off".to_string());
                }
            },
            Action::ClearLog => self.event_log.clear(),
            Action::PointerDown { column, row } => {
                if let Some((x, y)) = self.to_engine(column, row) {
                    self.pointer_down = true;
                    self.scroller.pointer_down(MOUSE_POINTER, x, y, now);
                }
            }
            Action::PointerMove { column, row } => {
                if self.pointer_down {
                    let (x, y) = self.cell_to_px(column, row);
                    self.scroller.pointer_move(MOUSE_POINTER, x, y, now);
                }
            }
            Action::PointerUp => {
                if self.pointer_down {
                    self.pointer_down = false;
                    self.scroller.pointer_up(MOUSE_POINTER, now);
                }
            }
            Action::None => {}
        }

        self.drain_events();
    }

    fn seek(&mut self, index: usize, smooth: bool) {
        let Some(id) = self.regions.get(index).map(|r| r.id) else {
            self.status(format!("no region {}", index + 1));
            return;
        };
        let result = if smooth {
            self.scroller.smooth_scroll_to_region(id)
        } else {
            self.scroller.scroll_to_region(id)
        };
        if let Err(e) = result {
            self.status(e.to_string());
        }
    }

    /// Center of the cell, in engine pixels relative to the stack
    fn to_engine(&self, column: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.stack_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        inside.then(|| self.cell_to_px(column, row))
    }

    fn cell_to_px(&self, column: u16, row: u16) -> (i32, i32) {
        let half = self.px_per_row / 2;
        let x = (i32::from(column) - i32::from(self.stack_area.x)) * self.px_per_row + half;
        let y = (i32::from(row) - i32::from(self.stack_area.y)) * self.px_per_row + half;
        (x, y)
    }

    fn status(&mut self, message: String) {
        debug!("{}", message);
        self.status_message = Some(message);
    }

    fn drain_events(&mut self) {
        for event in self.scroller.take_events() {
            self.event_log.push_front(describe(&event));
        }
        self.event_log.truncate(LOG_CAPACITY);
    }
}

pub(crate) fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// One log line per engine notification
pub fn describe(event: &ScrollEvent) -> String {
    match event {
        ScrollEvent::ScrollChanged {
            offset,
            old_offset,
            state,
        } if offset == old_offset => format!("state -> {}", state_name(*state)),
        ScrollEvent::ScrollChanged {
            offset, old_offset, ..
        } => format!("scroll {} -> {}", old_offset, offset),
        ScrollEvent::StickyChanged { old, new } => {
            let name = |id: &Option<RegionId>| id.map_or("none".to_string(), |id| id.to_string());
            format!("sticky {} -> {}", name(old), name(new))
        }
        ScrollEvent::PermanentStickyChanged { regions } => {
            let ids: Vec<String> = regions.iter().map(ToString::to_string).collect();
            format!("pinned [{}]", ids.join(", "))
        }
    }
}

pub fn state_name(state: MotionState) -> &'static str {
    match state {
        MotionState::Idle => "idle",
        MotionState::Dragging => "dragging",
        MotionState::Settling => "settling",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app() -> App {
        let mut app = App::new(&AppConfig::default());
        app.resize(Rect::new(0, 0, 60, 30));
        app
    }

    fn run_frames(app: &mut App, start: Instant) {
        let mut now = start;
        for _ in 0..2000 {
            if !app.needs_frame() {
                return;
            }
            app.on_frame(now);
            now += Duration::from_millis(16);
        }
        panic!("animation never settled");
    }

    #[test]
    fn test_resize_fits_viewport() {
        let app = app();
        assert_eq!(app.scroller.viewport().height, 480);
        assert_eq!(app.scroller.region(FEED).unwrap().height(), 480);
    }

    #[test]
    fn test_scroll_rows() {
        let mut app = app();
        app.apply(Action::ScrollRows(3), Instant::now());
        assert_eq!(app.scroller.scroll_offset(), 48);
        assert_eq!(app.event_log.front().map(String::as_str), Some("scroll 0 -> 48"));
    }

    #[test]
    fn test_mouse_drag_scrolls_and_releases() {
        let mut app = app();
        let t0 = Instant::now();
        app.apply(Action::PointerDown { column: 10, row: 20 }, t0);
        assert!(app.is_pointer_down());
        app.apply(
            Action::PointerMove { column: 10, row: 15 },
            t0 + Duration::from_millis(10),
        );
        assert_eq!(app.scroller.scroll_offset(), 80);

        app.apply(Action::PointerUp, t0 + Duration::from_millis(500));
        assert!(!app.is_pointer_down());
        run_frames(&mut app, t0 + Duration::from_millis(516));
        assert_eq!(app.scroller.state(), MotionState::Idle);
    }

    #[test]
    fn test_pointer_outside_stack_ignored() {
        let mut app = app();
        app.apply(Action::PointerDown { column: 70, row: 5 }, Instant::now());
        assert!(!app.is_pointer_down());
    }

    #[test]
    fn test_toggle_snap_parks_points() {
        let mut app = app();
        let points = app.scroller.snap_points().to_vec();
        app.apply(Action::ToggleSnap, Instant::now());
        assert!(app.scroller.snap_points().is_empty());
        app.apply(Action::ToggleSnap, Instant::now());
        assert_eq!(app.scroller.snap_points(), points.as_slice());
        assert_eq!(app.status_message.as_deref(), Some("snap on"));
    }

    #[test]
    fn test_seek_to_missing_region() {
        let mut app = app();
        app.apply(Action::JumpToRegion(8), Instant::now());
        assert_eq!(app.status_message.as_deref(), Some("no region 9"));
    }

    #[test]
    fn test_smooth_to_bottom_reaches_end() {
        let mut app = app();
        app.apply(Action::SmoothToBottom, Instant::now());
        run_frames(&mut app, Instant::now());
        assert!(app.scroller.is_scroll_bottom());
    }

    #[test]
    fn test_describe_events() {
        let event = ScrollEvent::StickyChanged {
            old: None,
            new: Some(RegionId(2)),
        };
        assert_eq!(describe(&event), "sticky none -> #2");

        let event = ScrollEvent::ScrollChanged {
            offset: 4,
            old_offset: 4,
            state: MotionState::Settling,
        };
        assert_eq!(describe(&event), "state -> settling");
    }
}
