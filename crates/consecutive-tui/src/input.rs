use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;

/// Fling speed for J/K, px/s
const KEY_FLING_VELOCITY: i32 = 4000;
/// Rows moved per wheel notch
const WHEEL_ROWS: i32 = 3;

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Scroll by a number of rows, positive moves the content up
    ScrollRows(i32),
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    /// Fling at a velocity in px/s
    Fling(i32),
    SmoothToTop,
    SmoothToBottom,
    /// Smooth seek to the n-th region of the stack
    SmoothToRegion(usize),
    /// Jump to the n-th region of the stack
    JumpToRegion(usize),
    Stop,
    ToggleOverDrag,
    TogglePermanentSticky,
    ToggleSnap,
    ClearLog,
    /// Left button pressed at a terminal cell
    PointerDown { column: u16, row: u16 },
    PointerMove { column: u16, row: u16 },
    PointerUp,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    // Keys do nothing while a finger is on the stack, except quitting
    if app.is_pointer_down() {
        return match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
            _ => Action::None,
        };
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => Action::ScrollRows(1),
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => Action::ScrollRows(-1),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::ScrollHalfPageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::ScrollHalfPageUp,

        (KeyCode::Char('J'), _) => Action::Fling(KEY_FLING_VELOCITY),
        (KeyCode::Char('K'), _) => Action::Fling(-KEY_FLING_VELOCITY),

        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::SmoothToTop,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::SmoothToBottom,

        // 1-9 seek smoothly, Alt+1-9 jump
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Action::SmoothToRegion(region_index(c))
        }
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::ALT) => Action::JumpToRegion(region_index(c)),

        (KeyCode::Char(' '), KeyModifiers::NONE) | (KeyCode::Esc, _) => Action::Stop,
        (KeyCode::Char('o'), KeyModifiers::NONE) => Action::ToggleOverDrag,
        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::TogglePermanentSticky,
        (KeyCode::Char('s'), KeyModifiers::NONE) => Action::ToggleSnap,
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Action::ClearLog,

        _ => Action::None,
    }
}

/// Map mouse reports onto pointer and wheel actions
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::PointerDown { column, row },
        MouseEventKind::Drag(MouseButton::Left) => Action::PointerMove { column, row },
        MouseEventKind::Up(MouseButton::Left) => Action::PointerUp,
        MouseEventKind::ScrollDown => Action::ScrollRows(WHEEL_ROWS),
        MouseEventKind::ScrollUp => Action::ScrollRows(-WHEEL_ROWS),
        _ => Action::None,
    }
}

fn region_index(c: char) -> usize {
    c.to_digit(10).map_or(0, |d| d as usize - 1)
}
