use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use consecutive_core::MotionState;

use crate::app::{on_off, state_name, App};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let scroller = &app.scroller;
        let bar = Style::default().bg(theme.border);

        let state = scroller.state();
        let state_color = match state {
            MotionState::Idle => theme.idle,
            MotionState::Dragging => theme.dragging,
            MotionState::Settling => theme.settling,
        };

        let pinned = scroller.pinned_regions();
        let pinned = if pinned.is_empty() {
            "-".to_string()
        } else {
            pinned.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
        };

        let status_text = match &app.status_message {
            Some(msg) => format!(" {} ", msg),
            None => format!(
                " offset {} | container {}/{} | pinned {} | over-drag {} | permanent {} ",
                scroller.scroll_offset(),
                scroller.container_offset(),
                scroller.scroll_range(),
                pinned,
                on_off(scroller.is_over_drag_enabled()),
                on_off(scroller.is_permanent_sticky()),
            ),
        };
        let state_text = format!(" {} ", state_name(state).to_uppercase());

        let help_hint = " q:quit j/k:scroll J/K:fling g/G:ends 1-5:seek o/p/s:toggles ";
        let used = state_text.len() + status_text.len() + help_hint.len();
        let padding = " ".repeat((area.width as usize).saturating_sub(used));

        let line = Line::from(vec![
            Span::styled(
                state_text,
                Style::default()
                    .fg(theme.background)
                    .bg(state_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(status_text, bar.fg(theme.text)),
            Span::styled(padding, bar),
            Span::styled(help_hint, bar.fg(theme.dim)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
