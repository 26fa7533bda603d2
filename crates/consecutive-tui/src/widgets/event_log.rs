use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Engine notifications, newest on top
pub struct EventLogWidget;

impl EventLogWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let block = Block::default()
            .title(format!(" Events ({}) ", app.event_log.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.background));

        let rows = block.inner(area).height as usize;
        let lines: Vec<Line> = app
            .event_log
            .iter()
            .take(rows)
            .enumerate()
            .map(|(i, entry)| {
                let color = if i == 0 { theme.text } else { theme.dim };
                Line::from(Span::styled(entry.clone(), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
