use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use consecutive_core::Region;

use crate::app::App;
use crate::demo::{DemoRegion, RegionKind};

/// Draws every region at its on-screen position, pinned regions last
pub struct StackViewWidget;

impl StackViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;

        // Whatever no region covers is over-drag gap
        let gap = Block::default().style(Style::default().bg(theme.over_drag));
        frame.render_widget(gap, area);

        for id in app.scroller.draw_order() {
            let Some(region) = app.scroller.region(id) else {
                continue;
            };
            let Some(demo) = app.regions.iter().find(|r| r.id == id) else {
                continue;
            };

            let top_px = app.scroller.screen_top(region);
            let Some((rect, hidden_rows)) = region_rect(area, top_px, region.height(), app.px_per_row)
            else {
                continue;
            };

            let pinned = app.scroller.is_region_pinned(id);
            let color = theme.region(demo.kind);
            let border_style = if pinned {
                Style::default().fg(theme.pinned).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            let title = if pinned {
                format!(" {} {} [pinned] ", demo.label, id)
            } else {
                format!(" {} {} ", demo.label, id)
            };

            let block = Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style)
                .style(Style::default().bg(theme.surface));
            let inner = block.inner(rect);
            let lines = body(app, region, demo, inner.height, hidden_rows);

            frame.render_widget(Clear, rect);
            frame.render_widget(Paragraph::new(lines).block(block), rect);
        }
    }
}

/// Terminal rows a region occupies inside `area`, and how many of its rows
/// fall above the area
fn region_rect(area: Rect, top_px: i32, height_px: i32, px_per_row: i32) -> Option<(Rect, u16)> {
    let row = px_per_row.max(1);
    let first = top_px.div_euclid(row);
    let last = (top_px + height_px + row - 1).div_euclid(row);

    let visible_first = first.max(0);
    let visible_last = last.min(i32::from(area.height));
    if visible_last <= visible_first {
        return None;
    }

    let rect = Rect::new(
        area.x,
        area.y + visible_first as u16,
        area.width,
        (visible_last - visible_first) as u16,
    );
    Some((rect, (visible_first - first) as u16))
}

fn body<'a>(app: &App, region: &Region, demo: &DemoRegion, rows: u16, hidden_rows: u16) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let text = Style::default().fg(theme.text);
    let dim = Style::default().fg(theme.dim);

    match demo.kind {
        RegionKind::Header => vec![
            Line::from(Span::styled("Collapsing header", text)),
            Line::from(Span::styled(
                format!(
                    "container {} / {}  virtual {}",
                    app.scroller.container_offset(),
                    app.scroller.scroll_range(),
                    app.scroller.scroll_offset()
                ),
                dim,
            )),
            Line::from(Span::styled(
                format!("snap points {:?}", app.scroller.snap_points()),
                dim,
            )),
        ],
        RegionKind::Bar => vec![Line::from(vec![
            Span::styled(" All ", text.add_modifier(Modifier::REVERSED)),
            Span::styled("  Popular  Recent  Saved", dim),
        ])],
        RegionKind::Banner => vec![Line::from(Span::styled(
            "sink: pinned beneath the tabs",
            dim,
        ))],
        RegionKind::List { item_px } => {
            let offset = region.internal_scroll_offset();
            let row = app.px_per_row.max(1);
            // Skip the top border row
            (0..rows)
                .map(|r| {
                    let px = offset + (i32::from(r + hidden_rows) + 1) * row;
                    let item = px / item_px.max(1);
                    let first_row_of_item = px % item_px.max(1) < row;
                    if first_row_of_item {
                        Line::from(vec![
                            Span::styled(format!("{:>4} ", item + 1), dim),
                            Span::styled(format!("Feed item {}", item + 1), text),
                        ])
                    } else {
                        Line::from(Span::styled(
                            format!("     internal offset {}", offset),
                            dim,
                        ))
                    }
                })
                .collect()
        }
        RegionKind::Footer => vec![Line::from(Span::styled("end of stack", dim))],
    }
}
