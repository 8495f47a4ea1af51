use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::hub::{GamesHub, HubView};

/// Render the games hub
pub fn render(frame: &mut Frame, area: Rect, hub: &GamesHub, accent: Color) {
    let block = Block::default()
        .title(" Games ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let lines = match hub.view() {
        HubView::Systems => {
            let [prev, selected, next] = hub.carousel();
            vec![
                Line::from(""),
                Line::from(Span::styled(prev, Style::default().fg(Color::DarkGray))),
                Line::from(""),
                Line::from(Span::styled(
                    format!("> {} <", selected),
                    Style::default().bold().fg(accent),
                )),
                Line::from(""),
                Line::from(Span::styled(next, Style::default().fg(Color::DarkGray))),
                Line::from(""),
                Line::from(Span::styled(
                    "w/s select  Enter play",
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        HubView::System => vec![
            Line::from(""),
            Line::from(Span::styled(
                hub.selected_system(),
                Style::default().bold().fg(Color::White),
            )),
            Line::from(""),
            Line::from(Span::styled("Now playing", Style::default().fg(accent))),
            Line::from(""),
            Line::from(Span::styled(
                "Enter back to systems",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };

    frame.render_widget(Paragraph::new(lines).block(block).centered(), area);
}
