use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const CONTROLS: [(&str, &str); 12] = [
    ("Up/Down", "change channel"),
    ("0-9", "enter a channel number"),
    ("Left/Right", "volume"),
    ("n", "mute"),
    ("g", "TV guide"),
    ("v", "next visualizer (music)"),
    ("w/s/a/d", "move in guide or games"),
    ("Enter", "select"),
    ("m", "menu"),
    ("c", "show these controls"),
    ("Esc", "close overlay"),
    ("q", "exit"),
];

/// Render the key help overlay
pub fn render(frame: &mut Frame, area: Rect, accent: Color) {
    let rect = super::popup_area(area, 44, CONTROLS.len() as u16 + 2);

    let lines: Vec<Line> = CONTROLS
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<12}", key), Style::default().fg(accent)),
                Span::raw(*action),
            ])
        })
        .collect();

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Render the exit confirmation
pub fn render_exit(frame: &mut Frame, area: Rect, accent: Color) {
    let rect = super::popup_area(area, 36, 5);

    let lines = vec![
        Line::from(Span::styled("Turn off the TV?", Style::default().bold())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(accent)),
            Span::raw(":yes  "),
            Span::styled("Esc", Style::default().fg(accent)),
            Span::raw(":no"),
        ]),
    ];

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    frame.render_widget(Paragraph::new(lines).block(block).centered(), rect);
}
