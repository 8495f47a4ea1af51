use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};

use crate::audio::MAX_VOLUME;

const WIDTH: u16 = 40;

fn bottom_area(area: Rect) -> Rect {
    let width = WIDTH.min(area.width);
    let height = 3u16.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height - height,
        width,
        height,
    }
}

/// Volume bar along the bottom edge
pub fn render_volume(frame: &mut Frame, area: Rect, volume: u8, accent: Color) {
    let rect = bottom_area(area);
    let ratio = f64::from(volume.min(MAX_VOLUME)) / f64::from(MAX_VOLUME);

    frame.render_widget(Clear, rect);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Volume ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        )
        .gauge_style(Style::default().fg(accent).bg(Color::Black))
        .ratio(ratio)
        .label(volume.to_string());
    frame.render_widget(gauge, rect);
}

/// Mute indicator along the bottom edge
pub fn render_mute(frame: &mut Frame, area: Rect, muted: bool, accent: Color) {
    let rect = bottom_area(area);
    let text = if muted { "MUTE" } else { "SOUND ON" };

    frame.render_widget(Clear, rect);
    let paragraph = Paragraph::new(Span::styled(text, Style::default().bold().fg(accent)))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(accent)))
        .centered();
    frame.render_widget(paragraph, rect);
}
