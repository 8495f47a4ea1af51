use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::channel::{ChannelLineup, ChannelNavigator};

/// Render the channel number (or pending digits) in the top-right corner
pub fn render(frame: &mut Frame, area: Rect, navigator: &ChannelNavigator, lineup: &ChannelLineup, accent: Color) {
    let text = if !navigator.digits().is_empty() {
        format!("{:-<2}", navigator.digits())
    } else if navigator.number_visible() {
        lineup.display_name(navigator.current())
    } else {
        return;
    };

    let width = (text.chars().count() as u16 + 4).min(area.width);
    let height = 3u16.min(area.height);
    let rect = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    };

    frame.render_widget(Clear, rect);
    let paragraph = Paragraph::new(Span::styled(text, Style::default().bold().fg(accent)))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(accent)))
        .centered();
    frame.render_widget(paragraph, rect);
}
