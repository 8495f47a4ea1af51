use chrono::{DateTime, TimeZone};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::channel::ChannelLineup;
use crate::guide::{listing, Guide};

const NAME_WIDTH: usize = 18;
const SLOT_WIDTH: usize = 9;

/// Render the TV guide: a preview line, time header and channel rows
pub fn render<Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    guide: &Guide,
    lineup: &ChannelLineup,
    now: &DateTime<Tz>,
    accent: Color,
) {
    let block = Block::default()
        .title(" TV Guide ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let highlighted = guide.highlighted();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                lineup.display_name(highlighted),
                Style::default().bold().fg(Color::White),
            ),
            Span::styled(
                format!("  {}", listing(highlighted)),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(""),
    ];

    let mut header = vec![Span::styled(
        format!("{:<width$}", "", width = NAME_WIDTH),
        Style::default(),
    )];
    for slot in guide.visible_slots(now) {
        header.push(Span::styled(
            format!("{:<width$}", slot, width = SLOT_WIDTH),
            Style::default().bold().fg(accent),
        ));
    }
    lines.push(Line::from(header));

    let listing_width = SLOT_WIDTH * crate::guide::VISIBLE_SLOTS;
    for row in guide.rows(lineup) {
        let style = if row.channel == highlighted {
            Style::default().fg(Color::Black).bg(accent)
        } else if !row.enabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", row.name, width = NAME_WIDTH), style.bold()),
            Span::styled(
                format!("{:<width$}", row.listing, width = listing_width),
                style,
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "w/s channels  a/d time  Enter tune",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
