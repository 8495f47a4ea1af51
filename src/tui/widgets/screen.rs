use rand::Rng;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::channel::Screen;
use crate::schedule::ItemRole;
use crate::session::ChannelView;

const NOISE: [char; 4] = [' ', '░', '▒', '▓'];

/// Render the main area for views that need nothing beyond the view itself
pub fn render(frame: &mut Frame, area: Rect, view: &ChannelView, accent: Color) {
    match view {
        ChannelView::Blackout => render_blackout(frame, area),
        ChannelView::Content { screen, error } => {
            render_content(frame, area, screen, error.as_deref(), accent)
        }
        ChannelView::VideoPlayer => render_card(
            frame,
            area,
            "Video Player",
            "Insert a disc or tape in the player connected to this input",
            accent,
        ),
        ChannelView::GamesOff => render_card(
            frame,
            area,
            "Games",
            "Channel 3 is switched off. Turn it back on from the menu (m).",
            Color::DarkGray,
        ),
        ChannelView::NoContent => render_static(frame, area, None),
        // Drawn by their own widgets
        ChannelView::Games | ChannelView::Guide | ChannelView::Music => {}
    }
}

fn render_blackout(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);
}

fn render_content(
    frame: &mut Frame,
    area: Rect,
    screen: &Screen,
    error: Option<&str>,
    accent: Color,
) {
    match screen {
        Screen::Blackout => render_blackout(frame, area),
        Screen::OffAir => render_static(frame, area, error),
        Screen::Playing {
            title,
            role,
            index,
            len,
        } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent));

            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    title.as_str(),
                    Style::default().bold().fg(Color::White),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled(role_label(*role), Style::default().fg(accent)),
                    Span::styled(
                        format!("  {}/{}", index + 1, len),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
            ];
            if let Some(err) = error {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(err, Style::default().fg(Color::Red))));
            }

            let paragraph = Paragraph::new(lines)
                .block(block)
                .centered()
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        }
    }
}

/// Snow, with an optional error line across the middle
fn render_static(frame: &mut Frame, area: Rect, error: Option<&str>) {
    let mut rng = rand::thread_rng();
    let lines: Vec<Line> = (0..area.height)
        .map(|_| {
            let row: String = (0..area.width)
                .map(|_| NOISE[rng.gen_range(0..NOISE.len())])
                .collect();
            Line::from(Span::styled(row, Style::default().fg(Color::Gray)))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);

    if let Some(err) = error {
        let width = (err.chars().count() as u16 + 4).min(area.width);
        let banner = super::popup_area(area, width, 3);
        frame.render_widget(Clear, banner);
        let paragraph = Paragraph::new(Span::styled(err, Style::default().fg(Color::Red)))
            .block(Block::default().borders(Borders::ALL))
            .centered();
        frame.render_widget(paragraph, banner);
    }
}

fn render_card(frame: &mut Frame, area: Rect, title: &str, text: &str, accent: Color) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(text, Style::default().fg(Color::Gray))),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .centered()
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn role_label(role: ItemRole) -> &'static str {
    match role {
        ItemRole::Intro => "INTRO",
        ItemRole::Show => "NOW SHOWING",
        ItemRole::Commercial => "COMMERCIAL BREAK",
        ItemRole::Outro => "SIGN-OFF",
        ItemRole::Song => "NOW PLAYING",
    }
}
