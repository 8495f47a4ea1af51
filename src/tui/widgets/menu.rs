use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{SystemSettings, Theme};
use crate::audio::AudioSettings;
use crate::channel::ChannelLineup;
use crate::menu::{Menu, MenuItem};

fn on_off(value: bool) -> &'static str {
    if value {
        "On"
    } else {
        "Off"
    }
}

/// Render the settings menu overlay
pub fn render(
    frame: &mut Frame,
    area: Rect,
    menu: &Menu,
    lineup: &ChannelLineup,
    audio: &AudioSettings,
    system: &SystemSettings,
    theme: Theme,
) {
    let accent = theme.menu.color();
    let rect = super::popup_area(area, 56, MenuItem::ALL.len() as u16 + 4);

    let lines: Vec<Line> = MenuItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let value = match item {
                MenuItem::Channel => {
                    let channel = menu.channel();
                    format!(
                        "< {} > {}",
                        lineup.display_name(channel),
                        on_off(lineup.is_enabled(channel))
                    )
                }
                MenuItem::Stereo => on_off(audio.is_stereo).to_string(),
                MenuItem::MenuColor => theme.menu.label().to_string(),
                MenuItem::UiColor => theme.ui.label().to_string(),
                MenuItem::Channel3 => system.channel3_option.label().to_string(),
                MenuItem::ShowControls => on_off(system.show_controls_on_start).to_string(),
                MenuItem::StartOnBoot => on_off(system.start_on_pc_boot).to_string(),
                MenuItem::Reset | MenuItem::Exit => String::new(),
            };

            let style = if i == menu.selected_index() {
                Style::default().fg(Color::Black).bg(accent)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(format!(" {:<24}", item.label()), style.bold()),
                Span::styled(format!("{:<28}", value), style),
            ])
        })
        .collect();

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(" Menu ")
        .title_bottom(" w/s select  a/d change  Enter toggle  Esc close ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
