use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders};

use crate::audio::FFT_SIZE;
use crate::channel::{MusicChannel, VisualizerKind};

/// Render the music channel visualizer
pub fn render(frame: &mut Frame, area: Rect, music: Option<&MusicChannel>, accent: Color) {
    let kind = music.map(|m| m.visualizer()).unwrap_or(VisualizerKind::Bars);
    let title = match music.and_then(|m| m.now_playing()) {
        Some(song) => format!(" {} | {} ", song.title(), kind.label()),
        None => format!(" No music | {} ", kind.label()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let analyser = music.and_then(|m| m.analyser());
    let frequencies = analyser
        .map(|a| a.frequency_data())
        .unwrap_or_else(|| vec![0; FFT_SIZE / 2]);

    match kind {
        VisualizerKind::Bars => {
            let count = (area.width.saturating_sub(2) / 2).max(1) as usize;
            let bars: Vec<Bar> = downsample(&frequencies, count)
                .into_iter()
                .map(|v| {
                    Bar::default()
                        .value(u64::from(v))
                        .text_value(String::new())
                        .style(Style::default().fg(accent))
                })
                .collect();
            let chart = BarChart::default()
                .block(block)
                .bar_width(1)
                .bar_gap(1)
                .max(255)
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(chart, area);
        }
        VisualizerKind::Oscilloscope => {
            let samples = analyser
                .map(|a| a.time_domain_data())
                .unwrap_or_else(|| vec![128; FFT_SIZE]);
            let points: Vec<(f64, f64)> = samples
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, (f64::from(*v) - 128.0) / 128.0))
                .collect();
            let width = samples.len() as f64;

            let canvas = Canvas::default()
                .block(block)
                .marker(Marker::Braille)
                .x_bounds([0.0, width])
                .y_bounds([-1.0, 1.0])
                .paint(move |ctx| {
                    for pair in points.windows(2) {
                        ctx.draw(&CanvasLine {
                            x1: pair[0].0,
                            y1: pair[0].1,
                            x2: pair[1].0,
                            y2: pair[1].1,
                            color: accent,
                        });
                    }
                });
            frame.render_widget(canvas, area);
        }
        VisualizerKind::Mirror => {
            let count = area.width.saturating_sub(2).max(1) as usize;
            let levels = downsample(&frequencies, count);
            let half = levels.len() as f64;

            let canvas = Canvas::default()
                .block(block)
                .marker(Marker::Braille)
                .x_bounds([-half, half])
                .y_bounds([-1.0, 1.0])
                .paint(move |ctx| {
                    for (i, level) in levels.iter().enumerate() {
                        let h = f64::from(*level) / 255.0;
                        let x = i as f64;
                        for x in [x, -x] {
                            ctx.draw(&CanvasLine {
                                x1: x,
                                y1: -h,
                                x2: x,
                                y2: h,
                                color: accent,
                            });
                        }
                    }
                });
            frame.render_widget(canvas, area);
        }
    }
}

/// Average `data` into `count` buckets, low frequencies first
fn downsample(data: &[u8], count: usize) -> Vec<u8> {
    if data.is_empty() || count == 0 {
        return Vec::new();
    }
    let count = count.min(data.len());
    let chunk = data.len() / count;
    data.chunks(chunk)
        .take(count)
        .map(|c| (c.iter().map(|v| u32::from(*v)).sum::<u32>() / c.len() as u32) as u8)
        .collect()
}
