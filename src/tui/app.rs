use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::app::AppState;
use crate::audio::AudioBackend;
use crate::error::TuiError;
use crate::session::{ChannelView, Session};
use crate::tasks::WorkerCommand;
use crate::timer::Deadline;

use super::input::{handle_key, Outcome, Overlay};
use super::widgets::{channel_display, controls, guide, hub, menu, osd, screen, visualizer};

/// How long a status or error line stays in the footer
const STATUS_DURATION: Duration = Duration::from_secs(5);

struct Status {
    text: String,
    is_error: bool,
}

/// TUI application state
pub struct TuiApp {
    state: Arc<AppState>,
    cmd_tx: mpsc::Sender<WorkerCommand>,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    overlay: Overlay,
    status: Option<Status>,
    status_timer: Deadline,
}

impl TuiApp {
    /// Create a new TUI application
    pub fn new(
        state: Arc<AppState>,
        cmd_tx: mpsc::Sender<WorkerCommand>,
        show_controls: bool,
    ) -> Result<Self, TuiError> {
        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            state,
            cmd_tx,
            terminal,
            overlay: if show_controls {
                Overlay::Controls
            } else {
                Overlay::None
            },
            status: None,
            status_timer: Deadline::new(),
        })
    }

    /// Restore terminal state
    fn restore_terminal(&mut self) -> Result<(), TuiError> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Show a status line in the footer
    pub fn set_status(&mut self, message: String) {
        self.show(message, false);
    }

    /// Show an error line in the footer
    pub fn set_error(&mut self, message: String) {
        self.show(message, true);
    }

    fn show(&mut self, text: String, is_error: bool) {
        self.status = Some(Status { text, is_error });
        self.status_timer.arm(Instant::now(), STATUS_DURATION);
    }

    /// Draw the TUI
    pub fn draw<B: AudioBackend>(&mut self, session: &Session<B>) -> Result<(), TuiError> {
        let now = Instant::now();
        if self.status_timer.fire(now) {
            self.status = None;
        }

        let view = session.view();
        let theme = session.theme();
        let accent = theme.ui.color();
        let overlay = self.overlay;
        let status = self.status.as_ref();

        self.terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: header, body, footer
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Min(10),   // Screen
                    Constraint::Length(3), // Footer
                ])
                .split(area);

            render_header(frame, chunks[0], session, accent);

            let body = chunks[1];
            match &view {
                ChannelView::Games => hub::render(frame, body, session.hub(), accent),
                ChannelView::Guide => guide::render(
                    frame,
                    body,
                    session.guide(),
                    session.lineup(),
                    &Local::now(),
                    accent,
                ),
                ChannelView::Music => {
                    visualizer::render(frame, body, session.channels().music(), accent)
                }
                other => screen::render(frame, body, other, accent),
            }

            channel_display::render(frame, body, session.navigator(), session.lineup(), accent);

            let audio = session.audio_settings();
            if session.volume_visible() {
                osd::render_volume(frame, body, audio.volume, accent);
            } else if session.mute_visible() {
                osd::render_mute(frame, body, audio.is_muted, accent);
            }

            match overlay {
                Overlay::Controls => controls::render(frame, body, accent),
                Overlay::Menu => menu::render(
                    frame,
                    body,
                    session.menu(),
                    session.lineup(),
                    &audio,
                    session.system(),
                    theme,
                ),
                Overlay::ExitConfirm => controls::render_exit(frame, body, theme.menu.color()),
                Overlay::None => {}
            }

            render_footer(frame, chunks[2], status);
        })?;

        Ok(())
    }

    /// Handle keyboard input (non-blocking)
    pub async fn handle_input<B: AudioBackend>(
        &mut self,
        session: &mut Session<B>,
    ) -> Result<bool, TuiError> {
        // Poll for events with a short timeout
        if !event::poll(Duration::from_millis(10))? {
            return Ok(false);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(false);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        match handle_key(&mut self.overlay, session, key.code, Instant::now()) {
            Outcome::Quit => {
                info!("Quit requested");
                self.state.quit();
                let _ = self.cmd_tx.send(WorkerCommand::Quit).await;
                return Ok(true);
            }
            Outcome::LaunchHub(system) => {
                self.set_status(format!("Starting {}...", system));
                let _ = self.cmd_tx.send(WorkerCommand::LaunchHub(system)).await;
            }
            Outcome::None => {}
        }

        Ok(false)
    }

    /// Run cleanup on drop
    pub fn cleanup(&mut self) {
        if let Err(e) = self.restore_terminal() {
            error!(error = %e, "Failed to restore terminal");
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Render the header bar
fn render_header<B: AudioBackend>(frame: &mut Frame, area: Rect, session: &Session<B>, accent: Color) {
    let channel = session.current_channel();
    let audio = session.audio_settings();
    let sound = if audio.is_muted {
        String::from("MUTE")
    } else {
        format!("VOL {}", audio.volume)
    };

    let title = Line::from(vec![
        Span::styled(" channelsurf ", Style::default().bold().fg(accent)),
        Span::raw("| "),
        Span::styled(session.lineup().display_name(channel), Style::default().fg(Color::White)),
        Span::raw(" | "),
        Span::styled(sound, Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled(
            Local::now().format("%-I:%M %p").to_string(),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(title).block(block).centered();
    frame.render_widget(paragraph, area);
}

/// Render the footer with controls
fn render_footer(frame: &mut Frame, area: Rect, status: Option<&Status>) {
    let controls = match status {
        Some(Status { text, is_error: true }) => Line::from(vec![
            Span::styled("Error: ", Style::default().fg(Color::Red)),
            Span::styled(text.as_str(), Style::default().fg(Color::Red)),
        ]),
        Some(Status { text, .. }) => Line::from(Span::styled(text.as_str(), Style::default().fg(Color::Yellow))),
        None => Line::from(vec![
            Span::styled("Up/Down", Style::default().fg(Color::Yellow)),
            Span::raw(":channel  "),
            Span::styled("Left/Right", Style::default().fg(Color::Yellow)),
            Span::raw(":volume  "),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(":mute  "),
            Span::styled("g", Style::default().fg(Color::Yellow)),
            Span::raw(":guide  "),
            Span::styled("m", Style::default().fg(Color::Yellow)),
            Span::raw(":menu  "),
            Span::styled("c", Style::default().fg(Color::Yellow)),
            Span::raw(":controls  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(":quit"),
        ]),
    };

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(controls).block(block).centered();
    frame.render_widget(paragraph, area);
}
