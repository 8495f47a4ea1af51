use std::time::Instant;

use crossterm::event::KeyCode;
use tracing::debug;

use crate::audio::AudioBackend;
use crate::channel::{ChannelKind, GUIDE_CHANNEL};
use crate::session::{Session, SessionAction};

/// Overlay drawn above the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Controls,
    Menu,
    ExitConfirm,
}

impl Overlay {
    /// Overlays that silence the output while open
    fn mutes(&self) -> bool {
        matches!(self, Overlay::Menu | Overlay::ExitConfirm)
    }
}

/// What the caller has to do after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    None,
    Quit,
    LaunchHub(String),
}

/// Map one key press to session intents
pub fn handle_key<B: AudioBackend>(
    overlay: &mut Overlay,
    session: &mut Session<B>,
    key: KeyCode,
    now: Instant,
) -> Outcome {
    session.on_user_interaction();

    let outcome = match *overlay {
        Overlay::ExitConfirm => match key {
            KeyCode::Enter | KeyCode::Char('y') => Outcome::Quit,
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('q') => {
                *overlay = Overlay::None;
                Outcome::None
            }
            _ => Outcome::None,
        },
        Overlay::Menu => menu_key(overlay, session, key, now),
        Overlay::Controls => {
            // Any key hides the help; only its own keys stop there
            *overlay = Overlay::None;
            match key {
                KeyCode::Esc | KeyCode::Char('c') => Outcome::None,
                _ => channel_key(overlay, session, key, now),
            }
        }
        Overlay::None => channel_key(overlay, session, key, now),
    };

    session.set_menu_open(overlay.mutes());
    outcome
}

fn menu_key<B: AudioBackend>(
    overlay: &mut Overlay,
    session: &mut Session<B>,
    key: KeyCode,
    now: Instant,
) -> Outcome {
    match key {
        KeyCode::Esc | KeyCode::Char('m') => *overlay = Overlay::None,
        KeyCode::Up | KeyCode::Char('w') => session.menu_select(-1),
        KeyCode::Down | KeyCode::Char('s') => session.menu_select(1),
        KeyCode::Left | KeyCode::Char('a') => session.menu_adjust(false),
        KeyCode::Right | KeyCode::Char('d') => session.menu_adjust(true),
        KeyCode::Enter => {
            if let Some(SessionAction::ConfirmExit) = session.menu_confirm(now) {
                *overlay = Overlay::ExitConfirm;
            }
        }
        _ => {}
    }
    Outcome::None
}

fn channel_key<B: AudioBackend>(
    overlay: &mut Overlay,
    session: &mut Session<B>,
    key: KeyCode,
    now: Instant,
) -> Outcome {
    let kind = ChannelKind::of(session.current_channel());

    match key {
        KeyCode::Up => session.change_channel(1, now),
        KeyCode::Down => session.change_channel(-1, now),
        KeyCode::Right => session.change_volume(1, now),
        KeyCode::Left => session.change_volume(-1, now),
        KeyCode::Char('n') => session.toggle_mute(now),
        KeyCode::Char(c) if c.is_ascii_digit() => session.press_digit(c, now),
        KeyCode::Char('m') => *overlay = Overlay::Menu,
        KeyCode::Char('c') => *overlay = Overlay::Controls,
        KeyCode::Char('g') => session.jump_to(GUIDE_CHANNEL, now),
        KeyCode::Char('v') => session.next_visualizer(),
        KeyCode::Char(c @ ('w' | 's' | 'a' | 'd')) => {
            let (rows, slots) = match c {
                'w' => (-1, 0),
                's' => (1, 0),
                'a' => (0, -1),
                _ => (0, 1),
            };
            match kind {
                ChannelKind::Guide => session.guide_scroll(rows, slots),
                ChannelKind::Games => session.hub_select(rows),
                _ => {}
            }
        }
        KeyCode::Enter => match kind {
            ChannelKind::Guide => session.guide_select(now),
            ChannelKind::Games => {
                if let Some(SessionAction::LaunchHub(system)) = session.hub_confirm() {
                    debug!(%system, "Hub launch requested");
                    return Outcome::LaunchHub(system);
                }
            }
            _ => {}
        },
        KeyCode::Esc | KeyCode::Char('q') => *overlay = Overlay::ExitConfirm,
        _ => {}
    }
    Outcome::None
}
