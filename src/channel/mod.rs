mod lineup;
mod manager;
mod music;
mod navigator;
mod runtime;

pub use lineup::ChannelLineup;
pub use manager::ChannelManager;
pub use music::{MusicChannel, VisualizerKind};
pub use navigator::{
    ChannelNavigator, NavEvent, NavPhase, BLACKOUT, DIGIT_DEBOUNCE_FULL, DIGIT_DEBOUNCE_PARTIAL,
    NUMBER_DISPLAY,
};
pub use runtime::{ChannelRuntime, Screen};

/// Lowest channel on the dial
pub const FIRST_CHANNEL: u8 = 3;
/// Highest channel on the dial
pub const LAST_CHANNEL: u8 = 44;
/// Number of channels on the dial
pub const CHANNEL_COUNT: u8 = LAST_CHANNEL - FIRST_CHANNEL + 1;

pub const GAMES_CHANNEL: u8 = 3;
pub const GUIDE_CHANNEL: u8 = 4;
pub const VIDEO_PLAYER_CHANNEL: u8 = 5;
pub const NO_CONTENT_CHANNEL: u8 = 6;
pub const MUSIC_CHANNEL: u8 = 44;

/// Maximum length of a user-assigned channel name
pub const MAX_NAME_LEN: usize = 6;

/// Behaviour class of a channel number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Games / emulation hub
    Games,
    Guide,
    VideoPlayer,
    NoContent,
    /// Audio-visualizer channel
    Music,
    /// Scheduled from the channel's folders
    Content,
}

impl ChannelKind {
    pub fn of(channel: u8) -> Self {
        match channel {
            GAMES_CHANNEL => ChannelKind::Games,
            GUIDE_CHANNEL => ChannelKind::Guide,
            VIDEO_PLAYER_CHANNEL => ChannelKind::VideoPlayer,
            NO_CONTENT_CHANNEL => ChannelKind::NoContent,
            MUSIC_CHANNEL => ChannelKind::Music,
            _ => ChannelKind::Content,
        }
    }

    /// Fixed-behaviour channel that bypasses playlist scheduling
    pub fn is_reserved(&self) -> bool {
        !matches!(self, ChannelKind::Content)
    }

    /// Reachable by navigation even when not in the enabled set
    pub fn is_always_reachable(&self) -> bool {
        matches!(
            self,
            ChannelKind::Games | ChannelKind::Guide | ChannelKind::VideoPlayer | ChannelKind::NoContent
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChannelKind::Games => "Games",
            ChannelKind::Guide => "TV Guide",
            ChannelKind::VideoPlayer => "Video Player",
            ChannelKind::NoContent => "No Content",
            ChannelKind::Music => "Music",
            ChannelKind::Content => "Content",
        }
    }
}

/// True if `channel` is on the dial
pub fn in_range(channel: u8) -> bool {
    (FIRST_CHANNEL..=LAST_CHANNEL).contains(&channel)
}

/// Every channel on the dial, in order
pub fn all_channels() -> impl Iterator<Item = u8> + Clone {
    FIRST_CHANNEL..=LAST_CHANNEL
}
