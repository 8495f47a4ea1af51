use crate::channel::{in_range, FIRST_CHANNEL, LAST_CHANNEL};

/// Entries of the settings menu, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// Enable or disable one channel
    Channel,
    Stereo,
    MenuColor,
    UiColor,
    Channel3,
    ShowControls,
    StartOnBoot,
    Reset,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 9] = [
        MenuItem::Channel,
        MenuItem::Stereo,
        MenuItem::MenuColor,
        MenuItem::UiColor,
        MenuItem::Channel3,
        MenuItem::ShowControls,
        MenuItem::StartOnBoot,
        MenuItem::Reset,
        MenuItem::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Channel => "Channel",
            MenuItem::Stereo => "Stereo",
            MenuItem::MenuColor => "Menu color",
            MenuItem::UiColor => "UI color",
            MenuItem::Channel3 => "Channel 3",
            MenuItem::ShowControls => "Show controls on start",
            MenuItem::StartOnBoot => "Start on PC boot",
            MenuItem::Reset => "Reset all settings",
            MenuItem::Exit => "Exit",
        }
    }
}

/// Cursor state of the settings menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    selected: usize,
    channel: u8,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            selected: 0,
            channel: 7,
        }
    }
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Channel the Channel entry currently edits
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Move the cursor, wrapping
    pub fn select(&mut self, delta: i32) {
        let len = MenuItem::ALL.len() as i32;
        self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
    }

    /// Pick the channel the Channel entry edits, wrapping over the dial
    pub fn step_channel(&mut self, delta: i32) {
        let next = self.channel as i32 + delta;
        self.channel = if next > LAST_CHANNEL as i32 {
            FIRST_CHANNEL
        } else if next < FIRST_CHANNEL as i32 {
            LAST_CHANNEL
        } else {
            next as u8
        };
        debug_assert!(in_range(self.channel));
    }
}
