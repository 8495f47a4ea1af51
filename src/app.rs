use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::store::{keys, Store};

/// What channel 3 (the games hub) does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Channel3Option {
    /// Hub always active, keeps its place between visits
    #[default]
    Default,
    /// Hub reloads each time the channel is selected
    AlwaysLoad,
    /// Hub switched off
    TurnOff,
}

impl Channel3Option {
    pub const ALL: [Channel3Option; 3] = [
        Channel3Option::Default,
        Channel3Option::AlwaysLoad,
        Channel3Option::TurnOff,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Channel3Option::Default => "Channel 3 always active",
            Channel3Option::AlwaysLoad => "Channel 3 loads when selected",
            Channel3Option::TurnOff => "Channel 3 off",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Channel3Option::Default => Channel3Option::AlwaysLoad,
            Channel3Option::AlwaysLoad => Channel3Option::TurnOff,
            Channel3Option::TurnOff => Channel3Option::Default,
        }
    }
}

/// System options from the settings menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemSettings {
    pub channel3_option: Channel3Option,
    pub show_controls_on_start: bool,
    #[serde(rename = "startOnPCBoot")]
    pub start_on_pc_boot: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            channel3_option: Channel3Option::Default,
            show_controls_on_start: true,
            start_on_pc_boot: false,
        }
    }
}

impl SystemSettings {
    /// Load; start-on-boot also lives under its own key
    pub fn load(store: &Store) -> Self {
        let mut settings: SystemSettings = store.load(keys::SYSTEM_SETTINGS, Self::default());
        settings.start_on_pc_boot = store.load(keys::START_ON_BOOT, settings.start_on_pc_boot);
        settings
    }

    pub fn save(&self, store: &Store) {
        store.save(keys::SYSTEM_SETTINGS, self);
        store.save(keys::START_ON_BOOT, &self.start_on_pc_boot);
    }
}

/// Named UI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    Blue,
    Green,
    Red,
    Pink,
    Purple,
    Yellow,
    Orange,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 7] = [
        ThemeColor::Blue,
        ThemeColor::Green,
        ThemeColor::Red,
        ThemeColor::Pink,
        ThemeColor::Purple,
        ThemeColor::Yellow,
        ThemeColor::Orange,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ThemeColor::Blue => "blue",
            ThemeColor::Green => "green",
            ThemeColor::Red => "red",
            ThemeColor::Pink => "pink",
            ThemeColor::Purple => "purple",
            ThemeColor::Yellow => "yellow",
            ThemeColor::Orange => "orange",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            ThemeColor::Blue => Color::Blue,
            ThemeColor::Green => Color::Green,
            ThemeColor::Red => Color::Red,
            ThemeColor::Pink => Color::LightMagenta,
            ThemeColor::Purple => Color::Magenta,
            ThemeColor::Yellow => Color::Yellow,
            ThemeColor::Orange => Color::Indexed(208),
        }
    }

    /// Cycle forward or backward through the palette
    pub fn cycle(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let index = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        let next = if forward { index + 1 } else { index + len - 1 };
        Self::ALL[next % len]
    }
}

/// Menu and UI accent colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub menu: ThemeColor,
    pub ui: ThemeColor,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            menu: ThemeColor::Blue,
            ui: ThemeColor::Green,
        }
    }
}

impl Theme {
    pub fn load(store: &Store) -> Self {
        let defaults = Self::default();
        Self {
            menu: store.load(keys::MENU_COLOR, defaults.menu),
            ui: store.load(keys::UI_COLOR, defaults.ui),
        }
    }

    pub fn save(&self, store: &Store) {
        store.save(keys::MENU_COLOR, &self.menu);
        store.save(keys::UI_COLOR, &self.ui);
    }
}

/// State shared between the interactive loop and background tasks
pub struct AppState {
    /// Shutdown flag
    pub should_quit: Arc<AtomicBool>,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            should_quit: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Signal shutdown
    pub fn quit(&self) {
        self.should_quit.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown requested
    pub fn is_quitting(&self) -> bool {
        self.should_quit.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_defaults() {
        let settings = SystemSettings::load(&Store::in_memory());
        assert_eq!(settings.channel3_option, Channel3Option::Default);
        assert!(settings.show_controls_on_start);
        assert!(!settings.start_on_pc_boot);
    }

    #[test]
    fn test_channel3_option_wire_names() {
        let json = serde_json::to_value(Channel3Option::AlwaysLoad).unwrap();
        assert_eq!(json, "alwaysLoad");
        let parsed: Channel3Option = serde_json::from_value("turnOff".into()).unwrap();
        assert_eq!(parsed, Channel3Option::TurnOff);
    }

    #[test]
    fn test_start_on_boot_key_wins() {
        let store = Store::in_memory();
        SystemSettings::default().save(&store);
        store.save(keys::START_ON_BOOT, &true);
        assert!(SystemSettings::load(&store).start_on_pc_boot);
    }

    #[test]
    fn test_unknown_color_falls_back() {
        let store = Store::in_memory();
        store.save(keys::MENU_COLOR, &"teal");
        store.save(keys::UI_COLOR, &"orange");

        let theme = Theme::load(&store);
        assert_eq!(theme.menu, ThemeColor::Blue);
        assert_eq!(theme.ui, ThemeColor::Orange);
    }

    #[test]
    fn test_color_cycle_wraps() {
        assert_eq!(ThemeColor::Orange.cycle(true), ThemeColor::Blue);
        assert_eq!(ThemeColor::Blue.cycle(false), ThemeColor::Orange);
    }

    #[test]
    fn test_quit_flag() {
        let state = AppState::new();
        assert!(!state.is_quitting());
        state.quit();
        assert!(state.is_quitting());
    }
}
