use crate::app::Channel3Option;

/// Systems offered by the games hub
pub const SYSTEMS: [&str; 11] = [
    "Game Boy Advance",
    "Game Boy Color",
    "Game Boy",
    "Nintendo 64",
    "SEGA Genesis",
    "Nintendo Entertainment System",
    "PlayStation Portable",
    "Super Nintendo Entertainment System",
    "PlayStation",
    "MAME",
    "DVD/VHS Player",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubView {
    /// Scrolling list of systems
    Systems,
    /// Page of the selected system
    System,
}

/// Something the hub wants done outside itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubAction {
    Launch(String),
}

/// The games hub on channel 3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamesHub {
    selected: usize,
    view: HubView,
}

impl Default for GamesHub {
    fn default() -> Self {
        Self {
            selected: 0,
            view: HubView::Systems,
        }
    }
}

impl GamesHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_system(&self) -> &'static str {
        SYSTEMS[self.selected % SYSTEMS.len()]
    }

    pub fn view(&self) -> HubView {
        self.view
    }

    /// Systems around the selection: previous, selected, next
    pub fn carousel(&self) -> [&'static str; 3] {
        let len = SYSTEMS.len();
        [
            SYSTEMS[(self.selected + len - 1) % len],
            SYSTEMS[self.selected],
            SYSTEMS[(self.selected + 1) % len],
        ]
    }

    /// Move the selection, wrapping; ignored on a system page
    pub fn select(&mut self, delta: i32) {
        if self.view != HubView::Systems {
            return;
        }
        let len = SYSTEMS.len() as i32;
        self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
    }

    /// Enter: open the selected system, or go back to the list
    pub fn confirm(&mut self) -> Option<HubAction> {
        match self.view {
            HubView::Systems => {
                self.view = HubView::System;
                Some(HubAction::Launch(self.selected_system().to_string()))
            }
            HubView::System => {
                self.view = HubView::Systems;
                None
            }
        }
    }

    /// Channel 3 was tuned in
    pub fn on_visit(&mut self, option: Channel3Option) {
        if option == Channel3Option::AlwaysLoad {
            *self = Self::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        let mut hub = GamesHub::new();
        hub.select(-1);
        assert_eq!(hub.selected_system(), "DVD/VHS Player");
        hub.select(1);
        assert_eq!(hub.selected_system(), "Game Boy Advance");
        assert_eq!(hub.carousel()[0], "DVD/VHS Player");
    }

    #[test]
    fn test_enter_toggles_system_page() {
        let mut hub = GamesHub::new();
        hub.select(3);

        assert_eq!(hub.confirm(), Some(HubAction::Launch("Nintendo 64".into())));
        assert_eq!(hub.view(), HubView::System);

        hub.select(1);
        assert_eq!(hub.selected(), 3, "selection is frozen on a system page");

        assert_eq!(hub.confirm(), None);
        assert_eq!(hub.view(), HubView::Systems);
    }

    #[test]
    fn test_visit_behaviour_follows_option() {
        let mut hub = GamesHub::new();
        hub.select(2);

        hub.on_visit(Channel3Option::Default);
        assert_eq!(hub.selected(), 2);

        hub.on_visit(Channel3Option::AlwaysLoad);
        assert_eq!(hub.selected(), 0);
    }
}
