use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::app::{Channel3Option, SystemSettings, Theme, ThemeColor};
use crate::audio::{AudioBackend, AudioGraphManager, AudioSettings, SharedAudioSettings};
use crate::channel::{
    all_channels, ChannelKind, ChannelLineup, ChannelManager, ChannelNavigator, NavEvent, Screen,
    GAMES_CHANNEL, MUSIC_CHANNEL,
};
use crate::guide::Guide;
use crate::hub::{GamesHub, HubAction};
use crate::menu::{Menu, MenuItem};
use crate::schedule::{Bucket, TimeOfDay};
use crate::store::Store;
use crate::timer::Deadline;

/// How long the volume and mute displays stay up
pub const OSD_DURATION: Duration = Duration::from_millis(3000);

/// Requests the session cannot fulfil itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Start the games hub for a system
    LaunchHub(String),
    /// Ask before quitting
    ConfirmExit,
}

/// What the main area shows for the current channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelView {
    Blackout,
    Games,
    /// Channel 3 switched off in settings
    GamesOff,
    Guide,
    VideoPlayer,
    NoContent,
    Music,
    Content { screen: Screen, error: Option<String> },
}

/// The running TV: every intent from the keyboard ends up here.
pub struct Session<B: AudioBackend> {
    store: Arc<Store>,
    lineup: ChannelLineup,
    system: SystemSettings,
    theme: Theme,
    audio: SharedAudioSettings,
    audio_rx: watch::Receiver<AudioSettings>,
    navigator: ChannelNavigator,
    channels: ChannelManager<B>,
    guide: Guide,
    hub: GamesHub,
    menu: Menu,
    menu_open: bool,
    volume_osd: Deadline,
    mute_osd: Deadline,
    shut_down: bool,
}

impl<B: AudioBackend> Session<B> {
    /// Load persisted state and tune to `start_channel` (the guide if it is
    /// not reachable). Nothing plays until `start`.
    pub fn new(store: Arc<Store>, backend: B, start_channel: u8, period: TimeOfDay) -> Self {
        let lineup = ChannelLineup::load(&store);
        let system = SystemSettings::load(&store);
        let theme = Theme::load(&store);
        let audio = SharedAudioSettings::load(Arc::clone(&store));
        let audio_rx = audio.subscribe();
        let navigator = ChannelNavigator::new(start_channel, lineup.enabled().clone());
        let channels = ChannelManager::new(AudioGraphManager::new(backend), period);

        Self {
            store,
            lineup,
            system,
            theme,
            audio,
            audio_rx,
            navigator,
            channels,
            guide: Guide::new(),
            hub: GamesHub::new(),
            menu: Menu::new(),
            menu_open: false,
            volume_osd: Deadline::new(),
            mute_osd: Deadline::new(),
            shut_down: false,
        }
    }

    /// Bring up audio and start the first channel. Audio failure is logged
    /// and the session carries on silent.
    #[instrument(skip(self))]
    pub async fn start(&mut self) {
        if let Err(e) = self.channels.init().await {
            warn!(error = %e, "Starting without audio");
        }
        let settings = self.audio.get();
        self.channels.apply_audio(settings, self.menu_open);
        let channel = self.navigator.current();
        self.tune(channel);
        self.channels.finish_transition(channel);
        info!(channel, "Session started");
    }

    pub fn current_channel(&self) -> u8 {
        self.navigator.current()
    }

    pub fn navigator(&self) -> &ChannelNavigator {
        &self.navigator
    }

    pub fn channels(&self) -> &ChannelManager<B> {
        &self.channels
    }

    pub fn lineup(&self) -> &ChannelLineup {
        &self.lineup
    }

    pub fn system(&self) -> &SystemSettings {
        &self.system
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn audio_settings(&self) -> AudioSettings {
        self.audio.get()
    }

    pub fn guide(&self) -> &Guide {
        &self.guide
    }

    pub fn hub(&self) -> &GamesHub {
        &self.hub
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn volume_visible(&self) -> bool {
        self.volume_osd.is_armed()
    }

    pub fn mute_visible(&self) -> bool {
        self.mute_osd.is_armed()
    }

    /// Any key press; lets a suspended audio context resume
    pub fn on_user_interaction(&mut self) {
        self.channels.on_user_interaction();
    }

    pub fn change_channel(&mut self, delta: i32, now: Instant) {
        let event = self.navigator.step(delta, now);
        self.handle_nav(event);
    }

    pub fn jump_to(&mut self, channel: u8, now: Instant) {
        let event = self.navigator.jump(channel, now);
        self.handle_nav(event);
    }

    pub fn press_digit(&mut self, digit: char, now: Instant) {
        self.navigator.press_digit(digit, now);
    }

    pub fn clear_digits(&mut self) {
        self.navigator.clear_digits();
    }

    /// Volume key. While muted the key unmutes instead.
    pub fn change_volume(&mut self, delta: i32, now: Instant) {
        if self.audio.get().is_muted {
            self.toggle_mute(now);
            return;
        }
        self.audio.change_volume(delta);
        self.mute_osd.cancel();
        self.volume_osd.arm(now, OSD_DURATION);
        self.sync_audio();
    }

    pub fn toggle_mute(&mut self, now: Instant) {
        self.audio.toggle_mute();
        self.volume_osd.cancel();
        self.mute_osd.arm(now, OSD_DURATION);
        self.sync_audio();
    }

    pub fn toggle_stereo(&mut self) {
        let settings = self.audio.get();
        self.audio.replace(AudioSettings {
            is_stereo: !settings.is_stereo,
            ..settings
        });
        self.sync_audio();
    }

    /// Open or close the menu overlay; output is muted while it is open
    pub fn set_menu_open(&mut self, open: bool) {
        if self.menu_open == open {
            return;
        }
        self.menu_open = open;
        self.channels.apply_audio(self.audio.get(), open);
    }

    pub fn toggle_channel_enabled(&mut self, channel: u8, now: Instant) {
        let enabled = !self.lineup.is_enabled(channel);
        self.lineup.set_enabled(channel, enabled);
        self.lineup.save_enabled(&self.store);
        let event = self.navigator.set_enabled(self.lineup.enabled().clone(), now);
        self.handle_nav(event);
    }

    /// Append media to a channel's bucket and rebuild it if loaded
    pub fn add_media(&mut self, channel: u8, bucket: Bucket, uris: Vec<String>) {
        self.lineup.append(channel, bucket, uris);
        self.lineup.save_folders(&self.store);
        self.channels.refresh_channel(channel, &self.lineup);
    }

    pub fn set_period(&mut self, period: TimeOfDay) {
        self.channels.set_period(period, &self.lineup);
    }

    pub fn set_menu_color(&mut self, color: ThemeColor) {
        self.theme.menu = color;
        self.theme.save(&self.store);
    }

    pub fn set_ui_color(&mut self, color: ThemeColor) {
        self.theme.ui = color;
        self.theme.save(&self.store);
    }

    pub fn set_system(&mut self, system: SystemSettings) {
        self.system = system;
        self.system.save(&self.store);
    }

    pub fn next_visualizer(&mut self) {
        if let Some(music) = self.channels.music_mut() {
            music.next_visualizer();
        }
    }

    pub fn guide_scroll(&mut self, rows: i32, slots: i32) {
        self.guide.scroll_rows(rows);
        self.guide.scroll_time(slots);
    }

    /// Tune to the channel highlighted in the guide
    pub fn guide_select(&mut self, now: Instant) {
        let target = self.guide.highlighted();
        self.jump_to(target, now);
    }

    pub fn hub_select(&mut self, delta: i32) {
        if self.system.channel3_option != Channel3Option::TurnOff {
            self.hub.select(delta);
        }
    }

    pub fn hub_confirm(&mut self) -> Option<SessionAction> {
        if self.system.channel3_option == Channel3Option::TurnOff {
            return None;
        }
        match self.hub.confirm() {
            Some(HubAction::Launch(system)) => Some(SessionAction::LaunchHub(system)),
            None => None,
        }
    }

    pub fn menu_select(&mut self, delta: i32) {
        self.menu.select(delta);
    }

    /// Left/right on the selected menu entry
    pub fn menu_adjust(&mut self, forward: bool) {
        let delta = if forward { 1 } else { -1 };
        match self.menu.selected() {
            MenuItem::Channel => self.menu.step_channel(delta),
            MenuItem::MenuColor => self.set_menu_color(self.theme.menu.cycle(forward)),
            MenuItem::UiColor => self.set_ui_color(self.theme.ui.cycle(forward)),
            MenuItem::Channel3 => {
                let mut system = self.system;
                system.channel3_option = system.channel3_option.next();
                self.set_system(system);
            }
            _ => {}
        }
    }

    /// Enter on the selected menu entry
    pub fn menu_confirm(&mut self, now: Instant) -> Option<SessionAction> {
        match self.menu.selected() {
            MenuItem::Channel => {
                let channel = self.menu.channel();
                self.toggle_channel_enabled(channel, now);
            }
            MenuItem::Stereo => self.toggle_stereo(),
            MenuItem::MenuColor | MenuItem::UiColor | MenuItem::Channel3 => self.menu_adjust(true),
            MenuItem::ShowControls => {
                let mut system = self.system;
                system.show_controls_on_start = !system.show_controls_on_start;
                self.set_system(system);
            }
            MenuItem::StartOnBoot => {
                let mut system = self.system;
                system.start_on_pc_boot = !system.start_on_pc_boot;
                self.set_system(system);
            }
            MenuItem::Reset => self.reset(now),
            MenuItem::Exit => return Some(SessionAction::ConfirmExit),
        }
        None
    }

    /// Forget every persisted setting and return to defaults
    pub fn reset(&mut self, now: Instant) {
        info!("Resetting all settings");
        self.store.reset();
        self.lineup = ChannelLineup::default();
        self.system = SystemSettings::default();
        self.theme = Theme::default();
        self.audio.replace(AudioSettings::default());
        self.hub = GamesHub::new();

        let loaded: Vec<u8> = self.channels.loaded_channels().collect();
        for channel in loaded {
            self.channels.refresh_channel(channel, &self.lineup);
        }
        self.channels.refresh_channel(MUSIC_CHANNEL, &self.lineup);

        let all: BTreeSet<u8> = all_channels().collect();
        let event = self.navigator.set_enabled(all, now);
        self.handle_nav(event);
        self.sync_audio();
    }

    /// What to draw in the main area
    pub fn view(&self) -> ChannelView {
        if self.navigator.is_blacked_out() {
            return ChannelView::Blackout;
        }
        let channel = self.navigator.current();
        match ChannelKind::of(channel) {
            ChannelKind::Games if self.system.channel3_option == Channel3Option::TurnOff => {
                ChannelView::GamesOff
            }
            ChannelKind::Games => ChannelView::Games,
            ChannelKind::Guide => ChannelView::Guide,
            ChannelKind::VideoPlayer => ChannelView::VideoPlayer,
            ChannelKind::NoContent => ChannelView::NoContent,
            ChannelKind::Music => ChannelView::Music,
            ChannelKind::Content => match self.channels.runtime(channel) {
                Some(runtime) => ChannelView::Content {
                    screen: runtime.screen(),
                    error: runtime.error().map(str::to_string),
                },
                None => ChannelView::Content {
                    screen: Screen::OffAir,
                    error: None,
                },
            },
        }
    }

    /// Run due timers and keep playback moving. Call every frame.
    pub fn tick(&mut self, now: Instant) {
        for event in self.navigator.poll(now) {
            self.handle_nav(Some(event));
        }
        self.volume_osd.fire(now);
        self.mute_osd.fire(now);
        self.sync_audio();
        self.channels.tick();
    }

    /// Stop all playback and release audio
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.channels.teardown();
        info!("Session shut down");
    }

    fn handle_nav(&mut self, event: Option<NavEvent>) {
        match event {
            Some(NavEvent::ChannelChanged { from, to }) => {
                debug!(from, to, "Tuning");
                self.tune(to);
            }
            Some(NavEvent::BlackoutEnded(channel)) => self.channels.finish_transition(channel),
            None => {}
        }
    }

    fn tune(&mut self, channel: u8) {
        if channel == GAMES_CHANNEL {
            self.hub.on_visit(self.system.channel3_option);
        }
        self.channels.switch_to(channel, &self.lineup);
    }

    /// Push settings changes out to every loaded channel
    fn sync_audio(&mut self) {
        if self.audio_rx.has_changed().unwrap_or(false) {
            let settings = *self.audio_rx.borrow_and_update();
            self.channels.apply_audio(settings, self.menu_open);
        }
    }
}

impl<B: AudioBackend> Drop for Session<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BLACKOUT;
    use crate::playback::fake::FakeBackend;

    fn session(backend: &FakeBackend, start: u8) -> Session<FakeBackend> {
        let store = Arc::new(Store::in_memory());
        let mut lineup = ChannelLineup::default();
        lineup.append(10, Bucket::Morning, vec!["show.mp4".into()]);
        lineup.save_folders(&store);

        let mut session = Session::new(store, backend.clone(), start, TimeOfDay::Morning);
        tokio_test::block_on(session.start());
        session
    }

    #[test]
    fn test_change_goes_through_blackout() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 9);
        let now = Instant::now();

        session.change_channel(1, now);
        assert_eq!(session.current_channel(), 10);
        assert_eq!(session.view(), ChannelView::Blackout);

        session.tick(now + BLACKOUT);
        match session.view() {
            ChannelView::Content { screen: Screen::Playing { title, .. }, error } => {
                assert_eq!(title, "show.mp4");
                assert!(error.is_none());
            }
            other => panic!("expected content, got {:?}", other),
        }
    }

    #[test]
    fn test_volume_key_while_muted_unmutes() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 4);
        let now = Instant::now();

        session.toggle_mute(now);
        assert!(session.audio_settings().is_muted);
        assert!(session.mute_visible());

        session.change_volume(1, now);
        let settings = session.audio_settings();
        assert!(!settings.is_muted);
        assert_eq!(settings.volume, 50, "volume unchanged by the unmuting press");

        session.change_volume(1, now);
        assert_eq!(session.audio_settings().volume, 51);
        assert!(session.volume_visible() && !session.mute_visible());

        session.tick(now + OSD_DURATION);
        assert!(!session.volume_visible());
    }

    #[test]
    fn test_menu_mutes_output_without_touching_settings() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 10);

        session.set_menu_open(true);
        assert!(!session.audio_settings().is_muted);
        let log = std::sync::Arc::clone(&backend.script.lock().elements[0]);
        assert_eq!(log.lock().mute_writes.last(), Some(&true));

        session.set_menu_open(false);
        assert_eq!(log.lock().mute_writes.last(), Some(&false));
    }

    #[test]
    fn test_disabling_current_channel_moves_on() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 10);
        let now = Instant::now();

        session.toggle_channel_enabled(10, now);

        assert_eq!(session.current_channel(), 11);
        assert!(!session.lineup().is_enabled(10));
    }

    #[test]
    fn test_games_off_view() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 3);
        assert_eq!(session.view(), ChannelView::Games);

        let mut system = *session.system();
        system.channel3_option = Channel3Option::TurnOff;
        session.set_system(system);

        assert_eq!(session.view(), ChannelView::GamesOff);
        assert_eq!(session.hub_confirm(), None);
    }

    #[test]
    fn test_hub_launch_request() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 3);
        session.hub_select(1);
        assert_eq!(
            session.hub_confirm(),
            Some(SessionAction::LaunchHub("Game Boy Color".into()))
        );
    }

    #[test]
    fn test_guide_enter_tunes_highlighted_channel() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 4);
        let now = Instant::now();

        // Highlight 10 (row after the top row)
        session.guide_scroll(6, 0);
        session.guide_select(now);

        assert_eq!(session.current_channel(), 10);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 4);
        let now = Instant::now();
        session.change_volume(-30, now);
        session.set_menu_color(ThemeColor::Red);
        session.toggle_channel_enabled(12, now);

        session.reset(now);

        assert_eq!(session.audio_settings(), AudioSettings::default());
        assert_eq!(session.theme(), Theme::default());
        assert!(session.lineup().is_enabled(12));
        assert!(session.lineup().folders(10).is_empty());
    }

    #[test]
    fn test_shutdown_silences_everything() {
        let backend = FakeBackend::default();
        let mut session = session(&backend, 10);
        session.shutdown();

        let script = backend.script.lock();
        assert!(script.elements.iter().all(|e| !e.lock().playing));
        assert_eq!(script.closes, 1);
    }
}
