use tracing::{debug, info, instrument, warn};

use crate::playback::MediaElement;
use crate::schedule::{ItemRole, Playlist};

/// What a channel puts on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Blackout,
    /// Nothing scheduled (or nothing playable): static noise
    OffAir,
    Playing {
        title: String,
        role: ItemRole,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Loaded {
    Nothing,
    Item(usize),
    Static,
}

/// Playback progress for one loaded content channel.
///
/// Owns its element for life. Inactive runtimes stay paused on their
/// current item and keep receiving volume and mute updates.
pub struct ChannelRuntime {
    channel: u8,
    element: Box<dyn MediaElement>,
    playlist: Playlist,
    index: usize,
    loaded: Loaded,
    active: bool,
    transitioning: bool,
    error: Option<String>,
    applied_volume: Option<f32>,
    applied_muted: Option<bool>,
    applied_stereo: Option<bool>,
}

impl ChannelRuntime {
    pub fn new(channel: u8, element: Box<dyn MediaElement>, playlist: Playlist) -> Self {
        debug!(channel, items = playlist.len(), "Channel loaded");
        Self {
            channel,
            element,
            playlist,
            index: 0,
            loaded: Loaded::Nothing,
            active: false,
            transitioning: false,
            error: None,
            applied_volume: None,
            applied_muted: None,
            applied_stereo: None,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Last playback failure, shown on screen until something plays
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_media(&self) -> bool {
        !self.playlist.is_empty()
    }

    /// Swap in a rebuilt playlist and start from its first item
    pub fn set_playlist(&mut self, playlist: Playlist) {
        debug!(channel = self.channel, items = playlist.len(), "Playlist replaced");
        self.playlist = playlist;
        self.index = 0;
        self.loaded = Loaded::Nothing;
        self.element.clear();
        if self.active {
            self.start_current();
        }
    }

    /// Channel became the visible one: resume where it left off, or start
    #[instrument(skip(self), fields(channel = self.channel))]
    pub fn activate(&mut self) {
        self.active = true;
        self.transitioning = true;
        match self.loaded {
            Loaded::Nothing => self.start_current(),
            Loaded::Item(_) | Loaded::Static => self.play(),
        }
    }

    /// Channel left the screen: pause in place
    pub fn deactivate(&mut self) {
        self.active = false;
        self.transitioning = false;
        self.element.pause();
    }

    /// Blackout over, show the picture
    pub fn finish_transition(&mut self) {
        self.transitioning = false;
    }

    /// Advance to the next item, wrapping at the end
    pub fn on_item_ended(&mut self) {
        if self.playlist.is_empty() {
            if self.loaded != Loaded::Static {
                self.loaded = Loaded::Nothing;
                self.start_current();
            }
            return;
        }

        self.index = (self.index + 1) % self.playlist.len();
        self.loaded = Loaded::Nothing;
        if self.active {
            self.start_current();
        }
    }

    /// Detect end of item; call from the event loop
    pub fn poll(&mut self) {
        if self.active && self.element.is_ended() {
            self.on_item_ended();
        }
    }

    /// Apply volume and mute, writing only what changed
    pub fn apply_settings(&mut self, volume: f32, muted: bool) {
        if self.applied_volume != Some(volume) {
            self.element.set_volume(volume);
            self.applied_volume = Some(volume);
        }
        if self.applied_muted != Some(muted) {
            self.element.set_muted(muted);
            self.applied_muted = Some(muted);
        }
    }

    pub fn apply_stereo(&mut self, stereo: bool) {
        if self.applied_stereo != Some(stereo) {
            self.element.set_stereo(stereo);
            self.applied_stereo = Some(stereo);
        }
    }

    pub fn screen(&self) -> Screen {
        if self.transitioning {
            return Screen::Blackout;
        }
        match self.loaded {
            Loaded::Item(index) => match self.playlist.get(index) {
                Some(item) => Screen::Playing {
                    title: item.title().to_string(),
                    role: item.role,
                    index,
                    len: self.playlist.len(),
                },
                None => Screen::OffAir,
            },
            Loaded::Nothing | Loaded::Static => Screen::OffAir,
        }
    }

    /// Stop and release the loaded media
    pub fn teardown(&mut self) {
        self.element.pause();
        self.element.clear();
        self.loaded = Loaded::Nothing;
        self.active = false;
        self.transitioning = false;
    }

    /// Load the current item and play it. Items that fail to load are
    /// skipped; if none loads the channel falls back to static.
    fn start_current(&mut self) {
        let len = self.playlist.len();
        for _ in 0..len {
            let Some(item) = self.playlist.get(self.index) else {
                break;
            };
            match self.element.load(&item.uri) {
                Ok(()) => {
                    info!(channel = self.channel, index = self.index, uri = %item.uri, "Playing");
                    self.loaded = Loaded::Item(self.index);
                    self.error = None;
                    self.play();
                    return;
                }
                Err(e) => {
                    warn!(channel = self.channel, error = %e, "Skipping unplayable item");
                    self.error = Some(e.to_string());
                    self.index = (self.index + 1) % len;
                }
            }
        }

        debug!(channel = self.channel, "Off air");
        self.element.load_static();
        self.loaded = Loaded::Static;
        self.play();
    }

    fn play(&mut self) {
        if let Err(e) = self.element.play() {
            warn!(channel = self.channel, error = %e, "Playback failed to start");
            self.error = Some(e.to_string());
        }
    }
}

impl Drop for ChannelRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::playback::fake::{ElementLog, FakeElement};
    use crate::playback::NullElement;
    use crate::schedule::{FolderSelection, PlaylistBuilder};

    fn playlist(uris: &[&str]) -> Playlist {
        let mut folders = FolderSelection::default();
        folders.morning = uris.iter().map(|u| u.to_string()).collect();
        PlaylistBuilder::music(&folders)
    }

    fn runtime(uris: &[&str], failing: &[&str]) -> (ChannelRuntime, Arc<Mutex<ElementLog>>) {
        let mut element = FakeElement::new();
        element.failing = failing.iter().map(|u| u.to_string()).collect();
        let log = Arc::clone(&element.log);
        (ChannelRuntime::new(10, Box::new(element), playlist(uris)), log)
    }

    #[test]
    fn test_activate_plays_first_item() {
        let (mut rt, log) = runtime(&["a.mp4", "b.mp4"], &[]);
        rt.activate();

        assert_eq!(log.lock().loaded, vec!["a.mp4"]);
        assert!(log.lock().playing);
        assert_eq!(rt.screen(), Screen::Blackout);

        rt.finish_transition();
        assert!(matches!(rt.screen(), Screen::Playing { index: 0, len: 2, .. }));
    }

    #[test]
    fn test_items_advance_and_wrap() {
        let (mut rt, log) = runtime(&["a.mp4", "b.mp4"], &[]);
        rt.activate();

        for _ in 0..2 {
            log.lock().ended = true;
            rt.poll();
        }

        assert_eq!(log.lock().loaded, vec!["a.mp4", "b.mp4", "a.mp4"]);
        assert_eq!(rt.index(), 0);
    }

    #[test]
    fn test_empty_playlist_is_off_air() {
        let (mut rt, log) = runtime(&[], &[]);
        rt.activate();
        rt.finish_transition();

        assert_eq!(rt.screen(), Screen::OffAir);
        assert_eq!(log.lock().static_loads, 1);
        assert!(rt.error().is_none());

        rt.on_item_ended();
        assert_eq!(log.lock().static_loads, 1, "static keeps looping");
    }

    #[test]
    fn test_unplayable_items_are_skipped() {
        let (mut rt, log) = runtime(&["bad.mp4", "good.mp4"], &["bad.mp4"]);
        rt.activate();

        assert_eq!(log.lock().loaded, vec!["good.mp4"]);
        assert_eq!(rt.index(), 1);
        assert!(rt.error().is_none(), "error clears once something plays");
    }

    #[test]
    fn test_nothing_playable_falls_back_to_static() {
        let (mut rt, log) = runtime(&["bad.mp4"], &["bad.mp4"]);
        rt.activate();
        rt.finish_transition();

        assert_eq!(rt.screen(), Screen::OffAir);
        assert_eq!(log.lock().static_loads, 1);
        assert!(rt.error().unwrap().contains("bad.mp4"));
    }

    #[test]
    fn test_play_failure_is_reported_not_fatal() {
        let mut rt = ChannelRuntime::new(10, Box::new(NullElement::new()), playlist(&["a.mp4"]));
        rt.activate();
        assert_eq!(rt.error(), Some("No audio device available"));

        rt.deactivate();
        rt.activate();
        assert!(rt.is_active());
    }

    #[test]
    fn test_reactivation_resumes_without_reload() {
        let (mut rt, log) = runtime(&["a.mp4", "b.mp4"], &[]);
        rt.activate();
        rt.deactivate();
        assert!(!log.lock().playing);

        rt.activate();
        let log = log.lock();
        assert_eq!(log.loaded.len(), 1);
        assert!(log.playing);
    }

    #[test]
    fn test_settings_skip_unchanged_writes() {
        let (mut rt, log) = runtime(&["a.mp4"], &[]);

        // Inactive channels still follow settings
        rt.apply_settings(0.5, false);
        rt.apply_settings(0.5, false);
        rt.apply_settings(0.5, true);

        let log = log.lock();
        assert_eq!(log.volume_writes, vec![0.5]);
        assert_eq!(log.mute_writes, vec![false, true]);
    }

    #[test]
    fn test_new_playlist_restarts_active_channel() {
        let (mut rt, log) = runtime(&["a.mp4", "b.mp4"], &[]);
        rt.activate();
        log.lock().ended = true;
        rt.poll();

        rt.set_playlist(playlist(&["night.mp4"]));

        assert_eq!(rt.index(), 0);
        assert_eq!(log.lock().loaded.last().map(String::as_str), Some("night.mp4"));
    }

    #[test]
    fn test_emptied_playlist_holds_at_static() {
        let (mut rt, log) = runtime(&["a.mp4", "b.mp4"], &[]);
        rt.activate();
        rt.finish_transition();

        rt.set_playlist(Playlist::empty());

        assert_eq!(rt.screen(), Screen::OffAir);
        assert_eq!(log.lock().static_loads, 1);

        rt.on_item_ended();
        assert_eq!(log.lock().static_loads, 1);
    }

    #[test]
    fn test_inactive_channel_does_not_advance() {
        let (mut rt, log) = runtime(&["a.mp4", "b.mp4"], &[]);
        log.lock().ended = true;
        rt.poll();
        assert_eq!(rt.index(), 0);
        assert!(log.lock().loaded.is_empty());
    }
}
