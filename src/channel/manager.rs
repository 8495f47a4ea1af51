use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::audio::{AudioBackend, AudioGraphManager, AudioSettings};
use crate::error::AudioError;
use crate::schedule::{Playlist, PlaylistBuilder, TimeOfDay};

use super::{ChannelKind, ChannelLineup, ChannelRuntime, MusicChannel, MUSIC_CHANNEL};

/// Output applied to every loaded element
#[derive(Debug, Clone, Copy, PartialEq)]
struct Output {
    volume: f32,
    muted: bool,
    stereo: bool,
}

/// Lazily loads channels on first visit and keeps them warm.
///
/// Exactly one channel is active at a time; the previous one is paused
/// before the next starts, so only one element is ever audible.
pub struct ChannelManager<B: AudioBackend> {
    graph: AudioGraphManager<B>,
    runtimes: BTreeMap<u8, ChannelRuntime>,
    music: Option<MusicChannel>,
    active: Option<u8>,
    period: TimeOfDay,
    output: Output,
}

impl<B: AudioBackend> ChannelManager<B> {
    pub fn new(graph: AudioGraphManager<B>, period: TimeOfDay) -> Self {
        let defaults = AudioSettings::default();
        Self {
            graph,
            runtimes: BTreeMap::new(),
            music: None,
            active: None,
            period,
            output: Output {
                volume: defaults.gain(),
                muted: defaults.is_muted,
                stereo: defaults.is_stereo,
            },
        }
    }

    /// Bring up the audio graph
    pub async fn init(&mut self) -> Result<(), AudioError> {
        self.graph.init().await
    }

    pub fn graph(&self) -> &AudioGraphManager<B> {
        &self.graph
    }

    pub fn on_user_interaction(&mut self) {
        self.graph.on_user_interaction();
    }

    pub fn active(&self) -> Option<u8> {
        self.active
    }

    pub fn period(&self) -> TimeOfDay {
        self.period
    }

    pub fn runtime(&self, channel: u8) -> Option<&ChannelRuntime> {
        self.runtimes.get(&channel)
    }

    pub fn music(&self) -> Option<&MusicChannel> {
        self.music.as_ref()
    }

    pub fn music_mut(&mut self) -> Option<&mut MusicChannel> {
        self.music.as_mut()
    }

    /// Channels with a loaded runtime, in order
    pub fn loaded_channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.runtimes.keys().copied()
    }

    /// Make `channel` the active one, loading it on first visit
    pub fn switch_to(&mut self, channel: u8, lineup: &ChannelLineup) {
        if let Some(previous) = self.active.filter(|p| *p != channel) {
            self.deactivate(previous);
        }
        self.active = Some(channel);

        match ChannelKind::of(channel) {
            ChannelKind::Content => {
                let output = self.output;
                let period = self.period;
                let runtime = self.runtimes.entry(channel).or_insert_with(|| {
                    let playlist = build_playlist(lineup, channel, period);
                    ChannelRuntime::new(channel, self.graph.create_element(), playlist)
                });
                runtime.apply_settings(output.volume, output.muted);
                runtime.apply_stereo(output.stereo);
                runtime.activate();
            }
            ChannelKind::Music => {
                if self.music.is_none() {
                    let songs = PlaylistBuilder::music(&lineup.folders(MUSIC_CHANNEL));
                    self.music = Some(MusicChannel::new(&mut self.graph, songs));
                }
                let output = self.output;
                if let Some(music) = self.music.as_mut() {
                    music.apply_settings(output.volume, output.muted);
                    music.apply_stereo(output.stereo);
                    music.activate();
                }
            }
            _ => debug!(channel, "Reserved channel has no media"),
        }
    }

    /// The blackout window on `channel` is over
    pub fn finish_transition(&mut self, channel: u8) {
        if let Some(runtime) = self.runtimes.get_mut(&channel) {
            runtime.finish_transition();
        }
    }

    /// Fan settings out to every loaded element. Unchanged values are not
    /// rewritten.
    pub fn apply_audio(&mut self, settings: AudioSettings, menu_open: bool) {
        self.output = Output {
            volume: settings.gain(),
            muted: settings.is_muted || menu_open,
            stereo: settings.is_stereo,
        };
        let output = self.output;

        for runtime in self.runtimes.values_mut() {
            runtime.apply_settings(output.volume, output.muted);
            runtime.apply_stereo(output.stereo);
        }
        if let Some(music) = self.music.as_mut() {
            music.apply_settings(output.volume, output.muted);
            music.apply_stereo(output.stereo);
        }
    }

    /// Rebuild every loaded playlist for a new time-of-day period
    pub fn set_period(&mut self, period: TimeOfDay, lineup: &ChannelLineup) {
        if period == self.period {
            return;
        }
        info!(%period, "Broadcast period changed");
        self.period = period;
        for (channel, runtime) in self.runtimes.iter_mut() {
            runtime.set_playlist(build_playlist(lineup, *channel, period));
        }
    }

    /// A channel's folders changed: rebuild it if loaded
    pub fn refresh_channel(&mut self, channel: u8, lineup: &ChannelLineup) {
        if channel == MUSIC_CHANNEL {
            if let Some(music) = self.music.as_mut() {
                music.set_songs(PlaylistBuilder::music(&lineup.folders(MUSIC_CHANNEL)));
            }
            return;
        }
        let period = self.period;
        if let Some(runtime) = self.runtimes.get_mut(&channel) {
            runtime.set_playlist(build_playlist(lineup, channel, period));
        }
    }

    /// Advance the active channel past finished items
    pub fn tick(&mut self) {
        match self.active {
            Some(MUSIC_CHANNEL) => {
                if let Some(music) = self.music.as_mut() {
                    music.poll();
                }
            }
            Some(channel) => {
                if let Some(runtime) = self.runtimes.get_mut(&channel) {
                    runtime.poll();
                }
            }
            None => {}
        }
    }

    /// Stop everything and release the audio context
    pub fn teardown(&mut self) {
        for runtime in self.runtimes.values_mut() {
            runtime.teardown();
        }
        if let Some(music) = self.music.as_mut() {
            music.teardown(&mut self.graph);
        }
        self.graph.cleanup();
        self.active = None;
        debug!("Channels torn down");
    }

    fn deactivate(&mut self, channel: u8) {
        if channel == MUSIC_CHANNEL {
            if let Some(music) = self.music.as_mut() {
                music.deactivate();
            }
        } else if let Some(runtime) = self.runtimes.get_mut(&channel) {
            runtime.deactivate();
        }
    }
}

fn build_playlist(lineup: &ChannelLineup, channel: u8, period: TimeOfDay) -> Playlist {
    PlaylistBuilder::build_with_rng(
        &lineup.folders(channel),
        period,
        channel,
        &mut rand::thread_rng(),
    )
}
