use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::audio::{Analyser, AudioBackend, AudioGraphManager};
use crate::playback::MediaElement;
use crate::schedule::{Playlist, PlaylistItem};

/// Visualizer styles for the music channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizerKind {
    Bars,
    Oscilloscope,
    Mirror,
}

impl VisualizerKind {
    pub const ALL: [VisualizerKind; 3] = [
        VisualizerKind::Bars,
        VisualizerKind::Oscilloscope,
        VisualizerKind::Mirror,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VisualizerKind::Bars => "Bars",
            VisualizerKind::Oscilloscope => "Oscilloscope",
            VisualizerKind::Mirror => "Mirror",
        }
    }

    /// A random style other than `self`
    pub fn other<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let choices: Vec<VisualizerKind> =
            Self::ALL.iter().copied().filter(|v| *v != self).collect();
        choices.choose(rng).copied().unwrap_or(self)
    }
}

/// The audio-visualizer channel: random songs from a flat list, played
/// through the analysis graph.
pub struct MusicChannel {
    element: Box<dyn MediaElement>,
    analyser: Option<Analyser>,
    songs: Playlist,
    current: Option<usize>,
    visualizer: VisualizerKind,
    active: bool,
    error: Option<String>,
    applied_volume: Option<f32>,
    applied_muted: Option<bool>,
    applied_stereo: Option<bool>,
}

impl MusicChannel {
    /// Create the channel's element and connect it to the graph. Without a
    /// running graph the channel still plays, but visualizers stay idle.
    pub fn new<B: AudioBackend>(graph: &mut AudioGraphManager<B>, songs: Playlist) -> Self {
        let mut element = graph.create_element();
        let analyser = match graph.connect(element.as_mut()) {
            Ok(analyser) => Some(analyser),
            Err(e) => {
                warn!(error = %e, "Visualizers disabled");
                None
            }
        };

        let visualizer = *VisualizerKind::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&VisualizerKind::Bars);

        debug!(songs = songs.len(), visualizer = visualizer.label(), "Music channel loaded");

        Self {
            element,
            analyser,
            songs,
            current: None,
            visualizer,
            active: false,
            error: None,
            applied_volume: None,
            applied_muted: None,
            applied_stereo: None,
        }
    }

    pub fn analyser(&self) -> Option<&Analyser> {
        self.analyser.as_ref()
    }

    pub fn visualizer(&self) -> VisualizerKind {
        self.visualizer
    }

    pub fn next_visualizer(&mut self) {
        self.visualizer = self.visualizer.other(&mut rand::thread_rng());
        debug!(visualizer = self.visualizer.label(), "Visualizer switched");
    }

    pub fn now_playing(&self) -> Option<&PlaylistItem> {
        self.current.and_then(|i| self.songs.get(i))
    }

    pub fn songs(&self) -> &Playlist {
        &self.songs
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_songs(&mut self, songs: Playlist) {
        self.songs = songs;
        self.current = None;
        self.element.clear();
        if self.active {
            self.play_random();
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
        if self.current.is_some() {
            self.play();
        } else {
            self.play_random();
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.element.pause();
    }

    /// Pick a new song when the current one ends
    pub fn poll(&mut self) {
        if self.active && self.element.is_ended() {
            self.play_random();
        }
    }

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

    /// Stop playback and remove the element's edge from the graph
    pub fn teardown<B: AudioBackend>(&mut self, graph: &mut AudioGraphManager<B>) {
        self.element.pause();
        self.element.clear();
        graph.disconnect(self.element.as_mut());
        self.analyser = None;
        self.current = None;
        self.active = false;
    }

    /// Load a random song, trying the others if it fails
    fn play_random(&mut self) {
        let mut order: Vec<usize> = (0..self.songs.len()).collect();
        order.shuffle(&mut rand::thread_rng());

        for index in order {
            let Some(song) = self.songs.get(index) else {
                continue;
            };
            match self.element.load(&song.uri) {
                Ok(()) => {
                    info!(song = song.title(), "Now playing");
                    self.current = Some(index);
                    self.error = None;
                    self.visualizer = self.visualizer.other(&mut rand::thread_rng());
                    self.play();
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unplayable song");
                    self.error = Some(e.to_string());
                }
            }
        }

        self.current = None;
        self.element.clear();
    }

    fn play(&mut self) {
        if let Err(e) = self.element.play() {
            warn!(error = %e, "Music playback failed to start");
            self.error = Some(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::fake::FakeBackend;
    use crate::schedule::{FolderSelection, PlaylistBuilder};

    fn songs(uris: &[&str]) -> Playlist {
        let mut folders = FolderSelection::default();
        folders.morning = uris.iter().map(|u| u.to_string()).collect();
        PlaylistBuilder::music(&folders)
    }

    fn graph(backend: &FakeBackend) -> AudioGraphManager<FakeBackend> {
        let mut graph = AudioGraphManager::new(backend.clone());
        tokio_test::block_on(graph.init()).unwrap();
        graph
    }

    #[test]
    fn test_other_visualizer_always_differs() {
        let mut rng = rand::thread_rng();
        for kind in VisualizerKind::ALL {
            for _ in 0..50 {
                assert_ne!(kind.other(&mut rng), kind);
            }
        }
    }

    #[test]
    fn test_connected_on_creation() {
        let backend = FakeBackend::default();
        let mut graph = graph(&backend);
        let music = MusicChannel::new(&mut graph, songs(&["a.mp3"]));

        assert!(music.analyser().is_some());
        assert_eq!(graph.edge_count(), 1);
        assert!(backend.script.lock().elements[0].lock().tapped);
    }

    #[test]
    fn test_without_graph_visualizers_are_idle() {
        let mut graph = AudioGraphManager::new(FakeBackend::default());
        let mut music = MusicChannel::new(&mut graph, songs(&["a.mp3"]));
        music.activate();

        assert!(music.analyser().is_none());
        assert!(music.error().is_some(), "silent element reports its failure");
    }

    #[test]
    fn test_each_song_changes_visualizer() {
        let backend = FakeBackend::default();
        let mut graph = graph(&backend);
        let mut music = MusicChannel::new(&mut graph, songs(&["a.mp3", "b.mp3", "c.mp3"]));

        music.activate();
        let log = std::sync::Arc::clone(&backend.script.lock().elements[0]);
        for _ in 0..20 {
            let before = music.visualizer();
            log.lock().ended = true;
            music.poll();
            assert_ne!(music.visualizer(), before);
            assert!(music.now_playing().is_some());
        }
        assert_eq!(log.lock().loaded.len(), 21);
    }

    #[test]
    fn test_no_songs_stays_silent() {
        let backend = FakeBackend::default();
        let mut graph = graph(&backend);
        let mut music = MusicChannel::new(&mut graph, Playlist::empty());
        music.activate();

        assert!(music.now_playing().is_none());
        assert_eq!(backend.script.lock().elements[0].lock().plays, 0);
    }

    #[test]
    fn test_teardown_disconnects() {
        let backend = FakeBackend::default();
        let mut graph = graph(&backend);
        let mut music = MusicChannel::new(&mut graph, songs(&["a.mp3"]));
        let analyser = music.analyser().cloned();
        music.activate();

        music.teardown(&mut graph);

        assert_eq!(graph.edge_count(), 0);
        assert!(analyser.is_some_and(|a| !a.is_connected()));
        assert!(!backend.script.lock().elements[0].lock().playing);
    }
}
