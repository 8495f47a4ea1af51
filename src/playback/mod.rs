mod engine;
mod source;

pub use engine::{list_audio_devices, AudioDevice, RodioBackend, RodioContext, SinkElement};
pub use source::{OutputRoute, StaticNoise, TapSource};

use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio::SampleTap;
use crate::error::PlaybackError;

/// Identity of a media element, stable for its lifetime
pub type ElementId = u64;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh element id
pub fn next_element_id() -> ElementId {
    NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A player for one media item at a time.
///
/// `load` replaces whatever was loaded and leaves the element paused;
/// `play` starts (or resumes) output. A tap, when set, receives a mono copy
/// of everything the element outputs.
pub trait MediaElement {
    fn id(&self) -> ElementId;

    fn load(&mut self, uri: &str) -> Result<(), PlaybackError>;

    /// Load the off-air static loop
    fn load_static(&mut self);

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Stop and drop the loaded item
    fn clear(&mut self);

    /// Output volume, 0.0 to 1.0
    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);

    fn set_stereo(&mut self, stereo: bool);

    /// True once a loaded item has played to the end
    fn is_ended(&self) -> bool;

    fn set_tap(&mut self, tap: Option<SampleTap>);
}

/// Element used when no output device could be opened. Everything is a
/// no-op except `play`, which reports the missing device.
pub struct NullElement {
    id: ElementId,
}

impl NullElement {
    pub fn new() -> Self {
        Self {
            id: next_element_id(),
        }
    }
}

impl Default for NullElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for NullElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn load(&mut self, _uri: &str) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn load_static(&mut self) {}

    fn play(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::NoDevice)
    }

    fn pause(&mut self) {}

    fn clear(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn set_muted(&mut self, _muted: bool) {}

    fn set_stereo(&mut self, _stereo: bool) {}

    fn is_ended(&self) -> bool {
        false
    }

    fn set_tap(&mut self, _tap: Option<SampleTap>) {}
}

/// In-memory element and backend for exercising the channel machinery
/// without an audio device.
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::audio::{AudioBackend, AudioContext, ContextState};
    use crate::error::AudioError;

    /// Everything an element was asked to do, shared with the test
    #[derive(Debug, Default)]
    pub struct ElementLog {
        pub loaded: Vec<String>,
        pub static_loads: usize,
        pub plays: usize,
        pub pauses: usize,
        pub clears: usize,
        pub volume_writes: Vec<f32>,
        pub mute_writes: Vec<bool>,
        pub stereo: Option<bool>,
        pub playing: bool,
        pub ended: bool,
        pub tapped: bool,
    }

    pub struct FakeElement {
        id: ElementId,
        pub log: Arc<Mutex<ElementLog>>,
        /// URIs that fail to load
        pub failing: Vec<String>,
        current: Option<String>,
    }

    impl FakeElement {
        pub fn new() -> Self {
            Self {
                id: next_element_id(),
                log: Arc::new(Mutex::new(ElementLog::default())),
                failing: Vec::new(),
                current: None,
            }
        }
    }

    impl MediaElement for FakeElement {
        fn id(&self) -> ElementId {
            self.id
        }

        fn load(&mut self, uri: &str) -> Result<(), PlaybackError> {
            if self.failing.iter().any(|f| f == uri) {
                return Err(PlaybackError::Decode {
                    uri: uri.to_string(),
                    reason: String::from("unsupported"),
                });
            }
            let mut log = self.log.lock();
            log.loaded.push(uri.to_string());
            log.playing = false;
            log.ended = false;
            self.current = Some(uri.to_string());
            Ok(())
        }

        fn load_static(&mut self) {
            let mut log = self.log.lock();
            log.static_loads += 1;
            log.ended = false;
            self.current = Some(String::from("static"));
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            if self.current.is_none() {
                return Err(PlaybackError::NothingLoaded);
            }
            let mut log = self.log.lock();
            log.plays += 1;
            log.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            let mut log = self.log.lock();
            log.pauses += 1;
            log.playing = false;
        }

        fn clear(&mut self) {
            let mut log = self.log.lock();
            log.clears += 1;
            log.playing = false;
            self.current = None;
        }

        fn set_volume(&mut self, volume: f32) {
            self.log.lock().volume_writes.push(volume);
        }

        fn set_muted(&mut self, muted: bool) {
            self.log.lock().mute_writes.push(muted);
        }

        fn set_stereo(&mut self, stereo: bool) {
            self.log.lock().stereo = Some(stereo);
        }

        fn is_ended(&self) -> bool {
            self.log.lock().ended
        }

        fn set_tap(&mut self, tap: Option<SampleTap>) {
            self.log.lock().tapped = tap.is_some();
        }
    }

    /// How the fake context behaves
    #[derive(Debug, Default)]
    pub struct BackendScript {
        /// Number of `create_context` calls that fail before one succeeds
        pub failures_before_success: u32,
        pub start_suspended: bool,
        pub resume_fails: bool,
        pub created: u32,
        pub resumes: u32,
        pub closes: u32,
        /// Logs of every element handed out, in creation order
        pub elements: Vec<Arc<Mutex<ElementLog>>>,
    }

    #[derive(Clone, Default)]
    pub struct FakeBackend {
        pub script: Arc<Mutex<BackendScript>>,
    }

    pub struct FakeContext {
        state: ContextState,
        script: Arc<Mutex<BackendScript>>,
    }

    impl AudioBackend for FakeBackend {
        type Context = FakeContext;

        fn create_context(&mut self) -> Result<FakeContext, AudioError> {
            let mut script = self.script.lock();
            if script.failures_before_success > 0 {
                script.failures_before_success -= 1;
                return Err(AudioError::ContextCreation(String::from("device busy")));
            }
            script.created += 1;
            let state = if script.start_suspended {
                ContextState::Suspended
            } else {
                ContextState::Running
            };
            Ok(FakeContext {
                state,
                script: Arc::clone(&self.script),
            })
        }
    }

    impl AudioContext for FakeContext {
        fn state(&self) -> ContextState {
            self.state
        }

        fn resume(&mut self) -> Result<(), AudioError> {
            let mut script = self.script.lock();
            script.resumes += 1;
            if script.resume_fails {
                return Err(AudioError::Resume(String::from("not allowed")));
            }
            self.state = ContextState::Running;
            Ok(())
        }

        fn close(&mut self) {
            self.script.lock().closes += 1;
            self.state = ContextState::Closed;
        }

        fn create_element(&self) -> Result<Box<dyn MediaElement>, PlaybackError> {
            let element = FakeElement::new();
            self.script.lock().elements.push(Arc::clone(&element.log));
            Ok(Box::new(element))
        }
    }
}
