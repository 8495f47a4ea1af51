use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::store::{keys, Store};

pub const MAX_VOLUME: u8 = 100;

/// Process-wide audio settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioSettings {
    pub volume: u8,
    pub is_muted: bool,
    pub is_stereo: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 50,
            is_muted: false,
            is_stereo: true,
        }
    }
}

impl AudioSettings {
    /// Volume as an output gain
    pub fn gain(&self) -> f32 {
        f32::from(self.volume) / f32::from(MAX_VOLUME)
    }
}

/// Single owner of the audio settings.
///
/// Readers subscribe to a watch channel; writers go through `toggle_mute`,
/// `change_volume` or `replace`. Every real change is persisted.
pub struct SharedAudioSettings {
    tx: watch::Sender<AudioSettings>,
    store: Arc<Store>,
}

impl SharedAudioSettings {
    /// Load from the store. Audio never starts muted.
    pub fn load(store: Arc<Store>) -> Self {
        let mut settings: AudioSettings = store.load(keys::AUDIO_SETTINGS, AudioSettings::default());
        settings.volume = settings.volume.min(MAX_VOLUME);
        settings.is_muted = false;
        let (tx, _) = watch::channel(settings);
        Self { tx, store }
    }

    pub fn get(&self) -> AudioSettings {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AudioSettings> {
        self.tx.subscribe()
    }

    pub fn toggle_mute(&self) -> AudioSettings {
        self.update(|s| s.is_muted = !s.is_muted)
    }

    /// Add `delta` to the volume, clamped to 0..=100
    pub fn change_volume(&self, delta: i32) -> AudioSettings {
        self.update(|s| {
            let volume = (i32::from(s.volume) + delta).clamp(0, i32::from(MAX_VOLUME));
            s.volume = volume as u8;
        })
    }

    pub fn replace(&self, settings: AudioSettings) -> AudioSettings {
        self.update(|s| {
            *s = AudioSettings {
                volume: settings.volume.min(MAX_VOLUME),
                ..settings
            }
        })
    }

    fn update(&self, f: impl FnOnce(&mut AudioSettings)) -> AudioSettings {
        let changed = self.tx.send_if_modified(|settings| {
            let before = *settings;
            f(settings);
            *settings != before
        });

        let settings = self.get();
        if changed {
            debug!(
                volume = settings.volume,
                muted = settings.is_muted,
                stereo = settings.is_stereo,
                "Audio settings changed"
            );
            self.store.save(keys::AUDIO_SETTINGS, &settings);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SharedAudioSettings {
        SharedAudioSettings::load(Arc::new(Store::in_memory()))
    }

    #[test]
    fn test_defaults() {
        let settings = shared().get();
        assert_eq!(settings, AudioSettings::default());
        assert_eq!(settings.volume, 50);
        assert!(settings.is_stereo);
    }

    #[test]
    fn test_volume_clamps_at_both_ends() {
        let settings = shared();
        settings.replace(AudioSettings {
            volume: 5,
            ..AudioSettings::default()
        });
        for _ in 0..10 {
            settings.change_volume(-1);
            assert!(settings.get().volume <= 5);
        }
        assert_eq!(settings.get().volume, 0);

        for _ in 0..150 {
            settings.change_volume(1);
        }
        assert_eq!(settings.get().volume, 100);
    }

    #[test]
    fn test_subscribers_see_changes_only() {
        let settings = shared();
        let mut rx = settings.subscribe();

        settings.change_volume(0);
        assert!(!rx.has_changed().unwrap(), "no-op change must not notify");

        settings.toggle_mute();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_muted);
    }

    #[test]
    fn test_persisted_but_never_loads_muted() {
        let store = Arc::new(Store::in_memory());
        let settings = SharedAudioSettings::load(Arc::clone(&store));
        settings.toggle_mute();
        settings.change_volume(-20);

        let saved: AudioSettings = store.load(keys::AUDIO_SETTINGS, AudioSettings::default());
        assert!(saved.is_muted);
        assert_eq!(saved.volume, 30);

        let reloaded = SharedAudioSettings::load(store).get();
        assert!(!reloaded.is_muted);
        assert_eq!(reloaded.volume, 30);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(AudioSettings::default()).unwrap();
        assert_eq!(json["volume"], 50);
        assert_eq!(json["isMuted"], false);
        assert_eq!(json["isStereo"], true);
    }
}
