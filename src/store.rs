use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::StoreError;

/// File holding every persisted key
const STATE_FILE: &str = "state.json";

/// Keys used by the application
pub mod keys {
    pub const AUDIO_SETTINGS: &str = "audioSettings";
    pub const MENU_COLOR: &str = "menuColor";
    pub const UI_COLOR: &str = "uiColor";
    pub const CHANNEL_NAMES: &str = "channelNames";
    pub const CHANNEL_FOLDERS: &str = "channelFolders";
    pub const ENABLED_CHANNELS: &str = "enabledChannels";
    pub const SYSTEM_SETTINGS: &str = "systemSettings";
    pub const START_ON_BOOT: &str = "startOnPCBoot";
}

/// Key/value persistence backed by a single JSON document.
///
/// `load` never fails: a missing key, a corrupt file or a value of the
/// wrong shape all fall back to the caller's default. `save` never fails
/// outward either; problems are logged and the in-memory value still wins.
pub struct Store {
    path: Option<PathBuf>,
    values: RwLock<Map<String, Value>>,
}

impl Store {
    /// Open (or create) the store in `dir`
    pub fn open(dir: &Path) -> Self {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(path = ?dir, error = %e, "Failed to create data directory");
        }

        let path = dir.join(STATE_FILE);
        let values = match read_document(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = ?path, error = %e, "Ignoring unreadable state file");
                Map::new()
            }
        };

        debug!(path = ?path, keys = values.len(), "Opened store");

        Self {
            path: Some(path),
            values: RwLock::new(values),
        }
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: RwLock::new(Map::new()),
        }
    }

    /// Default data directory
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("channelsurf")
    }

    /// Load `key`, falling back to `default` when missing or malformed
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let values = self.values.read();
        let Some(value) = values.get(key) else {
            debug!(key, "No saved value, using default");
            return default;
        };

        match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(key, error = %e, "Malformed saved value, using default");
                default
            }
        }
    }

    /// Save `value` under `key` and flush to disk
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize value");
                return;
            }
        };

        let mut values = self.values.write();
        values.insert(key.to_string(), value);
        self.flush(&values);
    }

    /// Forget every saved key
    pub fn reset(&self) {
        let mut values = self.values.write();
        values.clear();
        self.flush(&values);
        debug!("Store reset");
    }

    fn flush(&self, values: &Map<String, Value>) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_document(path, values) {
            warn!(path = ?path, error = %e, "Failed to write state file");
        }
    }
}

fn read_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    Ok(serde_json::from_str(&text)?)
}

fn write_document(path: &Path, values: &Map<String, Value>) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(values)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_key_returns_default() {
        let store = Store::in_memory();
        assert_eq!(store.load("menuColor", String::from("blue")), "blue");
    }

    #[test]
    fn test_type_mismatch_returns_default() {
        let store = Store::in_memory();
        store.save("volume", &"loud");
        assert_eq!(store.load("volume", 50u8), 50);
    }

    #[test]
    fn test_nested_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut names = BTreeMap::new();
        names.insert(7u8, String::from("NEWS"));

        {
            let store = Store::open(dir.path());
            store.save(keys::CHANNEL_NAMES, &names);
        }

        let store = Store::open(dir.path());
        let loaded: BTreeMap<u8, String> = store.load(keys::CHANNEL_NAMES, BTreeMap::new());
        assert_eq!(loaded, names);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), "{ not json").unwrap();

        let store = Store::open(dir.path());
        assert!(store.load(keys::START_ON_BOOT, true));
    }

    #[test]
    fn test_reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        store.save(keys::MENU_COLOR, &"red");
        store.reset();

        let reopened = Store::open(dir.path());
        assert_eq!(reopened.load(keys::MENU_COLOR, String::from("blue")), "blue");
    }
}
