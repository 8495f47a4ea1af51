use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::schedule::{Bucket, FolderSelection};
use crate::store::{keys, Store};

use super::{all_channels, in_range, ChannelKind, MAX_NAME_LEN};

/// The dial: which channels are enabled, what they are called and what
/// media they are scheduled from. Channels are never created or destroyed,
/// only toggled and edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLineup {
    enabled: BTreeSet<u8>,
    names: BTreeMap<u8, String>,
    folders: BTreeMap<u8, FolderSelection>,
}

impl Default for ChannelLineup {
    fn default() -> Self {
        Self {
            enabled: all_channels().collect(),
            names: BTreeMap::new(),
            folders: BTreeMap::new(),
        }
    }
}

impl ChannelLineup {
    /// Load from the store, defaulting every piece independently
    pub fn load(store: &Store) -> Self {
        let enabled: Vec<u8> = store.load(keys::ENABLED_CHANNELS, all_channels().collect());
        let names: BTreeMap<u8, String> = store.load(keys::CHANNEL_NAMES, BTreeMap::new());
        let folders: BTreeMap<u8, FolderSelection> =
            store.load(keys::CHANNEL_FOLDERS, BTreeMap::new());

        Self {
            enabled: enabled.into_iter().filter(|c| in_range(*c)).collect(),
            names: names
                .into_iter()
                .filter(|(c, _)| in_range(*c))
                .map(|(c, n)| (c, clamp_name(&n)))
                .collect(),
            folders: folders.into_iter().filter(|(c, _)| in_range(*c)).collect(),
        }
    }

    pub fn save_enabled(&self, store: &Store) {
        let enabled: Vec<u8> = self.enabled.iter().copied().collect();
        store.save(keys::ENABLED_CHANNELS, &enabled);
    }

    pub fn save_names(&self, store: &Store) {
        store.save(keys::CHANNEL_NAMES, &self.names);
    }

    pub fn save_folders(&self, store: &Store) {
        store.save(keys::CHANNEL_FOLDERS, &self.folders);
    }

    pub fn enabled(&self) -> &BTreeSet<u8> {
        &self.enabled
    }

    pub fn is_enabled(&self, channel: u8) -> bool {
        self.enabled.contains(&channel)
    }

    pub fn set_enabled(&mut self, channel: u8, enabled: bool) {
        if !in_range(channel) {
            return;
        }
        if enabled {
            self.enabled.insert(channel);
        } else {
            self.enabled.remove(&channel);
        }
        debug!(channel, enabled, "Channel toggled");
    }

    /// User-assigned name, if any
    pub fn name(&self, channel: u8) -> Option<&str> {
        self.names.get(&channel).map(String::as_str)
    }

    /// Set a custom name (capped length); blank clears it
    pub fn set_name(&mut self, channel: u8, name: &str) {
        let name = clamp_name(name);
        if name.is_empty() {
            self.names.remove(&channel);
        } else {
            self.names.insert(channel, name);
        }
    }

    /// Two-digit number plus label, as shown on screen and in the guide
    pub fn display_name(&self, channel: u8) -> String {
        let number = format!("{:02}", channel);
        match ChannelKind::of(channel) {
            ChannelKind::NoContent => number,
            ChannelKind::Content => match self.name(channel) {
                Some(name) => format!("{} {}", number, name),
                None => number,
            },
            kind => format!("{} {}", number, kind.label()),
        }
    }

    /// Folders for a channel; all six buckets present even if never assigned
    pub fn folders(&self, channel: u8) -> FolderSelection {
        self.folders.get(&channel).cloned().unwrap_or_default()
    }

    pub fn append(&mut self, channel: u8, bucket: Bucket, uris: Vec<String>) {
        debug!(channel, bucket = bucket.label(), count = uris.len(), "Appending media");
        self.folders.entry(channel).or_default().append(bucket, uris);
    }

    pub fn clear_bucket(&mut self, channel: u8, bucket: Bucket) {
        if let Some(folders) = self.folders.get_mut(&channel) {
            folders.bucket_mut(bucket).clear();
            if folders.is_empty() {
                self.folders.remove(&channel);
            }
        }
    }
}

fn clamp_name(name: &str) -> String {
    name.trim().chars().take(MAX_NAME_LEN).collect()
}
