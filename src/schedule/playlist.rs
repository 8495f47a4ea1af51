use chrono::{DateTime, TimeZone};
use rand::Rng;
use tracing::{debug, warn};

use crate::channel::ChannelKind;

use super::{Bucket, FolderSelection, TimeOfDay};

/// Commercials spliced in after each show: uniformly 1..=MAX
const MAX_COMMERCIALS_PER_BREAK: usize = 3;

/// What kind of media an item is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Music,
}

/// Where an item sits in the broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRole {
    Intro,
    Show,
    Commercial,
    Outro,
    Song,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub kind: MediaKind,
    pub role: ItemRole,
    pub uri: String,
}

impl PlaylistItem {
    fn video(role: ItemRole, uri: &str) -> Self {
        Self {
            kind: MediaKind::Video,
            role,
            uri: uri.to_string(),
        }
    }

    /// File name for display
    pub fn title(&self) -> &str {
        let trimmed = self.uri.trim_end_matches(['/', '\\']);
        trimmed
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(trimmed)
    }
}

/// Ordered, finite broadcast for one channel. Rebuilt, never restarted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    items: Vec<PlaylistItem>,
}

impl Playlist {
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }
}

impl FromIterator<PlaylistItem> for Playlist {
    fn from_iter<I: IntoIterator<Item = PlaylistItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Builds a channel's playlist from its folders and the time of day
pub struct PlaylistBuilder;

impl PlaylistBuilder {
    /// Build the playlist for `channel` at `timestamp`
    pub fn build<Tz: TimeZone>(
        folders: &FolderSelection,
        timestamp: &DateTime<Tz>,
        channel: u8,
    ) -> Playlist {
        let period = TimeOfDay::classify(timestamp);
        Self::build_with_rng(folders, period, channel, &mut rand::thread_rng())
    }

    /// Build with an explicit period and random source.
    ///
    /// Layout: optional intro, the period's shows in uniformly random order
    /// with 1-3 random commercials after each show, optional outro.
    pub fn build_with_rng<R: Rng + ?Sized>(
        folders: &FolderSelection,
        period: TimeOfDay,
        channel: u8,
        rng: &mut R,
    ) -> Playlist {
        if ChannelKind::of(channel).is_reserved() {
            return Playlist::empty();
        }

        let shows = folders.slot(period);
        if shows.is_empty() {
            debug!(channel, %period, "No content for period");
            return Playlist::empty();
        }

        let mut items = Vec::with_capacity(shows.len() * 3 + 2);

        if let Some(intro) = pick(&folders.intros, rng) {
            push_checked(&mut items, ItemRole::Intro, intro, channel, period);
        }

        let mut order: Vec<&String> = shows.iter().collect();
        shuffle(&mut order, rng);

        for show in order {
            push_checked(&mut items, ItemRole::Show, show, channel, period);

            if !folders.commercials.is_empty() {
                let count = rng.gen_range(1..=MAX_COMMERCIALS_PER_BREAK);
                for _ in 0..count {
                    if let Some(ad) = pick(&folders.commercials, rng) {
                        push_checked(&mut items, ItemRole::Commercial, ad, channel, period);
                    }
                }
            }
        }

        if let Some(outro) = pick(&folders.outros, rng) {
            push_checked(&mut items, ItemRole::Outro, outro, channel, period);
        }

        debug!(channel, %period, items = items.len(), "Built playlist");
        Playlist { items }
    }

    /// Flat song list for the music channel (its morning bucket)
    pub fn music(folders: &FolderSelection) -> Playlist {
        folders
            .bucket(Bucket::Morning)
            .iter()
            .filter(|uri| !uri.trim().is_empty())
            .map(|uri| PlaylistItem {
                kind: MediaKind::Music,
                role: ItemRole::Song,
                uri: uri.clone(),
            })
            .collect()
    }
}

/// Uniform in-place Fisher-Yates shuffle
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

fn pick<'a, R: Rng + ?Sized>(bucket: &'a [String], rng: &mut R) -> Option<&'a String> {
    if bucket.is_empty() {
        None
    } else {
        Some(&bucket[rng.gen_range(0..bucket.len())])
    }
}

fn push_checked(
    items: &mut Vec<PlaylistItem>,
    role: ItemRole,
    uri: &str,
    channel: u8,
    period: TimeOfDay,
) {
    if uri.trim().is_empty() {
        warn!(channel, %period, ?role, "Skipping empty media URI");
        return;
    }
    items.push(PlaylistItem::video(role, uri));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{GAMES_CHANNEL, GUIDE_CHANNEL, MUSIC_CHANNEL, NO_CONTENT_CHANNEL, VIDEO_PLAYER_CHANNEL};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn uris(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/media/{prefix}{i}.mp4")).collect()
    }

    fn full_folders() -> FolderSelection {
        FolderSelection {
            morning: uris("show", 5),
            evening: uris("eve", 3),
            night: Vec::new(),
            commercials: uris("ad", 4),
            intros: uris("intro", 2),
            outros: uris("outro", 2),
        }
    }

    /// Split a playlist into shows, each followed by its commercial break
    fn breaks(playlist: &Playlist) -> Vec<usize> {
        let mut counts = Vec::new();
        for item in playlist.items() {
            match item.role {
                ItemRole::Show => counts.push(0),
                ItemRole::Commercial => {
                    *counts.last_mut().expect("commercial before first show") += 1;
                }
                _ => {}
            }
        }
        counts
    }

    #[test]
    fn test_reserved_channels_are_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let folders = full_folders();
        for channel in [GAMES_CHANNEL, GUIDE_CHANNEL, VIDEO_PLAYER_CHANNEL, NO_CONTENT_CHANNEL, MUSIC_CHANNEL] {
            let playlist = PlaylistBuilder::build_with_rng(&folders, TimeOfDay::Morning, channel, &mut rng);
            assert!(playlist.is_empty(), "channel {} should not be scheduled", channel);
        }
    }

    #[test]
    fn test_empty_period_is_empty_regardless_of_other_buckets() {
        let mut rng = StdRng::seed_from_u64(2);
        let playlist = PlaylistBuilder::build_with_rng(&full_folders(), TimeOfDay::Night, 12, &mut rng);
        assert!(playlist.is_empty());
    }

    #[test]
    fn test_structure_intro_shows_breaks_outro() {
        let folders = full_folders();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            let playlist = PlaylistBuilder::build_with_rng(&folders, TimeOfDay::Morning, 7, &mut rng);
            let items = playlist.items();

            assert_eq!(items.first().unwrap().role, ItemRole::Intro);
            assert_eq!(items.last().unwrap().role, ItemRole::Outro);
            assert!(folders.intros.contains(&items[0].uri));
            assert!(folders.outros.contains(&items[items.len() - 1].uri));

            // Permutation property: exactly the morning bucket, once each
            let mut shows: Vec<&str> = items
                .iter()
                .filter(|i| i.role == ItemRole::Show)
                .map(|i| i.uri.as_str())
                .collect();
            shows.sort();
            let mut expected: Vec<&str> = folders.morning.iter().map(String::as_str).collect();
            expected.sort();
            assert_eq!(shows, expected);

            for count in breaks(&playlist) {
                assert!((1..=3).contains(&count), "break of {} commercials", count);
            }
            for ad in items.iter().filter(|i| i.role == ItemRole::Commercial) {
                assert!(folders.commercials.contains(&ad.uri));
            }
        }
    }

    #[test]
    fn test_no_commercials_without_bucket() {
        let folders = FolderSelection {
            evening: uris("eve", 4),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let playlist = PlaylistBuilder::build_with_rng(&folders, TimeOfDay::Evening, 9, &mut rng);

        assert_eq!(playlist.len(), 4);
        assert_eq!(breaks(&playlist), vec![0, 0, 0, 0]);
        assert!(playlist.items().iter().all(|i| i.kind == MediaKind::Video));
    }

    #[test]
    fn test_duplicates_in_input_are_preserved() {
        let folders = FolderSelection {
            morning: vec!["a".into(), "a".into(), "b".into()],
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let playlist = PlaylistBuilder::build_with_rng(&folders, TimeOfDay::Morning, 20, &mut rng);

        let a_count = playlist.items().iter().filter(|i| i.uri == "a").count();
        assert_eq!(a_count, 2);
        assert_eq!(playlist.len(), 3);
    }

    #[test]
    fn test_empty_uris_are_skipped() {
        let folders = FolderSelection {
            morning: vec!["show.mp4".into(), String::new()],
            intros: vec![String::new()],
            commercials: vec!["  ".into()],
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(6);
        let playlist = PlaylistBuilder::build_with_rng(&folders, TimeOfDay::Morning, 10, &mut rng);

        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.get(0).unwrap().uri, "show.mp4");
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        // 3 items -> 6 permutations, each should land near 1/6
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        let trials = 12_000;
        for _ in 0..trials {
            let mut items = vec![1u8, 2, 3];
            shuffle(&mut items, &mut rng);
            *seen.entry(items).or_default() += 1;
        }

        assert_eq!(seen.len(), 6);
        for (perm, count) in seen {
            let share = count as f64 / trials as f64;
            assert!(
                (share - 1.0 / 6.0).abs() < 0.03,
                "permutation {:?} drawn {:.3} of the time",
                perm,
                share
            );
        }
    }

    #[test]
    fn test_music_playlist_uses_morning_bucket() {
        let folders = FolderSelection {
            morning: vec!["song.mp3".into(), String::new()],
            evening: vec!["ignored.mp3".into()],
            ..Default::default()
        };
        let playlist = PlaylistBuilder::music(&folders);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.get(0).unwrap().kind, MediaKind::Music);
    }

    #[test]
    fn test_item_title() {
        let item = PlaylistItem::video(ItemRole::Show, "/media/shows/pilot.mp4");
        assert_eq!(item.title(), "pilot.mp4");
    }
}
