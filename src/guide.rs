use chrono::{DateTime, TimeZone, Timelike};

use crate::channel::{all_channels, ChannelKind, ChannelLineup, CHANNEL_COUNT, FIRST_CHANNEL};

/// Half-hour slots generated from the current half hour
pub const TIME_SLOTS: usize = 48;
/// Slots visible at once
pub const VISIBLE_SLOTS: usize = 8;
/// Channel rows visible at once
pub const VISIBLE_ROWS: usize = 11;

/// One row of the guide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideRow {
    pub channel: u8,
    pub name: String,
    pub listing: String,
    pub enabled: bool,
}

/// Scroll state of the TV guide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guide {
    first_row: usize,
    first_slot: usize,
}

impl Guide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_row(&self) -> usize {
        self.first_row
    }

    pub fn first_slot(&self) -> usize {
        self.first_slot
    }

    /// Scroll channel rows, wrapping
    pub fn scroll_rows(&mut self, delta: i32) {
        let count = CHANNEL_COUNT as i32;
        self.first_row = (self.first_row as i32 + delta).rem_euclid(count) as usize;
    }

    /// Scroll time, clamped so a full page of slots stays visible
    pub fn scroll_time(&mut self, delta: i32) {
        let max = (TIME_SLOTS - VISIBLE_SLOTS) as i32;
        self.first_slot = (self.first_slot as i32 + delta).clamp(0, max) as usize;
    }

    /// Channel under the cursor: the row after the top one
    pub fn highlighted(&self) -> u8 {
        let offset = (self.first_row + 1) % CHANNEL_COUNT as usize;
        FIRST_CHANNEL + offset as u8
    }

    /// Visible rows, starting from the top row and wrapping
    pub fn rows(&self, lineup: &ChannelLineup) -> Vec<GuideRow> {
        all_channels()
            .cycle()
            .skip(self.first_row)
            .take(VISIBLE_ROWS)
            .map(|channel| GuideRow {
                channel,
                name: lineup.display_name(channel),
                listing: listing(channel).to_string(),
                enabled: lineup.is_enabled(channel),
            })
            .collect()
    }

    /// Labels of the visible slots
    pub fn visible_slots<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<String> {
        time_slots(now)
            .into_iter()
            .skip(self.first_slot)
            .take(VISIBLE_SLOTS)
            .collect()
    }
}

/// What the guide lists for a channel in every slot
pub fn listing(channel: u8) -> &'static str {
    match ChannelKind::of(channel) {
        ChannelKind::Games => "Games",
        ChannelKind::Guide => "TV Guide",
        ChannelKind::Music => "Music",
        _ => "Off-Air",
    }
}

/// `TIME_SLOTS` labels like "7:30PM", from the current half hour
pub fn time_slots<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<String> {
    let minute = if now.minute() < 30 { 0 } else { 30 };
    let start_minutes = now.hour() * 60 + minute;

    (0..TIME_SLOTS as u32)
        .map(|i| {
            let minutes = (start_minutes + i * 30) % (24 * 60);
            let hour = minutes / 60;
            let display_hour = match hour % 12 {
                0 => 12,
                h => h,
            };
            let suffix = if hour < 12 { "AM" } else { "PM" };
            format!("{}:{:02}{}", display_hour, minutes % 60, suffix)
        })
        .collect()
}
