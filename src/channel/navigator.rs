use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::timer::Deadline;

use super::{in_range, ChannelKind, CHANNEL_COUNT, FIRST_CHANNEL, GUIDE_CHANNEL};

/// Black frame shown while a channel change settles
pub const BLACKOUT: Duration = Duration::from_millis(700);
/// How long the channel number stays on screen after a change
pub const NUMBER_DISPLAY: Duration = Duration::from_millis(3000);
/// Debounce after the second digit of a direct entry
pub const DIGIT_DEBOUNCE_FULL: Duration = Duration::from_millis(300);
/// Debounce after a single digit, waiting for a possible second
pub const DIGIT_DEBOUNCE_PARTIAL: Duration = Duration::from_millis(700);

/// Digits kept in the direct-entry buffer
const MAX_DIGITS: usize = 2;

/// Observable navigation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavPhase {
    Idle(u8),
    /// Blackout window after an accepted move
    Transitioning(u8),
    /// Digits typed, waiting for the debounce
    DigitEntry(String),
}

/// Something the rest of the app must react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// An accepted move; the new channel should be activated now
    ChannelChanged { from: u8, to: u8 },
    /// The blackout window ended on this channel
    BlackoutEnded(u8),
}

/// Translates navigation intents into a validated current channel.
///
/// Invariant: `current` is always an always-reachable reserved channel or a
/// member of the enabled set. Rejected moves are silent no-ops.
#[derive(Debug)]
pub struct ChannelNavigator {
    current: u8,
    enabled: BTreeSet<u8>,
    digits: String,
    blackout: Deadline,
    number_display: Deadline,
    digit_debounce: Deadline,
}

impl ChannelNavigator {
    /// Start on `start`, or on the guide if `start` is not reachable
    pub fn new(start: u8, enabled: BTreeSet<u8>) -> Self {
        let mut nav = Self {
            current: GUIDE_CHANNEL,
            enabled,
            digits: String::new(),
            blackout: Deadline::new(),
            number_display: Deadline::new(),
            digit_debounce: Deadline::new(),
        };
        if nav.is_reachable(start) {
            nav.current = start;
        }
        nav
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn enabled(&self) -> &BTreeSet<u8> {
        &self.enabled
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn phase(&self) -> NavPhase {
        if self.blackout.is_armed() {
            NavPhase::Transitioning(self.current)
        } else if !self.digits.is_empty() {
            NavPhase::DigitEntry(self.digits.clone())
        } else {
            NavPhase::Idle(self.current)
        }
    }

    pub fn is_blacked_out(&self) -> bool {
        self.blackout.is_armed()
    }

    /// Whether the channel number overlay should be drawn
    pub fn number_visible(&self) -> bool {
        !self.blackout.is_armed() && (self.number_display.is_armed() || !self.digits.is_empty())
    }

    /// Reserved always-reachable channel or enabled channel on the dial
    pub fn is_reachable(&self, channel: u8) -> bool {
        in_range(channel)
            && (ChannelKind::of(channel).is_always_reachable() || self.enabled.contains(&channel))
    }

    /// Relative move, skipping unreachable channels and wrapping around the
    /// dial. Returns the event if the channel changed.
    pub fn step(&mut self, delta: i32, now: Instant) -> Option<NavEvent> {
        if delta == 0 {
            return None;
        }

        let start = self.current;
        let mut candidate = wrap(start, delta);
        while candidate != start {
            if self.is_reachable(candidate) {
                return Some(self.accept(candidate, now));
            }
            candidate = wrap(candidate, delta);
        }

        debug!(channel = start, delta, "No other reachable channel");
        None
    }

    /// Direct move to an explicit channel, rejected if unreachable
    pub fn jump(&mut self, target: u8, now: Instant) -> Option<NavEvent> {
        if target == self.current {
            return None;
        }
        if !self.is_reachable(target) {
            debug!(target, "Rejected direct move");
            return None;
        }
        Some(self.accept(target, now))
    }

    /// Append a digit to the direct-entry buffer and restart its debounce
    pub fn press_digit(&mut self, digit: char, now: Instant) {
        if !digit.is_ascii_digit() {
            return;
        }
        self.digits.push(digit);
        if self.digits.len() > MAX_DIGITS {
            self.digits.remove(0);
        }

        let wait = if self.digits.len() == MAX_DIGITS {
            DIGIT_DEBOUNCE_FULL
        } else {
            DIGIT_DEBOUNCE_PARTIAL
        };
        self.digit_debounce.arm(now, wait);
    }

    /// Drop any pending direct entry
    pub fn clear_digits(&mut self) {
        self.digits.clear();
        self.digit_debounce.cancel();
    }

    /// Replace the enabled set. If the current channel is no longer
    /// reachable, step forward to the next one that is.
    pub fn set_enabled(&mut self, enabled: BTreeSet<u8>, now: Instant) -> Option<NavEvent> {
        self.enabled = enabled;
        if self.is_reachable(self.current) {
            None
        } else {
            self.step(1, now)
        }
    }

    /// Fire due timers, returning what happened
    pub fn poll(&mut self, now: Instant) -> Vec<NavEvent> {
        let mut events = Vec::new();

        if self.digit_debounce.fire(now) {
            let entry = std::mem::take(&mut self.digits);
            match entry.parse::<u8>() {
                Ok(target) if in_range(target) => {
                    if let Some(event) = self.jump(target, now) {
                        events.push(event);
                    }
                }
                _ => debug!(entry = %entry, "Discarding direct entry"),
            }
        }

        if self.blackout.fire(now) {
            self.number_display.arm(now, NUMBER_DISPLAY);
            events.push(NavEvent::BlackoutEnded(self.current));
        }

        self.number_display.fire(now);

        events
    }

    fn accept(&mut self, target: u8, now: Instant) -> NavEvent {
        let from = self.current;
        self.current = target;
        self.blackout.arm(now, BLACKOUT);
        self.number_display.cancel();
        debug!(from, to = target, "Channel changed");
        NavEvent::ChannelChanged { from, to: target }
    }
}

fn wrap(channel: u8, delta: i32) -> u8 {
    let range = CHANNEL_COUNT as i32;
    let offset = (channel as i32 - FIRST_CHANNEL as i32 + delta).rem_euclid(range);
    (offset + FIRST_CHANNEL as i32) as u8
}
