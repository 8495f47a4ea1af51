//! Retro cable-TV emulator: a dial of channels scheduled from your own media
//! folders, with blackout transitions, direct channel entry, a TV guide and
//! an audio-reactive music channel.

pub mod app;
pub mod audio;
pub mod channel;
pub mod cli;
pub mod error;
pub mod guide;
pub mod hub;
pub mod menu;
pub mod playback;
pub mod schedule;
pub mod session;
pub mod store;
pub mod tasks;
pub mod timer;
pub mod tui;
