use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::{Channel3Option, SystemSettings, Theme, ThemeColor};
use crate::audio::{AudioSettings, MAX_VOLUME};
use crate::channel::{all_channels, ChannelKind, ChannelLineup, GUIDE_CHANNEL, MUSIC_CHANNEL};
use crate::error::{ChannelsurfError, Result};
use crate::playback::list_audio_devices;
use crate::schedule::{scan_media, Bucket, PlaylistBuilder};
use crate::store::{keys, Store};

#[derive(Parser, Debug, Clone)]
#[command(name = "channelsurf")]
#[command(about = "Flip through a retro cable-TV lineup built from your own media")]
#[command(version)]
pub struct Args {
    /// Directory holding persisted settings and the log file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Channel to tune to on start
    #[arg(long, default_value_t = GUIDE_CHANNEL, value_parser = clap::value_parser!(u8).range(3..=44))]
    pub start_channel: u8,

    /// Command that starts the games hub (the system name is appended)
    #[arg(long)]
    pub hub_command: Option<String>,

    /// Audio output device index (see `devices`)
    #[arg(long)]
    pub device: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Store::default_dir)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every channel on the dial
    Lineup,

    /// Edit one channel
    Channel {
        #[arg(value_parser = clap::value_parser!(u8).range(3..=44))]
        number: u8,

        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Print or change persisted settings
    Settings(SettingsArgs),

    /// Forget all persisted state
    Reset,

    /// List audio output devices
    Devices,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ChannelAction {
    Enable,
    Disable,
    /// Set the custom name (6 characters max, empty clears)
    Name { name: String },
    /// Add files, or every media file under a folder, to a bucket
    Add {
        #[arg(value_enum)]
        bucket: Bucket,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Empty a bucket
    Clear {
        #[arg(value_enum)]
        bucket: Bucket,
    },
    /// Print the playlist the channel would play right now
    Playlist,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: Option<u8>,

    #[arg(long)]
    pub mute: Option<bool>,

    #[arg(long)]
    pub stereo: Option<bool>,

    #[arg(long, value_enum)]
    pub menu_color: Option<ThemeColor>,

    #[arg(long, value_enum)]
    pub ui_color: Option<ThemeColor>,

    #[arg(long, value_enum)]
    pub channel3: Option<Channel3Option>,

    #[arg(long)]
    pub show_controls_on_start: Option<bool>,

    #[arg(long)]
    pub start_on_boot: Option<bool>,
}

impl Command {
    /// Run a configuration command against the store, printing to `out`
    pub fn execute(&self, store: &Store, out: &mut impl Write) -> Result<()> {
        match self {
            Command::Lineup => print_lineup(&ChannelLineup::load(store), out),
            Command::Channel { number, action } => edit_channel(store, *number, action, out),
            Command::Settings(args) => settings(store, args, out),
            Command::Reset => {
                store.reset();
                info!("All settings reset");
                writeln!(out, "All settings reset")?;
                Ok(())
            }
            Command::Devices => {
                let devices = list_audio_devices();
                if devices.is_empty() {
                    writeln!(out, "No audio output devices found")?;
                }
                for device in devices {
                    let marker = if device.is_default { " (default)" } else { "" };
                    writeln!(out, "{:>3}  {}{}", device.index, device.name, marker)?;
                }
                Ok(())
            }
        }
    }
}

fn print_lineup(lineup: &ChannelLineup, out: &mut impl Write) -> Result<()> {
    for channel in all_channels() {
        let kind = ChannelKind::of(channel);
        let enabled = if lineup.is_enabled(channel) { "on " } else { "off" };
        let folders = lineup.folders(channel);
        let counts: Vec<String> = Bucket::ALL
            .iter()
            .map(|b| folders.bucket(*b).len())
            .map(|n| n.to_string())
            .collect();

        if kind == ChannelKind::Content || kind == ChannelKind::Music {
            writeln!(
                out,
                "{}  {:<16} {}",
                enabled,
                lineup.display_name(channel),
                counts.join("/")
            )?;
        } else {
            writeln!(out, "{}  {}", enabled, lineup.display_name(channel))?;
        }
    }
    Ok(())
}

fn edit_channel(
    store: &Store,
    channel: u8,
    action: &ChannelAction,
    out: &mut impl Write,
) -> Result<()> {
    let mut lineup = ChannelLineup::load(store);

    match action {
        ChannelAction::Enable | ChannelAction::Disable => {
            let enabled = matches!(action, ChannelAction::Enable);
            lineup.set_enabled(channel, enabled);
            lineup.save_enabled(store);
            writeln!(
                out,
                "{} {}",
                lineup.display_name(channel),
                if enabled { "enabled" } else { "disabled" }
            )?;
        }
        ChannelAction::Name { name } => {
            if ChannelKind::of(channel) != ChannelKind::Content {
                return Err(ChannelsurfError::Config(format!(
                    "channel {} cannot be renamed",
                    channel
                )));
            }
            lineup.set_name(channel, name);
            lineup.save_names(store);
            writeln!(out, "{}", lineup.display_name(channel))?;
        }
        ChannelAction::Add { bucket, paths } => {
            check_schedulable(channel)?;
            let uris = scan_media(paths)?;
            let count = uris.len();
            lineup.append(channel, *bucket, uris);
            lineup.save_folders(store);
            info!(channel, bucket = bucket.label(), count, "Media added");
            writeln!(
                out,
                "Added {} file(s) to {} {}",
                count,
                lineup.display_name(channel),
                bucket.label()
            )?;
        }
        ChannelAction::Clear { bucket } => {
            lineup.clear_bucket(channel, *bucket);
            lineup.save_folders(store);
            writeln!(out, "Cleared {} {}", lineup.display_name(channel), bucket.label())?;
        }
        ChannelAction::Playlist => {
            let folders = lineup.folders(channel);
            let playlist = if channel == MUSIC_CHANNEL {
                PlaylistBuilder::music(&folders)
            } else {
                PlaylistBuilder::build(&folders, &Local::now(), channel)
            };
            if playlist.is_empty() {
                writeln!(out, "{}: nothing scheduled", lineup.display_name(channel))?;
            }
            for (i, item) in playlist.items().iter().enumerate() {
                writeln!(out, "{:>3}  {:<10} {}", i + 1, format!("{:?}", item.role), item.uri)?;
            }
        }
    }

    Ok(())
}

/// Only content channels and the music channel take media
fn check_schedulable(channel: u8) -> Result<()> {
    match ChannelKind::of(channel) {
        ChannelKind::Content | ChannelKind::Music => Ok(()),
        kind => Err(ChannelsurfError::Config(format!(
            "channel {} ({}) has no schedule",
            channel,
            kind.label()
        ))),
    }
}

fn settings(store: &Store, args: &SettingsArgs, out: &mut impl Write) -> Result<()> {
    let mut audio: AudioSettings = store.load(keys::AUDIO_SETTINGS, AudioSettings::default());
    let mut theme = Theme::load(store);
    let mut system = SystemSettings::load(store);

    if args.volume.is_some() || args.mute.is_some() || args.stereo.is_some() {
        if let Some(volume) = args.volume {
            audio.volume = volume.min(MAX_VOLUME);
        }
        if let Some(mute) = args.mute {
            audio.is_muted = mute;
        }
        if let Some(stereo) = args.stereo {
            audio.is_stereo = stereo;
        }
        store.save(keys::AUDIO_SETTINGS, &audio);
    }

    if args.menu_color.is_some() || args.ui_color.is_some() {
        if let Some(color) = args.menu_color {
            theme.menu = color;
        }
        if let Some(color) = args.ui_color {
            theme.ui = color;
        }
        theme.save(store);
    }

    if args.channel3.is_some() || args.show_controls_on_start.is_some() || args.start_on_boot.is_some() {
        if let Some(option) = args.channel3 {
            system.channel3_option = option;
        }
        if let Some(show) = args.show_controls_on_start {
            system.show_controls_on_start = show;
        }
        if let Some(start) = args.start_on_boot {
            system.start_on_pc_boot = start;
        }
        system.save(store);
    }

    writeln!(out, "volume                  {}", audio.volume)?;
    writeln!(out, "muted                   {}", audio.is_muted)?;
    writeln!(out, "stereo                  {}", audio.is_stereo)?;
    writeln!(out, "menu color              {}", theme.menu.label())?;
    writeln!(out, "ui color                {}", theme.ui.label())?;
    writeln!(out, "channel 3               {}", system.channel3_option.label())?;
    writeln!(out, "show controls on start  {}", system.show_controls_on_start)?;
    writeln!(out, "start on boot           {}", system.start_on_pc_boot)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(store: &Store, argv: &[&str]) -> String {
        let args = Args::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        args.command.unwrap().execute(store, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["channelsurf"]).unwrap();
        assert_eq!(args.start_channel, GUIDE_CHANNEL);
        assert!(args.command.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_channel_out_of_range_rejected() {
        assert!(Args::try_parse_from(["channelsurf", "--start-channel", "2"]).is_err());
        assert!(Args::try_parse_from(["channelsurf", "channel", "45", "enable"]).is_err());
    }

    #[test]
    fn test_disable_and_rename() {
        let store = Store::in_memory();
        run(&store, &["channelsurf", "channel", "12", "disable"]);
        let out = run(&store, &["channelsurf", "channel", "12", "name", "CartoonNet"]);
        assert_eq!(out.trim(), "12 Cartoo", "names are capped at six characters");

        let lineup = ChannelLineup::load(&store);
        assert!(!lineup.is_enabled(12));
        assert_eq!(lineup.name(12), Some("Cartoo"));
    }

    #[test]
    fn test_reserved_channel_cannot_be_renamed() {
        let store = Store::in_memory();
        let args = Args::try_parse_from(["channelsurf", "channel", "4", "name", "News"]).unwrap();
        let err = args.command.unwrap().execute(&store, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ChannelsurfError::Config(_)));
    }

    #[test]
    fn test_add_and_print_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let show = dir.path().join("pilot.mp4");
        std::fs::write(&show, b"").unwrap();
        let show = show.to_string_lossy().into_owned();

        let store = Store::in_memory();
        for bucket in ["morning", "evening", "night"] {
            run(&store, &["channelsurf", "channel", "20", "add", bucket, show.as_str()]);
        }

        let out = run(&store, &["channelsurf", "channel", "20", "playlist"]);
        assert!(out.contains("Show"), "playlist output: {}", out);
        assert!(out.contains("pilot.mp4"));
    }

    #[test]
    fn test_settings_update() {
        let store = Store::in_memory();
        let out = run(
            &store,
            &["channelsurf", "settings", "--volume", "80", "--channel3", "turn-off", "--ui-color", "red"],
        );
        assert!(out.contains("volume                  80"));

        let audio: AudioSettings = store.load(keys::AUDIO_SETTINGS, AudioSettings::default());
        assert_eq!(audio.volume, 80);
        assert_eq!(SystemSettings::load(&store).channel3_option, Channel3Option::TurnOff);
        assert_eq!(Theme::load(&store).ui, ThemeColor::Red);
    }
}
