mod folders;
mod library;
mod playlist;
mod time_of_day;

pub use folders::{Bucket, FolderSelection};
pub use library::{scan_media, uri_to_path};
pub use playlist::{shuffle, ItemRole, MediaKind, Playlist, PlaylistBuilder, PlaylistItem};
pub use time_of_day::TimeOfDay;
