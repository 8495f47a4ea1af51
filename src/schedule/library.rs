use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Extensions accepted when scanning a folder
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mkv", "webm", "mov", "avi", "mp3", "m4a", "aac", "flac", "ogg", "wav",
];

/// Resolve user-selected paths into media URIs.
///
/// Files are taken as given; directories are walked recursively and only
/// media files are kept. Results of each directory are sorted.
pub fn scan_media(paths: &[PathBuf]) -> io::Result<Vec<String>> {
    let mut out = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            walk_dir(path, &mut found)?;
            found.sort();
            debug!(path = ?path, files = found.len(), "Scanned folder");
            out.extend(found.into_iter().map(|p| p.to_string_lossy().into_owned()));
        } else if path.exists() {
            out.push(path.to_string_lossy().into_owned());
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such file or directory", path.display()),
            ));
        }
    }

    Ok(out)
}

fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, out)?;
        } else if is_media(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| MEDIA_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// Strip an optional `file://` scheme from a media URI
pub fn uri_to_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_walks_folders_and_filters_media() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("season1");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("b.MP4"), b"").unwrap();
        fs::write(dir.path().join("a.mkv"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let found = scan_media(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a.mkv"));
        assert!(found[1].ends_with("b.MP4"));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let err = scan_media(&[PathBuf::from("/definitely/not/here.mp4")]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_uri_to_path() {
        assert_eq!(uri_to_path("file:///tmp/a.mp4"), PathBuf::from("/tmp/a.mp4"));
        assert_eq!(uri_to_path("/tmp/a.mp4"), PathBuf::from("/tmp/a.mp4"));
    }
}
