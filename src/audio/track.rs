use super::AudioFormat;
use std::fmt;
use std::path::{Path, PathBuf};

/// Handle to a song owned by the [`Catalog`](super::Catalog).
///
/// Playlists and history only ever hold these, never the song itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SongId(pub(crate) usize);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub path: PathBuf, // unique within a catalog
    pub format: AudioFormat,
}

impl Song {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Unknown);

        Self {
            title: title.into(),
            path,
            format,
        }
    }

    /// Build a song from a file path, titled with its file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("Unknown")
            .to_string();
        Self::new(title, path)
    }

    pub fn display_title(&self) -> &str {
        &self.title
    }

    /// Title without the file extension, for narrow panels.
    pub fn short_title(&self) -> &str {
        Path::new(&self.title)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_uses_file_name_as_title() {
        let song = Song::from_path("music/Blue Monday.ogg");
        assert_eq!(song.title, "Blue Monday.ogg");
        assert_eq!(song.short_title(), "Blue Monday");
        assert_eq!(song.format, AudioFormat::Ogg);
    }

    #[test]
    fn unknown_extension_has_unknown_format() {
        let song = Song::from_path("music/notes.txt");
        assert_eq!(song.format, AudioFormat::Unknown);
        assert!(!song.format.is_supported());
    }
}
