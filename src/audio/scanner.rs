use super::track::Song;
use crate::error::{LibraryError, LibraryResult};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Flat directory scanner: one folder, one extension.
#[derive(Debug, Clone)]
pub struct MusicScanner {
    extension: String,
}

impl MusicScanner {
    pub fn new(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Scan `dir` and return its matching songs in file-name order.
    ///
    /// An unreadable or empty directory is not an error for the player: it is
    /// logged and yields an empty list.
    pub fn scan<P: AsRef<Path>>(&self, dir: P) -> Vec<Song> {
        let dir = dir.as_ref();
        match self.try_scan(dir) {
            Ok(songs) if songs.is_empty() => {
                warn!(
                    "No .{} songs found in {} - add some music files",
                    self.extension,
                    dir.display()
                );
                songs
            }
            Ok(songs) => {
                info!("Found {} songs in {}", songs.len(), dir.display());
                songs
            }
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// Same as [`scan`](Self::scan) but surfaces a directory read failure.
    pub fn try_scan(&self, dir: &Path) -> LibraryResult<Vec<Song>> {
        info!("Scanning {} for .{} files", dir.display(), self.extension);

        let mut songs = Vec::new();
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // depth 0 failing means the directory itself is unusable
                Err(e) if e.depth() == 0 => {
                    return Err(LibraryError::UnreadableDirectory {
                        path: dir.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matches(entry.path()) {
                continue;
            }

            let song = Song::from_path(entry.path());
            if !song.format.is_supported() {
                warn!("Skipping {}: not an audio format the player decodes", song.path.display());
                continue;
            }
            debug!("Found and added: {}", song.path.display());
            songs.push(song);
        }

        Ok(songs)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl Default for MusicScanner {
    fn default() -> Self {
        Self::new("ogg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.ogg", "a.ogg", "cover.jpg", "C.OGG"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.ogg")).unwrap();
        fs::write(dir.path().join("nested.ogg").join("deep.ogg"), b"x").unwrap();

        let songs = MusicScanner::new("ogg").scan(dir.path());
        let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["C.OGG", "a.ogg", "b.ogg"]);
        assert_eq!(songs[1].path, dir.path().join("a.ogg"));
    }

    #[test]
    fn missing_directory_yields_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let scanner = MusicScanner::default();
        assert!(scanner.scan(&missing).is_empty());
        assert!(matches!(
            scanner.try_scan(&missing),
            Err(LibraryError::UnreadableDirectory { .. })
        ));
    }

    #[test]
    fn undecodable_extension_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert!(MusicScanner::new("txt").scan(dir.path()).is_empty());
    }

    #[test]
    fn leading_dot_in_extension_is_ignored() {
        assert_eq!(MusicScanner::new(".OGG").extension(), "ogg");
    }
}
