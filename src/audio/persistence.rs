//! Plain-text playlist file.
//!
//! ```text
//! #PLAYLIST_START:<name>
//! <song path>
//! #PLAYLIST_END
//! ```
//!
//! One block per playlist, paths exactly as the catalog recorded them.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::catalog::Catalog;
use super::playlist::{Playlist, PlaylistStore};
use crate::error::{LibraryError, LibraryResult};

const START_MARKER: &str = "#PLAYLIST_START:";
const END_MARKER: &str = "#PLAYLIST_END";

/// What a load found beyond the playlists themselves.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub playlists: usize,
    pub songs: usize,
    pub skipped: Vec<PathBuf>, // paths with no catalog match
}

/// Render every persistent playlist in store order.
pub fn serialize(store: &PlaylistStore, catalog: &Catalog) -> LibraryResult<String> {
    let mut out = String::new();
    for playlist in store.playlists() {
        if playlist.name.contains(['\n', '\r']) {
            return Err(LibraryError::InvalidPlaylistName(playlist.name.clone()));
        }
        // Infallible for String
        let _ = writeln!(out, "{START_MARKER}{}", playlist.name);
        for song in playlist.songs().filter_map(|id| catalog.get(id)) {
            let _ = writeln!(out, "{}", song.path.display());
        }
        let _ = writeln!(out, "{END_MARKER}");
    }
    Ok(out)
}

pub fn save<P: AsRef<Path>>(path: P, store: &PlaylistStore, catalog: &Catalog) -> LibraryResult<()> {
    let path = path.as_ref();
    let content = serialize(store, catalog)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LibraryError::PlaylistWrite {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| LibraryError::PlaylistWrite {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Saved {} playlists to {}", store.len(), path.display());
    Ok(())
}

/// Parse playlist blocks into `store`, resolving each path against `catalog`.
///
/// Blocks are appended in file order. Paths the catalog does not know are
/// skipped and listed in the report; lines outside a block are ignored.
pub fn parse_into(content: &str, catalog: &Catalog, store: &mut PlaylistStore) -> LoadReport {
    let mut report = LoadReport::default();
    let mut current: Option<Playlist> = None;

    for line in content.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(name) = line.strip_prefix(START_MARKER) {
            if let Some(unterminated) = current.take() {
                warn!("Playlist '{}' has no end marker", unterminated.name);
                store.push_loaded(unterminated);
                report.playlists += 1;
            }
            info!("Loading playlist: {}", name);
            current = Some(Playlist::new(name));
        } else if line == END_MARKER {
            if let Some(done) = current.take() {
                store.push_loaded(done);
                report.playlists += 1;
            }
        } else if let Some(playlist) = current.as_mut() {
            if line.is_empty() {
                continue;
            }
            match catalog.find_by_path(line) {
                Some(id) => {
                    debug!("  Added song: {}", line);
                    playlist.enqueue(id);
                    report.songs += 1;
                }
                None => {
                    warn!("  Song path not found in library, skipping: {}", line);
                    report.skipped.push(PathBuf::from(line));
                }
            }
        }
    }

    if let Some(unterminated) = current {
        warn!("Playlist '{}' has no end marker", unterminated.name);
        store.push_loaded(unterminated);
        report.playlists += 1;
    }

    report
}

/// Read the playlist file at `path` into `store`.
///
/// A missing file is a fresh start, not an error.
pub fn load<P: AsRef<Path>>(
    path: P,
    catalog: &Catalog,
    store: &mut PlaylistStore,
) -> LibraryResult<LoadReport> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No existing playlist file found: {}. Starting fresh.", path.display());
            return Ok(LoadReport::default());
        }
        Err(source) => {
            return Err(LibraryError::PlaylistRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let report = parse_into(&content, catalog, store);
    info!(
        "Loaded {} playlists ({} songs, {} skipped) from {}",
        report.playlists,
        report.songs,
        report.skipped.len(),
        path.display()
    );
    Ok(report)
}
