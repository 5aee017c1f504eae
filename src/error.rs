// Error types for the library side of TuneDeck
// The binary wraps these in anyhow; library callers can match on them

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("music directory {path} could not be read: {source}")]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read playlist file {path}: {source}")]
    PlaylistRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write playlist file {path}: {source}")]
    PlaylistWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("playlist name {0:?} contains a line break")]
    InvalidPlaylistName(String),

    #[error("audio backend error: {0}")]
    Playback(String),
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
