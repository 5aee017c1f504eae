// TuneDeck Library - core modules for the terminal music player
// Everything except drawing is usable (and tested) without a terminal

pub mod audio;  // songs, catalog, playlists, history, playlist file, playback backends
pub mod config; // settings and preferences
pub mod error;  // library error type
pub mod state;  // player state + screen switch
#[cfg(feature = "tui")]
pub mod ui;     // terminal interface

// Export the stuff other modules actually use
pub use audio::{Catalog, History, MusicScanner, Playlist, PlaylistStore, Song, SongId};
pub use config::Config;
pub use error::LibraryError;
pub use state::{AppState, Mode, PlayerSession};

use tracing::warn;

/// Scan the music folder and read saved playlists: the startup sequence.
///
/// Neither an empty folder nor a missing or unreadable playlist file stops
/// the player; both are logged and it starts with what it has.
pub fn load_state(config: &Config) -> AppState {
    let scanner = MusicScanner::new(&config.extension);
    let catalog = Catalog::new(scanner.scan(&config.music_directory));

    let mut store = PlaylistStore::new();
    if let Err(e) = audio::persistence::load(&config.playlists_file, &catalog, &mut store) {
        warn!("{} - starting with no playlists", e);
    }

    let mut state = AppState::new(catalog, store, History::with_capacity(config.history_capacity));
    if state.catalog.is_empty() {
        state.set_status(format!(
            "No .{} songs found in {}",
            scanner.extension(),
            config.music_directory.display()
        ));
    }
    state
}
