// Player state - everything the screens read and mutate, in one place
// Owned by the event loop; screens get a &mut to it, nothing is global

pub mod mode;
pub mod session;

pub use mode::{Action, Command, Debounce, Input, InputPhase, Mode, ModeController};
pub use session::PlayerSession;

use tracing::{info, warn};

use crate::audio::{Catalog, History, PlaylistStore, Song, SongId};

/// What "previous" resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Play(SongId),
    Restart(SongId),
    Nothing,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub store: PlaylistStore,
    pub history: History,
    now_playing: Option<SongId>,
    status: Option<String>,
}

impl AppState {
    pub fn new(catalog: Catalog, store: PlaylistStore, history: History) -> Self {
        let now_playing = catalog.first();
        Self {
            catalog,
            store,
            history,
            now_playing,
            status: None,
        }
    }

    pub fn now_playing(&self) -> Option<SongId> {
        self.now_playing
    }

    pub fn now_playing_song(&self) -> Option<&Song> {
        self.now_playing.and_then(|id| self.catalog.get(id))
    }

    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.catalog.get(id)
    }

    /// Point now-playing at a catalog song the user picked directly.
    pub fn select(&mut self, id: SongId) -> Option<SongId> {
        self.catalog.get(id)?;
        self.now_playing = Some(id);
        Some(id)
    }

    /// A song actually started: remember it in history.
    pub fn record_started(&mut self, id: SongId) {
        self.history.push(id);
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Next button: next song of the active playlist, or the next catalog song.
    pub fn next_song(&mut self) -> Option<SongId> {
        if let Some(active) = self.store.active_mut() {
            if let Some(id) = active.dequeue() {
                self.now_playing = Some(id);
                return Some(id);
            }
            self.finish_playlist();
            self.now_playing = self.catalog.first();
            return self.now_playing;
        }

        self.now_playing = self.now_playing.and_then(|id| self.catalog.next(id));
        self.now_playing
    }

    /// The current song ran out: keep the playlist going, then fall back to
    /// the catalog after the song that just ended.
    pub fn song_finished(&mut self) -> Option<SongId> {
        if let Some(active) = self.store.active_mut() {
            if let Some(id) = active.dequeue() {
                self.now_playing = Some(id);
                return Some(id);
            }
            self.finish_playlist();
        }

        self.now_playing = self.now_playing.and_then(|id| self.catalog.next(id));
        self.now_playing
    }

    /// Previous button. Inside a playlist this steps back through songs it
    /// already played; on its first song it restarts it.
    pub fn previous_song(&mut self) -> Step {
        let Some(current) = self.now_playing else {
            return Step::Nothing;
        };

        if let Some(active) = self.store.active_mut() {
            return match active.step_back() {
                Some(id) => {
                    self.now_playing = Some(id);
                    Step::Play(id)
                }
                None => {
                    info!("Restarting current song in playlist");
                    Step::Restart(current)
                }
            };
        }

        match self.catalog.previous(current) {
            Some(id) => {
                self.now_playing = Some(id);
                Step::Play(id)
            }
            None => Step::Nothing,
        }
    }

    /// Start playing the persistent playlist at `index` from a fresh copy.
    ///
    /// An empty playlist is refused: the current queue and song stay as they
    /// were and `None` comes back.
    pub fn activate_playlist(&mut self, index: usize) -> Option<SongId> {
        let Some(active) = self.store.activate(index) else {
            let message = match self.store.get(index) {
                Some(playlist) => format!("Playlist '{}' is empty", playlist.name),
                None => "No playlist selected".to_string(),
            };
            warn!("{}", message);
            self.set_status(message);
            return None;
        };

        let id = active.dequeue()?;
        self.now_playing = Some(id);
        Some(id)
    }

    /// Save a new persistent playlist holding `songs` in the given order.
    pub fn create_playlist<I>(&mut self, name: &str, songs: I) -> usize
    where
        I: IntoIterator<Item = SongId>,
    {
        let playlist = self.store.create_playlist(name);
        for id in songs {
            playlist.enqueue(id);
        }
        let count = playlist.len();
        info!("Playlist '{}' created with {} songs", name, count);
        self.set_status(format!("Created playlist '{}' ({} songs)", name, count));
        count
    }

    fn finish_playlist(&mut self) {
        if let Some(done) = self.store.deactivate() {
            info!("Playlist '{}' ended, back to the library", done.name());
            self.set_status("Playlist ended");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Playlist;

    fn state_with(names: &[&str]) -> AppState {
        let catalog = Catalog::new(
            names
                .iter()
                .map(|name| Song::from_path(format!("music/{name}")))
                .collect(),
        );
        AppState::new(catalog, PlaylistStore::new(), History::new())
    }

    fn add_playlist(state: &mut AppState, name: &str, songs: &[usize]) {
        let mut pl = Playlist::new(name);
        for &idx in songs {
            pl.enqueue(SongId(idx));
        }
        state.store.push_loaded(pl);
    }

    #[test]
    fn starts_on_first_song() {
        assert_eq!(state_with(&["a.ogg", "b.ogg"]).now_playing(), Some(SongId(0)));
        assert_eq!(state_with(&[]).now_playing(), None);
    }

    #[test]
    fn next_cycles_the_catalog_without_a_playlist() {
        let mut state = state_with(&["a.ogg", "b.ogg"]);
        assert_eq!(state.next_song(), Some(SongId(1)));
        assert_eq!(state.next_song(), Some(SongId(0)));
    }

    #[test]
    fn next_on_empty_catalog_does_nothing() {
        let mut state = state_with(&[]);
        assert_eq!(state.next_song(), None);
        assert_eq!(state.previous_song(), Step::Nothing);
    }

    #[test]
    fn previous_wraps_to_last_song() {
        let mut state = state_with(&["a.ogg", "b.ogg", "c.ogg"]);
        assert_eq!(state.previous_song(), Step::Play(SongId(2)));
    }

    #[test]
    fn playlist_drains_then_returns_to_library() {
        let mut state = state_with(&["a.ogg", "b.ogg", "c.ogg"]);
        add_playlist(&mut state, "P", &[2, 1]);

        assert_eq!(state.activate_playlist(0), Some(SongId(2)));
        assert_eq!(state.next_song(), Some(SongId(1)));
        assert_eq!(state.next_song(), Some(SongId(0)));
        assert!(state.store.active().is_none());
        assert_eq!(state.status(), Some("Playlist ended"));
    }

    #[test]
    fn finished_playlist_continues_after_last_song() {
        let mut state = state_with(&["a.ogg", "b.ogg", "c.ogg"]);
        add_playlist(&mut state, "P", &[1]);

        state.activate_playlist(0);
        assert_eq!(state.song_finished(), Some(SongId(2)));
        assert!(state.store.active().is_none());
    }

    #[test]
    fn empty_playlist_leaves_playback_untouched() {
        let mut state = state_with(&["a.ogg", "b.ogg", "c.ogg"]);
        add_playlist(&mut state, "full", &[1, 2]);
        add_playlist(&mut state, "empty", &[]);

        state.activate_playlist(0);
        assert_eq!(state.activate_playlist(1), None);
        assert_eq!(state.now_playing(), Some(SongId(1)));
        assert_eq!(state.store.active().unwrap().name(), "full");
        assert_eq!(state.status(), Some("Playlist 'empty' is empty"));
    }

    #[test]
    fn previous_in_playlist_steps_back_or_restarts() {
        let mut state = state_with(&["a.ogg", "b.ogg", "c.ogg"]);
        add_playlist(&mut state, "P", &[0, 2]);

        state.activate_playlist(0);
        assert_eq!(state.previous_song(), Step::Restart(SongId(0)));
        state.next_song();
        assert_eq!(state.previous_song(), Step::Play(SongId(0)));
        assert_eq!(state.next_song(), Some(SongId(2)));
    }

    #[test]
    fn create_playlist_keeps_given_order() {
        let mut state = state_with(&["a.ogg", "b.ogg", "c.ogg"]);
        assert_eq!(state.create_playlist("mix", [SongId(0), SongId(2)]), 2);
        let pl = state.store.find("mix").unwrap();
        assert_eq!(pl.songs().collect::<Vec<_>>(), [SongId(0), SongId(2)]);
    }
}
