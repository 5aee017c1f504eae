use std::path::PathBuf;
use tracing::{error, info, warn};

use super::mode::{Command, Input, InputPhase, Mode, ModeController};
use super::AppState;
use crate::audio::{persistence, PlaybackBackend, PlaybackState, SongId};
use crate::error::LibraryResult;

/// Player state, screen switch and audio backend behind one owner.
///
/// The UI loop feeds it inputs and ticks; everything else happens here.
pub struct PlayerSession<B: PlaybackBackend> {
    pub state: AppState,
    pub controller: ModeController,
    backend: B,
    playlists_file: PathBuf,
    save_error: Option<String>,
    should_quit: bool,
}

impl<B: PlaybackBackend> PlayerSession<B> {
    pub fn new(state: AppState, backend: B, playlists_file: impl Into<PathBuf>) -> Self {
        Self {
            state,
            controller: ModeController::new(),
            backend,
            playlists_file: playlists_file.into(),
            save_error: None,
            should_quit: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.backend.state()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Why the save on quit failed, if it did.
    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    /// Route one input through the active screen and act on the result.
    ///
    /// The status line describes the latest action, so a new press clears it.
    pub fn dispatch(&mut self, input: Input) {
        if input.phase == InputPhase::Press && input.action.is_some() {
            self.state.clear_status();
        }
        let command = self.controller.handle(input, &mut self.state);
        self.apply(command);
    }

    /// Poll the backend; start the next song when the current one ran out.
    pub fn tick(&mut self) {
        if !self.backend.finished() {
            return;
        }
        self.state.clear_status();
        match self.state.song_finished() {
            Some(id) => self.start(id),
            None => self.backend.stop(),
        }
    }

    /// Write all persistent playlists to the playlist file.
    pub fn save(&self) -> LibraryResult<()> {
        persistence::save(&self.playlists_file, &self.state.store, &self.state.catalog)
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::Play(id) | Command::Restart(id) => self.start(id),
            Command::TogglePlayback => self.toggle_playback(),
            Command::Volume(delta) => {
                let volume = self.backend.volume() + delta;
                self.backend.set_volume(volume);
            }
            Command::Quit => self.quit(),
        }
    }

    fn toggle_playback(&mut self) {
        match self.backend.state() {
            PlaybackState::Playing => self.backend.pause(),
            PlaybackState::Paused => self.backend.resume(),
            PlaybackState::Stopped => match self.state.now_playing() {
                Some(id) => self.start(id),
                None => self.state.set_status("No Song Selected"),
            },
        }
    }

    fn start(&mut self, id: SongId) {
        let Some(song) = self.state.song(id) else {
            warn!("Song {} is not in the library", id);
            return;
        };

        match self.backend.play(song) {
            Ok(()) => {
                info!("Now playing: {}", song.title);
                self.state.record_started(id);
            }
            Err(e) => {
                error!("Failed to load {}: {}", song.path.display(), e);
                self.state.set_status("Error loading song!");
            }
        }
    }

    /// Close without a quit key: a signal, a lost terminal or a UI failure.
    /// Playlists are saved the same way; a second call does nothing.
    pub fn shutdown(&mut self, reason: &str) {
        if self.should_quit {
            return;
        }
        info!("Shutting down: {}", reason);
        self.quit();
    }

    fn quit(&mut self) {
        self.backend.stop();
        if let Err(e) = self.save() {
            error!("Could not save playlists: {}", e);
            self.save_error = Some(e.to_string());
        }
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Catalog, History, PlaylistStore, SilentBackend, Song};
    use crate::state::mode::Action;
    use std::path::Path;

    fn session(dir: &Path) -> PlayerSession<SilentBackend> {
        let catalog = Catalog::new(
            ["a.ogg", "b.ogg", "c.ogg"]
                .iter()
                .map(|name| Song::from_path(format!("music/{name}")))
                .collect(),
        );
        let state = AppState::new(catalog, PlaylistStore::new(), History::new());
        PlayerSession::new(state, SilentBackend::new(), dir.join("playlists.txt"))
    }

    fn press(session: &mut PlayerSession<SilentBackend>, action: Action) {
        session.dispatch(Input::press(action));
        session.dispatch(Input::release());
    }

    #[test]
    fn play_pause_cycles_backend_and_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());

        press(&mut session, Action::PlayPause);
        assert_eq!(session.playback_state(), PlaybackState::Playing);
        press(&mut session, Action::PlayPause);
        assert_eq!(session.playback_state(), PlaybackState::Paused);
        press(&mut session, Action::PlayPause);
        assert_eq!(session.playback_state(), PlaybackState::Playing);

        assert_eq!(session.state.history.len(), 1);
        assert_eq!(session.backend().played.len(), 1);
    }

    #[test]
    fn finished_song_advances_through_the_library() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());

        press(&mut session, Action::PlayPause);
        session.tick();
        assert_eq!(session.backend().played.len(), 1);

        session.backend_mut().finish_current();
        session.tick();
        assert_eq!(session.state.now_playing(), Some(SongId(1)));
        assert_eq!(
            session.state.history.songs().collect::<Vec<_>>(),
            [SongId(1), SongId(0)]
        );
    }

    #[test]
    fn undecodable_song_is_reported_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.backend_mut().failing.push(PathBuf::from("music/a.ogg"));

        press(&mut session, Action::PlayPause);
        assert_eq!(session.state.status(), Some("Error loading song!"));
        assert!(session.state.history.is_empty());
        assert_eq!(session.playback_state(), PlaybackState::Stopped);
    }

    #[test]
    fn quit_saves_playlists() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.state.create_playlist("P", [SongId(1)]);

        press(&mut session, Action::Quit);
        assert!(session.should_quit());
        assert!(session.save_error().is_none());

        let saved = std::fs::read_to_string(dir.path().join("playlists.txt")).unwrap();
        assert_eq!(saved, "#PLAYLIST_START:P\nmusic/b.ogg\n#PLAYLIST_END\n");
    }

    #[test]
    fn failed_save_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be makes the write fail
        std::fs::create_dir(dir.path().join("playlists.txt")).unwrap();
        let mut session = session(dir.path());

        press(&mut session, Action::Quit);
        assert!(session.should_quit());
        assert!(session.save_error().is_some());
    }

    #[test]
    fn volume_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        for _ in 0..10 {
            press(&mut session, Action::VolumeUp);
        }
        assert_eq!(session.backend().volume(), 1.0);
    }

    #[test]
    fn stale_error_clears_once_a_song_starts() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.backend_mut().failing.push(PathBuf::from("music/a.ogg"));

        press(&mut session, Action::PlayPause);
        assert_eq!(session.state.status(), Some("Error loading song!"));

        press(&mut session, Action::Next);
        assert_eq!(session.state.now_playing_song().unwrap().title, "b.ogg");
        assert_eq!(session.playback_state(), PlaybackState::Playing);
        assert_eq!(session.state.status(), None);
    }

    #[test]
    fn playlist_end_message_outlives_the_fallback_song() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.state.create_playlist("P", [SongId(2)]);
        session.state.activate_playlist(0);

        press(&mut session, Action::Next);
        assert_eq!(session.state.now_playing(), Some(SongId(0)));
        assert_eq!(session.state.status(), Some("Playlist ended"));

        session.backend_mut().finish_current();
        session.tick();
        assert_eq!(session.state.now_playing(), Some(SongId(1)));
        assert_eq!(session.state.status(), None);
    }

    #[test]
    fn shutdown_saves_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.state.create_playlist("P", [SongId(0)]);

        session.shutdown("hangup");
        assert!(session.should_quit());
        let file = dir.path().join("playlists.txt");
        assert!(file.exists());

        std::fs::remove_file(&file).unwrap();
        session.shutdown("terminate");
        assert!(!file.exists());
    }
}
