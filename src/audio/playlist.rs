use std::collections::VecDeque;
use tracing::{info, warn};

use super::track::SongId;

/// Longest playlist name the create screen accepts.
pub const MAX_PLAYLIST_NAME_LENGTH: usize = 50;

/// A named FIFO of catalog songs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    queue: VecDeque<SongId>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, song: SongId) {
        self.queue.push_back(song);
    }

    /// Take the front song; `None` once the queue is drained.
    pub fn dequeue(&mut self) -> Option<SongId> {
        self.queue.pop_front()
    }

    pub fn songs(&self) -> impl Iterator<Item = SongId> + '_ {
        self.queue.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// The transient queue being drained by playback.
///
/// Holds its own copy of the song handles so the persistent playlist it came
/// from is never touched. Songs already handed out are remembered so the
/// player can step back through them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePlaylist {
    queue: Playlist,
    played: Vec<SongId>,
}

impl ActivePlaylist {
    fn from_playlist(source: &Playlist) -> Self {
        Self {
            queue: source.clone(),
            played: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.queue.name
    }

    /// Hand out the next song, remembering it for [`step_back`](Self::step_back).
    pub fn dequeue(&mut self) -> Option<SongId> {
        let song = self.queue.dequeue()?;
        self.played.push(song);
        Some(song)
    }

    /// Undo the last [`dequeue`](Self::dequeue): the current song goes back to
    /// the front of the queue and the one before it is returned.
    ///
    /// Returns `None` (and changes nothing) when the current song is the
    /// first one handed out.
    pub fn step_back(&mut self) -> Option<SongId> {
        if self.played.len() < 2 {
            return None;
        }
        if let Some(current) = self.played.pop() {
            self.queue.queue.push_front(current);
        }
        self.played.last().copied()
    }

    pub fn upcoming(&self) -> impl Iterator<Item = SongId> + '_ {
        self.queue.songs()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_drained(&self) -> bool {
        self.queue.is_empty()
    }
}

/// All persistent playlists plus whichever one is currently playing.
#[derive(Debug, Clone, Default)]
pub struct PlaylistStore {
    playlists: Vec<Playlist>, // newest first
    active: Option<ActivePlaylist>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty playlist at the front of the collection.
    pub fn create_playlist(&mut self, name: impl Into<String>) -> &mut Playlist {
        let playlist = Playlist::new(name);
        info!("Created playlist '{}'", playlist.name);
        self.playlists.insert(0, playlist);
        &mut self.playlists[0]
    }

    /// Append a playlist read from disk, keeping file order.
    pub fn push_loaded(&mut self, playlist: Playlist) {
        self.playlists.push(playlist);
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get(&self, index: usize) -> Option<&Playlist> {
        self.playlists.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn active(&self) -> Option<&ActivePlaylist> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ActivePlaylist> {
        self.active.as_mut()
    }

    /// Copy the playlist at `index` into a fresh active queue, replacing any
    /// previous one.
    ///
    /// An empty (or missing) playlist leaves the current active queue alone
    /// and returns `None`.
    pub fn activate(&mut self, index: usize) -> Option<&mut ActivePlaylist> {
        let Some(source) = self.playlists.get(index) else {
            warn!("No playlist at position {}", index);
            return None;
        };
        if source.is_empty() {
            warn!("Playlist '{}' is empty - nothing to play", source.name);
            return None;
        }

        info!("Activating playlist '{}' ({} songs)", source.name, source.len());
        self.active = Some(ActivePlaylist::from_playlist(source));
        self.active.as_mut()
    }

    /// Drop the active queue, returning it if there was one.
    pub fn deactivate(&mut self) -> Option<ActivePlaylist> {
        self.active.take()
    }
}
