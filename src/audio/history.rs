use chrono::{DateTime, Local};
use std::collections::VecDeque;

use super::track::SongId;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub song: SongId,
    pub played_at: DateTime<Local>,
}

/// Recently played songs, most recent first.
///
/// Pushing the song that is already on top does nothing; pushing past
/// capacity drops the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, song: SongId) {
        self.push_at(song, Local::now());
    }

    pub fn push_at(&mut self, song: SongId, played_at: DateTime<Local>) {
        if self.top() == Some(song) {
            return;
        }
        self.entries.push_front(HistoryEntry { song, played_at });
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    pub fn pop(&mut self) -> Option<SongId> {
        self.entries.pop_front().map(|entry| entry.song)
    }

    pub fn top(&self) -> Option<SongId> {
        self.entries.front().map(|entry| entry.song)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn songs(&self) -> impl Iterator<Item = SongId> + '_ {
        self.entries.iter().map(|entry| entry.song)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
