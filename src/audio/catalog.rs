use super::track::{Song, SongId};
use std::collections::HashMap;
use std::path::Path;

/// Every playable song found at startup, in scan order.
///
/// Built once and never mutated afterwards, so a [`SongId`] handed out by a
/// catalog stays valid for its whole lifetime.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
    by_path: HashMap<String, SongId>,
}

impl Catalog {
    pub fn new(songs: Vec<Song>) -> Self {
        let mut by_path = HashMap::with_capacity(songs.len());
        for (idx, song) in songs.iter().enumerate() {
            // First occurrence wins so lookups stay deterministic
            by_path
                .entry(song.path.to_string_lossy().into_owned())
                .or_insert(SongId(idx));
        }

        Self { songs, by_path }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.songs.get(id.0)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn iter(&self) -> impl Iterator<Item = (SongId, &Song)> + '_ {
        self.songs.iter().enumerate().map(|(idx, song)| (SongId(idx), song))
    }

    pub fn first(&self) -> Option<SongId> {
        (!self.songs.is_empty()).then_some(SongId(0))
    }

    pub fn last(&self) -> Option<SongId> {
        self.songs.len().checked_sub(1).map(SongId)
    }

    /// Exact path match, as written in the playlist file.
    pub fn find_by_path<P: AsRef<Path>>(&self, path: P) -> Option<SongId> {
        self.by_path
            .get(path.as_ref().to_string_lossy().as_ref())
            .copied()
    }

    /// Song after `id`, wrapping around to the first.
    pub fn next(&self, id: SongId) -> Option<SongId> {
        if self.songs.is_empty() {
            return None;
        }
        Some(SongId((id.0 + 1) % self.songs.len()))
    }

    /// Song before `id`, wrapping around to the last.
    pub fn previous(&self, id: SongId) -> Option<SongId> {
        if self.songs.is_empty() {
            return None;
        }
        match id.0 {
            0 => self.last(),
            n => Some(SongId(n.min(self.songs.len()) - 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> Catalog {
        Catalog::new(
            names
                .iter()
                .map(|name| Song::from_path(format!("music/{name}")))
                .collect(),
        )
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let cat = catalog(&["a.ogg", "b.ogg", "c.ogg"]);
        assert_eq!(cat.next(SongId(2)), Some(SongId(0)));
        assert_eq!(cat.next(SongId(0)), Some(SongId(1)));
        assert_eq!(cat.previous(SongId(0)), Some(SongId(2)));
        assert_eq!(cat.previous(SongId(2)), Some(SongId(1)));
    }

    #[test]
    fn empty_catalog_has_no_neighbours() {
        let cat = Catalog::default();
        assert!(cat.first().is_none());
        assert!(cat.next(SongId(0)).is_none());
        assert!(cat.previous(SongId(0)).is_none());
    }

    #[test]
    fn find_by_path_is_exact() {
        let cat = catalog(&["a.ogg", "b.ogg"]);
        assert_eq!(cat.find_by_path("music/b.ogg"), Some(SongId(1)));
        assert_eq!(cat.find_by_path("music/B.ogg"), None);
        assert_eq!(cat.find_by_path("b.ogg"), None);
    }

    #[test]
    fn duplicate_paths_resolve_to_first_entry() {
        let cat = Catalog::new(vec![
            Song::new("one", "music/x.ogg"),
            Song::new("two", "music/x.ogg"),
        ]);
        assert_eq!(cat.find_by_path("music/x.ogg"), Some(SongId(0)));
    }
}
