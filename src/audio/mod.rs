pub mod catalog;
pub mod history;
pub mod persistence;
pub mod player;
pub mod playlist;
pub mod scanner;
pub mod track;

pub use catalog::Catalog;
pub use history::History;
pub use player::{PlaybackBackend, PlaybackState, SilentBackend};
pub use playlist::{ActivePlaylist, Playlist, PlaylistStore};
pub use scanner::MusicScanner;
pub use track::{Song, SongId};

#[cfg(feature = "audio")]
pub use player::AudioPlayer;

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub volume: f32, // 0.0 to 1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { volume: 0.7 }
    }
}

impl From<&crate::config::Config> for AudioConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            volume: config.audio.volume.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Ogg,
    Wav,
    Unknown,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "flac" => AudioFormat::Flac,
            "ogg" | "oga" => AudioFormat::Ogg,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}
