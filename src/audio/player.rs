use super::track::Song;
use crate::error::LibraryResult;
use std::path::PathBuf;

#[cfg(feature = "audio")]
use super::AudioConfig;
#[cfg(feature = "audio")]
use crate::error::LibraryError;
#[cfg(feature = "audio")]
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
#[cfg(feature = "audio")]
use std::{fs::File, io::BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Whatever actually makes sound. The player state only talks to this.
pub trait PlaybackBackend {
    /// Stop anything loaded and start `song` from the beginning.
    fn play(&mut self, song: &Song) -> LibraryResult<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn state(&self) -> PlaybackState;
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    /// True once a started song has run out on its own.
    fn finished(&self) -> bool;
}

/// Backend that plays nothing and remembers what it was asked to do.
///
/// Used when audio support is compiled out, and by tests.
#[derive(Debug, Clone)]
pub struct SilentBackend {
    state: PlaybackState,
    volume: f32,
    finished: bool,
    pub played: Vec<PathBuf>,
    pub failing: Vec<PathBuf>, // paths that refuse to "decode"
}

impl SilentBackend {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            volume: 0.7,
            finished: false,
            played: Vec::new(),
            failing: Vec::new(),
        }
    }

    /// Pretend the current song played to its end.
    pub fn finish_current(&mut self) {
        if self.state == PlaybackState::Playing {
            self.finished = true;
        }
    }
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackBackend for SilentBackend {
    fn play(&mut self, song: &Song) -> LibraryResult<()> {
        self.stop();
        if self.failing.contains(&song.path) {
            return Err(crate::error::LibraryError::Playback(format!(
                "cannot decode {}",
                song.path.display()
            )));
        }
        self.played.push(song.path.clone());
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.finished = false;
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn finished(&self) -> bool {
        self.finished
    }
}

/// rodio-backed player. Owns the output stream for the life of the app.
#[cfg(feature = "audio")]
pub struct AudioPlayer {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    state: PlaybackState,
    config: AudioConfig,
}

#[cfg(feature = "audio")]
impl AudioPlayer {
    pub fn new(config: AudioConfig) -> LibraryResult<Self> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| LibraryError::Playback(format!("no audio output device: {}", e)))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            state: PlaybackState::Stopped,
            config,
        })
    }
}

#[cfg(feature = "audio")]
impl PlaybackBackend for AudioPlayer {
    fn play(&mut self, song: &Song) -> LibraryResult<()> {
        self.stop();

        let file = File::open(&song.path).map_err(|e| {
            LibraryError::Playback(format!("failed to open {}: {}", song.path.display(), e))
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| {
            LibraryError::Playback(format!("failed to decode {}: {}", song.path.display(), e))
        })?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| LibraryError::Playback(e.to_string()))?;
        sink.set_volume(self.config.volume);
        sink.append(source);

        self.sink = Some(sink);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
            self.state = PlaybackState::Paused;
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
            self.state = PlaybackState::Playing;
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.state = PlaybackState::Stopped;
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn set_volume(&mut self, volume: f32) {
        self.config.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.config.volume);
        }
    }

    fn volume(&self) -> f32 {
        self.config.volume
    }

    fn finished(&self) -> bool {
        self.state == PlaybackState::Playing
            && self.sink.as_ref().map(|sink| sink.empty()).unwrap_or(false)
    }
}
