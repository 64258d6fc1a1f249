//! Player model types: `Player`, `PlayerState`, `PlaybackState` and `LoopMode`.
//!
//! The `Player` binds a handful of primitive values (play flag, elapsed time,
//! duration, volume, active track, search text) to one `Output`. Every
//! mutation calls the output directly; everything the output reports back
//! arrives through `poll`.

use std::time::Duration;

use serde::Serialize;

use crate::audio::{Output, OutputEvent};
use crate::library::{Library, Track, filter};

use super::error::PlayerError;

/// The playback state as reported to clients.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopMode {
    /// Do not wrap at the end of the library.
    #[default]
    NoLoop,
    /// Wrap around to the start of the library.
    LoopAll,
    /// Repeat the current song when it ends.
    LoopOne,
}

impl LoopMode {
    /// `NoLoop -> LoopAll -> LoopOne -> NoLoop`.
    pub fn next(self) -> Self {
        match self {
            LoopMode::NoLoop => LoopMode::LoopAll,
            LoopMode::LoopAll => LoopMode::LoopOne,
            LoopMode::LoopOne => LoopMode::NoLoop,
        }
    }
}

/// Upper bound for positions in a track whose length is unknown.
pub const UNKNOWN_DURATION_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Transient state mirrored from the output.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub playing: bool,
    pub elapsed: Duration,
    /// Total length of the active track, once known.
    pub duration: Option<Duration>,
    /// Output volume in `[0, 1]`.
    pub volume: f32,
    pub current: Option<Track>,
    pub search: String,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playing: false,
            elapsed: Duration::ZERO,
            duration: None,
            volume: 1.0,
            current: None,
            search: String::new(),
        }
    }
}

impl PlayerState {
    fn clamp_position(&self, position: Duration) -> Duration {
        position.min(self.duration.unwrap_or(UNKNOWN_DURATION_LIMIT))
    }
}

/// Clamp a requested volume into `[0, 1]`; NaN mutes.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

pub struct Player<O: Output> {
    output: O,
    state: PlayerState,
    pub loop_mode: LoopMode,
    // Loads not yet answered by `Loaded` or `Error`; events queued before the last answer are stale.
    pending_loads: usize,
}

impl<O: Output> Player<O> {
    /// Wrap `output`, pushing the initial `volume` to it.
    pub fn new(mut output: O, volume: f32, loop_mode: LoopMode) -> Self {
        let volume = clamp_volume(volume);
        output.set_volume(volume);
        Self {
            output,
            state: PlayerState {
                volume,
                ..PlayerState::default()
            },
            loop_mode,
            pending_loads: 0,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn current(&self) -> Option<&Track> {
        self.state.current.as_ref()
    }

    pub fn playback(&self) -> PlaybackState {
        match (&self.state.current, self.state.playing) {
            (None, _) => PlaybackState::Stopped,
            (Some(_), true) => PlaybackState::Playing,
            (Some(_), false) => PlaybackState::Paused,
        }
    }

    /// Make `track` the active track, paused at the start.
    pub fn select(&mut self, track: Track) {
        log::debug!("select {}", track.id);
        self.output.load(&track);
        self.pending_loads += 1;
        self.state.elapsed = Duration::ZERO;
        self.state.playing = false;
        self.state.duration = track.duration;
        self.state.current = Some(track);
    }

    /// Select `track` and start playing it.
    pub fn start(&mut self, track: Track) {
        self.select(track);
        self.output.play();
        self.state.playing = true;
    }

    /// Pause when playing, play when paused.
    pub fn toggle(&mut self) -> Result<PlaybackState, PlayerError> {
        if self.state.current.is_none() {
            return Err(PlayerError::NothingLoaded);
        }
        if self.state.playing {
            self.output.pause();
        } else {
            self.output.play();
        }
        self.state.playing = !self.state.playing;
        Ok(self.playback())
    }

    pub fn resume(&mut self) -> Result<(), PlayerError> {
        if self.state.playing {
            return Err(PlayerError::AlreadyPlaying);
        }
        if self.state.current.is_none() {
            return Err(PlayerError::NothingLoaded);
        }
        self.output.play();
        self.state.playing = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlayerError> {
        if !self.state.playing {
            return Err(PlayerError::AlreadyPaused);
        }
        self.output.pause();
        self.state.playing = false;
        Ok(())
    }

    /// Stop output and forget the active track.
    pub fn stop(&mut self) {
        self.output.stop();
        self.state.playing = false;
        self.state.elapsed = Duration::ZERO;
        self.state.duration = None;
        self.state.current = None;
    }

    /// Jump to `position`, clamped to the track's length when it is known.
    pub fn seek(&mut self, position: Duration) -> Result<Duration, PlayerError> {
        if self.state.current.is_none() {
            return Err(PlayerError::NothingLoaded);
        }
        let position = self.state.clamp_position(position);
        self.output.seek(position);
        self.state.elapsed = position;
        Ok(position)
    }

    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let volume = clamp_volume(volume);
        self.output.set_volume(volume);
        self.state.volume = volume;
        volume
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.state.search = text.into();
    }

    /// Library tracks matching the current search text.
    pub fn filtered<'a>(&self, library: &'a Library) -> Vec<&'a Track> {
        filter(library.tracks(), &self.state.search)
    }

    pub fn cycle_loop_mode(&mut self) -> LoopMode {
        self.loop_mode = self.loop_mode.next();
        self.loop_mode
    }

    /// Apply everything the output reported. Returns true when the active track ended.
    pub fn poll(&mut self) -> bool {
        let mut ended = false;
        for event in self.output.poll_events() {
            // Every load is answered by exactly one `Loaded` or `Error`.
            let stale = match event {
                OutputEvent::Loaded { .. } | OutputEvent::Error(_) if self.pending_loads > 0 => {
                    self.pending_loads -= 1;
                    self.pending_loads > 0
                }
                _ => self.pending_loads > 0,
            };
            if stale || self.state.current.is_none() {
                continue;
            }
            match event {
                OutputEvent::Loaded { duration } => {
                    if duration.is_some() {
                        self.state.duration = duration;
                    }
                }
                OutputEvent::TimeUpdate(t) => {
                    self.state.elapsed = self.state.clamp_position(t);
                }
                OutputEvent::Ended => {
                    self.state.playing = false;
                    if let Some(d) = self.state.duration {
                        self.state.elapsed = d;
                    }
                    ended = true;
                }
                OutputEvent::Error(msg) => {
                    log::warn!("playback error: {msg}");
                    self.state.playing = false;
                }
            }
        }
        ended
    }
}
