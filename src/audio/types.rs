//! Audio-related small types.
//!
//! This module defines the commands accepted by the audio thread, the events
//! it reports back, and the `Output` seam the player drives.

use std::time::Duration;

use thiserror::Error;

use crate::library::Track;

#[derive(Debug)]
pub enum AudioCmd {
    /// Prepare `track` paused at position zero.
    Load(Track),
    /// Start or resume the loaded track.
    Play,
    /// Pause the loaded track.
    Pause,
    /// Stop and drop the loaded track.
    Stop,
    /// Jump to an absolute position in the loaded track.
    Seek(Duration),
    /// Set the output volume (0.0 - 1.0).
    SetVolume(f32),
    /// Quit the audio thread.
    Quit,
}

/// Something the playback device reports back asynchronously.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// The loaded track was decoded; `duration` when the decoder knows it.
    Loaded { duration: Option<Duration> },
    /// Current playback position.
    TimeUpdate(Duration),
    /// The loaded track played to its end.
    Ended,
    /// The loaded track could not be played.
    Error(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoDevice(String),
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// The playback handle a `Player` drives.
///
/// Methods are imperative and fire-and-forget; results of loading and
/// playing arrive later through `poll_events`.
pub trait Output {
    fn load(&mut self, track: &Track);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
    /// Drain events reported since the last call.
    fn poll_events(&mut self) -> Vec<OutputEvent>;
}
