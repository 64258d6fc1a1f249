//! Utilities for creating `rodio` sinks from `Track` values.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::library::Track;

use super::types::AudioError;

/// Create a paused `Sink` for `track` that starts playback at `start_at`.
///
/// Also returns the decoder's total duration, when it can tell.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    track: &Track,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), AudioError> {
    let file = File::open(&track.path).map_err(|source| AudioError::Open {
        path: track.path.display().to_string(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
        path: track.path.display().to_string(),
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration().or(track.duration);

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
