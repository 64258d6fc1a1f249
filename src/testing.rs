//! Test doubles shared by the player, controller and server tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::{Output, OutputEvent};
use crate::library::{Library, Track};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetVolume(f32),
}

/// Records every call; events are queued by the test and handed out by `poll_events`.
///
/// Clones share their log, so a test can keep one while the player owns another.
#[derive(Debug, Clone, Default)]
pub struct MockOutput {
    calls: Arc<Mutex<Vec<Call>>>,
    pending: Arc<Mutex<Vec<OutputEvent>>>,
}

impl MockOutput {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn push_event(&self, event: OutputEvent) {
        self.pending.lock().unwrap().push(event);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Output for MockOutput {
    fn load(&mut self, track: &Track) {
        self.record(Call::Load(track.id.clone()));
        self.push_event(OutputEvent::Loaded {
            duration: track.duration,
        });
    }

    fn play(&mut self) {
        self.record(Call::Play);
    }

    fn pause(&mut self) {
        self.record(Call::Pause);
    }

    fn stop(&mut self) {
        self.record(Call::Stop);
    }

    fn seek(&mut self, position: Duration) {
        self.record(Call::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(Call::SetVolume(volume));
    }

    fn poll_events(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }
}

pub fn track(title: &str, artist: Option<&str>, secs: u64) -> Track {
    Track {
        id: format!("{title}.mp3"),
        path: PathBuf::from(format!("/music/{title}.mp3")),
        title: title.into(),
        artist: artist.map(String::from),
        album: None,
        duration: Some(Duration::from_secs(secs)),
        display: title.into(),
    }
}

/// Library of three tracks: Alpha, Beta (by "The Band"), Gamma.
pub fn library() -> Library {
    Library::from_tracks(
        "/music",
        vec![
            track("Alpha", None, 180),
            track("Beta", Some("The Band"), 200),
            track("Gamma", None, 240),
        ],
    )
}
