//! The controller owns the player, the library and the queue, and applies
//! API commands to them one at a time on its own thread.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::json;

use crate::audio::Output;
use crate::library::{Library, LibraryError, Track};
use crate::player::{LoopMode, PlayQueue, PlaybackState, Player, PlayerError};
use crate::server::{ApiCommand, ApiResponse, ControlHandle, Envelope};

type Outcome = Result<ApiResponse, PlayerError>;

pub struct Controller<O: Output> {
    player: Player<O>,
    library: Library,
    queue: PlayQueue,
    max_results: usize,
}

impl<O: Output> Controller<O> {
    pub fn new(player: Player<O>, library: Library, max_results: usize) -> Self {
        Self {
            player,
            library,
            queue: PlayQueue::new(),
            max_results,
        }
    }

    #[cfg(test)]
    pub fn player(&self) -> &Player<O> {
        &self.player
    }

    #[cfg(test)]
    pub fn library(&self) -> &Library {
        &self.library
    }

    #[cfg(test)]
    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    /// Run the controller on its own thread.
    pub fn spawn(mut self, tick: Duration, request_timeout: Duration) -> (ControlHandle, JoinHandle<()>)
    where
        O: Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Envelope>();
        let join = thread::spawn(move || self.run(rx, tick));
        (ControlHandle::new(tx, request_timeout), join)
    }

    fn run(&mut self, rx: Receiver<Envelope>, tick: Duration) {
        loop {
            match rx.recv_timeout(tick) {
                Ok(Envelope { cmd, reply }) => {
                    let response = self.handle(cmd);
                    // The HTTP handler may have timed out and gone away.
                    let _ = reply.send(response);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.tick();
        }
        log::debug!("controller finished");
    }

    /// Apply output events; move on when the active track finished.
    pub fn tick(&mut self) {
        if self.player.poll() {
            self.advance_after_end();
        }
    }

    pub fn handle(&mut self, cmd: ApiCommand) -> ApiResponse {
        log::debug!("command {cmd:?}");
        let outcome = match cmd {
            ApiCommand::Status => Ok(self.status()),
            ApiCommand::Current => Ok(self.current()),
            ApiCommand::Tracks => Ok(self.tracks()),
            ApiCommand::Resume => self
                .player
                .resume()
                .map(|_| ApiResponse::ok("Playback resumed")),
            ApiCommand::Pause => self
                .player
                .pause()
                .map(|_| ApiResponse::ok("Playback paused")),
            ApiCommand::Toggle => self.toggle(),
            ApiCommand::Play => self.play(),
            ApiCommand::Skip => self.skip(),
            ApiCommand::Previous => self.previous(),
            ApiCommand::Stop { clear_queue } => Ok(self.stop(clear_queue)),
            ApiCommand::SetVolume(percent) => Ok(self.set_volume(percent)),
            ApiCommand::Seek(secs) => self.seek(secs),
            ApiCommand::Search(query) => Ok(self.search(query)),
            ApiCommand::QueueAdd(name) => self.queue_add(&name),
            ApiCommand::QueueList => Ok(self.queue_list()),
            ApiCommand::QueueRemove(index) => self.queue_remove(index),
            ApiCommand::QueueClear => {
                self.queue.clear();
                Ok(ApiResponse::ok("Queue cleared"))
            }
            ApiCommand::LibraryDelete(id) => Ok(self.library_delete(&id)),
            ApiCommand::CycleLoop => {
                let mode = self.player.cycle_loop_mode();
                Ok(ApiResponse::with_data(
                    format!("Repeat mode set to {}", loop_mode_name(mode)),
                    json!({ "repeat_mode": mode }),
                ))
            }
            ApiCommand::Downloaded { path, enqueue } => self.downloaded(&path, enqueue),
        };

        outcome.unwrap_or_else(|e| {
            log::debug!("refused: {e}");
            ApiResponse::failure(e.to_string())
        })
    }

    fn status(&self) -> ApiResponse {
        let state = self.player.state();
        ApiResponse::with_data(
            "Player status retrieved",
            json!({
                "is_playing": state.playing,
                "state": self.player.playback(),
                "current_track": state.current.as_ref().map(|t| t.id.as_str()),
                "volume": volume_percent(state.volume),
                "queue_length": self.queue.len(),
                "repeat_mode": self.player.loop_mode,
                "tracks_count": self.library.len(),
            }),
        )
    }

    fn current(&self) -> ApiResponse {
        let state = self.player.state();
        let track = state.current.as_ref();
        ApiResponse::with_data(
            "Current song info retrieved",
            json!({
                "track": track.map(|t| t.id.as_str()),
                "title": track.map(|t| t.title.as_str()),
                "artist": track.and_then(|t| t.artist.as_deref()),
                "progress": state.elapsed.as_secs(),
                "duration": state.duration.map_or(0, |d| d.as_secs()),
                "state": self.player.playback(),
                "volume": volume_percent(state.volume),
            }),
        )
    }

    fn tracks(&self) -> ApiResponse {
        let ids: Vec<&str> = self.library.tracks().iter().map(|t| t.id.as_str()).collect();
        ApiResponse::with_data(
            format!("Found {} tracks", ids.len()),
            json!({ "tracks": ids }),
        )
    }

    fn toggle(&mut self) -> Outcome {
        let state = self.player.toggle()?;
        let message = match state {
            PlaybackState::Playing => "Playback resumed",
            _ => "Playback paused",
        };
        Ok(ApiResponse::with_data(message, json!({ "state": state })))
    }

    fn play(&mut self) -> Outcome {
        match self.player.playback() {
            PlaybackState::Paused => {
                self.player.resume()?;
                Ok(ApiResponse::ok("Playback resumed"))
            }
            playback => {
                let track = match self.next_from_queue() {
                    Some(t) => t,
                    None if playback == PlaybackState::Playing => {
                        return Err(PlayerError::AlreadyPlaying);
                    }
                    None => self
                        .library
                        .tracks()
                        .first()
                        .cloned()
                        .ok_or(PlayerError::EmptyLibrary)?,
                };
                Ok(self.start(track, "Now playing"))
            }
        }
    }

    fn skip(&mut self) -> Outcome {
        let track = match self.next_from_queue() {
            Some(t) => t,
            None => self.library_neighbor(true)?,
        };
        Ok(self.start(track, "Skipped to next track"))
    }

    fn previous(&mut self) -> Outcome {
        let track = self.library_neighbor(false)?;
        Ok(self.start(track, "Moved to previous track"))
    }

    fn stop(&mut self, clear_queue: bool) -> ApiResponse {
        self.player.stop();
        if clear_queue {
            self.queue.clear();
            ApiResponse::ok("Playback stopped and queue cleared")
        } else {
            ApiResponse::ok("Playback stopped")
        }
    }

    fn set_volume(&mut self, percent: i64) -> ApiResponse {
        let percent = percent.clamp(0, 100);
        self.player.set_volume(percent as f32 / 100.0);
        ApiResponse::with_data(
            format!("Volume set to {percent}%"),
            json!({ "volume": percent }),
        )
    }

    fn seek(&mut self, secs: f64) -> Outcome {
        // `max` also maps NaN to zero.
        let requested = Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX);
        let position = self.player.seek(requested)?;
        Ok(ApiResponse::with_data(
            format!("Seeked to {}s", position.as_secs()),
            json!({ "position": position.as_secs_f64() }),
        ))
    }

    fn search(&mut self, query: String) -> ApiResponse {
        self.player.set_search(query);
        let results: Vec<&str> = self
            .player
            .filtered(&self.library)
            .into_iter()
            .take(self.max_results)
            .map(|t| t.id.as_str())
            .collect();
        ApiResponse::with_data(
            format!("Found {} matching tracks", results.len()),
            json!({ "results": results }),
        )
    }

    fn queue_add(&mut self, name: &str) -> Outcome {
        if let Some(track) = self.library.get(name) {
            self.queue.add(track.id.clone());
            return Ok(ApiResponse::with_data(
                format!("Added '{name}' to queue"),
                json!({ "queue_length": self.queue.len() }),
            ));
        }

        let top = self
            .library
            .search(name)
            .first()
            .map(|t| t.id.clone())
            .ok_or(PlayerError::NoSearchResults)?;
        self.queue.add(top.clone());
        Ok(ApiResponse::with_data(
            format!("Added top search result '{top}' to queue"),
            json!({ "queue_length": self.queue.len() }),
        ))
    }

    fn queue_list(&self) -> ApiResponse {
        let entries: Vec<_> = self
            .queue
            .iter()
            .enumerate()
            .map(|(index, track)| json!({ "index": index, "track": track }))
            .collect();
        ApiResponse::with_data(
            format!("Queue has {} tracks", self.queue.len()),
            json!({ "queue": entries, "total_tracks": self.queue.len() }),
        )
    }

    fn queue_remove(&mut self, index: i64) -> Outcome {
        let removed = self.queue.remove(index)?;
        Ok(ApiResponse::with_data(
            format!("Removed '{removed}' from queue"),
            json!({ "queue_length": self.queue.len() }),
        ))
    }

    fn library_delete(&mut self, id: &str) -> ApiResponse {
        match self.library.delete(id) {
            Ok(track) => {
                log::info!("deleted {}", track.path.display());
                self.queue.retain_without(id);
                if self.player.current().is_some_and(|t| t.id == id) {
                    self.player.stop();
                }
                ApiResponse::with_data(
                    format!("Deleted '{id}' from music library"),
                    json!({ "tracks_count": self.library.len() }),
                )
            }
            Err(LibraryError::TrackNotFound(_)) => {
                ApiResponse::failure(format!("Failed to delete '{id}' - file not found"))
            }
            Err(e) => {
                log::warn!("{e}");
                ApiResponse::failure(format!("Failed to delete '{id}': {e}"))
            }
        }
    }

    fn downloaded(&mut self, path: &std::path::Path, enqueue: bool) -> Outcome {
        self.library.rescan();
        let Some(track) = self.library.find_by_path(path) else {
            return Ok(ApiResponse::failure(format!(
                "Downloaded file {} is not a playable track",
                path.display()
            )));
        };

        if enqueue {
            let id = track.id.clone();
            self.queue.add(id.clone());
            Ok(ApiResponse::with_data(
                format!("Downloaded and added '{id}' to queue"),
                json!({ "queue_length": self.queue.len() }),
            ))
        } else {
            Ok(ApiResponse::with_data(
                format!("Downloaded '{}'", track.id),
                json!({ "tracks_count": self.library.len() }),
            ))
        }
    }

    fn start(&mut self, track: Track, message: &str) -> ApiResponse {
        let id = track.id.clone();
        log::info!("playing {id}");
        self.player.start(track);
        ApiResponse::with_data(message, json!({ "track": id }))
    }

    /// Pop queued ids until one still exists in the library.
    fn next_from_queue(&mut self) -> Option<Track> {
        while let Some(id) = self.queue.pop_front() {
            match self.library.get(&id) {
                Some(t) => return Some(t.clone()),
                None => log::debug!("dropping stale queue entry {id}"),
            }
        }
        None
    }

    /// The library track after (or before) the active one.
    ///
    /// Wraps around only under `LoopAll`; with nothing active, starts at the top.
    fn library_neighbor(&self, forward: bool) -> Result<Track, PlayerError> {
        let tracks = self.library.tracks();
        if tracks.is_empty() {
            return Err(PlayerError::EmptyLibrary);
        }
        let len = tracks.len();
        let wrap = self.player.loop_mode == LoopMode::LoopAll;
        let current = self
            .player
            .current()
            .and_then(|t| self.library.position(&t.id));

        let idx = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) if i + 1 < len => i + 1,
            (Some(_), true) if wrap => 0,
            (Some(_), true) => return Err(PlayerError::EndOfPlaylist),
            (Some(i), false) if i > 0 => i - 1,
            (Some(_), false) if wrap => len - 1,
            (Some(_), false) => return Err(PlayerError::StartOfPlaylist),
        };
        Ok(tracks[idx].clone())
    }

    fn advance_after_end(&mut self) {
        if self.player.loop_mode == LoopMode::LoopOne {
            if let Some(t) = self.player.current().cloned() {
                self.start(t, "Repeating");
                return;
            }
        }

        let next = match self.next_from_queue() {
            Some(t) => Ok(t),
            None => self.library_neighbor(true),
        };
        match next {
            Ok(t) => {
                self.start(t, "Auto-advance");
            }
            Err(e) => {
                log::info!("{e}; stopping");
                self.player.stop();
            }
        }
    }
}

fn volume_percent(volume: f32) -> u8 {
    (volume * 100.0).round().clamp(0.0, 100.0) as u8
}

fn loop_mode_name(mode: LoopMode) -> &'static str {
    match mode {
        LoopMode::NoLoop => "no-loop",
        LoopMode::LoopAll => "loop-all",
        LoopMode::LoopOne => "loop-one",
    }
}

#[cfg(test)]
mod tests;
