use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;
use crate::library::Track;

use super::sink::create_sink_at;
use super::types::{AudioCmd, AudioError, OutputEvent};

/// Volumes of the outgoing and incoming sink at `step` of a `steps`-long crossfade.
pub(super) fn fade_volumes(step: u64, steps: u64, volume: f32) -> (f32, f32) {
    let steps = steps.max(1);
    let t = (step.min(steps) as f32) / (steps as f32);
    (volume * (1.0 - t), volume * t)
}

/// Position reached after playing `running` from `accumulated`; saturates instead of overflowing.
pub(super) fn playhead(accumulated: Duration, running: Option<Duration>) -> Duration {
    accumulated.saturating_add(running.unwrap_or(Duration::ZERO))
}

/// State owned by the audio thread: the device stream and the loaded track.
struct Deck {
    stream: OutputStream,
    settings: AudioSettings,
    events: Sender<OutputEvent>,

    track: Option<Track>,
    sink: Option<Sink>,
    // Still audible after a `Load`; faded out by the next `Play`.
    outgoing: Option<Sink>,
    paused: bool,
    volume: f32,

    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Deck {
    fn new(stream: OutputStream, settings: AudioSettings, events: Sender<OutputEvent>) -> Self {
        Self {
            stream,
            settings,
            events,
            track: None,
            sink: None,
            outgoing: None,
            paused: true,
            volume: 1.0,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    fn emit(&self, event: OutputEvent) {
        // The receiver only disappears while the player is shutting down.
        let _ = self.events.send(event);
    }

    fn elapsed(&self) -> Duration {
        playhead(self.accumulated, self.started_at.map(|st| st.elapsed()))
    }

    fn drop_outgoing(&mut self) {
        if let Some(s) = self.outgoing.take() {
            s.stop();
        }
    }

    fn apply(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load(track) => self.load(track),
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Stop => self.stop(),
            AudioCmd::Seek(pos) => self.seek(pos),
            AudioCmd::SetVolume(v) => {
                self.volume = v;
                if let Some(s) = self.sink.as_ref() {
                    s.set_volume(v);
                }
            }
            AudioCmd::Quit => self.stop(),
        }
    }

    fn load(&mut self, track: Track) {
        self.drop_outgoing();
        if let Some(old) = self.sink.take() {
            if !self.paused && self.settings.crossfade_ms > 0 {
                self.outgoing = Some(old);
            } else {
                old.stop();
            }
        }

        match create_sink_at(&self.stream, &track, Duration::ZERO, self.volume) {
            Ok((sink, duration)) => {
                log::debug!("loaded {}", track.path.display());
                self.sink = Some(sink);
                self.emit(OutputEvent::Loaded { duration });
            }
            Err(e) => {
                log::warn!("{e}");
                self.drop_outgoing();
                self.emit(OutputEvent::Error(e.to_string()));
            }
        }

        self.track = Some(track);
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    fn play(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };

        match self.outgoing.take() {
            Some(old) => crossfade(&old, sink, self.volume, &self.settings),
            None => sink.play(),
        }

        if self.paused {
            self.started_at = Some(Instant::now());
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        self.drop_outgoing();
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        sink.pause();
        if !self.paused {
            if let Some(st) = self.started_at.take() {
                self.accumulated = self.accumulated.saturating_add(st.elapsed());
            }
            self.paused = true;
        }
    }

    fn stop(&mut self) {
        self.drop_outgoing();
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.track = None;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    /// Rebuild the current sink and skip into the file.
    fn seek(&mut self, position: Duration) {
        self.drop_outgoing();
        let Some(track) = self.track.as_ref() else {
            return;
        };
        if let Some(s) = self.sink.take() {
            s.stop();
        }

        match create_sink_at(&self.stream, track, position, self.volume) {
            Ok((sink, _)) => {
                if self.paused {
                    self.started_at = None;
                } else {
                    sink.play();
                    self.started_at = Some(Instant::now());
                }
                self.sink = Some(sink);
                self.accumulated = position;
                self.emit(OutputEvent::TimeUpdate(position));
            }
            Err(e) => {
                log::warn!("seek failed: {e}");
                self.paused = true;
                self.started_at = None;
                self.emit(OutputEvent::Error(e.to_string()));
            }
        }
    }

    /// Periodic position report and end-of-track detection.
    fn tick(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            return;
        }

        if sink.empty() {
            self.accumulated = self.elapsed();
            self.started_at = None;
            self.paused = true;
            self.emit(OutputEvent::Ended);
        } else {
            self.emit(OutputEvent::TimeUpdate(self.elapsed()));
        }
    }
}

/// Fade `old` out and `new` in, blocking for `crossfade_ms`.
fn crossfade(old: &Sink, new: &Sink, volume: f32, settings: &AudioSettings) {
    let steps = settings.crossfade_steps.max(1);
    let step_ms = (settings.crossfade_ms / steps).max(1);

    new.set_volume(0.0);
    new.play();

    // Simple and good enough; audio keeps flowing in rodio's mixer thread.
    for step in 1..=steps {
        let (out_v, in_v) = fade_volumes(step, steps, volume);
        old.set_volume(out_v);
        new.set_volume(in_v);
        thread::sleep(Duration::from_millis(step_ms));
    }

    old.stop();
    new.set_volume(volume);
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<OutputEvent>,
    ready: SyncSender<Result<(), AudioError>>,
    settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(AudioError::NoDevice(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped; our own log covers shutdown.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let tick = Duration::from_millis(settings.tick_ms.max(1));
        let mut deck = Deck::new(stream, settings, events);

        loop {
            match rx.recv_timeout(tick) {
                Ok(AudioCmd::Quit) => {
                    deck.apply(AudioCmd::Quit);
                    break;
                }
                Ok(cmd) => deck.apply(cmd),
                Err(RecvTimeoutError::Timeout) => deck.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::debug!("audio thread finished");
    })
}
