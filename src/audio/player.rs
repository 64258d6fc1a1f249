use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::library::Track;

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioError, Output, OutputEvent};

/// `Output` backed by a rodio sink living on a dedicated audio thread.
pub struct RodioOutput {
    tx: Sender<AudioCmd>,
    events: Receiver<OutputEvent>,
    join: Option<JoinHandle<()>>,
}

impl RodioOutput {
    /// Spawn the audio thread and wait until the output device is open.
    pub fn spawn(audio_settings: AudioSettings) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<OutputEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let join = spawn_audio_thread(rx, event_tx, ready_tx, audio_settings);

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                events: event_rx,
                join: Some(join),
            }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(_) => Err(AudioError::NoDevice("audio thread exited".to_string())),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(mpsc::SendError(cmd)) = self.tx.send(cmd) {
            log::warn!("audio thread is gone, dropping {cmd:?}");
        }
    }
}

impl Output for RodioOutput {
    fn load(&mut self, track: &Track) {
        self.send(AudioCmd::Load(track.clone()));
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn stop(&mut self) {
        self.send(AudioCmd::Stop);
    }

    fn seek(&mut self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }

    fn poll_events(&mut self) -> Vec<OutputEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
