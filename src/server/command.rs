//! Commands sent from HTTP handlers to the controller thread.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use thiserror::Error;

use super::response::ApiResponse;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCommand {
    Status,
    Current,
    Tracks,
    Resume,
    Pause,
    Toggle,
    /// Resume, or start the queue / library from the top.
    Play,
    Skip,
    Previous,
    Stop { clear_queue: bool },
    /// Volume in percent; clamped to 0-100.
    SetVolume(i64),
    /// Position in seconds.
    Seek(f64),
    Search(String),
    QueueAdd(String),
    QueueList,
    QueueRemove(i64),
    QueueClear,
    LibraryDelete(String),
    CycleLoop,
    /// A file was downloaded into the library directory.
    Downloaded { path: PathBuf, enqueue: bool },
}

/// A command plus the channel its answer goes back on.
pub struct Envelope {
    pub cmd: ApiCommand,
    pub reply: Sender<ApiResponse>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("Music player not initialized")]
    Unavailable,
    #[error("Music player did not answer within {0:?}")]
    Timeout(Duration),
}

/// Cloneable handle used by HTTP handlers to talk to the controller.
#[derive(Clone)]
pub struct ControlHandle {
    tx: Sender<Envelope>,
    timeout: Duration,
}

impl ControlHandle {
    pub fn new(tx: Sender<Envelope>, timeout: Duration) -> Self {
        Self { tx, timeout }
    }

    /// A handle with no controller behind it; every request is `Unavailable`.
    pub fn detached() -> Self {
        let (tx, _rx) = mpsc::channel();
        Self {
            tx,
            timeout: Duration::from_millis(1),
        }
    }

    /// Send `cmd` and wait for the controller's answer.
    pub fn request(&self, cmd: ApiCommand) -> Result<ApiResponse, ControlError> {
        let (reply_tx, reply_rx): (Sender<ApiResponse>, Receiver<ApiResponse>) = mpsc::channel();
        self.tx
            .send(Envelope {
                cmd,
                reply: reply_tx,
            })
            .map_err(|_| ControlError::Unavailable)?;

        reply_rx.recv_timeout(self.timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => ControlError::Timeout(self.timeout),
            RecvTimeoutError::Disconnected => ControlError::Unavailable,
        })
    }
}
