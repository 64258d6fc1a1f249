use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while managing the music library on disk.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("track '{0}' not found")]
    TrackNotFound(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("downloads are disabled")]
    DownloadDisabled,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("download failed: {0}")]
    Download(String),

    #[error("downloader did not report an output file")]
    DownloadOutput,
}
