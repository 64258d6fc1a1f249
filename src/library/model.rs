use std::path::PathBuf;
use std::time::Duration;

/// One playable item in the library.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Path relative to the library root, `/`-separated. Used as the track name by the API.
    pub id: String,
    /// Absolute location of the audio file.
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
}
