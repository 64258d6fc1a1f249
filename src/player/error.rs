use thiserror::Error;

/// Why a player or queue operation was refused.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Music is already playing")]
    AlreadyPlaying,
    #[error("Music is already paused")]
    AlreadyPaused,
    #[error("No track loaded")]
    NothingLoaded,
    #[error("No music files available")]
    EmptyLibrary,
    #[error("Reached end of playlist")]
    EndOfPlaylist,
    #[error("Reached start of playlist")]
    StartOfPlaylist,
    #[error("Invalid index {index}. Queue has {len} tracks")]
    QueueIndex { index: i64, len: usize },
    #[error("No tracks found matching the query")]
    NoSearchResults,
}
