use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LibrarySettings;

use super::error::LibraryError;
use super::model::Track;
use super::scan::{scan, track_id};
use super::search::filter;

/// The scanned music directory.
pub struct Library {
    root: PathBuf,
    settings: LibrarySettings,
    tracks: Vec<Track>,
}

impl Library {
    /// Scan `root` and build the library.
    pub fn open(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        let root = root.into();
        let tracks = scan(&root, &settings);
        log::info!("library {}: {} tracks", root.display(), tracks.len());
        Self {
            root,
            settings,
            tracks,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_tracks(root: impl Into<PathBuf>, tracks: Vec<Track>) -> Self {
        Self {
            root: root.into(),
            settings: LibrarySettings::default(),
            tracks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Re-read the directory, e.g. after a download added a file.
    pub fn rescan(&mut self) {
        self.tracks = scan(&self.root, &self.settings);
        log::debug!("library rescanned: {} tracks", self.tracks.len());
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn find_by_path(&self, path: &Path) -> Option<&Track> {
        self.get(&track_id(&self.root, path))
    }

    /// Remove the track's file from disk and drop it from the library.
    pub fn delete(&mut self, id: &str) -> Result<Track, LibraryError> {
        let pos = self
            .position(id)
            .ok_or_else(|| LibraryError::TrackNotFound(id.to_string()))?;

        let path = &self.tracks[pos].path;
        fs::remove_file(path).map_err(|source| LibraryError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(self.tracks.remove(pos))
    }

    pub fn search(&self, query: &str) -> Vec<&Track> {
        filter(&self.tracks, query)
    }
}
