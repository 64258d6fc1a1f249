//! Fetching remote audio into the library directory.
//!
//! The heavy lifting is delegated to an external yt-dlp compatible program;
//! we only build its command line and read back where the file landed.

use std::path::PathBuf;
use std::process::Command;

use crate::config::DownloadSettings;

use super::error::LibraryError;

/// Whether `locator` should be downloaded rather than looked up in the library.
pub fn is_remote_url(locator: &str) -> bool {
    let l = locator.trim().to_ascii_lowercase();
    l.starts_with("https://") || l.starts_with("http://")
}

#[derive(Debug, Clone)]
pub struct Downloader {
    settings: DownloadSettings,
    dir: PathBuf,
}

impl Downloader {
    pub fn new(settings: DownloadSettings, dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            dir: dir.into(),
        }
    }

    fn args(&self, url: &str) -> Vec<String> {
        vec![
            "-P".to_string(),
            self.dir.display().to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.settings.audio_format.clone(),
            "--no-playlist".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            url.to_string(),
        ]
    }

    /// Download `url` and return the path of the resulting audio file.
    ///
    /// Blocks until the downloader exits.
    pub fn fetch(&self, url: &str) -> Result<PathBuf, LibraryError> {
        if !self.settings.enabled {
            return Err(LibraryError::DownloadDisabled);
        }

        log::info!("downloading {url} into {}", self.dir.display());
        let output = Command::new(&self.settings.program)
            .args(self.args(url))
            .output()
            .map_err(|source| LibraryError::Spawn {
                program: self.settings.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::warn!("download of {url} failed: {stderr}");
            return Err(LibraryError::Download(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .map(PathBuf::from)
            .ok_or(LibraryError::DownloadOutput)?;

        log::info!("downloaded {}", path.display());
        Ok(path)
    }
}
