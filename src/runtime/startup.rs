use std::io;
use std::path::{Path, PathBuf};

use crate::config::{self, LoopModeSetting};
use crate::player::LoopMode;

pub fn loop_mode(setting: LoopModeSetting) -> LoopMode {
    match setting {
        LoopModeSetting::NoLoop => LoopMode::NoLoop,
        LoopModeSetting::LoopAll => LoopMode::LoopAll,
        LoopModeSetting::LoopOne => LoopMode::LoopOne,
    }
}

/// Configured volume percent as an output volume in `[0, 1]`.
pub fn initial_volume(settings: &config::PlaybackSettings) -> f32 {
    f32::from(settings.volume.min(100)) / 100.0
}

/// The configured music directory, or `cwd`, made absolute.
pub fn music_dir(configured: Option<&Path>, cwd: &Path) -> io::Result<PathBuf> {
    let dir = match configured {
        Some(d) if d.is_absolute() => d.to_path_buf(),
        Some(d) => cwd.join(d),
        None => cwd.to_path_buf(),
    };
    dir.canonicalize()
}
