use std::path::Path;

use crate::config::TrackDisplayField;

/// Build a display string for a track according to the provided `fields` and separator.
///
/// This composes metadata fields (artist, title, album, filename, path) in the
/// configured order and falls back to `title` when no parts were produced.
pub fn display_from_fields(
    path: &Path,
    title: &str,
    artist: Option<&str>,
    album: Option<&str>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let non_blank = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    let parts: Vec<String> = fields
        .iter()
        .filter_map(|f| match f {
            TrackDisplayField::Title => non_blank(Some(title)),
            TrackDisplayField::Artist => non_blank(artist),
            TrackDisplayField::Album => non_blank(album),
            TrackDisplayField::Filename => non_blank(path.file_stem().and_then(|s| s.to_str())),
            TrackDisplayField::Path => Some(path.display().to_string()),
        })
        .collect();

    if parts.is_empty() {
        title.to_string()
    } else {
        parts.join(sep)
    }
}
