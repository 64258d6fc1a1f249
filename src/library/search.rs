use super::model::Track;

/// Case-insensitive substring match against the track's title or artist.
pub fn matches(track: &Track, query_lower: &str) -> bool {
    track.title.to_lowercase().contains(query_lower)
        || track
            .artist
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(query_lower))
}

/// Tracks matching `query`, in library order.
///
/// A blank query matches everything.
pub fn filter<'a>(tracks: &'a [Track], query: &str) -> Vec<&'a Track> {
    let query = query.trim();
    if query.is_empty() {
        return tracks.iter().collect();
    }

    let query_lower = query.to_lowercase();
    tracks
        .iter()
        .filter(|t| matches(t, &query_lower))
        .collect()
}
