//! In-memory fuzzy track search
//!
//! Ranks the track index against a free-text query using Levenshtein edit
//! distance, with substring bonuses for the file key and the display name.
//! The scoring heuristic is inherited behavior and preserved exactly,
//! including the double substring doubling (up to 4x) and the `score > 0`
//! cutoff.

use crate::models::Track;
use tracing::debug;

/// Classic dynamic-programming edit distance over single-character
/// insert/delete/substitute, with a full 2-D table.
///
/// Collections here are at most a few thousand short strings; O(n*m) per
/// candidate is plenty.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut table = vec![vec![0usize; a.len() + 1]; b.len() + 1];

    for (i, cell) in table[0].iter_mut().enumerate() {
        *cell = i;
    }
    for (j, row) in table.iter_mut().enumerate() {
        row[0] = j;
    }

    for j in 1..=b.len() {
        for i in 1..=a.len() {
            let indicator = usize::from(a[i - 1] != b[j - 1]);
            table[j][i] = (table[j][i - 1] + 1)
                .min(table[j - 1][i] + 1)
                .min(table[j - 1][i - 1] + indicator);
        }
    }

    table[b.len()][a.len()]
}

/// Category filter for a search: all playlists, or a single one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    Everyone,
    Playlist(String),
}

impl SearchScope {
    fn includes(&self, playlist: &str) -> bool {
        match self {
            SearchScope::Everyone => true,
            SearchScope::Playlist(name) => name == playlist,
        }
    }
}

/// One searchable candidate: the raw file key plus the human display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Owning playlist name.
    pub playlist: String,
    /// File name within the playlist; the string the distance runs against.
    pub key: String,
    /// Human display name shown in result lists.
    pub display: String,
}

/// A scored search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub playlist: String,
    pub key: String,
    pub display: String,
    pub score: i64,
}

/// Search output: ranked matches plus a truncation indicator for the
/// "...and more" affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub matches: Vec<SearchMatch>,
    pub truncated: bool,
}

/// The in-memory candidate list the search runs over.
///
/// Rebuilt wholesale whenever the server-side track list is (re)fetched.
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    entries: Vec<SearchEntry>,
}

impl TrackIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append candidates for a batch of tracks.
    pub fn add_tracks<'a>(&mut self, tracks: impl IntoIterator<Item = &'a Track>) {
        for track in tracks {
            self.entries.push(SearchEntry {
                playlist: track.playlist.clone(),
                key: track.file_name().to_string(),
                display: track.display_title(),
            });
        }
    }

    /// Drop all candidates, keeping allocations.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank candidates in `scope` against `query`.
    ///
    /// An empty (or whitespace) query lists every candidate in the scope with
    /// a uniform score, preserving encounter order. Otherwise each candidate
    /// scores `key_length - levenshtein(key, query)` (both lowercased),
    /// doubled when the key contains the query as a substring and doubled
    /// again when the display name does; candidates scoring zero or below
    /// are excluded. Ties keep encounter order.
    pub fn search(&self, scope: &SearchScope, query: &str, limit: usize) -> SearchResults {
        let query = query.trim().to_lowercase();

        let mut matches: Vec<SearchMatch> = Vec::new();

        for entry in &self.entries {
            if !scope.includes(&entry.playlist) {
                continue;
            }

            let score = if query.is_empty() {
                // No query, display all
                1
            } else {
                let key_lower = entry.key.to_lowercase();
                let mut score =
                    entry.key.chars().count() as i64 - levenshtein(&key_lower, &query) as i64;

                if key_lower.contains(&query) {
                    score *= 2;
                }

                if entry.display.to_lowercase().contains(&query) {
                    score *= 2;
                }

                score
            };

            if score > 0 {
                matches.push(SearchMatch {
                    playlist: entry.playlist.clone(),
                    key: entry.key.clone(),
                    display: entry.display.clone(),
                    score,
                });
            }
        }

        // sort_by is stable, so equal scores keep encounter order
        matches.sort_by(|a, b| b.score.cmp(&a.score));

        let truncated = matches.len() > limit;
        matches.truncate(limit);

        debug!(
            query = %query,
            matches = matches.len(),
            truncated,
            "Searched track index"
        );

        SearchResults { matches, truncated }
    }
}
