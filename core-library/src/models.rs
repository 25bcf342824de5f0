//! Domain models for the client-side library view
//!
//! These types mirror the server's JSON schema. A [`Track`] is immutable once
//! parsed; the only sanctioned mutation is the explicit metadata-save round
//! trip through [`TrackMetadata`], which rewrites the same fields server-side.

use serde::{Deserialize, Serialize};

/// A playlist as returned by the playlist listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist name, also the namespace prefix of its track paths.
    pub name: String,
    /// Number of tracks in the playlist.
    pub track_count: u32,
    /// Whether the user marked this playlist as a favorite.
    #[serde(default)]
    pub favorite: bool,
    /// Whether the user may modify this playlist.
    #[serde(default)]
    pub write: bool,
}

/// A single track, identified by an opaque path scoped to its playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque identifier, `"<playlist>/<file>"`.
    pub path: String,
    /// Owning playlist name.
    pub playlist: String,
    /// Duration in seconds.
    pub duration: u32,
    /// Free-form tag list.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Display title, when the file has metadata.
    pub title: Option<String>,
    /// Ordered artist list, when known.
    pub artists: Option<Vec<String>>,
    /// Album name, when known.
    pub album: Option<String>,
    /// Album artist, when known.
    pub album_artist: Option<String>,
    /// Release year, when known.
    pub year: Option<u32>,
}

impl Track {
    /// File name portion of the path (everything after the playlist prefix).
    pub fn file_name(&self) -> &str {
        match self.path.find('/') {
            Some(idx) => &self.path[idx + 1..],
            None => &self.path,
        }
    }

    /// Primary display text: `"Artist, Other - Title"` when metadata exists,
    /// the file name otherwise.
    pub fn display_title(&self) -> String {
        match (&self.artists, &self.title) {
            (Some(artists), Some(title)) if !artists.is_empty() => {
                format!("{} - {}", artists.join(", "), title)
            }
            (_, Some(title)) => title.clone(),
            _ => self.file_name().to_string(),
        }
    }

    /// Full display text, optionally prefixed with the playlist and suffixed
    /// with album and year.
    pub fn display_text(&self, show_playlist: bool, show_album: bool) -> String {
        let mut text = String::new();

        if show_playlist {
            text.push_str(&self.playlist);
            text.push_str(": ");
        }

        text.push_str(&self.display_title());

        if show_album && self.album.is_some() {
            let album = self.album.as_deref().unwrap_or_default();
            match self.year {
                Some(year) => text.push_str(&format!(" ({}, {})", album, year)),
                None => text.push_str(&format!(" ({})", album)),
            }
        } else if let Some(year) = self.year {
            text.push_str(&format!(" ({})", year));
        }

        text
    }

    /// Snapshot of the editable metadata fields, as sent to the
    /// metadata-update endpoint.
    pub fn metadata(&self) -> TrackMetadata {
        TrackMetadata {
            path: self.path.clone(),
            title: self.title.clone(),
            album: self.album.clone(),
            artists: self.artists.clone(),
            album_artist: self.album_artist.clone(),
            tags: self.tags.clone(),
            year: self.year,
        }
    }
}

/// The metadata-save payload.
///
/// Field names match the track JSON, so a saved payload combined with the
/// track's immutable fields reparses to an identical [`Track`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub path: String,
    pub title: Option<String>,
    pub album: Option<String>,
    pub artists: Option<Vec<String>>,
    pub album_artist: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub year: Option<u32>,
}

/// Lyrics for a track: source attribution plus markup already sanitized by
/// the server. Hosts render the markup verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lyrics {
    /// URL of the lyrics source, when attributed.
    pub source: Option<String>,
    /// Pre-sanitized HTML markup.
    pub html: String,
}
