//! Queue entries
//!
//! A [`QueueEntry`] is a ready-to-play bundle: the track, its prefetched
//! audio and cover handles, and lyrics when the server has them. The entry
//! exclusively owns its media handles; dropping it releases them.

use crate::media::MediaHandle;
use core_library::models::{Lyrics, Track};

/// One ready-to-play queue item.
#[derive(Debug)]
pub struct QueueEntry {
    pub track: Track,
    pub audio: MediaHandle,
    pub cover: MediaHandle,
    pub lyrics: Option<Lyrics>,
}

impl QueueEntry {
    /// Display line shown for this entry: `"[Playlist] Artists - Title"`.
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.track.playlist, self.track.display_title())
    }
}
