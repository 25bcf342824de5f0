//! # Playback Module
//!
//! The client-side playback core: prefetching queue, media-handle ownership,
//! and the player controller driving the host's audio element.
//!
//! ## Overview
//!
//! This module handles:
//! - The bounded, asynchronously refilled playback queue (single-flight
//!   refills, asymmetric retry backoff)
//! - Ownership of prefetched media blobs with release-exactly-once
//!   accounting
//! - The `Idle`/`Loaded` player state machine with transport controls
//! - Render-data snapshots (`NowPlaying`) consumed by host UIs

pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod media;
pub mod queue;
pub mod source;

pub use config::QueueConfig;
pub use controller::{LyricsRender, NowPlaying, PlayerController};
pub use entry::QueueEntry;
pub use error::{PlaybackError, Result};
pub use media::{MediaHandle, MediaRef, MediaStore};
pub use queue::{PlaybackQueue, QueuedTrackView};
pub use source::{ApiTrackSource, FetchMode, TrackSource};
