//! # Library Data Module
//!
//! Owns the client-side view of the music library.
//!
//! ## Overview
//!
//! This module provides:
//! - Data model types mapped to the server's JSON schema (tracks, playlists,
//!   lyrics, metadata payloads)
//! - The in-memory track index with Levenshtein-based fuzzy search
//!
//! The server remains the source of truth; nothing here persists anything.

pub mod models;
pub mod search;

pub use models::{Lyrics, Playlist, Track, TrackMetadata};
pub use search::{levenshtein, SearchScope, TrackIndex};
