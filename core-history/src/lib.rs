//! # Listening History Module
//!
//! Tracks how long the current track has actually been playing and reports
//! listens to the server: a one-shot "played" report once the scrobble
//! threshold is crossed, and a periodic "now playing" heartbeat.
//!
//! Reporting is telemetry: failures are logged and surfaced as events, never
//! propagated into playback.

pub mod reporter;
pub mod tracker;

pub use reporter::PlaybackReporter;
pub use tracker::HistoryTracker;
