//! Reporting seam for the history tracker.
//!
//! The tracker talks to the server through this trait so tests can count and
//! fail reports deterministically; [`ApiClient`] is the production
//! implementation.

use async_trait::async_trait;
use core_api::{ApiClient, NowPlayingReport, PlayedReport, Result};

/// Sink for listening-history reports.
#[async_trait]
pub trait PlaybackReporter: Send + Sync {
    /// Report the periodic now-playing heartbeat.
    async fn report_now_playing(&self, report: &NowPlayingReport) -> Result<()>;

    /// Report a completed listen (scrobble).
    async fn report_played(&self, report: &PlayedReport) -> Result<()>;
}

#[async_trait]
impl PlaybackReporter for ApiClient {
    async fn report_now_playing(&self, report: &NowPlayingReport) -> Result<()> {
        ApiClient::report_now_playing(self, report).await
    }

    async fn report_played(&self, report: &PlayedReport) -> Result<()> {
        ApiClient::report_played(self, report).await
    }
}
