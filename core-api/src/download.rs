//! Remote download service
//!
//! Wraps the server's downloader: a search endpoint returning candidate
//! media, and a download endpoint whose response body is chunked progress
//! text streamed back to the caller as it arrives.

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use bridge_traits::BridgeError;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One candidate from the download search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSearchResult {
    pub title: String,
    pub view_count: u64,
    pub duration_string: String,
    pub channel_name: String,
    pub channel_subscribers: u64,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<DownloadSearchResult>,
}

/// Terminal state of a download: the accumulated progress log, and whether
/// the downloader reported completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub success: bool,
    pub log: String,
}

impl ApiClient {
    /// Search the remote downloader for candidate media.
    pub async fn download_search(&self, query: &str) -> Result<Vec<DownloadSearchResult>> {
        let response = self
            .post_json("/download/search", serde_json::json!({ "query": query }))
            .await?;
        let parsed: SearchResponse = Self::decode("/download/search", &response)?;
        Ok(parsed.results)
    }

    /// Download a URL into a playlist, streaming downloader output.
    ///
    /// Each chunk of progress text is forwarded through `progress` as it
    /// arrives (a dropped receiver just stops the forwarding, not the
    /// download). The downloader signals success by ending its output with
    /// `Done!`.
    ///
    /// Unlike queue refills, failures here propagate: a lost download is a
    /// lost user action and the host must surface it.
    pub async fn start_download(
        &self,
        playlist: &str,
        url: &str,
        progress: Option<mpsc::Sender<String>>,
    ) -> Result<DownloadOutcome> {
        info!(playlist = playlist, url = url, "Starting download");

        let request = self.post_request(
            "/download/ytdl",
            serde_json::json!({ "directory": playlist, "url": url }),
        )?;

        let mut reader = self.http.execute_stream(request).await?;

        let mut log = String::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| ApiError::Bridge(BridgeError::Io(e)))?;
            if n == 0 {
                break;
            }

            let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
            log.push_str(&chunk);

            if let Some(tx) = &progress {
                let _ = tx.send(chunk).await;
            }
        }

        let success = log.trim_end().ends_with("Done!");
        if !success {
            warn!(playlist = playlist, url = url, "Download did not report completion");
        }

        Ok(DownloadOutcome { success, log })
    }
}
