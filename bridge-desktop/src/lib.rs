//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! using desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a JSON file with per-entry expiry
//!
//! `AudioOutput` has no desktop default here: the audio element belongs to
//! the embedding host (web view, media shell) and must be injected.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{JsonSettingsStore, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new();
//!     let settings = JsonSettingsStore::open("/path/to/settings.json").unwrap();
//!
//!     // Use in core configuration
//! }
//! ```

mod http;
mod settings;

pub use http::ReqwestHttpClient;
pub use settings::JsonSettingsStore;
