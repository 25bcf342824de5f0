//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the client core and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per host (desktop shell, embedded web
//! view, test harness).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations against the music server
//!
//! ### Preferences
//! - [`SettingsStore`](storage::SettingsStore) - Small string preferences with expiry
//!
//! ### Playback
//! - [`AudioOutput`](audio::AudioOutput) - The single platform audio element
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::error::Error;
//!
//! pub fn new(config: CoreConfig) -> Result<Self> {
//!     let audio = config.audio_output
//!         .ok_or_else(|| Error::CapabilityMissing {
//!             capability: "AudioOutput".to_string(),
//!             message: "No audio output implementation provided. \
//!                      Inject the host's audio element adapter.".to_string()
//!         })?;
//!     // ...
//! }
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError` and
//! provide actionable messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod audio;
pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioOutput, AudioSource, AudioState};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::SettingsStore;
pub use time::{Clock, SystemClock};
