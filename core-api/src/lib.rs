//! # Server API Module
//!
//! Thin typed wrappers around the music server's JSON/HTTP API.
//!
//! ## Overview
//!
//! This module handles:
//! - Track listing, selection, and search endpoints
//! - Audio / cover / lyrics byte-stream endpoints (dual-mode: streamed URL
//!   or buffered download)
//! - Metadata update, delete-to-trash, and dislike endpoints
//! - Now-playing and history reporting endpoints
//! - The download service with chunked progress streaming
//!
//! Every mutating call is a POST carrying the hosting page's anti-forgery
//! token; every call maps a non-2xx status to [`ApiError::Status`]. The
//! server owns all schemas; these wrappers only shuttle JSON.

pub mod client;
pub mod download;
pub mod error;

pub use client::{ApiClient, NowPlayingReport, PlayedReport};
pub use download::{DownloadOutcome, DownloadSearchResult};
pub use error::{ApiError, Result};
