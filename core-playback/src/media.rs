//! Media handle ownership
//!
//! Prefetched audio and cover blobs are owned through [`MediaHandle`]s issued
//! by a [`MediaStore`]. A cached handle releases its store registration when
//! dropped, so release happens exactly once per handle no matter how an entry
//! leaves the queue (played, removed, or abandoned mid-pipeline). The store
//! keeps create/release counters so the invariant is observable.
//!
//! Handles are dual-mode: `Stream` wraps a server URL the host fetches
//! itself (nothing to release), `Cached` wraps bytes downloaded up front.

use bridge_traits::audio::AudioSource;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Accounting registry for cached media handles.
///
/// Shared by everything that mints handles so `active()` reflects the whole
/// client. The counters only ever grow; `active` is their difference.
#[derive(Debug, Default)]
pub struct MediaStore {
    created: AtomicU64,
    released: AtomicU64,
}

impl MediaStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wrap downloaded bytes in a cached, store-accounted handle.
    pub fn cache(self: &Arc<Self>, data: Bytes) -> MediaHandle {
        self.created.fetch_add(1, Ordering::Relaxed);
        MediaHandle::Cached(CachedMedia {
            data,
            store: Arc::clone(self),
        })
    }

    /// Total cached handles ever created.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Total cached handles released.
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Cached handles currently alive.
    pub fn active(&self) -> u64 {
        self.created() - self.released()
    }
}

/// A handle to one track resource (audio or cover).
#[derive(Debug)]
pub enum MediaHandle {
    /// Remote URL; the host element streams it directly.
    Stream { url: String },
    /// Locally cached bytes owned by this handle.
    Cached(CachedMedia),
}

/// Cached media bytes registered with a [`MediaStore`].
///
/// Not `Clone`: the handle is the unit of ownership. The underlying `Bytes`
/// may be cheaply shared (e.g. into an [`AudioSource`]) without affecting
/// the release accounting.
#[derive(Debug)]
pub struct CachedMedia {
    data: Bytes,
    store: Arc<MediaStore>,
}

impl Drop for CachedMedia {
    fn drop(&mut self) {
        self.store.released.fetch_add(1, Ordering::Relaxed);
        debug!(bytes = self.data.len(), "Released cached media");
    }
}

/// Borrow-free reference to a handle's content, for render data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Url(String),
    Bytes(Bytes),
}

impl MediaHandle {
    /// Whether this handle owns locally cached bytes.
    pub fn is_cached(&self) -> bool {
        matches!(self, MediaHandle::Cached(_))
    }

    /// The cached bytes, when present.
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            MediaHandle::Stream { .. } => None,
            MediaHandle::Cached(cached) => Some(&cached.data),
        }
    }

    /// Content reference for render-data snapshots.
    pub fn media_ref(&self) -> MediaRef {
        match self {
            MediaHandle::Stream { url } => MediaRef::Url(url.clone()),
            MediaHandle::Cached(cached) => MediaRef::Bytes(cached.data.clone()),
        }
    }

    /// Source representation for the host audio element.
    pub fn audio_source(&self) -> AudioSource {
        match self {
            MediaHandle::Stream { url } => AudioSource::RemoteStream { url: url.clone() },
            MediaHandle::Cached(cached) => AudioSource::MemoryBuffer {
                data: cached.data.clone(),
            },
        }
    }
}
