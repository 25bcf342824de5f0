//! # Event Bus System
//!
//! Provides an event-driven architecture for the client core using
//! `tokio::sync::broadcast`. Modules communicate through typed events rather
//! than direct references: the queue announces refills, the controller
//! announces track changes, and the history tracker listens for them.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Player(PlayerEvent::QueueEmpty))
//!     .ok();
//!
//! assert_eq!(
//!     stream.recv().await.unwrap(),
//!     CoreEvent::Player(PlayerEvent::QueueEmpty)
//! );
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The bus uses `tokio::sync::broadcast`, which can produce two errors:
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber continues with newer events.
//! - **`RecvError::Closed`**: all senders dropped. Treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback queue events
    Queue(QueueEvent),
    /// Player controller events
    Player(PlayerEvent),
    /// Listening history events
    History(HistoryEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Queue(e) => e.description(),
            CoreEvent::Player(e) => e.description(),
            CoreEvent::History(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Queue(QueueEvent::RefillFailed { .. }) => EventSeverity::Warning,
            CoreEvent::History(HistoryEvent::ReportFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Player(PlayerEvent::TrackChanged { .. }) => EventSeverity::Info,
            CoreEvent::History(HistoryEvent::Scrobbled { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Queue Events
// ============================================================================

/// Events emitted by the playback queue and its refill pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum QueueEvent {
    /// A fully prefetched entry was appended to the queue tail.
    EntryQueued {
        /// Track path of the queued entry.
        path: String,
        /// Playlist the track was drawn from.
        playlist: String,
        /// Queue length after the append.
        queue_len: usize,
    },
    /// A not-yet-played entry was discarded from the queue.
    EntryRemoved {
        /// Track path of the removed entry.
        path: String,
    },
    /// A refill pipeline aborted; the queue retries after the error backoff.
    RefillFailed {
        /// Playlist the failed fetch attempt drew from.
        playlist: String,
        /// Human-readable failure message.
        message: String,
    },
}

impl QueueEvent {
    fn description(&self) -> &str {
        match self {
            QueueEvent::EntryQueued { .. } => "Track queued",
            QueueEvent::EntryRemoved { .. } => "Queued track removed",
            QueueEvent::RefillFailed { .. } => "Queue refill failed",
        }
    }
}

// ============================================================================
// Player Events
// ============================================================================

/// Events emitted by the player controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// A new track became current (natural end-of-media or manual skip).
    TrackChanged {
        /// Track path.
        path: String,
        /// Owning playlist.
        playlist: String,
        /// Display line for the track.
        display: String,
        /// Track duration in seconds.
        duration_secs: u32,
    },
    /// Playback paused.
    Paused,
    /// Playback resumed.
    Resumed,
    /// A relative seek was applied.
    Seeked {
        /// New position in seconds.
        position_secs: u64,
    },
    /// The controller wanted the next track but the queue was empty.
    QueueEmpty,
}

impl PlayerEvent {
    fn description(&self) -> &str {
        match self {
            PlayerEvent::TrackChanged { .. } => "Track changed",
            PlayerEvent::Paused => "Playback paused",
            PlayerEvent::Resumed => "Playback resumed",
            PlayerEvent::Seeked { .. } => "Seek applied",
            PlayerEvent::QueueEmpty => "Queue empty",
        }
    }
}

// ============================================================================
// History Events
// ============================================================================

/// Events emitted by the listening-history tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum HistoryEvent {
    /// The play threshold was crossed and the listen was reported once.
    Scrobbled {
        /// Track path.
        path: String,
        /// Owning playlist.
        playlist: String,
    },
    /// A history or now-playing report failed (non-fatal telemetry).
    ReportFailed {
        /// Human-readable failure message.
        message: String,
    },
}

impl HistoryEvent {
    fn description(&self) -> &str {
        match self {
            HistoryEvent::Scrobbled { .. } => "Listen scrobbled",
            HistoryEvent::ReportFailed { .. } => "History report failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
///
/// The history tracker uses this to follow only `TrackChanged` events
/// without manually skipping the rest.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events. Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
