//! Directory events and the broadcast bus that carries them
//!
//! Filter State and the Member Fetch Pipeline publish here; a presentation
//! layer subscribes to redraw. Sends are synchronous: a subscriber that is
//! already listening sees the event before the mutating call returns.

use serde::Serialize;
use tokio::sync::broadcast;

/// Events published by the directory core
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DirectoryEvent {
    /// A filter field changed (or all were reset)
    FilterChanged { has_active_filters: bool },

    /// A page was committed to the member set
    MembersAppended {
        generation: u64,
        added: usize,
        total: usize,
        offset: u64,
    },

    /// The member set and cursor were cleared
    MembersCleared { generation: u64 },

    /// A page request failed; earlier pages remain
    FetchFailed { generation: u64, message: String },
}

/// Broadcast bus for [`DirectoryEvent`]
///
/// Cloning the bus shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DirectoryEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(64);
    /// assert_eq!(event_bus.capacity(), 64);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: DirectoryEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
