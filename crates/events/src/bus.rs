//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] carries [`ClientEvent`]s from background work to whichever
//! views are interested. It is designed to be shared via `Arc<EventBus>`.

use tokio::sync::broadcast;
use torisetsu_core::models::manual::Manual;
use torisetsu_core::types::EntityId;

use crate::notice::Notice;

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// Something a view may want to react to.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A watched manual changed status and was refetched in full.
    ManualUpdated { manual: Box<Manual> },

    /// The manual list of a torisetsu was refetched.
    ManualsRefreshed {
        torisetsu_id: EntityId,
        manuals: Vec<Manual>,
    },

    /// A user-facing notice.
    Notice(Notice),
}

impl ClientEvent {
    /// Dot-separated event name, for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ManualUpdated { .. } => "manual.updated",
            Self::ManualsRefreshed { .. } => "manuals.refreshed",
            Self::Notice(_) => "notice",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use torisetsu_events::{ClientEvent, EventBus, Notice};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ClientEvent::Notice(Notice::info("saved")));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: ClientEvent) {
        tracing::debug!(event_type = event.event_type(), "Publishing client event");
        let _ = self.sender.send(event);
    }

    /// Shorthand for publishing a [`Notice`].
    pub fn notify(&self, notice: Notice) {
        self.publish(ClientEvent::Notice(notice));
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
