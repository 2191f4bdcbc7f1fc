//! Event bus for player events

use tokio::sync::broadcast;

use crate::types::{AudioItem, PlaybackSpeed, PlaybackState};

/// Player events
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    // Playback events
    /// Playback state changed
    StateChanged {
        /// Old state
        old: PlaybackState,
        /// New state
        new: PlaybackState,
    },
    /// Current item changed
    ItemChanged {
        /// New item (None when idle)
        item: Option<Box<AudioItem>>,
    },
    /// Position sampled from the device
    PositionUpdated {
        /// Position in milliseconds
        position_ms: u64,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// Seek completed
    SeekCompleted {
        /// New position in milliseconds
        position_ms: u64,
    },
    /// Speed changed
    SpeedChanged {
        /// New speed
        speed: PlaybackSpeed,
    },
    /// A `play()` attempt failed and the previous session was restored
    PlaybackFailed {
        /// Item that failed to load
        item_id: String,
        /// Failure description
        message: String,
    },

    // Queue events
    /// Queue contents changed
    QueueUpdated {
        /// New queue length
        length: usize,
    },
}

/// Event bus for distributing events
#[derive(Clone)]
pub struct EventBus {
    /// Broadcast sender
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a new event bus
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event
    pub fn emit(&self, event: PlayerEvent) {
        // Ignore error if no receivers
        let _ = self.tx.send(event);
    }

    /// Get subscriber count
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Event filter for selective subscription
pub struct EventFilter {
    rx: broadcast::Receiver<PlayerEvent>,
    filter: Box<dyn Fn(&PlayerEvent) -> bool + Send>,
}

impl EventFilter {
    /// Create a filtered event receiver
    pub fn new<F>(bus: &EventBus, filter: F) -> Self
    where
        F: Fn(&PlayerEvent) -> bool + Send + 'static,
    {
        Self {
            rx: bus.subscribe(),
            filter: Box::new(filter),
        }
    }

    /// Receive next matching event
    pub async fn recv(&mut self) -> Option<PlayerEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if (self.filter)(&event) => return Some(event),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Helper functions for common filters
impl EventFilter {
    /// Filter for playback events only
    #[must_use]
    pub fn playback_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| {
            matches!(
                e,
                PlayerEvent::StateChanged { .. }
                    | PlayerEvent::ItemChanged { .. }
                    | PlayerEvent::SeekCompleted { .. }
                    | PlayerEvent::SpeedChanged { .. }
            )
        })
    }

    /// Filter for queue events only
    #[must_use]
    pub fn queue_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| matches!(e, PlayerEvent::QueueUpdated { .. }))
    }

    /// Filter for failures only
    #[must_use]
    pub fn error_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| matches!(e, PlayerEvent::PlaybackFailed { .. }))
    }
}
