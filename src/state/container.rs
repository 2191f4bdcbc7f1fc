//! Published player state

use tokio::sync::{RwLock, watch};

use crate::control::queue::PlaybackQueue;
use crate::types::{AudioItem, PlaybackSpeed, PlaybackState};

/// Snapshot of everything observers can read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    /// Item loaded or loading (None when idle)
    pub current_item: Option<AudioItem>,
    /// State machine phase
    pub playback: PlaybackState,
    /// Playhead in milliseconds
    pub position_ms: u64,
    /// Duration in milliseconds (0 when unknown)
    pub duration_ms: u64,
    /// Current rate
    pub speed: PlaybackSpeed,
    /// Pending items
    pub queue: PlaybackQueue,
}

impl PlayerState {
    /// Initial state with a given speed
    #[must_use]
    pub fn with_speed(speed: PlaybackSpeed) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// Audio is playing
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }

    /// A load is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.playback == PlaybackState::Loading
    }

    /// Nothing loaded
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.playback == PlaybackState::Idle
    }

    /// Progress as a fraction (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "ratio of millisecond counts")]
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.position_ms as f64 / self.duration_ms as f64).min(1.0)
        }
    }

    /// Time left in milliseconds
    #[must_use]
    pub fn remaining_ms(&self) -> u64 {
        self.duration_ms.saturating_sub(self.position_ms)
    }

    /// Set the playhead, keeping it inside `[0, duration]`
    pub fn set_position(&mut self, position_ms: u64) {
        self.position_ms = clamp_position(position_ms, self.duration_ms);
    }

    /// Drop the loaded item and return to idle
    pub fn reset_session(&mut self) {
        self.current_item = None;
        self.playback = PlaybackState::Idle;
        self.position_ms = 0;
        self.duration_ms = 0;
    }
}

/// Clamp a playhead to `[0, duration]`; unknown durations (0) do not clamp
#[must_use]
pub fn clamp_position(position_ms: u64, duration_ms: u64) -> u64 {
    if duration_ms > 0 {
        position_ms.min(duration_ms)
    } else {
        position_ms
    }
}

/// State container with change notifications
pub struct StateContainer {
    /// Current state
    state: RwLock<PlayerState>,
    /// State change sender
    tx: watch::Sender<PlayerState>,
}

impl StateContainer {
    /// Create a new state container
    #[must_use]
    pub fn new(initial: PlayerState) -> Self {
        let (tx, _) = watch::channel(initial.clone());
        Self {
            state: RwLock::new(initial),
            tx,
        }
    }

    /// Get current state
    pub async fn get(&self) -> PlayerState {
        self.state.read().await.clone()
    }

    /// Read a projection of the state without cloning all of it
    pub async fn read<R>(&self, f: impl FnOnce(&PlayerState) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.tx.subscribe()
    }

    /// Update state with a function, publishing the result
    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PlayerState) -> R,
    {
        let mut state = self.state.write().await;
        let result = f(&mut state);
        self.tx.send_if_modified(|published| {
            if *published == *state {
                false
            } else {
                published.clone_from(&state);
                true
            }
        });
        result
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new(PlayerState::default())
    }
}
