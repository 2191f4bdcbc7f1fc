//! Position polling while audio plays

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::device::{PlaybackDevice, secs_to_ms};
use crate::state::{EventBus, PlayerEvent, StateContainer, clamp_position};
use crate::types::PlaybackState;

/// Background task sampling the device playhead
///
/// Owned by the controller for exactly one Playing stretch. Stopping or
/// dropping the tracker cancels the task; samples are only published while
/// the tracker is live and the player is still Playing.
pub struct PositionTracker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PositionTracker {
    /// Spawn a tracker polling every `period`
    ///
    /// The first sample is taken one period after start.
    #[must_use]
    pub fn start(
        device: Arc<dyn PlaybackDevice>,
        state: Arc<StateContainer>,
        events: EventBus,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        // interval_at panics on a zero period
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some((position_ms, duration_ms)) = sample(device.as_ref()).await else {
                    continue;
                };

                let applied = state
                    .update(|s| {
                        if token.is_cancelled() || s.playback != PlaybackState::Playing {
                            return None;
                        }
                        if let Some(duration_ms) = duration_ms {
                            s.duration_ms = duration_ms;
                        }
                        s.position_ms = clamp_position(position_ms, s.duration_ms);
                        Some((s.position_ms, s.duration_ms))
                    })
                    .await;

                if let Some((position_ms, duration_ms)) = applied {
                    events.emit(PlayerEvent::PositionUpdated {
                        position_ms,
                        duration_ms,
                    });
                }
            }

            tracing::trace!("position tracker stopped");
        });

        Self { cancel, handle }
    }

    /// Stop sampling
    pub fn stop(self) {
        self.cancel.cancel();
    }

    /// Whether the task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Read position and duration; `None` skips this cycle
async fn sample(device: &dyn PlaybackDevice) -> Option<(u64, Option<u64>)> {
    let position = match device.current_time().await {
        Ok(Some(seconds)) => secs_to_ms(seconds),
        Ok(None) => return None,
        Err(e) => {
            tracing::trace!("skipping position sample: {e}");
            return None;
        }
    };

    let duration = match device.duration().await {
        Ok(Some(seconds)) if seconds.is_finite() && seconds > 0.0 => Some(secs_to_ms(seconds)),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("duration unavailable: {e}");
            None
        }
    };

    Some((position, duration))
}
