//! Playback control: the player state machine

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};

use crate::control::tracker::PositionTracker;
use crate::device::{PlaybackDevice, ms_to_secs, secs_to_ms};
use crate::error::{DeviceError, PlayerError, Result};
use crate::haptics::{Haptic, HapticFeedback};
use crate::resolver::SignedUrlResolver;
use crate::state::{EventBus, PlayerEvent, PlayerState, StateContainer, clamp_position};
use crate::types::{AudioItem, AudioKind, PlaybackSpeed, PlaybackState, PlayerConfig};

/// Last settled session, restored when a load fails
#[derive(Debug, Clone, Default)]
struct Settled {
    item: Option<AudioItem>,
    /// Source the device played the item from
    url: Option<String>,
    playback: PlaybackState,
    position_ms: u64,
    duration_ms: u64,
}

impl Settled {
    fn capture(state: &PlayerState, url: Option<String>) -> Self {
        Self {
            item: state.current_item.clone(),
            url,
            playback: state.playback,
            position_ms: state.position_ms,
            duration_ms: state.duration_ms,
        }
    }

    fn apply(self, state: &mut PlayerState) {
        state.current_item = self.item;
        state.playback = self.playback;
        state.duration_ms = self.duration_ms;
        state.position_ms = clamp_position(self.position_ms, self.duration_ms);
    }
}

/// Transition bookkeeping guarded by the session lock
#[derive(Default)]
struct Session {
    /// Token of the most recent `play()` (or `stop()`)
    request: u64,
    /// Tracker of the current Playing stretch
    tracker: Option<PositionTracker>,
    /// State to go back to if the pending load fails
    restore_point: Option<Settled>,
    /// Playable URL of the settled session
    current_url: Option<String>,
    /// Last source the device accepted, settled or not
    device_source: Option<String>,
}

impl Session {
    fn stop_tracker(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.stop();
        }
    }
}

/// Playback controller
///
/// One instance per app session, shared by `Arc`. Every transition takes the
/// session lock first, then the state lock; URL resolution and device load
/// run without the session lock so observers see `Loading` and a newer
/// `play()` can supersede a slow one.
pub struct PlaybackController {
    device: Arc<dyn PlaybackDevice>,
    resolver: Arc<dyn SignedUrlResolver>,
    haptics: Arc<dyn HapticFeedback>,
    config: PlayerConfig,
    state: Arc<StateContainer>,
    events: EventBus,
    session: Mutex<Session>,
}

impl PlaybackController {
    /// Create a new playback controller
    #[must_use]
    pub fn new(
        device: Arc<dyn PlaybackDevice>,
        resolver: Arc<dyn SignedUrlResolver>,
        haptics: Arc<dyn HapticFeedback>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            device,
            resolver,
            haptics,
            state: Arc::new(StateContainer::new(PlayerState::with_speed(
                config.initial_speed,
            ))),
            events: EventBus::new(config.event_capacity),
            config,
            session: Mutex::new(Session::default()),
        }
    }

    // === Playback ===

    /// Load and start `item`
    ///
    /// Summary items get a freshly signed URL on every call. On failure the
    /// previous session is restored and the error returned. If a newer
    /// `play()` or `stop()` arrives before this one completes, this call
    /// drops its side effects and returns
    /// [`PlayerError::StaleRequestDiscarded`].
    ///
    /// # Errors
    ///
    /// Returns error if URL resolution or device load fails, or if the
    /// request was superseded.
    pub async fn play(&self, item: AudioItem) -> Result<()> {
        let (token, restore) = self.begin_request(&item).await;

        let url = match self.playable_url(&item).await {
            Ok(url) => url,
            Err(e) => return Err(self.fail_request(token, &item, restore, e).await),
        };

        if !self.is_current(token).await {
            return Err(discard(&item));
        }

        tracing::debug!("Loading {} from {}", item.id, url);
        if let Err(source) = self.device.load(&url).await {
            let error = PlayerError::DeviceLoadFailed { url, source };
            return Err(self.fail_request(token, &item, restore, error).await);
        }

        self.commit_request(token, &item, url, restore).await
    }

    /// Play the head of the queue
    ///
    /// Returns `Ok(false)` without touching anything when the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns error if the promoted item fails to play.
    pub async fn play_next(&self) -> Result<bool> {
        let Some(next) = self.state.update(|s| s.queue.pop_next()).await else {
            tracing::debug!("play_next: queue empty");
            return Ok(false);
        };
        self.emit_queue_length().await;

        self.play(next).await.map(|()| true)
    }

    /// Pause playback
    ///
    /// No-op unless playing.
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the command.
    pub async fn pause(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if self.playback_state().await != PlaybackState::Playing {
            return Ok(());
        }

        self.device
            .pause()
            .await
            .map_err(|source| command_failed("pause", source))?;
        session.stop_tracker();

        // Last reading so the paused position is exact
        let position = self.device.current_time().await.ok().flatten().map(secs_to_ms);
        self.state
            .update(|s| {
                s.playback = PlaybackState::Paused;
                if let Some(position) = position {
                    s.set_position(position);
                }
            })
            .await;
        self.emit_transition(PlaybackState::Playing, PlaybackState::Paused);
        Ok(())
    }

    /// Resume paused playback
    ///
    /// No-op unless paused.
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the command.
    pub async fn resume(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if self.playback_state().await != PlaybackState::Paused {
            return Ok(());
        }

        self.device
            .play()
            .await
            .map_err(|source| command_failed("resume", source))?;

        self.state.update(|s| s.playback = PlaybackState::Playing).await;
        session.stop_tracker();
        session.tracker = Some(self.spawn_tracker());
        self.emit_transition(PlaybackState::Paused, PlaybackState::Playing);
        Ok(())
    }

    /// Toggle play/pause
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the command.
    pub async fn toggle(&self) -> Result<()> {
        match self.playback_state().await {
            PlaybackState::Playing => self.pause().await,
            PlaybackState::Paused => self.resume().await,
            PlaybackState::Idle | PlaybackState::Loading => Ok(()),
        }
    }

    /// Unload the current item and go idle
    ///
    /// Also supersedes a pending `play()`.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        session.request += 1;
        session.restore_point = None;
        session.current_url = None;
        session.stop_tracker();

        let old = self.playback_state().await;
        if old == PlaybackState::Idle {
            return;
        }
        if old.is_active() {
            if let Err(e) = self.device.pause().await {
                tracing::warn!("Device pause failed while stopping: {e}");
            }
        }

        self.state.update(PlayerState::reset_session).await;
        self.emit_transition(old, PlaybackState::Idle);
        self.events.emit(PlayerEvent::ItemChanged { item: None });
        tracing::info!("Playback stopped");
    }

    // === Seeking ===

    /// Seek to `position_ms`, clamped to `[0, duration]`
    ///
    /// No-op unless playing or paused. The published position is updated
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the seek.
    pub async fn seek_to(&self, position_ms: u64) -> Result<()> {
        let _session = self.session.lock().await;
        let (playback, duration_ms) = self.state.read(|s| (s.playback, s.duration_ms)).await;
        if !playback.is_active() {
            return Ok(());
        }
        self.seek_locked(clamp_position(position_ms, duration_ms)).await
    }

    /// Jump forward by the skip interval, stopping at the end
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the seek.
    pub async fn skip_forward(&self) -> Result<()> {
        let skip = self.config.skip_interval_ms();
        self.skip_by(|position| position.saturating_add(skip)).await
    }

    /// Jump backward by the skip interval, stopping at zero
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the seek.
    pub async fn skip_backward(&self) -> Result<()> {
        let skip = self.config.skip_interval_ms();
        self.skip_by(|position| position.saturating_sub(skip)).await
    }

    // === Speed ===

    /// Change the playback rate
    ///
    /// Rates outside [`PlaybackSpeed::VALUES`] are rejected and leave the
    /// state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InvalidSpeed`] for a disallowed rate, or an
    /// error if the device rejects it.
    pub async fn set_speed(&self, rate: f32) -> Result<()> {
        let speed = PlaybackSpeed::try_from(rate)?;
        self.set_playback_speed(speed).await
    }

    /// Change the playback rate to an allowed speed
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the rate.
    pub async fn set_playback_speed(&self, speed: PlaybackSpeed) -> Result<()> {
        let _session = self.session.lock().await;
        self.device
            .set_rate(speed.as_f32())
            .await
            .map_err(|source| command_failed("set_rate", source))?;

        self.state.update(|s| s.speed = speed).await;
        self.haptics.trigger(Haptic::Selection);
        self.events.emit(PlayerEvent::SpeedChanged { speed });
        tracing::debug!("Speed set to {speed}");
        Ok(())
    }

    /// Step to the next faster speed, wrapping to the slowest
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the rate.
    pub async fn cycle_speed(&self) -> Result<()> {
        let next = self.speed().await.next();
        self.set_playback_speed(next).await
    }

    // === Queue ===

    /// Append an item to the play-next queue
    ///
    /// Returns `false` if the id is already queued or currently loaded.
    pub async fn add_to_queue(&self, item: AudioItem) -> bool {
        let id = item.id.clone();
        let added = self
            .state
            .update(|s| {
                let is_current = s.current_item.as_ref().is_some_and(|c| c.id == item.id);
                !is_current && s.queue.enqueue(item)
            })
            .await;

        if added {
            tracing::debug!("Queued {id}");
            self.emit_queue_length().await;
        }
        added
    }

    /// Remove the first queued item with `id`
    pub async fn remove_from_queue(&self, id: &str) -> Option<AudioItem> {
        let removed = self.state.update(|s| s.queue.dequeue(id)).await;
        if removed.is_some() {
            self.emit_queue_length().await;
        }
        removed
    }

    /// Empty the queue
    pub async fn clear_queue(&self) {
        self.state.update(|s| s.queue.clear()).await;
        self.emit_queue_length().await;
    }

    // === Observed state ===

    /// Full state snapshot
    pub async fn state(&self) -> PlayerState {
        self.state.get().await
    }

    /// Watch state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.state.subscribe()
    }

    /// Subscribe to discrete events
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Event bus, for building filters
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// Item loaded or loading
    pub async fn current_item(&self) -> Option<AudioItem> {
        self.state.read(|s| s.current_item.clone()).await
    }

    /// State machine phase
    pub async fn playback_state(&self) -> PlaybackState {
        self.state.read(|s| s.playback).await
    }

    /// Audio is playing
    pub async fn is_playing(&self) -> bool {
        self.state.read(PlayerState::is_playing).await
    }

    /// A load is in flight
    pub async fn is_loading(&self) -> bool {
        self.state.read(PlayerState::is_loading).await
    }

    /// Playhead in milliseconds
    pub async fn position_ms(&self) -> u64 {
        self.state.read(|s| s.position_ms).await
    }

    /// Duration in milliseconds
    pub async fn duration_ms(&self) -> u64 {
        self.state.read(|s| s.duration_ms).await
    }

    /// Current speed
    pub async fn speed(&self) -> PlaybackSpeed {
        self.state.read(|s| s.speed).await
    }

    /// Queued items in play order
    pub async fn queue(&self) -> Vec<AudioItem> {
        self.state.read(|s| s.queue.items().cloned().collect()).await
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    // === Internals ===

    /// Stop the old session, take a request token and enter Loading
    async fn begin_request(&self, item: &AudioItem) -> (u64, Settled) {
        let mut session = self.session.lock().await;
        session.request += 1;
        session.stop_tracker();

        let session = &mut *session;
        let old = self
            .state
            .update(|s| {
                let old = s.playback;
                // A superseded load never settled; keep its restore point
                if old != PlaybackState::Loading || session.restore_point.is_none() {
                    let url = session.current_url.clone();
                    session.restore_point = Some(Settled::capture(s, url));
                }
                s.current_item = Some(item.clone());
                s.playback = PlaybackState::Loading;
                s.duration_ms = item.duration_ms;
                s.position_ms = clamp_position(item.resume_position_ms, item.duration_ms);
                old
            })
            .await;

        tracing::info!("Play request {} for {} ({:?})", session.request, item.id, item.kind);
        self.emit_transition(old, PlaybackState::Loading);
        self.events.emit(PlayerEvent::ItemChanged {
            item: Some(Box::new(item.clone())),
        });

        (
            session.request,
            session.restore_point.clone().unwrap_or_default(),
        )
    }

    async fn playable_url(&self, item: &AudioItem) -> Result<String> {
        match item.kind {
            AudioKind::Episode => Ok(item.source_url.clone()),
            AudioKind::Summary => {
                let brief_id = item.master_brief_id();
                let signed = self.resolver.resolve(brief_id).await.map_err(|e| {
                    PlayerError::UrlResolutionFailed {
                        item_id: item.id.clone(),
                        message: e.to_string(),
                        source: Some(e),
                    }
                })?;

                if signed.signed_url.is_empty() {
                    return Err(PlayerError::UrlResolutionFailed {
                        item_id: item.id.clone(),
                        message: format!("no URL returned for brief {brief_id}"),
                        source: None,
                    });
                }
                Ok(signed.signed_url)
            }
        }
    }

    async fn is_current(&self, token: u64) -> bool {
        self.session.lock().await.request == token
    }

    /// Finish a successful load: rate, seek, play, then publish Playing
    async fn commit_request(
        &self,
        token: u64,
        item: &AudioItem,
        url: String,
        restore: Settled,
    ) -> Result<()> {
        let mut session = self.session.lock().await;
        session.device_source = Some(url.clone());
        if session.request != token {
            return Err(discard(item));
        }

        let speed = self.speed().await;
        let duration_ms = match self.start_device(item, speed).await {
            Ok(duration_ms) => duration_ms,
            Err(source) => {
                let error = PlayerError::DeviceLoadFailed { url, source };
                return Err(self.restore_locked(&mut session, item, restore, error).await);
            }
        };

        let position_ms = self
            .state
            .update(|s| {
                s.playback = PlaybackState::Playing;
                if let Some(duration_ms) = duration_ms {
                    s.duration_ms = duration_ms;
                }
                s.set_position(item.resume_position_ms);
                s.position_ms
            })
            .await;

        session.restore_point = None;
        session.current_url = Some(url);
        session.tracker = Some(self.spawn_tracker());
        drop(session);

        self.haptics.trigger(Haptic::Success);
        self.emit_transition(PlaybackState::Loading, PlaybackState::Playing);
        tracing::info!("Playing {} from {} ms", item.id, position_ms);
        Ok(())
    }

    /// Drive the freshly loaded device into playback; returns its duration
    async fn start_device(
        &self,
        item: &AudioItem,
        speed: PlaybackSpeed,
    ) -> std::result::Result<Option<u64>, DeviceError> {
        self.device.set_rate(speed.as_f32()).await?;

        let duration_ms = match self.device.duration().await {
            Ok(Some(seconds)) if seconds.is_finite() && seconds > 0.0 => Some(secs_to_ms(seconds)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Duration not available after load: {e}");
                None
            }
        };

        let known_duration = duration_ms.unwrap_or(item.duration_ms);
        let resume_ms = clamp_position(item.resume_position_ms, known_duration);
        if resume_ms > 0 {
            self.device.seek_to(ms_to_secs(resume_ms)).await?;
        }

        self.device.play().await?;
        Ok(duration_ms)
    }

    async fn fail_request(
        &self,
        token: u64,
        item: &AudioItem,
        restore: Settled,
        error: PlayerError,
    ) -> PlayerError {
        let mut session = self.session.lock().await;
        if session.request != token {
            tracing::debug!("Ignoring failure of superseded request: {error}");
            return discard(item);
        }
        self.restore_locked(&mut session, item, restore, error).await
    }

    /// Put back the last settled session after a failed load
    async fn restore_locked(
        &self,
        session: &mut Session,
        item: &AudioItem,
        restore: Settled,
        error: PlayerError,
    ) -> PlayerError {
        tracing::warn!("Failed to play {}: {error}", item.id);

        let restore = self.reattach_device(session, restore).await;
        let restored = restore.playback;
        let restored_item = restore.item.clone();
        session.current_url = restore.url.clone();
        self.state.update(|s| restore.apply(s)).await;

        session.restore_point = None;
        if restored == PlaybackState::Playing {
            session.tracker = Some(self.spawn_tracker());
        }

        self.haptics.trigger(Haptic::Error);
        self.emit_transition(PlaybackState::Loading, restored);
        self.events.emit(PlayerEvent::ItemChanged {
            item: restored_item.map(Box::new),
        });
        self.events.emit(PlayerEvent::PlaybackFailed {
            item_id: item.id.clone(),
            message: error.to_string(),
        });
        error
    }

    /// Point the device back at the settled source if a failed load replaced it
    ///
    /// Falls back to Paused when the source reloads but will not resume, and
    /// to Idle when it cannot be reloaded at all.
    async fn reattach_device(&self, session: &mut Session, mut restore: Settled) -> Settled {
        if !restore.playback.is_active() || restore.url == session.device_source {
            return restore;
        }
        let Some(url) = restore.url.clone() else {
            return Settled::default();
        };

        tracing::debug!("Reloading {url} after failed load");
        if let Err(e) = self.device.load(&url).await {
            tracing::warn!("Could not reload {url}: {e}");
            session.device_source = None;
            return Settled::default();
        }
        session.device_source = Some(url);

        let speed = self.speed().await;
        if let Err(e) = self.resume_device(&restore, speed).await {
            tracing::warn!("Could not resume previous session: {e}");
            if let Err(e) = self.device.pause().await {
                tracing::debug!("Pause after failed resume also failed: {e}");
            }
            restore.playback = PlaybackState::Paused;
            if let Ok(Some(seconds)) = self.device.current_time().await {
                restore.position_ms = secs_to_ms(seconds);
            }
        }
        restore
    }

    /// Rate, seek and (if it was playing) play for a reloaded settled session
    async fn resume_device(
        &self,
        restore: &Settled,
        speed: PlaybackSpeed,
    ) -> std::result::Result<(), DeviceError> {
        self.device.set_rate(speed.as_f32()).await?;
        let position_ms = clamp_position(restore.position_ms, restore.duration_ms);
        if position_ms > 0 {
            self.device.seek_to(ms_to_secs(position_ms)).await?;
        }
        if restore.playback == PlaybackState::Playing {
            self.device.play().await?;
        }
        Ok(())
    }

    async fn skip_by(&self, step: impl FnOnce(u64) -> u64) -> Result<()> {
        let _session = self.session.lock().await;
        let (playback, position_ms, duration_ms) = self
            .state
            .read(|s| (s.playback, s.position_ms, s.duration_ms))
            .await;
        if !playback.is_active() {
            return Ok(());
        }

        self.seek_locked(clamp_position(step(position_ms), duration_ms))
            .await?;
        self.haptics.trigger(Haptic::LightImpact);
        Ok(())
    }

    /// Seek the device and publish; caller holds the session lock
    async fn seek_locked(&self, target_ms: u64) -> Result<()> {
        self.device
            .seek_to(ms_to_secs(target_ms))
            .await
            .map_err(|source| command_failed("seek", source))?;

        let position_ms = self
            .state
            .update(|s| {
                s.set_position(target_ms);
                s.position_ms
            })
            .await;
        self.events.emit(PlayerEvent::SeekCompleted { position_ms });
        tracing::debug!("Seeked to {position_ms} ms");
        Ok(())
    }

    fn spawn_tracker(&self) -> PositionTracker {
        PositionTracker::start(
            Arc::clone(&self.device),
            Arc::clone(&self.state),
            self.events.clone(),
            self.config.position_poll_interval,
        )
    }

    fn emit_transition(&self, old: PlaybackState, new: PlaybackState) {
        if old != new {
            tracing::debug!("Playback state {old} -> {new}");
            self.events.emit(PlayerEvent::StateChanged { old, new });
        }
    }

    async fn emit_queue_length(&self) {
        let length = self.state.read(|s| s.queue.len()).await;
        self.events.emit(PlayerEvent::QueueUpdated { length });
    }
}

fn discard(item: &AudioItem) -> PlayerError {
    tracing::debug!("Discarding superseded play request for {}", item.id);
    PlayerError::StaleRequestDiscarded {
        item_id: item.id.clone(),
    }
}

fn command_failed(operation: &'static str, source: DeviceError) -> PlayerError {
    PlayerError::DeviceCommandFailed { operation, source }
}
