//! Scriptable playback device

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::device::PlaybackDevice;
use crate::error::DeviceError;

/// A command received by [`MockDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `load(url)`
    Load(String),
    /// `play()`
    Play,
    /// `pause()`
    Pause,
    /// `seek_to(seconds)`
    SeekTo(f64),
    /// `set_rate(rate)`
    SetRate(f32),
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<DeviceCall>,
    loaded: Option<String>,
    playing: bool,
    rate: f32,
    position_secs: f64,
    duration_secs: Option<f64>,
    failing_loads: HashSet<String>,
    failing_commands: HashSet<&'static str>,
    failing_once: HashSet<&'static str>,
    failing_reads: bool,
    held_loads: HashMap<String, Arc<Notify>>,
}

/// In-memory device recording every command
///
/// Reads (`current_time`, `duration`) are not recorded; the position only
/// moves on seek or when a test sets it.
#[derive(Debug)]
pub struct MockDevice {
    inner: Mutex<Inner>,
}

impl MockDevice {
    /// Create an empty device
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rate: 1.0,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Duration reported once a source is loaded
    pub fn set_duration(&self, seconds: Option<f64>) {
        self.lock().duration_secs = seconds;
    }

    /// Move the playhead as if audio had played
    pub fn set_position(&self, seconds: f64) {
        self.lock().position_secs = seconds;
    }

    /// Make `load(url)` fail
    pub fn fail_load(&self, url: impl Into<String>) {
        self.lock().failing_loads.insert(url.into());
    }

    /// Make a command (`"play"`, `"pause"`, `"seek"`, `"set_rate"`) fail
    pub fn fail_command(&self, command: &'static str) {
        self.lock().failing_commands.insert(command);
    }

    /// Make only the next call of a command fail
    pub fn fail_next(&self, command: &'static str) {
        self.lock().failing_once.insert(command);
    }

    /// Make position and duration reads fail
    pub fn fail_reads(&self, failing: bool) {
        self.lock().failing_reads = failing;
    }

    /// Block `load(url)` until the returned gate is notified
    #[must_use]
    pub fn hold_load(&self, url: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().held_loads.insert(url.into(), Arc::clone(&gate));
        gate
    }

    /// Every command so far
    #[must_use]
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    /// URLs passed to `load`, in order
    #[must_use]
    pub fn loads(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Load(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&DeviceCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| pred(call)).count()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Source currently loaded
    #[must_use]
    pub fn loaded_url(&self) -> Option<String> {
        self.lock().loaded.clone()
    }

    /// Whether output is running
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    /// Current rate
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.lock().rate
    }

    /// Current playhead in seconds
    #[must_use]
    pub fn position(&self) -> f64 {
        self.lock().position_secs
    }

    fn record(
        &self,
        call: DeviceCall,
        command: &'static str,
    ) -> Result<MutexGuard<'_, Inner>, DeviceError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        if inner.failing_commands.contains(command) || inner.failing_once.remove(command) {
            return Err(DeviceError::Command {
                command,
                message: "rejected by mock".to_string(),
            });
        }
        Ok(inner)
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackDevice for MockDevice {
    async fn load(&self, url: &str) -> Result<(), DeviceError> {
        let gate = {
            let mut inner = self.lock();
            inner.calls.push(DeviceCall::Load(url.to_string()));
            inner.held_loads.remove(url)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut inner = self.lock();
        if inner.failing_loads.contains(url) {
            return Err(DeviceError::Load {
                message: format!("cannot open {url}"),
            });
        }
        inner.loaded = Some(url.to_string());
        inner.playing = false;
        inner.position_secs = 0.0;
        Ok(())
    }

    async fn play(&self) -> Result<(), DeviceError> {
        let mut inner = self.record(DeviceCall::Play, "play")?;
        if inner.loaded.is_none() {
            return Err(DeviceError::NotLoaded);
        }
        inner.playing = true;
        Ok(())
    }

    async fn pause(&self) -> Result<(), DeviceError> {
        self.record(DeviceCall::Pause, "pause")?.playing = false;
        Ok(())
    }

    async fn seek_to(&self, seconds: f64) -> Result<(), DeviceError> {
        self.record(DeviceCall::SeekTo(seconds), "seek")?.position_secs = seconds;
        Ok(())
    }

    async fn set_rate(&self, rate: f32) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetRate(rate), "set_rate")?.rate = rate;
        Ok(())
    }

    async fn current_time(&self) -> Result<Option<f64>, DeviceError> {
        let inner = self.lock();
        if inner.failing_reads {
            return Err(DeviceError::NotLoaded);
        }
        Ok(inner.loaded.as_ref().map(|_| inner.position_secs))
    }

    async fn duration(&self) -> Result<Option<f64>, DeviceError> {
        let inner = self.lock();
        if inner.failing_reads {
            return Err(DeviceError::NotLoaded);
        }
        Ok(inner.loaded.as_ref().and(inner.duration_secs))
    }
}
