//! Audio output capability

use async_trait::async_trait;

use crate::error::DeviceError;

/// The audio output primitive driven by the controller
///
/// Positions are exchanged in seconds here; the controller converts to and
/// from milliseconds.
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// Open a source; resolves once the device is ready to play it
    async fn load(&self, url: &str) -> Result<(), DeviceError>;

    /// Start or resume output
    async fn play(&self) -> Result<(), DeviceError>;

    /// Pause output
    async fn pause(&self) -> Result<(), DeviceError>;

    /// Move the playhead
    async fn seek_to(&self, seconds: f64) -> Result<(), DeviceError>;

    /// Change the playback rate
    async fn set_rate(&self, rate: f32) -> Result<(), DeviceError>;

    /// Current playhead, if known
    async fn current_time(&self) -> Result<Option<f64>, DeviceError>;

    /// Source duration, if known
    async fn duration(&self) -> Result<Option<f64>, DeviceError>;
}

/// Convert device seconds to milliseconds
///
/// Negative, NaN and infinite readings collapse to zero.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is checked to be finite and non-negative"
)]
pub fn secs_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

/// Convert milliseconds to device seconds
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "positions stay far below 2^52 ms")]
pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}
