//! Player session construction

use std::sync::Arc;
use std::time::Duration;

use crate::control::PlaybackController;
use crate::device::PlaybackDevice;
use crate::haptics::{HapticFeedback, NoHaptics};
use crate::resolver::SignedUrlResolver;
use crate::types::{PlaybackSpeed, PlayerConfig};


/// Builder for a [`PlaybackController`] session
///
/// The controller is created once when the app session starts and handed by
/// reference to whatever needs it.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use briefcast::testing::{MockDevice, MockResolver};
/// use briefcast::{AudioItem, PlayerBuilder};
///
/// # async fn example() -> Result<(), briefcast::PlayerError> {
/// let player = PlayerBuilder::new(Arc::new(MockDevice::new()), Arc::new(MockResolver::new()))
///     .skip_interval(std::time::Duration::from_secs(30))
///     .build();
///
/// player.play(AudioItem::summary("s1", "m1")).await?;
/// player.set_speed(1.5).await?;
/// player.skip_forward().await?;
/// # Ok(())
/// # }
/// ```
pub struct PlayerBuilder {
    device: Arc<dyn PlaybackDevice>,
    resolver: Arc<dyn SignedUrlResolver>,
    haptics: Arc<dyn HapticFeedback>,
    config: PlayerConfig,
}

impl PlayerBuilder {
    /// Create a new builder around the required collaborators
    #[must_use]
    pub fn new(device: Arc<dyn PlaybackDevice>, resolver: Arc<dyn SignedUrlResolver>) -> Self {
        Self {
            device,
            resolver,
            haptics: Arc::new(NoHaptics),
            config: PlayerConfig::default(),
        }
    }

    /// Set the haptics sink
    #[must_use]
    pub fn haptics(mut self, haptics: Arc<dyn HapticFeedback>) -> Self {
        self.haptics = haptics;
        self
    }

    /// Replace the whole config
    #[must_use]
    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set position polling interval
    #[must_use]
    pub fn position_poll_interval(mut self, interval: Duration) -> Self {
        self.config.position_poll_interval = interval;
        self
    }

    /// Set skip distance
    #[must_use]
    pub fn skip_interval(mut self, interval: Duration) -> Self {
        self.config.skip_interval = interval;
        self
    }

    /// Set starting speed
    #[must_use]
    pub fn initial_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.config.initial_speed = speed;
        self
    }

    /// Build the controller
    #[must_use]
    pub fn build(self) -> Arc<PlaybackController> {
        tracing::debug!(
            "Building player (poll {:?}, skip {:?}, speed {})",
            self.config.position_poll_interval,
            self.config.skip_interval,
            self.config.initial_speed
        );
        Arc::new(PlaybackController::new(
            self.device,
            self.resolver,
            self.haptics,
            self.config,
        ))
    }
}
