//! Test doubles for the player's collaborators
//!
//! The mocks record every call so tests can assert on exact device traffic,
//! and can be told to fail or to hold an operation until released.

mod device;
mod haptics;
mod resolver;

pub use device::{DeviceCall, MockDevice};
pub use haptics::RecordingHaptics;
pub use resolver::MockResolver;

use std::sync::Arc;

use crate::control::PlaybackController;
use crate::player::PlayerBuilder;
use crate::types::PlayerConfig;

/// Mocks wired into a controller
pub struct TestRig {
    /// Controller under test
    pub controller: Arc<PlaybackController>,
    /// Mock output device
    pub device: Arc<MockDevice>,
    /// Mock URL signer
    pub resolver: Arc<MockResolver>,
    /// Recorded haptics
    pub haptics: Arc<RecordingHaptics>,
}

impl TestRig {
    /// Controller with default config and fresh mocks
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    /// Controller with custom config and fresh mocks
    #[must_use]
    pub fn with_config(config: PlayerConfig) -> Self {
        let device = Arc::new(MockDevice::new());
        let resolver = Arc::new(MockResolver::new());
        let haptics = Arc::new(RecordingHaptics::new());

        let controller = PlayerBuilder::new(device.clone(), resolver.clone())
            .haptics(haptics.clone())
            .config(config)
            .build();

        Self {
            controller,
            device,
            resolver,
            haptics,
        }
    }
}

impl Default for TestRig {
    fn default() -> Self {
        Self::new()
    }
}
