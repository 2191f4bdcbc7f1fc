use std::time::Duration;

use serde::Deserialize;

use super::speed::PlaybackSpeed;

/// Configuration for player behavior
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Interval between position samples while playing (default: 500ms)
    #[serde(rename = "positionPollIntervalMs", with = "millis")]
    pub position_poll_interval: Duration,

    /// Distance covered by skip forward/backward (default: 15 seconds)
    #[serde(rename = "skipIntervalMs", with = "millis")]
    pub skip_interval: Duration,

    /// Speed applied when the session starts (default: 1.0)
    pub initial_speed: PlaybackSpeed,

    /// Capacity of the event broadcast channel (default: 100)
    pub event_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position_poll_interval: Duration::from_millis(500),
            skip_interval: Duration::from_secs(15),
            initial_speed: PlaybackSpeed::NORMAL,
            event_capacity: 100,
        }
    }
}

impl PlayerConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Parse a JSON config; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed or a speed is not allowed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Skip distance in milliseconds
    #[must_use]
    #[allow(clippy::cast_possible_truncation, reason = "skip interval is seconds long")]
    pub fn skip_interval_ms(&self) -> u64 {
        self.skip_interval.as_millis() as u64
    }
}

/// Builder for `PlayerConfig`
#[derive(Debug, Clone, Default)]
pub struct PlayerConfigBuilder {
    config: PlayerConfig,
}

impl PlayerConfigBuilder {
    /// Set the position polling interval
    #[must_use]
    pub fn position_poll_interval(mut self, interval: Duration) -> Self {
        self.config.position_poll_interval = interval;
        self
    }

    /// Set the skip distance
    #[must_use]
    pub fn skip_interval(mut self, interval: Duration) -> Self {
        self.config.skip_interval = interval;
        self
    }

    /// Set the starting speed
    #[must_use]
    pub fn initial_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.config.initial_speed = speed;
        self
    }

    /// Set the event channel capacity
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity.max(1);
        self
    }

    /// Build the config
    #[must_use]
    pub fn build(self) -> PlayerConfig {
        self.config
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
