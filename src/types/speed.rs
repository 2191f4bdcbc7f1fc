use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;

/// A playback rate from the fixed set offered to the listener
///
/// Stored as an index into [`PlaybackSpeed::VALUES`] so only allowed rates
/// can ever be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct PlaybackSpeed(u8);

impl PlaybackSpeed {
    /// Allowed rates, in ascending order
    pub const VALUES: [f32; 9] = [0.5, 0.75, 0.9, 1.0, 1.1, 1.25, 1.5, 1.75, 2.0];

    /// Normal speed
    pub const NORMAL: Self = Self(3);
    /// Slowest allowed speed
    pub const MIN: Self = Self(0);
    /// Fastest allowed speed
    #[allow(clippy::cast_possible_truncation, reason = "nine values fit in u8")]
    pub const MAX: Self = Self((Self::VALUES.len() - 1) as u8);

    const TOLERANCE: f32 = 1e-3;

    /// Look up an allowed rate
    #[must_use]
    pub fn new(rate: f32) -> Option<Self> {
        Self::VALUES
            .iter()
            .position(|v| (v - rate).abs() < Self::TOLERANCE)
            .and_then(|i| u8::try_from(i).ok())
            .map(Self)
    }

    /// All allowed speeds in ascending order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::VALUES.len()).filter_map(|i| u8::try_from(i).ok().map(Self))
    }

    /// Rate multiplier
    #[must_use]
    pub fn as_f32(self) -> f32 {
        Self::VALUES[usize::from(self.0)]
    }

    /// Next faster speed, wrapping around to the slowest
    #[must_use]
    pub fn next(self) -> Self {
        if self == Self::MAX {
            Self::MIN
        } else {
            Self(self.0 + 1)
        }
    }

    /// Next slower speed, wrapping around to the fastest
    #[must_use]
    pub fn previous(self) -> Self {
        if self == Self::MIN {
            Self::MAX
        } else {
            Self(self.0 - 1)
        }
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f32> for PlaybackSpeed {
    type Error = PlayerError;

    fn try_from(speed: f32) -> Result<Self, Self::Error> {
        Self::new(speed).ok_or(PlayerError::InvalidSpeed { speed })
    }
}

impl From<PlaybackSpeed> for f32 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.as_f32()
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f32())
    }
}
