use std::fmt;

/// Phase of the playback state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Nothing loaded
    #[default]
    Idle,
    /// URL resolution or device load in flight
    Loading,
    /// Audio is playing
    Playing,
    /// Audio is loaded but paused
    Paused,
}

impl PlaybackState {
    /// Whether a source is loaded and settled (playing or paused)
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
        })
    }
}
