//! # briefcast
//!
//! Audio playback and play-next queue core for podcast episodes and
//! AI-generated summary briefs.
//!
//! ## Features
//!
//! - Playback state machine (idle, loading, playing, paused)
//! - Signed URL resolution for summary audio
//! - Position polling while playing
//! - Fixed-step playback speeds and skip forward/backward
//! - Manually advanced play-next queue
//! - Supersession of slow loads by newer `play()` calls
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use briefcast::testing::{MockDevice, MockResolver};
//! use briefcast::{AudioItem, PlayerBuilder};
//!
//! # async fn example() -> Result<(), briefcast::PlayerError> {
//! let player = PlayerBuilder::new(Arc::new(MockDevice::new()), Arc::new(MockResolver::new()))
//!     .build();
//!
//! player.add_to_queue(AudioItem::summary("s2", "m2")).await;
//! player
//!     .play(AudioItem::episode("e1", "https://x/a.mp3").with_resume_position_ms(30_000))
//!     .await?;
//! player.pause().await?;
//! player.play_next().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Session**: `PlayerBuilder` builds the shared `PlaybackController`
//! - **Control**: controller, queue and position tracker
//! - **Capabilities**: `PlaybackDevice`, `SignedUrlResolver`, `HapticFeedback`
//!   traits implemented by the host platform

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// State management
pub mod state;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

pub mod control;
pub mod device;
pub mod haptics;
mod player;
pub mod resolver;

// Re-exports
pub use control::{PlaybackController, PlaybackQueue};
pub use device::PlaybackDevice;
pub use error::{DeviceError, PlayerError, ResolveError};
pub use haptics::{Haptic, HapticFeedback, NoHaptics};
pub use player::PlayerBuilder;
pub use resolver::{SignedUrl, SignedUrlResolver};
pub use state::{PlayerEvent, PlayerState};
pub use types::{
    AudioItem, AudioKind, CorrelationIds, PlaybackSpeed, PlaybackState, PlayerConfig,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AudioItem, AudioKind, Haptic, HapticFeedback, PlaybackController, PlaybackDevice,
        PlaybackSpeed, PlaybackState, PlayerBuilder, PlayerError, PlayerEvent, PlayerState,
        SignedUrl, SignedUrlResolver,
    };
}
