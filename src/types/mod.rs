//! Core types module

mod config;
mod item;
mod speed;
mod state;


pub use config::{PlayerConfig, PlayerConfigBuilder};
pub use item::{AudioItem, AudioKind, CorrelationIds};
pub use speed::PlaybackSpeed;
pub use state::PlaybackState;
