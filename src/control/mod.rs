//! Playback control module

pub mod playback;
pub mod queue;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use playback::PlaybackController;
pub use queue::PlaybackQueue;
pub use tracker::PositionTracker;
