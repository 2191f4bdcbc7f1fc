//! State management and events

mod container;
mod events;

pub use container::{PlayerState, StateContainer, clamp_position};
pub use events::{EventBus, EventFilter, PlayerEvent};
