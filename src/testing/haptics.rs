//! Haptics recorder

use std::sync::{Mutex, PoisonError};

use crate::haptics::{Haptic, HapticFeedback};

/// Records every haptic in order
#[derive(Debug, Default)]
pub struct RecordingHaptics {
    fired: Mutex<Vec<Haptic>>,
}

impl RecordingHaptics {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Haptics fired so far
    #[must_use]
    pub fn fired(&self) -> Vec<Haptic> {
        self.fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times `haptic` fired
    #[must_use]
    pub fn count(&self, haptic: Haptic) -> usize {
        self.fired().iter().filter(|h| **h == haptic).count()
    }
}

impl HapticFeedback for RecordingHaptics {
    fn trigger(&self, haptic: Haptic) {
        self.fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(haptic);
    }
}
