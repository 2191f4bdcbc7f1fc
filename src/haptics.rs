//! Haptic feedback capability

/// Kinds of haptic feedback the player emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Haptic {
    /// Skip forward/backward
    LightImpact,
    /// Load completed
    Success,
    /// Load failed
    Error,
    /// Speed changed
    Selection,
}

/// Fire-and-forget haptic output
///
/// Implementations must return quickly; the controller never waits on them.
pub trait HapticFeedback: Send + Sync {
    /// Trigger feedback
    fn trigger(&self, haptic: Haptic);
}

/// Haptics sink that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn trigger(&self, _haptic: Haptic) {}
}
