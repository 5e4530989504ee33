//! Cue playback error types.

use thiserror::Error;

/// Errors reported by a [`CueSink`](super::CueSink).
#[derive(Debug, Error)]
pub enum CueError {
    /// No audio output or haptic engine is available.
    #[error("cue device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Generic playback failure.
    #[error("cue playback failed: {0}")]
    Playback(String),
}

impl CueError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceUnavailable(_))
    }
}
