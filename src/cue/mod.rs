//! Audio and haptic cues for stretch sessions.
//!
//! Playback itself belongs to the host platform. This module defines the
//! capability the timer's caller injects, plus the policy that turns timer
//! events into cues:
//!
//! ```text
//! ┌──────────────┐  TimerEvent  ┌───────────────┐  play_*  ┌──────────┐
//! │ IntervalTimer│ ───────────▶ │ CueDispatcher │ ───────▶ │ CueSink  │
//! └──────────────┘              └───────────────┘          └──────────┘
//! ```

mod dispatcher;
mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub use dispatcher::CueDispatcher;
pub use error::CueError;

// ============================================================================
// Prompt
// ============================================================================

/// Spoken prompts played at phase boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    /// Session finished
    Relax,
    /// Rest starting
    Rest,
    /// Stretch starting
    Stretch,
    /// Countdown before resuming
    Countdown,
    /// Countdown before the first stretch
    CountdownExpanded,
}

impl Prompt {
    /// Asset name of the recording for this prompt.
    pub fn asset_name(&self) -> &'static str {
        match self {
            Prompt::Relax => "and_relax",
            Prompt::Rest => "and_rest",
            Prompt::Stretch => "and_stretch",
            Prompt::Countdown => "321",
            Prompt::CountdownExpanded => "321_stretch",
        }
    }
}

/// Asset name of the per-second tick.
pub const TICK_ASSET: &str = "tick";

// ============================================================================
// CueSink
// ============================================================================

/// Host capability that plays cues.
///
/// Implementations should not block; playback happens in the background.
pub trait CueSink {
    /// Plays the short per-second tick.
    fn play_tick(&self) -> Result<(), CueError>;

    /// Plays a spoken prompt at `volume` (0.0-1.0).
    fn play_prompt(&self, prompt: Prompt, volume: f64) -> Result<(), CueError>;

    /// Plays a haptic impulse at `intensity` (0.0-1.0).
    fn play_haptic(&self, intensity: f64) -> Result<(), CueError>;
}

impl<S: CueSink + ?Sized> CueSink for &S {
    fn play_tick(&self) -> Result<(), CueError> {
        (**self).play_tick()
    }

    fn play_prompt(&self, prompt: Prompt, volume: f64) -> Result<(), CueError> {
        (**self).play_prompt(prompt, volume)
    }

    fn play_haptic(&self, intensity: f64) -> Result<(), CueError> {
        (**self).play_haptic(intensity)
    }
}

// ============================================================================
// TracingCueSink
// ============================================================================

/// Sink that reports cues through `tracing` instead of playing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCueSink;

impl CueSink for TracingCueSink {
    fn play_tick(&self) -> Result<(), CueError> {
        tracing::trace!("cue: {}", TICK_ASSET);
        Ok(())
    }

    fn play_prompt(&self, prompt: Prompt, volume: f64) -> Result<(), CueError> {
        tracing::info!("cue: {} (volume {:.2})", prompt.asset_name(), volume);
        Ok(())
    }

    fn play_haptic(&self, intensity: f64) -> Result<(), CueError> {
        tracing::debug!("haptic: intensity {:.2}", intensity);
        Ok(())
    }
}

// ============================================================================
// MockCueSink
// ============================================================================

/// A cue recorded by [`MockCueSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum CueCall {
    Tick,
    Prompt { prompt: Prompt, volume: f64 },
    Haptic { intensity: f64 },
}

/// Mock cue sink for testing.
#[derive(Debug, Default)]
pub struct MockCueSink {
    calls: Mutex<Vec<CueCall>>,
    should_fail: AtomicBool,
}

impl MockCueSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<CueCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Prompts played so far, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<Prompt> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CueCall::Prompt { prompt, .. } => Some(prompt),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: CueCall) -> Result<(), CueError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(CueError::Playback("Mock failure".to_string()));
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        Ok(())
    }
}

impl CueSink for MockCueSink {
    fn play_tick(&self) -> Result<(), CueError> {
        self.record(CueCall::Tick)
    }

    fn play_prompt(&self, prompt: Prompt, volume: f64) -> Result<(), CueError> {
        self.record(CueCall::Prompt { prompt, volume })
    }

    fn play_haptic(&self, intensity: f64) -> Result<(), CueError> {
        self.record(CueCall::Haptic { intensity })
    }
}
