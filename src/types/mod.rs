//! Core data types for the stretch timer.
//!
//! This module defines the data structures used for:
//! - Phase tracking and the per-second state machine
//! - Timer configuration with validation
//! - The settings snapshot exchanged between paired devices

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Valid stretch durations in seconds.
pub const STRETCH_SECONDS: RangeInclusive<u32> = 1..=60;

/// Valid rest durations in seconds.
pub const REST_SECONDS: RangeInclusive<u32> = 1..=30;

/// Valid repetition counts.
pub const REPS: RangeInclusive<u32> = 1..=20;

/// Arc angle for a full remaining duration (and for Stop).
pub const FULL_ANGLE: f64 = 340.0;

/// Arc angle for an empty remaining duration.
pub const EMPTY_ANGLE: f64 = 20.0;

const ARC_SWEEP: f64 = FULL_ANGLE - EMPTY_ANGLE;

/// Countdown before a phase takes effect when the countdown prompt is audible.
const AUDIBLE_COUNTDOWN: Duration = Duration::from_secs(3);

/// Countdown before a phase takes effect when audio is off.
const SILENT_COUNTDOWN: Duration = Duration::from_millis(250);

// ============================================================================
// Phase
// ============================================================================

/// Current stage of the stretch/rest cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Holding a stretch, time counts down
    Stretch,
    /// Resting between stretches, time counts up
    Rest,
    /// Session suspended mid-phase
    Paused,
    /// No session running
    Stop,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Stretch => "stretch",
            Phase::Rest => "rest",
            Phase::Paused => "paused",
            Phase::Stop => "stop",
        }
    }

    /// Returns the label shown next to the countdown.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Stretch => "STRETCH",
            Phase::Rest => "REST",
            Phase::Paused => "PAUSED",
            Phase::Stop => "STOP",
        }
    }

    /// Cue strength in `[0, 1]` used to scale haptic feedback.
    pub fn intensity(&self) -> f64 {
        match self {
            Phase::Stretch => 0.5,
            Phase::Rest | Phase::Paused => 0.25,
            Phase::Stop => 1.0,
        }
    }

    /// Returns true if ticks advance the timer in this phase.
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Stretch | Phase::Rest)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Stop
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Errors reported when a configuration is outside its allowed ranges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("stretch duration must be between 1 and 60 seconds (got {0})")]
    Stretch(u32),

    #[error("rest duration must be between 1 and 30 seconds (got {0})")]
    Rest(u32),

    #[error("repetitions must be between 1 and 20 (got {0})")]
    Reps(u32),

    #[error("prompt volume must be between 0.0 and 1.0 (got {0})")]
    Volume(f64),
}

/// Session configuration.
///
/// Serialized keys match the storage keys used on both devices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Stretch duration in seconds (1-60)
    #[serde(rename = "stretch")]
    pub total_stretch: u32,
    /// Rest duration in seconds (1-30)
    #[serde(rename = "rest")]
    pub total_rest: u32,
    /// Repetitions per session (1-20)
    #[serde(rename = "reps")]
    pub total_reps: u32,
    /// Whether spoken prompts and ticks play
    #[serde(rename = "audio")]
    pub audio_enabled: bool,
    /// Whether haptic feedback plays
    #[serde(rename = "haptics")]
    pub haptics_enabled: bool,
    /// Prompt volume (0.0-1.0)
    #[serde(rename = "promptVolume")]
    pub prompt_volume: f64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            total_stretch: 10,
            total_rest: 5,
            total_reps: 3,
            audio_enabled: true,
            haptics_enabled: true,
            prompt_volume: 1.0,
        }
    }
}

impl TimerConfig {
    /// Sets the stretch duration.
    pub fn with_stretch(mut self, seconds: u32) -> Self {
        self.total_stretch = seconds;
        self
    }

    /// Sets the rest duration.
    pub fn with_rest(mut self, seconds: u32) -> Self {
        self.total_rest = seconds;
        self
    }

    /// Sets the repetition count.
    pub fn with_reps(mut self, reps: u32) -> Self {
        self.total_reps = reps;
        self
    }

    /// Enables or disables audio cues.
    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }

    /// Enables or disables haptic cues.
    pub fn with_haptics(mut self, enabled: bool) -> Self {
        self.haptics_enabled = enabled;
        self
    }

    /// Sets the prompt volume.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.prompt_volume = volume;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !STRETCH_SECONDS.contains(&self.total_stretch) {
            return Err(ConfigError::Stretch(self.total_stretch));
        }
        if !REST_SECONDS.contains(&self.total_rest) {
            return Err(ConfigError::Rest(self.total_rest));
        }
        if !REPS.contains(&self.total_reps) {
            return Err(ConfigError::Reps(self.total_reps));
        }
        if !(0.0..=1.0).contains(&self.prompt_volume) {
            return Err(ConfigError::Volume(self.prompt_volume));
        }
        Ok(())
    }

    /// Delay between requesting a start/resume and the phase taking effect.
    pub fn countdown_delay(&self) -> Duration {
        if self.audio_enabled {
            AUDIBLE_COUNTDOWN
        } else {
            SILENT_COUNTDOWN
        }
    }
}

// ============================================================================
// Progress angle
// ============================================================================

/// Arc angle for `time_remaining` seconds into `phase`.
///
/// Stretch and Rest map linearly onto `[20, 340]` against their own duration.
/// Stop, and Paused without a known phase, sit at 340.
pub fn progress_angle(phase: Phase, time_remaining: u32, config: &TimerConfig) -> f64 {
    let duration = match phase {
        Phase::Stretch => config.total_stretch,
        Phase::Rest => config.total_rest,
        Phase::Paused | Phase::Stop => return FULL_ANGLE,
    };
    if duration == 0 {
        return FULL_ANGLE;
    }
    let angle = f64::from(time_remaining) / f64::from(duration) * ARC_SWEEP + EMPTY_ANGLE;
    angle.clamp(EMPTY_ANGLE, FULL_ANGLE)
}

// ============================================================================
// TimerState
// ============================================================================

/// Result of advancing the state by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed
    Idle,
    /// Stretch time decreased by one second
    CountedDown,
    /// Rest time increased by one second
    CountedUp,
    /// A stretch finished and the next phase (Rest or Stop) began
    RepCompleted {
        /// Whether this tick also consumed the final second
        counted: bool,
    },
    /// Rest finished and the next stretch began
    RestFinished,
}

/// Mutable state of a stretch session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    /// Current phase
    pub phase: Phase,
    /// Seconds left in Stretch, seconds elapsed in Rest
    pub time_remaining: u32,
    /// Stretches finished in this session
    pub reps_completed: u32,
    /// Derived arc angle in degrees
    pub progress_angle: f64,
    /// Phase to return to after a pause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resume_phase: Option<Phase>,
}

impl TimerState {
    /// Creates a stopped state for the given configuration.
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            phase: Phase::Stop,
            time_remaining: config.total_stretch,
            reps_completed: 0,
            progress_angle: FULL_ANGLE,
            resume_phase: None,
        }
    }

    /// Enters Stretch with a full stretch duration.
    pub fn begin_stretch(&mut self, config: &TimerConfig) {
        self.phase = Phase::Stretch;
        self.time_remaining = config.total_stretch;
        self.resume_phase = None;
        self.refresh_angle(config);
    }

    /// Enters Rest at the rest target.
    pub fn begin_rest(&mut self, config: &TimerConfig) {
        self.phase = Phase::Rest;
        self.time_remaining = config.total_rest;
        self.resume_phase = None;
        self.refresh_angle(config);
    }

    /// Pauses a running phase. Returns false if nothing was running.
    pub fn pause(&mut self) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        self.resume_phase = Some(self.phase);
        self.phase = Phase::Paused;
        true
    }

    /// Restores the phase that was paused. Returns false if not paused.
    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        // A pause always records its phase; Stretch covers deserialized states.
        self.phase = self.resume_phase.take().unwrap_or(Phase::Stretch);
        true
    }

    /// Stops the session and clears progress.
    pub fn reset(&mut self, config: &TimerConfig) {
        self.phase = Phase::Stop;
        self.time_remaining = config.total_stretch;
        self.reps_completed = 0;
        self.resume_phase = None;
        self.progress_angle = FULL_ANGLE;
    }

    /// Advances the state by one second.
    pub fn tick(&mut self, config: &TimerConfig) -> TickOutcome {
        match self.phase {
            Phase::Stretch => {
                let counted = self.time_remaining > 0;
                if counted {
                    self.time_remaining -= 1;
                    self.refresh_angle(config);
                    if self.time_remaining > 0 {
                        return TickOutcome::CountedDown;
                    }
                }
                self.reps_completed += 1;
                if self.reps_completed < config.total_reps {
                    self.begin_rest(config);
                } else {
                    self.finish(config);
                }
                TickOutcome::RepCompleted { counted }
            }
            Phase::Rest => {
                if self.time_remaining < config.total_rest {
                    self.time_remaining += 1;
                    self.refresh_angle(config);
                    TickOutcome::CountedUp
                } else {
                    self.begin_stretch(config);
                    TickOutcome::RestFinished
                }
            }
            Phase::Paused | Phase::Stop => TickOutcome::Idle,
        }
    }

    /// Returns true if ticks advance the timer.
    pub fn is_running(&self) -> bool {
        self.phase.is_active()
    }

    /// Returns true if the session is paused.
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    /// Phase a paused session will return to.
    pub fn resume_phase(&self) -> Option<Phase> {
        self.resume_phase
    }

    /// Ends a completed session; the rep count is kept for display.
    fn finish(&mut self, config: &TimerConfig) {
        self.phase = Phase::Stop;
        self.time_remaining = config.total_stretch;
        self.resume_phase = None;
        self.progress_angle = FULL_ANGLE;
    }

    fn refresh_angle(&mut self, config: &TimerConfig) {
        let phase = match self.phase {
            Phase::Paused => self.resume_phase.unwrap_or(Phase::Stop),
            phase => phase,
        };
        self.progress_angle = progress_angle(phase, self.time_remaining, config);
    }
}

// ============================================================================
// RemoteSettingsSnapshot
// ============================================================================

/// Timing settings exchanged between paired devices.
///
/// Every field is optional on the wire. Accessors fill missing or unusable
/// values with the snapshot defaults (10 s stretch, 5 s rest, 5 reps).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettingsSnapshot {
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub stretch: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub rest: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub reps: Option<u32>,
}

impl RemoteSettingsSnapshot {
    pub const DEFAULT_STRETCH: u32 = 10;
    pub const DEFAULT_REST: u32 = 5;
    pub const DEFAULT_REPS: u32 = 5;

    /// Builds the outbound snapshot for a local configuration.
    pub fn from_config(config: &TimerConfig) -> Self {
        Self {
            stretch: Some(config.total_stretch),
            rest: Some(config.total_rest),
            reps: Some(config.total_reps),
        }
    }

    /// Decodes a received payload. Never fails: an unreadable payload
    /// yields a snapshot with every field missing.
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Unreadable settings payload, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Encodes the snapshot as a JSON object.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Stretch seconds, defaulted when missing or out of range.
    pub fn stretch_seconds(&self) -> u32 {
        pick(self.stretch, &STRETCH_SECONDS, Self::DEFAULT_STRETCH)
    }

    /// Rest seconds, defaulted when missing or out of range.
    pub fn rest_seconds(&self) -> u32 {
        pick(self.rest, &REST_SECONDS, Self::DEFAULT_REST)
    }

    /// Repetitions, defaulted when missing or out of range.
    pub fn total_reps(&self) -> u32 {
        pick(self.reps, &REPS, Self::DEFAULT_REPS)
    }

    /// Returns `config` with its timing fields replaced by this snapshot.
    ///
    /// Audio, haptics and volume are local to each device and kept.
    pub fn apply_to(&self, config: &TimerConfig) -> TimerConfig {
        TimerConfig {
            total_stretch: self.stretch_seconds(),
            total_rest: self.rest_seconds(),
            total_reps: self.total_reps(),
            ..*config
        }
    }
}

fn pick(value: Option<u32>, range: &RangeInclusive<u32>, default: u32) -> u32 {
    value.filter(|v| range.contains(v)).unwrap_or(default)
}

/// Accepts integers, whole floats and numeric strings; anything else is
/// treated as missing.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(whole_number))
}

fn whole_number(value: &serde_json::Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) {
            return Some(f as u32);
        }
        return None;
    }
    value.as_str().and_then(|s| s.trim().parse().ok())
}

// ============================================================================
// Tests
// ============================================================================
