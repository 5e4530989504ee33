//! Stretch & Release Library
//!
//! This library provides the core of a guided stretching interval timer
//! shared by a phone and a watch. It includes:
//! - Interval timer state machine (stretch, rest, pause, stop)
//! - Cue dispatch onto an injected audio/haptic sink
//! - Best-effort settings sync between paired devices
//! - Settings persistence and the command-line front-end

pub mod cli;
pub mod companion;
pub mod cue;
pub mod settings;
pub mod sync;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    progress_angle, ConfigError, Phase, RemoteSettingsSnapshot, TickOutcome, TimerConfig,
    TimerState,
};

pub use timer::{CountdownCue, IntervalTimer, TimerEvent};

pub use cue::{CueDispatcher, CueError, CueSink, MockCueSink, Prompt, TracingCueSink};

pub use sync::{
    MemoryTransport, PushOutcome, SettingsSync, SettingsTransport, SpoolTransport, SyncState,
    TransportError,
};

pub use companion::Companion;

pub use settings::SettingsStore;
