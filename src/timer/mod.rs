//! Timer module for stretch sessions.
//!
//! - `engine`: Interval timer with phase transitions and cue events

pub mod engine;

pub use engine::{CountdownCue, IntervalTimer, TimerEvent};
