//! Display utilities for the stretch timer CLI.
//!
//! This module provides formatted output for:
//! - Session progress lines
//! - Stored settings and sync results
//! - Error messages

use std::path::Path;
use std::time::Duration;

use crate::sync::PushOutcome;
use crate::types::{TimerConfig, TimerState, EMPTY_ANGLE, FULL_ANGLE};

/// Width of the progress bar in cells.
const BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the countdown before the first stretch.
    pub fn show_countdown(delay: Duration) {
        println!("Get ready... starting in {:.1}s", delay.as_secs_f64());
    }

    /// Shows one progress line.
    pub fn show_progress(state: &TimerState, config: &TimerConfig) {
        println!("{}", Self::format_progress(state, config));
    }

    /// Shows the end-of-session message.
    pub fn show_session_complete(reps: u32) {
        println!("* Session complete: {} reps. And relax.", reps);
    }

    /// Shows that the session was cancelled.
    pub fn show_cancelled() {
        println!("[] Session cancelled");
    }

    /// Shows stored settings.
    pub fn show_settings(config: &TimerConfig, path: &Path) {
        println!("Stretch settings ({})", path.display());
        println!("─────────────────────────────");
        println!("Stretch: {}s", config.total_stretch);
        println!("Rest:    {}s", config.total_rest);
        println!("Reps:    {}", config.total_reps);
        println!("Audio:   {}", Self::on_off(config.audio_enabled));
        println!("Haptics: {}", Self::on_off(config.haptics_enabled));
        println!("Volume:  {:.0}%", config.prompt_volume * 100.0);
    }

    /// Shows the result of a local save.
    pub fn show_saved(outcome: &PushOutcome) {
        println!("* Settings saved");
        match outcome {
            PushOutcome::Sent => println!("  Sent to paired device"),
            PushOutcome::Skipped => println!("  No paired device; not sent"),
            PushOutcome::Failed(e) => println!("  Push failed: {}", e),
        }
    }

    /// Shows settings adopted from the paired device.
    pub fn show_received(config: &TimerConfig) {
        println!(
            "* Settings received: stretch {}s, rest {}s, {} reps",
            config.total_stretch, config.total_rest, config.total_reps
        );
    }

    /// Shows that no snapshot was waiting.
    pub fn show_nothing_received() {
        println!("No settings waiting from the paired device");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Formats one progress line, e.g. `STRETCH  07s  [#####.....]  rep 1/3`.
    pub fn format_progress(state: &TimerState, config: &TimerConfig) -> String {
        format!(
            "{:<8} {:02}s  [{}]  rep {}/{}",
            state.phase.label(),
            state.time_remaining,
            Self::format_bar(state.progress_angle),
            state.reps_completed,
            config.total_reps
        )
    }

    /// Renders the arc angle as a bar: full at 340°, empty at 20°.
    fn format_bar(angle: f64) -> String {
        let fraction = ((angle - EMPTY_ANGLE) / (FULL_ANGLE - EMPTY_ANGLE)).clamp(0.0, 1.0);
        let filled = (fraction * BAR_WIDTH as f64).round() as usize;
        format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
    }

    fn on_off(enabled: bool) -> &'static str {
        if enabled {
            "on"
        } else {
            "off"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
