//! Command definitions for the stretch timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::TimerConfig;

// ============================================================================
// CLI Structure
// ============================================================================

/// Guided stretching interval timer
#[derive(Parser, Debug)]
#[command(
    name = "stretch",
    version,
    about = "Guided stretching interval timer",
    long_about = "Times stretch and rest intervals with spoken cues.\n\
                  Settings can be exchanged with a paired device through spool files.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a stretch session
    Run(RunArgs),

    /// Show or change stored settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the stored settings
    Show,

    /// Save new settings and push them to the paired device
    Set(SetArgs),

    /// Apply settings sent by the paired device
    Receive {
        /// Spool file written by the other device
        path: PathBuf,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the run command. Unset values come from stored settings.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Stretch duration in seconds (1-60)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub stretch: Option<u32>,

    /// Rest duration in seconds (1-30)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=30))]
    pub rest: Option<u32>,

    /// Number of repetitions (1-20)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub reps: Option<u32>,

    /// Disable spoken prompts and ticks
    #[arg(long)]
    pub no_audio: bool,

    /// Disable haptic feedback
    #[arg(long)]
    pub no_haptics: bool,

    /// Prompt volume (0.0-1.0)
    #[arg(long, value_parser = parse_volume)]
    pub volume: Option<f64>,
}

impl RunArgs {
    /// Overlays these arguments on stored settings.
    pub fn apply(&self, base: TimerConfig) -> TimerConfig {
        let mut config = base;
        if let Some(stretch) = self.stretch {
            config.total_stretch = stretch;
        }
        if let Some(rest) = self.rest {
            config.total_rest = rest;
        }
        if let Some(reps) = self.reps {
            config.total_reps = reps;
        }
        if self.no_audio {
            config.audio_enabled = false;
        }
        if self.no_haptics {
            config.haptics_enabled = false;
        }
        if let Some(volume) = self.volume {
            config.prompt_volume = volume;
        }
        config
    }
}

/// Arguments for the settings set command.
#[derive(Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Stretch duration in seconds (1-60)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub stretch: Option<u32>,

    /// Rest duration in seconds (1-30)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=30))]
    pub rest: Option<u32>,

    /// Number of repetitions (1-20)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub reps: Option<u32>,

    /// Spoken prompts and ticks on or off
    #[arg(long, value_name = "BOOL")]
    pub audio: Option<bool>,

    /// Haptic feedback on or off
    #[arg(long, value_name = "BOOL")]
    pub haptics: Option<bool>,

    /// Prompt volume (0.0-1.0)
    #[arg(long, value_parser = parse_volume)]
    pub volume: Option<f64>,

    /// Spool file the paired device reads from
    #[arg(long, value_name = "PATH")]
    pub peer: Option<PathBuf>,
}

impl SetArgs {
    /// Overlays these arguments on stored settings.
    pub fn apply(&self, base: TimerConfig) -> TimerConfig {
        TimerConfig {
            total_stretch: self.stretch.unwrap_or(base.total_stretch),
            total_rest: self.rest.unwrap_or(base.total_rest),
            total_reps: self.reps.unwrap_or(base.total_reps),
            audio_enabled: self.audio.unwrap_or(base.audio_enabled),
            haptics_enabled: self.haptics.unwrap_or(base.haptics_enabled),
            prompt_volume: self.volume.unwrap_or(base.prompt_volume),
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a prompt volume in `0.0..=1.0`.
fn parse_volume(s: &str) -> Result<f64, String> {
    let volume: f64 = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if !(0.0..=1.0).contains(&volume) {
        return Err("volume must be between 0.0 and 1.0".to_string());
    }
    Ok(volume)
}

// ============================================================================
// Tests
// ============================================================================
