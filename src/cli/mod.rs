//! CLI module for the stretch timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `runner`: Terminal session driven by a one-second clock

pub mod commands;
pub mod display;
pub mod runner;

pub use commands::{Cli, Commands, RunArgs, SetArgs, SettingsCommand};
pub use display::Display;
pub use runner::run_session;
