//! Stretch & Release CLI - guided stretching interval timer
//!
//! Alternates timed stretches and rests with spoken cues:
//! - 10 seconds of stretching
//! - 5 seconds of rest
//! - 3 repetitions per session

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use stretch_release::cli::{run_session, Cli, Commands, Display, SettingsCommand};
use stretch_release::{Companion, SettingsStore, SpoolTransport, TracingCueSink};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let store = match &cli.config {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::default_location()?,
    };

    match cli.command {
        Some(Commands::Run(args)) => {
            let config = args.apply(store.load()?);
            config.validate()?;
            run_session(config, TracingCueSink).await?;
        }
        Some(Commands::Settings(SettingsCommand::Show)) => {
            let config = store.load()?;
            Display::show_settings(&config, store.path());
        }
        Some(Commands::Settings(SettingsCommand::Set(args))) => {
            let stored = store.load()?;
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut device = Companion::new(stored, tx);
            let mut transport = SpoolTransport::new(args.peer.clone(), None);

            let outcome = device.save_settings(args.apply(stored), &mut transport)?;
            store.save(device.config())?;
            Display::show_saved(&outcome);
        }
        Some(Commands::Settings(SettingsCommand::Receive { path })) => {
            let stored = store.load()?;
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut device = Companion::new(stored, tx);
            let mut transport = SpoolTransport::inbox(path);

            match device.poll(&mut transport) {
                Some(config) => {
                    store.save(&config)?;
                    Display::show_received(&config);
                }
                None => Display::show_nothing_received(),
            }
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["stretch", "run"]);
        assert!(matches!(cli.command, Some(Commands::Run(_))));
    }

    #[test]
    fn test_cli_parse_settings_show() {
        let cli = Cli::parse_from(["stretch", "settings", "show"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Settings(SettingsCommand::Show))
        ));
    }

    #[tokio::test]
    async fn test_execute_set_then_receive() {
        let dir = tempfile::tempdir().unwrap();
        let phone = dir.path().join("phone.json");
        let watch = dir.path().join("watch.json");
        let spool = dir.path().join("spool.json");

        let set = Cli::parse_from([
            "stretch",
            "--config",
            phone.to_str().unwrap(),
            "settings",
            "set",
            "--reps",
            "9",
            "--peer",
            spool.to_str().unwrap(),
        ]);
        execute(set).await.unwrap();

        let receive = Cli::parse_from([
            "stretch",
            "--config",
            watch.to_str().unwrap(),
            "settings",
            "receive",
            spool.to_str().unwrap(),
        ]);
        execute(receive).await.unwrap();

        assert_eq!(SettingsStore::new(&watch).load().unwrap().total_reps, 9);
    }

    #[tokio::test]
    async fn test_execute_run_rejects_invalid_stored_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        std::fs::write(&config, r#"{"reps": 40}"#).unwrap();

        let cli = Cli::parse_from(["stretch", "--config", config.to_str().unwrap(), "run"]);

        assert!(execute(cli).await.is_err());
    }
}
