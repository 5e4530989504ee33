//! Drives a stretch session from the terminal.
//!
//! The runner owns the clock: it waits out the start countdown, then ticks
//! the timer once per second until the session stops. Ctrl-C resets the
//! timer and ends the run.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::cue::{CueDispatcher, CueSink};
use crate::timer::{IntervalTimer, TimerEvent};
use crate::types::{Phase, TimerConfig};

use super::display::Display;

/// Runs one session to completion or cancellation.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed or the
/// configuration cannot start a session.
pub async fn run_session<S: CueSink>(config: TimerConfig, sink: S) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timer = IntervalTimer::new(config, tx);
    let cues = CueDispatcher::new(sink);

    let delay = timer
        .request_start()
        .context("Timer refused to start")?;
    drain_events(&mut rx, &cues, &config);
    Display::show_countdown(delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        result = &mut ctrl_c => {
            result.context("Failed to listen for Ctrl-C")?;
            timer.reset();
            Display::show_cancelled();
            return Ok(());
        }
    }

    if !timer.commit_start() {
        anyhow::bail!("Timer refused to commit start");
    }
    drain_events(&mut rx, &cues, &config);
    Display::show_progress(timer.state(), timer.config());

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of an interval completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                timer.tick();
                drain_events(&mut rx, &cues, &config);
                Display::show_progress(timer.state(), timer.config());

                if timer.state().phase == Phase::Stop {
                    break;
                }
            }
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                timer.reset();
                drain_events(&mut rx, &cues, &config);
                Display::show_cancelled();
                break;
            }
        }
    }

    Ok(())
}

/// Plays cues for every queued event and reports session completion.
fn drain_events<S: CueSink>(
    rx: &mut mpsc::UnboundedReceiver<TimerEvent>,
    cues: &CueDispatcher<S>,
    config: &TimerConfig,
) {
    while let Ok(event) = rx.try_recv() {
        cues.dispatch(&event, config);
        if let TimerEvent::SessionCompleted { reps_completed } = event {
            Display::show_session_complete(reps_completed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::{MockCueSink, Prompt};

    #[tokio::test(start_paused = true)]
    async fn test_short_session_runs_to_completion() {
        let config = TimerConfig::default()
            .with_stretch(1)
            .with_rest(1)
            .with_reps(1)
            .with_audio(false);
        let sink = MockCueSink::new();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_session(config, &sink),
        )
        .await;

        assert!(result.is_ok(), "session should finish within the timeout");
        assert!(result.unwrap().is_ok());
        // Audio is off: only haptics were played.
        assert!(sink.prompts().is_empty());
        assert!(!sink.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_audible_session_plays_prompts() {
        let config = TimerConfig::default()
            .with_stretch(1)
            .with_reps(1)
            .with_haptics(false)
            .with_audio(true);
        let sink = MockCueSink::new();

        let result = tokio::time::timeout(
            Duration::from_secs(8),
            run_session(config, &sink),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
        assert_eq!(
            sink.prompts(),
            vec![Prompt::CountdownExpanded, Prompt::Relax]
        );
    }
}
