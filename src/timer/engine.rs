//! Interval timer engine.
//!
//! This module wraps [`TimerState`] with the command surface used by callers:
//! - Two-step start/resume (request a countdown, then commit)
//! - Pause and reset
//! - Per-second ticks driven by a caller-owned clock
//! - Event firing for cue playback

use std::time::Duration;

use tokio::sync::mpsc;

use crate::types::{Phase, TickOutcome, TimerConfig, TimerState, EMPTY_ANGLE};

// ============================================================================
// TimerEvent
// ============================================================================

/// Which countdown prompt precedes a phase taking effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownCue {
    /// "3, 2, 1, stretch" before a new session
    Expanded,
    /// "3, 2, 1" before resuming
    Short,
}

/// Timer events for cue playback and display.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// A start or resume was requested; the caller waits `delay` then commits
    CountdownStarted {
        /// Prompt to play
        cue: CountdownCue,
        /// Wait before committing
        delay: Duration,
    },
    /// One stretch second elapsed
    Tick {
        /// Seconds left in the stretch
        remaining_seconds: u32,
        /// Arc angle after the tick
        progress_angle: f64,
    },
    /// The phase changed
    PhaseChanged {
        /// Previous phase
        from: Phase,
        /// New phase
        to: Phase,
    },
    /// A stretch finished
    RepCompleted {
        /// Stretches finished so far
        reps_completed: u32,
        /// Stretches in the session
        total_reps: u32,
    },
    /// The last stretch of the session finished
    SessionCompleted {
        /// Stretches finished
        reps_completed: u32,
    },
    /// The session was reset
    Reset,
}

// ============================================================================
// IntervalTimer
// ============================================================================

/// Countdown awaiting its commit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Start,
    Resume,
}

/// Stretch/rest interval timer.
///
/// Commands that are not valid in the current phase are ignored: they return
/// `false` (or `None`) and emit nothing.
pub struct IntervalTimer {
    /// Session configuration
    config: TimerConfig,
    /// Current timer state
    state: TimerState,
    /// Countdown requested but not yet committed
    pending: Option<Pending>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl IntervalTimer {
    /// Creates a stopped timer with the given configuration and event channel.
    pub fn new(config: TimerConfig, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(&config),
            config,
            pending: None,
            event_tx,
        }
    }

    /// Begins a session countdown.
    ///
    /// Valid only from Stop. Clears the rep counter and returns how long the
    /// caller should wait before calling [`commit_start`](Self::commit_start).
    pub fn request_start(&mut self) -> Option<Duration> {
        if self.state.phase != Phase::Stop || self.pending.is_some() {
            tracing::debug!("Start ignored in phase {}", self.state.phase.as_str());
            return None;
        }

        self.state.reps_completed = 0;
        self.pending = Some(Pending::Start);

        let delay = self.config.countdown_delay();
        self.emit(TimerEvent::CountdownStarted {
            cue: CountdownCue::Expanded,
            delay,
        });
        Some(delay)
    }

    /// Enters the first stretch after a start countdown.
    pub fn commit_start(&mut self) -> bool {
        if self.pending != Some(Pending::Start) || self.state.phase != Phase::Stop {
            return false;
        }

        self.pending = None;
        self.state.begin_stretch(&self.config);
        tracing::debug!("Session started: {} reps", self.config.total_reps);

        self.emit(TimerEvent::PhaseChanged {
            from: Phase::Stop,
            to: Phase::Stretch,
        });
        true
    }

    /// Starts a session without waiting out the countdown.
    pub fn start(&mut self) -> bool {
        self.request_start().is_some() && self.commit_start()
    }

    /// Pauses a running stretch or rest.
    pub fn pause(&mut self) -> bool {
        let from = self.state.phase;
        if !self.state.pause() {
            tracing::debug!("Pause ignored in phase {}", from.as_str());
            return false;
        }

        self.emit(TimerEvent::PhaseChanged {
            from,
            to: Phase::Paused,
        });
        true
    }

    /// Begins a resume countdown.
    ///
    /// Valid only while paused. Returns the wait before
    /// [`commit_resume`](Self::commit_resume).
    pub fn request_resume(&mut self) -> Option<Duration> {
        if self.state.phase != Phase::Paused || self.pending.is_some() {
            tracing::debug!("Resume ignored in phase {}", self.state.phase.as_str());
            return None;
        }

        self.pending = Some(Pending::Resume);

        let delay = self.config.countdown_delay();
        self.emit(TimerEvent::CountdownStarted {
            cue: CountdownCue::Short,
            delay,
        });
        Some(delay)
    }

    /// Returns to the paused-from phase after a resume countdown.
    pub fn commit_resume(&mut self) -> bool {
        if self.pending != Some(Pending::Resume) {
            return false;
        }

        self.pending = None;
        if !self.state.resume() {
            return false;
        }

        self.emit(TimerEvent::PhaseChanged {
            from: Phase::Paused,
            to: self.state.phase,
        });
        true
    }

    /// Resumes without waiting out the countdown.
    pub fn resume(&mut self) -> bool {
        self.request_resume().is_some() && self.commit_resume()
    }

    /// Stops the session and clears all progress. Cancels pending countdowns.
    pub fn reset(&mut self) {
        let from = self.state.phase;
        self.pending = None;
        self.state.reset(&self.config);

        if from != Phase::Stop {
            self.emit(TimerEvent::PhaseChanged {
                from,
                to: Phase::Stop,
            });
        }
        self.emit(TimerEvent::Reset);
    }

    /// Advances the timer by one second. Does nothing unless running.
    pub fn tick(&mut self) -> TickOutcome {
        let from = self.state.phase;
        let outcome = self.state.tick(&self.config);

        match outcome {
            TickOutcome::Idle | TickOutcome::CountedUp => {}
            TickOutcome::CountedDown => {
                self.emit(TimerEvent::Tick {
                    remaining_seconds: self.state.time_remaining,
                    progress_angle: self.state.progress_angle,
                });
            }
            TickOutcome::RepCompleted { counted } => {
                if counted {
                    self.emit(TimerEvent::Tick {
                        remaining_seconds: 0,
                        progress_angle: EMPTY_ANGLE,
                    });
                }

                let reps_completed = self.state.reps_completed;
                tracing::debug!("Rep {}/{} complete", reps_completed, self.config.total_reps);

                self.emit(TimerEvent::RepCompleted {
                    reps_completed,
                    total_reps: self.config.total_reps,
                });
                self.emit(TimerEvent::PhaseChanged {
                    from,
                    to: self.state.phase,
                });
                if self.state.phase == Phase::Stop {
                    self.emit(TimerEvent::SessionCompleted { reps_completed });
                }
            }
            TickOutcome::RestFinished => {
                self.emit(TimerEvent::PhaseChanged {
                    from,
                    to: Phase::Stretch,
                });
            }
        }

        outcome
    }

    /// Replaces the configuration and resets the session.
    pub fn update_config(&mut self, config: TimerConfig) {
        self.config = config;
        self.reset();
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Returns true if ticks advance the timer.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Returns true while a start or resume countdown awaits its commit.
    pub fn countdown_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Timer event dropped: no receiver");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_timer(config: TimerConfig) -> (IntervalTimer, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (IntervalTimer::new(config, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn short_config() -> TimerConfig {
        TimerConfig::default().with_stretch(2).with_rest(1).with_reps(2)
    }

    // ------------------------------------------------------------------------
    // Start Tests
    // ------------------------------------------------------------------------

    mod start_tests {
        use super::*;

        #[test]
        fn test_new_timer() {
            let (timer, _rx) = create_timer(short_config());
            let state = timer.state();

            assert_eq!(state.phase, Phase::Stop);
            assert_eq!(state.time_remaining, 2);
            assert_eq!(state.reps_completed, 0);
            assert!(!timer.is_running());
        }

        #[test]
        fn test_request_start_emits_countdown() {
            let (mut timer, mut rx) = create_timer(TimerConfig::default());

            let delay = timer.request_start();

            assert_eq!(delay, Some(Duration::from_secs(3)));
            assert_eq!(timer.state().phase, Phase::Stop);
            assert!(timer.countdown_pending());
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::CountdownStarted {
                    cue: CountdownCue::Expanded,
                    delay: Duration::from_secs(3),
                }
            );
        }

        #[test]
        fn test_silent_countdown_is_short() {
            let (mut timer, _rx) = create_timer(TimerConfig::default().with_audio(false));
            assert_eq!(timer.request_start(), Some(Duration::from_millis(250)));
        }

        #[test]
        fn test_ticks_during_countdown_are_ignored() {
            let (mut timer, _rx) = create_timer(short_config());
            timer.request_start();

            assert_eq!(timer.tick(), TickOutcome::Idle);
            assert_eq!(timer.state().time_remaining, 2);
        }

        #[test]
        fn test_commit_start_enters_stretch() {
            let (mut timer, mut rx) = create_timer(short_config());
            timer.request_start();
            let _ = rx.try_recv();

            assert!(timer.commit_start());

            let state = timer.state();
            assert_eq!(state.phase, Phase::Stretch);
            assert_eq!(state.time_remaining, 2);
            assert_eq!(state.progress_angle, 340.0);
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::PhaseChanged {
                    from: Phase::Stop,
                    to: Phase::Stretch
                }
            );
        }

        #[test]
        fn test_commit_without_request_is_ignored() {
            let (mut timer, mut rx) = create_timer(short_config());

            assert!(!timer.commit_start());
            assert_eq!(timer.state().phase, Phase::Stop);
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_start_while_running_is_ignored() {
            let (mut timer, mut rx) = create_timer(short_config());
            assert!(timer.start());
            timer.tick();
            drain(&mut rx);

            assert!(!timer.start());
            assert_eq!(timer.state().time_remaining, 1);
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_start_clears_reps_from_finished_session() {
            let config = TimerConfig::default().with_stretch(1).with_reps(1);
            let (mut timer, _rx) = create_timer(config);
            timer.start();
            timer.tick();
            assert_eq!(timer.state().reps_completed, 1);

            timer.request_start();
            assert_eq!(timer.state().reps_completed, 0);
        }
    }

    // ------------------------------------------------------------------------
    // Tick Tests
    // ------------------------------------------------------------------------

    mod tick_tests {
        use super::*;

        #[test]
        fn test_stretch_tick_emits_tick_cue() {
            let (mut timer, mut rx) = create_timer(TimerConfig::default());
            timer.start();
            drain(&mut rx);

            assert_eq!(timer.tick(), TickOutcome::CountedDown);
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::Tick {
                    remaining_seconds: 9,
                    progress_angle: 9.0 / 10.0 * 320.0 + 20.0,
                }
            );
        }

        #[test]
        fn test_rep_completion_events() {
            let (mut timer, mut rx) = create_timer(short_config());
            timer.start();
            timer.tick();
            drain(&mut rx);

            timer.tick();

            assert_eq!(
                drain(&mut rx),
                vec![
                    TimerEvent::Tick {
                        remaining_seconds: 0,
                        progress_angle: 20.0
                    },
                    TimerEvent::RepCompleted {
                        reps_completed: 1,
                        total_reps: 2
                    },
                    TimerEvent::PhaseChanged {
                        from: Phase::Stretch,
                        to: Phase::Rest
                    },
                ]
            );
        }

        #[test]
        fn test_session_completion_events() {
            let config = TimerConfig::default().with_stretch(1).with_reps(1);
            let (mut timer, mut rx) = create_timer(config);
            timer.start();
            drain(&mut rx);

            timer.tick();

            let events = drain(&mut rx);
            assert_eq!(
                events.last(),
                Some(&TimerEvent::SessionCompleted { reps_completed: 1 })
            );
            assert!(events.contains(&TimerEvent::PhaseChanged {
                from: Phase::Stretch,
                to: Phase::Stop
            }));
        }

        #[test]
        fn test_rest_ticks_are_silent_until_boundary() {
            let config = TimerConfig::default().with_stretch(1).with_rest(3).with_reps(2);
            let (mut timer, mut rx) = create_timer(config);
            timer.start();
            timer.tick();
            timer.state_mut().time_remaining = 2;
            drain(&mut rx);

            assert_eq!(timer.tick(), TickOutcome::CountedUp);
            assert!(rx.try_recv().is_err());

            assert_eq!(timer.tick(), TickOutcome::RestFinished);
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::PhaseChanged {
                    from: Phase::Rest,
                    to: Phase::Stretch
                }
            );
        }

        #[test]
        fn test_stretch_duration_completes_one_rep() {
            for stretch in 1..=60 {
                for reps in [1, 2, 20] {
                    let config = TimerConfig::default().with_stretch(stretch).with_reps(reps);
                    let (mut timer, _rx) = create_timer(config);
                    timer.start();

                    for _ in 0..stretch {
                        timer.tick();
                    }

                    let expected = if reps == 1 { Phase::Stop } else { Phase::Rest };
                    assert_eq!(
                        timer.state().phase,
                        expected,
                        "stretch={} reps={}",
                        stretch,
                        reps
                    );
                    assert_eq!(timer.state().reps_completed, 1);
                }
            }
        }

        #[test]
        fn test_full_session_scenario() {
            let (mut timer, _rx) = create_timer(short_config());
            timer.start();

            timer.tick();
            timer.tick();
            assert_eq!(timer.state().phase, Phase::Rest);
            assert_eq!(timer.state().time_remaining, 1);
            assert_eq!(timer.state().reps_completed, 1);

            timer.tick();
            assert_eq!(timer.state().phase, Phase::Stretch);
            assert_eq!(timer.state().time_remaining, 2);

            timer.tick();
            timer.tick();
            assert_eq!(timer.state().phase, Phase::Stop);
            assert_eq!(timer.state().time_remaining, 2);
            assert_eq!(timer.state().reps_completed, 2);
        }
    }

    // ------------------------------------------------------------------------
    // Pause / Resume Tests
    // ------------------------------------------------------------------------

    mod pause_resume_tests {
        use super::*;

        #[test]
        fn test_pause_emits_phase_change() {
            let (mut timer, mut rx) = create_timer(TimerConfig::default());
            timer.start();
            drain(&mut rx);

            assert!(timer.pause());
            assert_eq!(timer.state().phase, Phase::Paused);
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::PhaseChanged {
                    from: Phase::Stretch,
                    to: Phase::Paused
                }
            );
        }

        #[test]
        fn test_pause_when_stopped_is_ignored() {
            let (mut timer, mut rx) = create_timer(TimerConfig::default());

            assert!(!timer.pause());
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_resume_uses_short_countdown() {
            let (mut timer, mut rx) = create_timer(TimerConfig::default().with_audio(false));
            timer.start();
            timer.pause();
            drain(&mut rx);

            let delay = timer.request_resume();

            assert_eq!(delay, Some(Duration::from_millis(250)));
            assert_eq!(timer.state().phase, Phase::Paused);
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::CountdownStarted {
                    cue: CountdownCue::Short,
                    delay: Duration::from_millis(250),
                }
            );
        }

        #[test]
        fn test_resume_returns_to_stretch() {
            let (mut timer, _rx) = create_timer(TimerConfig::default());
            timer.start();
            timer.tick();
            let before = timer.state().clone();

            assert!(timer.pause());
            assert_eq!(timer.state().progress_angle, before.progress_angle);
            assert!(timer.resume());

            assert_eq!(timer.state().phase, Phase::Stretch);
            assert_eq!(timer.state().time_remaining, 9);
            assert_eq!(timer.state().progress_angle, before.progress_angle);
            assert_eq!(timer.state(), &before);
        }

        #[test]
        fn test_resume_returns_to_rest() {
            let config = TimerConfig::default().with_stretch(1).with_rest(4).with_reps(3);
            let (mut timer, _rx) = create_timer(config);
            timer.start();
            timer.tick();
            timer.state_mut().time_remaining = 2;

            timer.pause();
            assert!(timer.resume());

            assert_eq!(timer.state().phase, Phase::Rest);
            assert_eq!(timer.state().time_remaining, 2);
        }

        #[test]
        fn test_resume_when_running_is_ignored() {
            let (mut timer, _rx) = create_timer(TimerConfig::default());
            timer.start();

            assert!(timer.request_resume().is_none());
            assert!(!timer.commit_resume());
        }

        #[test]
        fn test_reset_cancels_pending_resume() {
            let (mut timer, _rx) = create_timer(TimerConfig::default());
            timer.start();
            timer.pause();
            timer.request_resume();

            timer.reset();

            assert!(!timer.countdown_pending());
            assert!(!timer.commit_resume());
            assert_eq!(timer.state().phase, Phase::Stop);
        }
    }

    // ------------------------------------------------------------------------
    // Reset / Config Tests
    // ------------------------------------------------------------------------

    mod reset_tests {
        use super::*;

        #[test]
        fn test_reset_from_running() {
            let (mut timer, mut rx) = create_timer(TimerConfig::default());
            timer.start();
            timer.tick();
            drain(&mut rx);

            timer.reset();

            let state = timer.state();
            assert_eq!(state.phase, Phase::Stop);
            assert_eq!(state.time_remaining, 10);
            assert_eq!(state.reps_completed, 0);
            assert_eq!(state.progress_angle, 340.0);
            assert_eq!(
                drain(&mut rx),
                vec![
                    TimerEvent::PhaseChanged {
                        from: Phase::Stretch,
                        to: Phase::Stop
                    },
                    TimerEvent::Reset,
                ]
            );
        }

        #[test]
        fn test_reset_is_idempotent() {
            let (mut timer, _rx) = create_timer(TimerConfig::default());
            timer.start();
            timer.tick();

            timer.reset();
            let once = timer.state().clone();
            timer.reset();

            assert_eq!(timer.state(), &once);
        }

        #[test]
        fn test_update_config_resets() {
            let (mut timer, _rx) = create_timer(TimerConfig::default());
            timer.start();
            timer.tick();

            timer.update_config(TimerConfig::default().with_stretch(25));

            assert_eq!(timer.state().phase, Phase::Stop);
            assert_eq!(timer.state().time_remaining, 25);
            assert_eq!(timer.config().total_stretch, 25);
        }

        #[test]
        fn test_any_config_change_stops_session() {
            let (mut timer, _rx) = create_timer(TimerConfig::default());
            timer.start();
            timer.tick();

            timer.update_config(TimerConfig::default().with_audio(false).with_volume(0.2));

            assert_eq!(timer.state().phase, Phase::Stop);
            assert_eq!(timer.state().time_remaining, 10);
            assert!(!timer.config().audio_enabled);
        }

        #[test]
        fn test_dropped_receiver_does_not_panic() {
            let (mut timer, rx) = create_timer(TimerConfig::default());
            drop(rx);

            assert!(timer.start());
            timer.tick();
            timer.reset();
        }
    }
}
