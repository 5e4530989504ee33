//! Maps timer events onto cues.

use crate::timer::{CountdownCue, TimerEvent};
use crate::types::{Phase, TimerConfig};

use super::{CueError, CueSink, Prompt};

/// Turns [`TimerEvent`]s into sink calls according to the audio, haptics and
/// volume settings.
///
/// Sink failures are logged and dropped; a missing speaker never interrupts
/// a session.
pub struct CueDispatcher<S> {
    sink: S,
}

impl<S: CueSink> CueDispatcher<S> {
    /// Creates a dispatcher playing through `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Returns the underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Plays the cues for one event.
    pub fn dispatch(&self, event: &TimerEvent, config: &TimerConfig) {
        match event {
            TimerEvent::CountdownStarted { cue, .. } => {
                let prompt = match cue {
                    CountdownCue::Expanded => Prompt::CountdownExpanded,
                    CountdownCue::Short => Prompt::Countdown,
                };
                self.prompt(prompt, config);
            }
            TimerEvent::Tick { .. } => {
                if config.audio_enabled {
                    self.report(self.sink.play_tick());
                }
                self.haptic(Phase::Stretch, config);
            }
            TimerEvent::PhaseChanged { from, to } => {
                match (from, to) {
                    (Phase::Stretch, Phase::Rest) => self.prompt(Prompt::Rest, config),
                    (Phase::Rest, Phase::Stretch) => self.prompt(Prompt::Stretch, config),
                    _ => {}
                }
                self.haptic(*to, config);
            }
            TimerEvent::SessionCompleted { .. } => self.prompt(Prompt::Relax, config),
            TimerEvent::RepCompleted { .. } | TimerEvent::Reset => {}
        }
    }

    fn prompt(&self, prompt: Prompt, config: &TimerConfig) {
        if config.audio_enabled {
            self.report(self.sink.play_prompt(prompt, config.prompt_volume));
        }
    }

    fn haptic(&self, phase: Phase, config: &TimerConfig) {
        if config.haptics_enabled {
            self.report(self.sink.play_haptic(phase.intensity()));
        }
    }

    fn report(&self, result: Result<(), CueError>) {
        if let Err(e) = result {
            if e.is_device_error() {
                tracing::debug!("Cue skipped: {}", e);
            } else {
                tracing::warn!("Cue failed: {}", e);
            }
        }
    }
}
