//! One device's timer and settings, wired together.
//!
//! Settings changes from either side stop the running session, so the timer
//! never mixes durations from two configurations.

use tokio::sync::mpsc;

use crate::sync::{PushOutcome, SettingsSync, SettingsTransport};
use crate::timer::{IntervalTimer, TimerEvent};
use crate::types::{ConfigError, RemoteSettingsSnapshot, TimerConfig};

/// Timer plus settings sync for a single device.
pub struct Companion {
    timer: IntervalTimer,
    sync: SettingsSync,
}

impl Companion {
    /// Creates a device with `config` as its stored settings.
    pub fn new(config: TimerConfig, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            timer: IntervalTimer::new(config, event_tx),
            sync: SettingsSync::new(config),
        }
    }

    /// The interval timer.
    pub fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    /// The interval timer, for start/pause/resume/tick.
    pub fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    /// The settings sync.
    pub fn sync(&self) -> &SettingsSync {
        &self.sync
    }

    /// Current settings.
    pub fn config(&self) -> &TimerConfig {
        self.sync.config()
    }

    /// Applies a snapshot from the paired device and stops the session.
    pub fn apply_remote(&mut self, snapshot: &RemoteSettingsSnapshot) -> TimerConfig {
        let config = self.sync.apply_remote(snapshot);
        self.adopt(config);
        config
    }

    /// Saves settings chosen on this device and pushes them to the peer.
    ///
    /// Invalid settings are rejected before anything changes.
    pub fn save_settings<T>(
        &mut self,
        config: TimerConfig,
        transport: &mut T,
    ) -> Result<PushOutcome, ConfigError>
    where
        T: SettingsTransport + ?Sized,
    {
        config.validate()?;
        self.sync.save_local(config);
        self.adopt(config);
        Ok(self.sync.mark_dirty_and_push(transport))
    }

    /// Applies whatever the peer sent since the last poll. When several
    /// snapshots arrived, the last one wins.
    pub fn poll<T>(&mut self, transport: &mut T) -> Option<TimerConfig>
    where
        T: SettingsTransport + ?Sized,
    {
        for snapshot in transport.poll_received() {
            self.sync.receive(snapshot);
        }
        let config = self.sync.apply_pending()?;
        self.adopt(config);
        Some(config)
    }

    fn adopt(&mut self, config: TimerConfig) {
        self.timer.update_config(config);
    }
}
