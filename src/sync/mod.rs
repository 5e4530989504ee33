//! Settings sync between paired devices.
//!
//! Remote wins on receipt, local wins on explicit save. Only the timing
//! fields travel; audio, haptics and volume stay on each device. Pushes are
//! fire-and-forget: one attempt per save, no queue, no retry.

pub mod transport;

pub use transport::{MemoryTransport, SettingsTransport, SpoolTransport, TransportError};

use crate::types::{RemoteSettingsSnapshot, TimerConfig};

// ============================================================================
// SyncState
// ============================================================================

/// Bookkeeping for one side of the sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Received snapshot not yet applied
    pub pending_remote: Option<RemoteSettingsSnapshot>,
    /// Local save awaiting its push attempt
    pub local_dirty: bool,
}

/// Result of a push attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The transport accepted the snapshot
    Sent,
    /// The link was down; nothing was sent
    Skipped,
    /// The transport rejected the snapshot
    Failed(TransportError),
}

// ============================================================================
// SettingsSync
// ============================================================================

/// Reconciles local settings with snapshots from the paired device.
#[derive(Debug, Clone)]
pub struct SettingsSync {
    local: TimerConfig,
    state: SyncState,
    status: String,
}

impl SettingsSync {
    /// Creates a sync holding `local` as the current settings.
    pub fn new(local: TimerConfig) -> Self {
        Self {
            local,
            state: SyncState::default(),
            status: String::new(),
        }
    }

    /// Current local settings.
    pub fn config(&self) -> &TimerConfig {
        &self.local
    }

    /// Sync bookkeeping.
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Human-readable result of the last sync activity.
    pub fn status_text(&self) -> &str {
        &self.status
    }

    /// Returns true while a local save awaits its push.
    pub fn is_dirty(&self) -> bool {
        self.state.local_dirty
    }

    /// Records a snapshot delivered by the transport. A later delivery
    /// replaces an earlier one that has not been applied.
    pub fn receive(&mut self, snapshot: RemoteSettingsSnapshot) {
        if self.state.pending_remote.replace(snapshot).is_some() {
            tracing::debug!("Unapplied remote settings superseded");
        }
    }

    /// Applies the pending snapshot, if any.
    pub fn apply_pending(&mut self) -> Option<TimerConfig> {
        let snapshot = self.state.pending_remote.take()?;
        Some(self.apply_remote(&snapshot))
    }

    /// Overwrites the timing fields from `snapshot`, filling gaps with the
    /// snapshot defaults. Returns the new local settings.
    ///
    /// Callers must stop any running session in response.
    pub fn apply_remote(&mut self, snapshot: &RemoteSettingsSnapshot) -> TimerConfig {
        self.state.pending_remote = None;
        self.local = snapshot.apply_to(&self.local);
        self.status = "Settings received".to_string();

        tracing::info!(
            "Applied remote settings: stretch={}s rest={}s reps={}",
            self.local.total_stretch,
            self.local.total_rest,
            self.local.total_reps
        );
        self.local
    }

    /// Stores a user-initiated save and marks it dirty until
    /// [`mark_dirty_and_push`](Self::mark_dirty_and_push) runs.
    pub fn save_local(&mut self, config: TimerConfig) {
        self.local = config;
        self.state.local_dirty = true;
    }

    /// Pushes the local timing fields to the paired device.
    ///
    /// Makes at most one send attempt. A link that is not connected drops
    /// the push silently; a failed send only updates the status text. The
    /// dirty flag is cleared either way.
    pub fn mark_dirty_and_push<T>(&mut self, transport: &mut T) -> PushOutcome
    where
        T: SettingsTransport + ?Sized,
    {
        self.state.local_dirty = true;

        let outcome = if transport.is_connected() {
            let snapshot = RemoteSettingsSnapshot::from_config(&self.local);
            match transport.send(&snapshot) {
                Ok(()) => {
                    self.status = "Settings sent".to_string();
                    PushOutcome::Sent
                }
                Err(e) => {
                    tracing::warn!("Settings push failed: {}", e);
                    self.status = format!("Push failed: {}", e);
                    PushOutcome::Failed(e)
                }
            }
        } else {
            tracing::debug!("Settings push dropped: transport not connected");
            PushOutcome::Skipped
        };

        self.state.local_dirty = false;
        outcome
    }
}

// ============================================================================
// Tests
// ============================================================================
