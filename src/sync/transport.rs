//! Device-to-device channels for settings snapshots.
//!
//! - [`MemoryTransport`]: a connected in-process pair, one end per device
//! - [`SpoolTransport`]: snapshots exchanged through files

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::types::RemoteSettingsSnapshot;

// ============================================================================
// TransportError
// ============================================================================

/// Transport-level failures. Sync records these; it never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The link is not up yet
    #[error("not connected")]
    NotConnected,

    /// The other device went away
    #[error("peer disconnected")]
    Disconnected,

    /// Snapshot could not be encoded
    #[error("encode failed: {0}")]
    Encode(String),

    /// Writing the payload failed
    #[error("I/O error: {0}")]
    Io(String),
}

// ============================================================================
// SettingsTransport
// ============================================================================

/// A bidirectional link to the paired device.
///
/// Delivery is best effort and unordered across sends; the receiving side
/// keeps whichever snapshot arrives last.
pub trait SettingsTransport {
    /// Returns true if a send can be attempted.
    fn is_connected(&self) -> bool;

    /// Sends one snapshot.
    fn send(&mut self, snapshot: &RemoteSettingsSnapshot) -> Result<(), TransportError>;

    /// Takes every snapshot received since the last poll, oldest first.
    fn poll_received(&mut self) -> Vec<RemoteSettingsSnapshot>;
}

fn encode(snapshot: &RemoteSettingsSnapshot) -> Result<Vec<u8>, TransportError> {
    snapshot
        .encode()
        .map_err(|e| TransportError::Encode(e.to_string()))
}

// ============================================================================
// MemoryTransport
// ============================================================================

/// One end of an in-process device link.
///
/// Payloads travel as encoded JSON so the receiving end exercises the same
/// forgiving decode as a real link.
pub struct MemoryTransport {
    outbound: Sender<Vec<u8>>,
    inbound: Receiver<Vec<u8>>,
    connected: bool,
}

impl MemoryTransport {
    /// Creates two connected endpoints.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = crossbeam_channel::unbounded();
        let (b_tx, a_rx) = crossbeam_channel::unbounded();

        let a = Self {
            outbound: a_tx,
            inbound: a_rx,
            connected: true,
        };
        let b = Self {
            outbound: b_tx,
            inbound: b_rx,
            connected: true,
        };
        (a, b)
    }

    /// Marks this end as not yet activated.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Marks this end as activated.
    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// Sends an arbitrary payload to the peer, bypassing encoding.
    pub fn send_raw(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.outbound
            .send(payload)
            .map_err(|_| TransportError::Disconnected)
    }
}

impl SettingsTransport for MemoryTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, snapshot: &RemoteSettingsSnapshot) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        let payload = encode(snapshot)?;
        self.send_raw(payload)
    }

    fn poll_received(&mut self) -> Vec<RemoteSettingsSnapshot> {
        self.inbound
            .try_iter()
            .map(|payload| RemoteSettingsSnapshot::decode(&payload))
            .collect()
    }
}

// ============================================================================
// SpoolTransport
// ============================================================================

/// Exchanges snapshots through files.
///
/// Sending overwrites the outbox file; polling reads and removes the inbox
/// file. The link counts as connected when the outbox's directory exists.
#[derive(Debug, Clone, Default)]
pub struct SpoolTransport {
    outbox: Option<PathBuf>,
    inbox: Option<PathBuf>,
}

impl SpoolTransport {
    /// Creates a transport writing to `outbox` and reading from `inbox`.
    pub fn new(outbox: Option<PathBuf>, inbox: Option<PathBuf>) -> Self {
        Self { outbox, inbox }
    }

    /// Send-only transport.
    pub fn outbox(path: impl Into<PathBuf>) -> Self {
        Self::new(Some(path.into()), None)
    }

    /// Receive-only transport.
    pub fn inbox(path: impl Into<PathBuf>) -> Self {
        Self::new(None, Some(path.into()))
    }

    fn directory_exists(path: &Path) -> bool {
        match path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => true,
            Some(dir) => dir.is_dir(),
            None => false,
        }
    }
}

impl SettingsTransport for SpoolTransport {
    fn is_connected(&self) -> bool {
        self.outbox
            .as_deref()
            .is_some_and(Self::directory_exists)
    }

    fn send(&mut self, snapshot: &RemoteSettingsSnapshot) -> Result<(), TransportError> {
        let path = match &self.outbox {
            Some(path) if Self::directory_exists(path) => path,
            _ => return Err(TransportError::NotConnected),
        };
        let payload = encode(snapshot)?;
        std::fs::write(path, payload).map_err(|e| TransportError::Io(e.to_string()))
    }

    fn poll_received(&mut self) -> Vec<RemoteSettingsSnapshot> {
        let Some(path) = &self.inbox else {
            return Vec::new();
        };

        match std::fs::read(path) {
            Ok(payload) => {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!("Could not consume {:?}: {}", path, e);
                }
                vec![RemoteSettingsSnapshot::decode(&payload)]
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read {:?}: {}", path, e);
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
