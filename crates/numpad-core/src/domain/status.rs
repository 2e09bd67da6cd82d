//! Connection status state values.
//!
//! A connection instance is always in exactly one of these states.  Only the
//! transport that owns the connection moves it from one state to another; the
//! user interface observes the transitions through a status listener.
//!
//! ```text
//!                 open()                      open ok
//! Disconnected ──────────> Connecting ───────────────> Connected
//!      ^                        │                          │
//!      │ 2000 ms reset          │ open failed              │ send failed
//!      │                        v                          v
//!      ├─────────────── CouldNotConnect            ConnectionLost
//!      │                                                   │
//!      └───────────────────────────────────────────────────┘
//!
//! any non-idle state ── close() ──> Disconnecting ──> Disconnected
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// The state of a connection to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No connection and no attempt in progress.
    Disconnected,
    /// An explicit close is releasing the transport.
    Disconnecting,
    /// An open attempt is in progress.
    Connecting,
    /// The transport is open and key events are being forwarded.
    Connected,
    /// The transport failed after it had been opened.
    ConnectionLost,
    /// The open attempt failed.
    CouldNotConnect,
}

/// How a status is rendered by a user interface (the colour of the status text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusTone {
    /// Nothing happening.
    Idle,
    /// A transition is in progress.
    Working,
    /// The last attempt or session failed.
    Failed,
    /// Connected and ready.
    Connected,
}

impl ConnectionStatus {
    /// All status values, in declaration order.
    pub const ALL: [ConnectionStatus; 6] = [
        ConnectionStatus::Disconnected,
        ConnectionStatus::Disconnecting,
        ConnectionStatus::Connecting,
        ConnectionStatus::Connected,
        ConnectionStatus::ConnectionLost,
        ConnectionStatus::CouldNotConnect,
    ];

    /// Returns the user-facing label for this status.
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Disconnecting => "Disconnecting…",
            ConnectionStatus::Connecting => "Connecting…",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::ConnectionLost => "Connection lost",
            ConnectionStatus::CouldNotConnect => "Could not connect",
        }
    }

    /// Returns the display tone for this status.
    pub fn tone(self) -> StatusTone {
        match self {
            ConnectionStatus::Disconnected => StatusTone::Idle,
            ConnectionStatus::Disconnecting | ConnectionStatus::Connecting => StatusTone::Working,
            ConnectionStatus::ConnectionLost | ConnectionStatus::CouldNotConnect => {
                StatusTone::Failed
            }
            ConnectionStatus::Connected => StatusTone::Connected,
        }
    }

    /// Returns `true` for the two failure states that are displayed for a
    /// fixed time and then reset to [`ConnectionStatus::Disconnected`].
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            ConnectionStatus::ConnectionLost | ConnectionStatus::CouldNotConnect
        )
    }

    /// Returns `true` when neither a connection nor an attempt is alive.
    pub fn is_idle(self) -> bool {
        self == ConnectionStatus::Disconnected
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        ConnectionStatus::Disconnected
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
