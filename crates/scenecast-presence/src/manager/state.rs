//! Manager lifecycle states.

use std::fmt;

use serde::Serialize;

use crate::channel::ChannelHandle;

/// Observable lifecycle state of a [`PresenceManager`](super::PresenceManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Uninitialized,
    Connecting,
    /// Updates are forwarded to the channel.
    Connected,
    /// No usable channel; updates are dropped silently.
    Disconnected,
    /// Shut down; every operation is a no-op.
    Terminated,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Internal phase; only `Connected` carries a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Uninitialized,
    Connecting,
    Connected(ChannelHandle),
    Disconnected,
    Terminated,
}

impl Phase {
    pub(crate) fn state(&self) -> ConnectionState {
        match self {
            Phase::Uninitialized => ConnectionState::Uninitialized,
            Phase::Connecting => ConnectionState::Connecting,
            Phase::Connected(_) => ConnectionState::Connected,
            Phase::Disconnected => ConnectionState::Disconnected,
            Phase::Terminated => ConnectionState::Terminated,
        }
    }

    pub(crate) fn handle(&self) -> Option<ChannelHandle> {
        match self {
            Phase::Connected(handle) => Some(*handle),
            _ => None,
        }
    }
}
