//! The external presence channel seam.
//!
//! A [`PresenceChannel`] wraps whatever service actually displays the
//! presence. Operations never block: submissions hand back a [`Ticket`]
//! and their outcome arrives later as a [`Completion`] returned from
//! [`PresenceChannel::poll`]. Completions are delivered nowhere else, so
//! a channel that is never polled never completes anything.

mod log_sink;
mod loopback;
mod task;

pub use log_sink::LogSink;
pub use loopback::{LoopbackCall, LoopbackChannel, LoopbackControl};
pub use task::{PresenceSink, TaskChannel};

use std::fmt;

use scenecast_common::ChannelError;

use crate::descriptor::PresenceDescriptor;

/// Opaque proof of a successful `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(u64);

impl ChannelHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Identifies one submitted channel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one channel operation as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Ok,
    Failed(String),
}

impl UpdateOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, UpdateOutcome::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: UpdateOutcome,
}

impl Completion {
    pub fn ok(ticket: Ticket) -> Self {
        Self {
            ticket,
            outcome: UpdateOutcome::Ok,
        }
    }

    pub fn failed(ticket: Ticket, reason: impl Into<String>) -> Self {
        Self {
            ticket,
            outcome: UpdateOutcome::Failed(reason.into()),
        }
    }
}

/// Adapter over an external presence service.
pub trait PresenceChannel: Send {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Establish the connection. Absence of the service is an `Err`, never a panic.
    fn connect(&mut self, client_id: u64) -> Result<ChannelHandle, ChannelError>;

    /// Queue a presence update. Must return without waiting for the service.
    fn submit_update(
        &mut self,
        handle: &ChannelHandle,
        descriptor: &PresenceDescriptor,
    ) -> Result<Ticket, ChannelError>;

    /// Queue removal of the shown presence.
    fn clear_presence(&mut self, handle: &ChannelHandle) -> Result<Ticket, ChannelError>;

    /// Collect completions that became ready since the last poll.
    fn poll(&mut self, handle: &ChannelHandle) -> Vec<Completion>;

    /// Take a connection failure that surfaced after `connect` returned,
    /// such as a handshake that only completes in the background. Checked
    /// right after [`poll`](Self::poll); each failure is reported once.
    fn connection_lost(&mut self, _handle: &ChannelHandle) -> Option<ChannelError> {
        None
    }

    /// Release the connection. Calling it again, or for a stale handle, does nothing.
    fn disconnect(&mut self, handle: ChannelHandle);
}
