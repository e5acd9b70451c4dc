//! In-process channel with scriptable behavior.
//!
//! Nothing leaves the process. A [`LoopbackControl`] obtained from the
//! channel decides whether `connect` succeeds, when and how submissions
//! complete (including out of order), and records every call.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scenecast_common::ChannelError;
use tracing::debug;

use super::{ChannelHandle, Completion, PresenceChannel, Ticket, UpdateOutcome};
use crate::descriptor::PresenceDescriptor;

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopbackCall {
    Connect(u64),
    SubmitUpdate(PresenceDescriptor),
    ClearPresence,
    Poll,
    Disconnect,
}

#[derive(Debug)]
struct LoopbackState {
    connect_error: Option<ChannelError>,
    reject_reason: Option<String>,
    /// When set, every pending operation completes with this on the next poll.
    auto_outcome: Option<UpdateOutcome>,
    handle: Option<ChannelHandle>,
    /// Failure waiting to be picked up by `connection_lost`.
    lost: Option<ChannelError>,
    next_handle: u64,
    next_ticket: u64,
    /// Submitted operations by ticket; `None` marks a clear.
    operations: HashMap<Ticket, Option<PresenceDescriptor>>,
    pending: Vec<Ticket>,
    ready: VecDeque<Completion>,
    shown: Option<PresenceDescriptor>,
    calls: Vec<LoopbackCall>,
}

impl Default for LoopbackState {
    fn default() -> Self {
        Self {
            connect_error: None,
            reject_reason: None,
            auto_outcome: Some(UpdateOutcome::Ok),
            handle: None,
            lost: None,
            next_handle: 1,
            next_ticket: 1,
            operations: HashMap::new(),
            pending: Vec::new(),
            ready: VecDeque::new(),
            shown: None,
            calls: Vec::new(),
        }
    }
}

/// A [`PresenceChannel`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct LoopbackChannel {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackChannel {
    /// A channel that connects and completes every operation with `Ok`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose `connect` always fails with `error`.
    pub fn unavailable(error: ChannelError) -> Self {
        let channel = Self::new();
        channel.control().fail_connect(error);
        channel
    }

    /// A handle for scripting and inspecting this channel after it is moved.
    pub fn control(&self) -> LoopbackControl {
        LoopbackControl {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PresenceChannel for LoopbackChannel {
    fn name(&self) -> &'static str {
        "loopback"
    }

    fn connect(&mut self, client_id: u64) -> Result<ChannelHandle, ChannelError> {
        let mut state = self.lock();
        state.calls.push(LoopbackCall::Connect(client_id));

        if let Some(err) = state.connect_error.clone() {
            return Err(err);
        }

        let handle = ChannelHandle::new(state.next_handle);
        state.next_handle += 1;
        state.handle = Some(handle);
        Ok(handle)
    }

    fn submit_update(
        &mut self,
        handle: &ChannelHandle,
        descriptor: &PresenceDescriptor,
    ) -> Result<Ticket, ChannelError> {
        let mut state = self.lock();
        state.calls.push(LoopbackCall::SubmitUpdate(descriptor.clone()));
        state.enqueue(handle, Some(descriptor.clone()))
    }

    fn clear_presence(&mut self, handle: &ChannelHandle) -> Result<Ticket, ChannelError> {
        let mut state = self.lock();
        state.calls.push(LoopbackCall::ClearPresence);
        state.enqueue(handle, None)
    }

    fn poll(&mut self, handle: &ChannelHandle) -> Vec<Completion> {
        let mut state = self.lock();
        state.calls.push(LoopbackCall::Poll);

        if state.handle != Some(*handle) {
            return Vec::new();
        }

        if let Some(outcome) = state.auto_outcome.clone() {
            let pending = std::mem::take(&mut state.pending);
            for ticket in pending {
                state.ready.push_back(Completion {
                    ticket,
                    outcome: outcome.clone(),
                });
            }
        }

        let delivered: Vec<Completion> = state.ready.drain(..).collect();
        for completion in &delivered {
            if let Some(operation) = state.operations.remove(&completion.ticket) {
                if completion.outcome.is_ok() {
                    state.shown = operation;
                }
            }
        }
        delivered
    }

    fn connection_lost(&mut self, handle: &ChannelHandle) -> Option<ChannelError> {
        let mut state = self.lock();
        if state.handle != Some(*handle) {
            return None;
        }
        state.lost.take()
    }

    fn disconnect(&mut self, handle: ChannelHandle) {
        let mut state = self.lock();
        state.calls.push(LoopbackCall::Disconnect);
        if state.handle == Some(handle) {
            state.handle = None;
            state.lost = None;
            state.pending.clear();
            state.ready.clear();
            state.operations.clear();
            debug!(handle = handle.id(), "loopback channel disconnected");
        }
    }
}

impl LoopbackState {
    fn enqueue(
        &mut self,
        handle: &ChannelHandle,
        operation: Option<PresenceDescriptor>,
    ) -> Result<Ticket, ChannelError> {
        if self.handle != Some(*handle) {
            return Err(ChannelError::InvalidHandle(handle.id()));
        }
        if let Some(reason) = &self.reject_reason {
            return Err(ChannelError::Rejected(reason.clone()));
        }

        let ticket = Ticket::new(self.next_ticket);
        self.next_ticket += 1;
        self.operations.insert(ticket, operation);
        self.pending.push(ticket);
        Ok(ticket)
    }
}

/// Scripting and inspection handle for a [`LoopbackChannel`].
#[derive(Debug, Clone)]
pub struct LoopbackControl {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackControl {
    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later `connect` fail with `error`.
    pub fn fail_connect(&self, error: ChannelError) {
        self.lock().connect_error = Some(error);
    }

    /// Report `error` as a lost connection on the next `connection_lost` check.
    /// Does nothing while disconnected.
    pub fn drop_connection(&self, error: ChannelError) {
        let mut state = self.lock();
        if state.handle.is_some() {
            state.lost = Some(error);
        }
    }

    /// Make every later submission fail synchronously with `Rejected(reason)`.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        self.lock().reject_reason = Some(reason.into());
    }

    /// Complete every pending operation with `outcome` on each poll.
    pub fn auto_complete(&self, outcome: UpdateOutcome) {
        self.lock().auto_outcome = Some(outcome);
    }

    /// Leave operations pending until [`complete`](Self::complete) resolves them.
    pub fn manual(&self) {
        self.lock().auto_outcome = None;
    }

    /// Resolve one pending operation; it is delivered on the next poll.
    /// Returns `false` if `ticket` is not pending.
    pub fn complete(&self, ticket: Ticket, outcome: UpdateOutcome) -> bool {
        let mut state = self.lock();
        let Some(index) = state.pending.iter().position(|t| *t == ticket) else {
            return false;
        };
        state.pending.remove(index);
        state.ready.push_back(Completion { ticket, outcome });
        true
    }

    /// Tickets submitted and not yet resolved, oldest first.
    pub fn pending(&self) -> Vec<Ticket> {
        self.lock().pending.clone()
    }

    pub fn calls(&self) -> Vec<LoopbackCall> {
        self.lock().calls.clone()
    }

    /// Descriptors passed to `submit_update`, in call order.
    pub fn submitted(&self) -> Vec<PresenceDescriptor> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                LoopbackCall::SubmitUpdate(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls equal to `call`.
    pub fn count(&self, call: &LoopbackCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// What the simulated service currently shows.
    pub fn shown(&self) -> Option<PresenceDescriptor> {
        self.lock().shown.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().handle.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> (LoopbackChannel, LoopbackControl, ChannelHandle) {
        let mut channel = LoopbackChannel::new();
        let control = channel.control();
        let handle = channel.connect(7).unwrap();
        (channel, control, handle)
    }

    #[test]
    fn connect_records_client_id() {
        let (_channel, control, handle) = connected();
        assert_eq!(handle.id(), 1);
        assert!(control.is_connected());
        assert_eq!(control.calls(), vec![LoopbackCall::Connect(7)]);
    }

    #[test]
    fn unavailable_channel_refuses_connect() {
        let mut channel = LoopbackChannel::unavailable(ChannelError::Unavailable("down".into()));
        let err = channel.connect(1).unwrap_err();
        assert_eq!(err, ChannelError::Unavailable("down".into()));
        assert!(!channel.control().is_connected());
    }

    #[test]
    fn submissions_complete_only_on_poll() {
        let (mut channel, control, handle) = connected();
        let d = PresenceDescriptor::idle("In Menu");
        let ticket = channel.submit_update(&handle, &d).unwrap();

        assert_eq!(control.pending(), vec![ticket]);
        assert!(control.shown().is_none());

        let done = channel.poll(&handle);
        assert_eq!(done, vec![Completion::ok(ticket)]);
        assert_eq!(control.shown(), Some(d));
        assert!(control.pending().is_empty());
    }

    #[test]
    fn manual_mode_resolves_in_chosen_order() {
        let (mut channel, control, handle) = connected();
        control.manual();

        let first = channel.submit_update(&handle, &PresenceDescriptor::idle("a")).unwrap();
        let second = channel.submit_update(&handle, &PresenceDescriptor::idle("b")).unwrap();
        assert!(channel.poll(&handle).is_empty());

        assert!(control.complete(second, UpdateOutcome::Ok));
        assert!(control.complete(first, UpdateOutcome::Ok));
        assert!(!control.complete(first, UpdateOutcome::Ok));

        let done = channel.poll(&handle);
        assert_eq!(done, vec![Completion::ok(second), Completion::ok(first)]);
        assert_eq!(control.shown(), Some(PresenceDescriptor::idle("a")));
    }

    #[test]
    fn failed_completion_leaves_shown_presence() {
        let (mut channel, control, handle) = connected();
        channel.submit_update(&handle, &PresenceDescriptor::idle("a")).unwrap();
        channel.poll(&handle);

        control.auto_complete(UpdateOutcome::Failed("busy".into()));
        let ticket = channel.submit_update(&handle, &PresenceDescriptor::idle("b")).unwrap();
        let done = channel.poll(&handle);

        assert_eq!(done, vec![Completion::failed(ticket, "busy")]);
        assert_eq!(control.shown(), Some(PresenceDescriptor::idle("a")));
    }

    #[test]
    fn clear_removes_shown_presence() {
        let (mut channel, control, handle) = connected();
        channel.submit_update(&handle, &PresenceDescriptor::idle("a")).unwrap();
        channel.clear_presence(&handle).unwrap();
        channel.poll(&handle);
        assert!(control.shown().is_none());
    }

    #[test]
    fn rejected_submission_is_an_error() {
        let (mut channel, control, handle) = connected();
        control.reject_submissions("rate limited");
        let err = channel
            .submit_update(&handle, &PresenceDescriptor::idle("a"))
            .unwrap_err();
        assert_eq!(err, ChannelError::Rejected("rate limited".into()));
        assert!(control.pending().is_empty());
    }

    #[test]
    fn stale_handle_is_refused() {
        let (mut channel, _control, handle) = connected();
        channel.disconnect(handle);
        let err = channel.clear_presence(&handle).unwrap_err();
        assert_eq!(err, ChannelError::InvalidHandle(handle.id()));
        assert!(channel.poll(&handle).is_empty());
    }

    #[test]
    fn dropped_connection_is_reported_once() {
        let (mut channel, control, handle) = connected();
        assert!(channel.connection_lost(&handle).is_none());

        control.drop_connection(ChannelError::Closed);
        assert_eq!(channel.connection_lost(&handle), Some(ChannelError::Closed));
        assert!(channel.connection_lost(&handle).is_none());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut channel, control, handle) = connected();
        channel.disconnect(handle);
        channel.disconnect(handle);
        assert!(!control.is_connected());
        assert_eq!(control.count(&LoopbackCall::Disconnect), 2);
    }
}
