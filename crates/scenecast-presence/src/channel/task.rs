//! Channel backed by a tokio task driving an async [`PresenceSink`].
//!
//! Operations are forwarded to the task over an unbounded queue and the
//! task reports each outcome back over a std channel. `poll` drains that
//! channel without waiting, which keeps completion delivery on the thread
//! that owns the manager. A failed sink handshake travels the same way and
//! surfaces through `connection_lost`.

use std::sync::mpsc as std_mpsc;

use async_trait::async_trait;
use scenecast_common::ChannelError;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{ChannelHandle, Completion, PresenceChannel, Ticket, UpdateOutcome};
use crate::descriptor::PresenceDescriptor;

/// The transport that actually shows a presence somewhere.
#[async_trait]
pub trait PresenceSink: Send + 'static {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    async fn connect(&mut self, client_id: u64) -> Result<(), ChannelError>;

    async fn set_presence(&mut self, descriptor: &PresenceDescriptor) -> Result<(), ChannelError>;

    async fn clear_presence(&mut self) -> Result<(), ChannelError>;

    async fn close(&mut self) {}
}

enum Operation {
    Update(Ticket, PresenceDescriptor),
    Clear(Ticket),
}

/// What the sink task sends back.
enum Report {
    Done(Completion),
    HandshakeFailed(ChannelError),
}

struct Link {
    handle: ChannelHandle,
    ops_tx: mpsc::UnboundedSender<Operation>,
    done_rx: std_mpsc::Receiver<Report>,
    lost: Option<ChannelError>,
}

/// A [`PresenceChannel`] that runs its sink on a tokio runtime.
pub struct TaskChannel<S: PresenceSink> {
    sink: Option<S>,
    runtime: Option<Handle>,
    link: Option<Link>,
    next_handle: u64,
    next_ticket: u64,
}

impl<S: PresenceSink> TaskChannel<S> {
    /// Use the runtime current at `connect` time.
    pub fn new(sink: S) -> Self {
        Self {
            sink: Some(sink),
            runtime: None,
            link: None,
            next_handle: 1,
            next_ticket: 1,
        }
    }

    /// Spawn the sink task on `runtime` instead of the current one.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    fn link_for(&self, handle: &ChannelHandle) -> Result<&Link, ChannelError> {
        match &self.link {
            Some(link) if link.handle == *handle => Ok(link),
            _ => Err(ChannelError::InvalidHandle(handle.id())),
        }
    }

    fn link_for_mut(&mut self, handle: &ChannelHandle) -> Option<&mut Link> {
        self.link.as_mut().filter(|link| link.handle == *handle)
    }

    fn send(
        &mut self,
        handle: &ChannelHandle,
        make: impl FnOnce(Ticket) -> Operation,
    ) -> Result<Ticket, ChannelError> {
        let ticket = Ticket::new(self.next_ticket);
        let link = self.link_for(handle)?;
        link.ops_tx
            .send(make(ticket))
            .map_err(|_| ChannelError::Closed)?;
        self.next_ticket += 1;
        Ok(ticket)
    }
}

impl<S: PresenceSink> PresenceChannel for TaskChannel<S> {
    fn name(&self) -> &'static str {
        "task"
    }

    /// Fails fast when no client id is configured, the sink was already
    /// consumed by an earlier connect, or no tokio runtime is reachable.
    /// The sink's own handshake happens inside the task; if it fails, the
    /// failure is reported by `connection_lost` and queued operations
    /// complete with `Failed`.
    fn connect(&mut self, client_id: u64) -> Result<ChannelHandle, ChannelError> {
        if client_id == 0 {
            return Err(ChannelError::Unavailable("no client id configured".into()));
        }

        let runtime = match self.runtime.clone() {
            Some(runtime) => runtime,
            None => Handle::try_current()
                .map_err(|e| ChannelError::Unavailable(format!("no async runtime: {e}")))?,
        };

        let sink = self
            .sink
            .take()
            .ok_or_else(|| ChannelError::Unavailable("sink already consumed".into()))?;

        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = std_mpsc::channel();
        runtime.spawn(run_sink(sink, client_id, ops_rx, done_tx));

        let handle = ChannelHandle::new(self.next_handle);
        self.next_handle += 1;
        self.link = Some(Link {
            handle,
            ops_tx,
            done_rx,
            lost: None,
        });
        Ok(handle)
    }

    fn submit_update(
        &mut self,
        handle: &ChannelHandle,
        descriptor: &PresenceDescriptor,
    ) -> Result<Ticket, ChannelError> {
        let descriptor = descriptor.clone();
        self.send(handle, move |ticket| Operation::Update(ticket, descriptor))
    }

    fn clear_presence(&mut self, handle: &ChannelHandle) -> Result<Ticket, ChannelError> {
        self.send(handle, Operation::Clear)
    }

    fn poll(&mut self, handle: &ChannelHandle) -> Vec<Completion> {
        let Some(link) = self.link_for_mut(handle) else {
            return Vec::new();
        };

        let mut done = Vec::new();
        for report in link.done_rx.try_iter() {
            match report {
                Report::Done(completion) => done.push(completion),
                Report::HandshakeFailed(e) => link.lost = Some(e),
            }
        }
        done
    }

    fn connection_lost(&mut self, handle: &ChannelHandle) -> Option<ChannelError> {
        self.link_for_mut(handle)?.lost.take()
    }

    fn disconnect(&mut self, handle: ChannelHandle) {
        if self.link.as_ref().is_some_and(|l| l.handle == handle) {
            // Dropping the sender ends the task after queued operations drain.
            self.link = None;
            debug!(handle = handle.id(), "task channel disconnected");
        }
    }
}

async fn run_sink<S: PresenceSink>(
    mut sink: S,
    client_id: u64,
    mut ops_rx: mpsc::UnboundedReceiver<Operation>,
    done_tx: std_mpsc::Sender<Report>,
) {
    let connect_error = match sink.connect(client_id).await {
        Ok(()) => {
            info!(sink = sink.name(), "presence sink connected");
            None
        }
        Err(e) => {
            warn!(sink = sink.name(), "presence sink failed to connect: {e}");
            let reason = e.to_string();
            if done_tx.send(Report::HandshakeFailed(e)).is_err() {
                return;
            }
            Some(reason)
        }
    };

    while let Some(op) = ops_rx.recv().await {
        let (ticket, result) = match (&connect_error, op) {
            (Some(reason), Operation::Update(ticket, _) | Operation::Clear(ticket)) => {
                (ticket, Err(reason.clone()))
            }
            (None, Operation::Update(ticket, descriptor)) => (
                ticket,
                sink.set_presence(&descriptor).await.map_err(|e| e.to_string()),
            ),
            (None, Operation::Clear(ticket)) => {
                (ticket, sink.clear_presence().await.map_err(|e| e.to_string()))
            }
        };

        let outcome = match result {
            Ok(()) => UpdateOutcome::Ok,
            Err(reason) => UpdateOutcome::Failed(reason),
        };
        if done_tx.send(Report::Done(Completion { ticket, outcome })).is_err() {
            debug!("completion receiver gone, stopping sink task");
            break;
        }
    }

    if connect_error.is_none() {
        sink.close().await;
    }
    info!(sink = sink.name(), "presence sink task finished");
}
