//! The presence synchronization manager.

use std::collections::HashMap;
use std::sync::Arc;

use scenecast_common::{HostEvent, PresenceError};
use scenecast_config::PresenceConfig;
use tracing::{debug, info, warn};

use crate::channel::{PresenceChannel, Ticket, UpdateOutcome};
use crate::descriptor::{PresenceDescriptor, DEFAULT_IDLE_STATE};
use crate::registry::ContextRegistry;

use super::slot::{InstanceSlot, SlotGuard};
use super::state::{ConnectionState, Phase};

/// Startup options for a [`PresenceManager`].
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub client_id: u64,
    pub auto_context_sync: bool,
    /// Shown for contexts that have no registry entry.
    pub idle: PresenceDescriptor,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            client_id: 0,
            auto_context_sync: true,
            idle: PresenceDescriptor::idle(DEFAULT_IDLE_STATE),
        }
    }
}

impl From<&PresenceConfig> for ManagerOptions {
    fn from(config: &PresenceConfig) -> Self {
        Self {
            client_id: config.client_id,
            auto_context_sync: config.auto_context_sync,
            idle: PresenceDescriptor::idle(config.idle_state.clone()),
        }
    }
}

/// Keeps one external presence in step with the host's active context.
///
/// All state is touched from the thread that owns the manager; channel
/// completions only arrive inside [`tick`](Self::tick). No public
/// operation returns an error after construction: channel trouble is
/// logged and the manager keeps going.
pub struct PresenceManager {
    channel: Box<dyn PresenceChannel>,
    registry: ContextRegistry,
    phase: Phase,
    confirmed: Option<PresenceDescriptor>,
    /// Submitted updates awaiting completion, by ticket.
    in_flight: HashMap<Ticket, PresenceDescriptor>,
    auto_context_sync: bool,
    idle: PresenceDescriptor,
    _slot: SlotGuard,
}

impl PresenceManager {
    /// Start the process-wide manager.
    ///
    /// Fails with [`PresenceError::DuplicateInstance`] while another manager
    /// started this way is alive; the existing one is left untouched and
    /// `channel` is dropped without being connected.
    pub fn start(
        channel: Box<dyn PresenceChannel>,
        registry: ContextRegistry,
        options: ManagerOptions,
    ) -> Result<Self, PresenceError> {
        Self::start_in(&InstanceSlot::global(), channel, registry, options)
    }

    /// Start a manager whose uniqueness is scoped to `slot`.
    pub fn start_in(
        slot: &Arc<InstanceSlot>,
        channel: Box<dyn PresenceChannel>,
        registry: ContextRegistry,
        options: ManagerOptions,
    ) -> Result<Self, PresenceError> {
        let guard = slot.acquire().inspect_err(|_| {
            warn!("presence manager already active, discarding the new one");
        })?;

        let mut manager = Self {
            channel,
            registry,
            phase: Phase::Uninitialized,
            confirmed: None,
            in_flight: HashMap::new(),
            auto_context_sync: options.auto_context_sync,
            idle: options.idle,
            _slot: guard,
        };
        manager.connect(options.client_id);
        Ok(manager)
    }

    fn connect(&mut self, client_id: u64) {
        self.phase = Phase::Connecting;
        debug!(channel = self.channel.name(), client_id, "connecting presence channel");

        self.phase = match self.channel.connect(client_id) {
            Ok(handle) => {
                info!(channel = self.channel.name(), "presence channel connected");
                Phase::Connected(handle)
            }
            Err(e) => {
                warn!(channel = self.channel.name(), "failed to set up presence channel: {e}");
                Phase::Disconnected
            }
        };
    }

    /// Submit `descriptor`. Dropped silently unless connected.
    ///
    /// Earlier requests are not cancelled; every submission resolves on its
    /// own and each successful completion overwrites the confirmed presence
    /// in the order completions arrive.
    pub fn request_update(&mut self, descriptor: PresenceDescriptor) {
        let Some(handle) = self.phase.handle() else {
            debug!(state = %self.state(), "presence update dropped: no channel");
            return;
        };

        match self.channel.submit_update(&handle, &descriptor) {
            Ok(ticket) => {
                debug!(%ticket, presence = %descriptor, "presence update submitted");
                self.in_flight.insert(ticket, descriptor);
            }
            Err(e) => warn!("presence update rejected: {e}"),
        }
    }

    /// The last descriptor the channel confirmed as applied.
    pub fn current_presence(&self) -> Option<&PresenceDescriptor> {
        self.confirmed.as_ref()
    }

    /// Derive and request the presence for a newly active context.
    pub fn on_context_activated(&mut self, name: &str) {
        if !self.auto_context_sync {
            return;
        }

        let descriptor = match self.registry.lookup(name) {
            Some(descriptor) => descriptor,
            None => {
                debug!(context = name, "no presence registered for context, using idle");
                self.idle.clone()
            }
        };
        self.request_update(descriptor);
    }

    /// Let the channel deliver completions. Call once per host cycle.
    pub fn tick(&mut self) {
        let Some(handle) = self.phase.handle() else {
            return;
        };

        for completion in self.channel.poll(&handle) {
            let Some(descriptor) = self.in_flight.remove(&completion.ticket) else {
                debug!(ticket = %completion.ticket, "ignoring completion for untracked ticket");
                continue;
            };
            match completion.outcome {
                UpdateOutcome::Ok => {
                    debug!(ticket = %completion.ticket, presence = %descriptor, "presence confirmed");
                    self.confirmed = Some(descriptor);
                }
                UpdateOutcome::Failed(reason) => {
                    warn!(ticket = %completion.ticket, "presence service could not set presence: {reason}");
                }
            }
        }

        if let Some(e) = self.channel.connection_lost(&handle) {
            warn!(channel = self.channel.name(), "presence channel lost: {e}");
            self.discard_in_flight("channel lost");
            self.channel.disconnect(handle);
            self.phase = Phase::Disconnected;
        }
    }

    /// Clear the remote presence and release the channel. Safe to repeat.
    pub fn shutdown(&mut self) {
        if self.phase == Phase::Terminated {
            return;
        }

        if let Some(handle) = self.phase.handle() {
            if let Err(e) = self.channel.clear_presence(&handle) {
                debug!("clearing presence on shutdown failed: {e}");
            }
            self.channel.disconnect(handle);
            info!(channel = self.channel.name(), "presence channel released");
        }

        self.discard_in_flight("shutdown");
        self.phase = Phase::Terminated;
    }

    fn discard_in_flight(&mut self, cause: &str) {
        if !self.in_flight.is_empty() {
            debug!(count = self.in_flight.len(), cause, "discarding in-flight presence updates");
            self.in_flight.clear();
        }
    }

    /// Route a host event to the matching operation.
    pub fn handle_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::ContextActivated(name) => self.on_context_activated(name),
            HostEvent::Tick => self.tick(),
            HostEvent::Shutdown => self.shutdown(),
            HostEvent::Unknown => {}
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.phase.state()
    }

    pub fn is_connected(&self) -> bool {
        self.phase.handle().is_some()
    }

    /// Number of submitted updates still awaiting completion.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn auto_context_sync(&self) -> bool {
        self.auto_context_sync
    }

    pub fn set_auto_context_sync(&mut self, enabled: bool) {
        self.auto_context_sync = enabled;
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn idle_presence(&self) -> &PresenceDescriptor {
        &self.idle
    }

    pub fn set_idle_presence(&mut self, idle: PresenceDescriptor) {
        self.idle = idle;
    }
}

impl Drop for PresenceManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
