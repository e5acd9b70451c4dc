//! Presence synchronization for scene-driven applications.
//!
//! Keeps one external presence record (a status line shown by some
//! third-party service) in step with whichever named context the host
//! application has active:
//!
//! - [`descriptor`]: the presence value and its builder
//! - [`registry`]: context name to descriptor mapping
//! - [`channel`]: the seam to the external service, plus in-process and
//!   task-backed implementations
//! - [`manager`]: the state machine tying them together
//!
//! ```rust
//! use scenecast_presence::{
//!     ContextRegistry, LoopbackChannel, ManagerOptions, PresenceDescriptor, PresenceManager,
//! };
//!
//! let registry = ContextRegistry::new();
//! registry.register("Menu", PresenceDescriptor::builder().state("In Menu").build());
//!
//! let mut manager = PresenceManager::start(
//!     Box::new(LoopbackChannel::new()),
//!     registry,
//!     ManagerOptions::default(),
//! )
//! .expect("no other manager running");
//!
//! manager.on_context_activated("Menu");
//! manager.tick();
//! assert_eq!(manager.current_presence().and_then(|p| p.state()), Some("In Menu"));
//! manager.shutdown();
//! ```

pub mod channel;
pub mod descriptor;
pub mod manager;
pub mod registry;

pub use channel::{
    ChannelHandle, Completion, LogSink, LoopbackCall, LoopbackChannel, LoopbackControl,
    PresenceChannel, PresenceSink, TaskChannel, Ticket, UpdateOutcome,
};
pub use descriptor::{Assets, DescriptorBuilder, PresenceDescriptor, Timestamps, DEFAULT_IDLE_STATE};
pub use manager::{ConnectionState, InstanceSlot, ManagerOptions, PresenceManager};
pub use registry::ContextRegistry;
