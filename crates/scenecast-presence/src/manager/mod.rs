//! Presence synchronization manager.
//!
//! Owns the channel connection, the confirmed presence, and the
//! lifecycle from connect to shutdown.

mod core;
mod slot;
mod state;


pub use self::core::{ManagerOptions, PresenceManager};
pub use slot::InstanceSlot;
pub use state::ConnectionState;
