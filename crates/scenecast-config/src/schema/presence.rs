//! Presence channel and synchronization settings.

use serde::{Deserialize, Serialize};

/// Presence synchronization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Application identifier handed to the presence channel on connect.
    /// Zero means "not configured"; the channel will refuse to connect.
    pub client_id: u64,
    /// Derive presence automatically when a context becomes active.
    pub auto_context_sync: bool,
    /// State text of the fallback descriptor used for unregistered contexts.
    pub idle_state: String,
    /// Host tick interval in milliseconds (valid range: 1-1000).
    pub tick_interval_ms: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            client_id: 0,
            auto_context_sync: true,
            idle_state: "Idle".to_string(),
            tick_interval_ms: 16,
        }
    }
}
