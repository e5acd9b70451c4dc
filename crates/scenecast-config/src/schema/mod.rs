//! Configuration schema types for scenecast.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod contexts;
mod presence;
mod system;

pub use contexts::*;
pub use presence::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ScenecastConfig {
    pub presence: PresenceConfig,
    pub contexts: ContextsConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
