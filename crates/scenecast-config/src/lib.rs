//! scenecast configuration.
//!
//! TOML-based configuration for presence synchronization: channel
//! settings, per-context presence entries, and logging. All sections use
//! defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use scenecast_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("{} contexts", config.contexts.len());
//! ```

pub mod reload;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use reload::{ConfigReloader, FileWatcher};
pub use schema::{ContextPresence, ContextsConfig, LogLevel, PresenceConfig, ScenecastConfig};

use scenecast_common::ConfigError;

/// Load config from the platform default path.
///
/// Creates a documented default file if none exists. Validation problems
/// are logged as warnings and the parsed config is kept.
pub fn load_config() -> Result<ScenecastConfig, ConfigError> {
    toml_loader::load_default()
}
