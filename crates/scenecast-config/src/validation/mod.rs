//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod contexts;
mod helpers;
mod presence;

#[cfg(test)]
mod tests;

use crate::schema::ScenecastConfig;
use scenecast_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ScenecastConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    presence::validate_presence(&mut errors, config);
    contexts::validate_contexts(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
