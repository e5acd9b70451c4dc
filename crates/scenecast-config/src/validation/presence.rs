//! Validation for the `[presence]` section.

use crate::schema::ScenecastConfig;

use super::helpers::validate_range;

/// Validate presence constraints.
pub(crate) fn validate_presence(errors: &mut Vec<String>, config: &ScenecastConfig) {
    validate_range(
        errors,
        "presence.tick_interval_ms",
        config.presence.tick_interval_ms,
        1,
        1000,
    );
}
